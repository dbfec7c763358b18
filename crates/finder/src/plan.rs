//! Candidate planning: from sparse hints to an ordered list of extensionless
//! lookup paths.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::adjust::PathAdjuster;
use crate::context::LookupContext;
use crate::error::AdjustError;
use crate::tsconfig::TsConfig;

/// Base name tried when no hint matches.
pub const DEFAULT_BASE_NAME: &str = "data-source";

/// Suffixes removed from a file-name hint.
pub const HINT_EXTENSIONS: &[&str] = &[".ts", ".mts", ".cts", ".js", ".mjs", ".cjs"];

/// Directory alternation tried below `src/`.
const SOURCE_SUBDIRECTORIES: &str = "{db,database}";

/// How a directory hint takes part in the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryHint {
    /// Absolute directory, searched as an additional root.
    Root(PathBuf),
    /// Relative directory, prefixed onto every base name.
    Pattern(String),
}

impl DirectoryHint {
    pub fn classify(directory: &str) -> Self {
        if Path::new(directory).is_absolute() {
            Self::Root(PathBuf::from(directory))
        } else {
            Self::Pattern(normalize_separators(directory))
        }
    }
}

/// Active project-layout adjustment for one planning pass.
#[derive(Clone, Copy)]
pub struct Adjustment<'a> {
    pub adjuster: &'a dyn PathAdjuster,
    pub layout: Option<&'a TsConfig>,
}

/// Ordered, extensionless search plan plus the roots it is resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPlan {
    pub candidates: Vec<String>,
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CandidatePlanner {
    fallback_name: String,
}

impl Default for CandidatePlanner {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_NAME)
    }
}

impl CandidatePlanner {
    pub fn new(fallback_name: impl Into<String>) -> Self {
        Self {
            fallback_name: fallback_name.into(),
        }
    }

    /// Base names in priority order: the hint (extension stripped), then the
    /// fallback name. The hint is dropped when it equals the fallback.
    pub fn base_names(&self, file_name: Option<&str>) -> Vec<String> {
        let mut names = vec![self.fallback_name.clone()];
        if let Some(hint) = file_name {
            let hint = strip_file_extension(hint, HINT_EXTENSIONS);
            if !hint.is_empty() && hint != self.fallback_name {
                names.insert(0, hint.to_string());
            }
        }
        names
    }

    /// Build the plan for `ctx`. With `adjustment`, the directory hint and
    /// every candidate are rewritten in place.
    pub fn plan(
        &self,
        ctx: &LookupContext,
        root: &Path,
        adjustment: Option<Adjustment<'_>>,
    ) -> Result<SearchPlan, AdjustError> {
        let directory = ctx
            .directory_hint()
            .map(DirectoryHint::classify)
            .map(|hint| adjust_directory(hint, root, adjustment))
            .transpose()?;

        let pattern = match &directory {
            Some(DirectoryHint::Pattern(pattern)) => Some(pattern.as_str()),
            _ => None,
        };

        let mut candidates = expand_candidates(&self.base_names(ctx.file_name_hint()), pattern);

        if let Some(Adjustment { adjuster, layout }) = adjustment {
            for candidate in candidates.iter_mut() {
                *candidate = adjuster.adjust(candidate, layout, root)?;
            }
        }

        let mut roots = vec![root.to_path_buf()];
        if let Some(DirectoryHint::Root(dir)) = directory {
            roots.push(dir);
        }

        Ok(SearchPlan { candidates, roots })
    }
}

fn adjust_directory(
    hint: DirectoryHint,
    root: &Path,
    adjustment: Option<Adjustment<'_>>,
) -> Result<DirectoryHint, AdjustError> {
    let Some(Adjustment { adjuster, layout }) = adjustment else {
        return Ok(hint);
    };

    Ok(match hint {
        DirectoryHint::Root(dir) => {
            let adjusted = adjuster.adjust(&dir.to_string_lossy(), layout, root)?;
            DirectoryHint::Root(PathBuf::from(adjusted))
        }
        DirectoryHint::Pattern(pattern) => {
            DirectoryHint::Pattern(adjuster.adjust(&pattern, layout, root)?)
        }
    })
}

/// Bare names first, then per name (in order) the optional directory-pattern
/// variant, `src/{name}` and `src/{db,database}/{name}`.
pub fn expand_candidates(base_names: &[String], directory_pattern: Option<&str>) -> Vec<String> {
    let mut qualified = Vec::with_capacity(base_names.len() * 3);
    for name in base_names {
        if let Some(pattern) = directory_pattern {
            qualified.push(posix_join(pattern, name));
        }
        qualified.push(posix_join("src", name));
        qualified.push(posix_join(&format!("src/{SOURCE_SUBDIRECTORIES}"), name));
    }

    let mut candidates = base_names.to_vec();
    candidates.extend(qualified);
    candidates
}

/// Remove the first matching suffix from `extensions`, once.
pub fn strip_file_extension<'a>(name: &'a str, extensions: &[&str]) -> &'a str {
    extensions
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Join two `/` separated paths and normalize `.`/`..` segments and repeated
/// separators.
pub fn posix_join(base: &str, name: &str) -> String {
    let joined = match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{name}"),
    };
    let absolute = joined.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (absolute, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
