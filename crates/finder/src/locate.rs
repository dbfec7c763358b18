//! File lookup for one candidate across a set of search roots.

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::LocateError;

/// Extensions accepted for a module file, in preference order.
pub const MODULE_EXTENSIONS: &[&str] = &["js", "cjs", "mjs", "ts", "cts", "mts"];

/// Matches excluded from every lookup.
pub const DEFAULT_IGNORE: &[&str] = &["**/*.d.ts"];

/// Build `<candidate>.{ext1,ext2,...}`.
pub fn extension_pattern(candidate: &str, extensions: &[String]) -> String {
    format!("{candidate}.{{{}}}", extensions.join(","))
}

#[async_trait]
pub trait FileLocator: Send + Sync {
    /// First file matching `pattern` below any of `roots`, in root order.
    async fn locate(
        &self,
        pattern: &str,
        roots: &[PathBuf],
        ignore: &[String],
    ) -> Result<Option<PathBuf>, LocateError>;
}

/// Glob based locator. Only the literal directory prefix of a pattern is
/// walked, bounded by the number of remaining segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobLocator;

#[async_trait]
impl FileLocator for GlobLocator {
    async fn locate(
        &self,
        pattern: &str,
        roots: &[PathBuf],
        ignore: &[String],
    ) -> Result<Option<PathBuf>, LocateError> {
        let pattern = pattern.to_string();
        let roots = roots.to_vec();
        let ignore = ignore.to_vec();
        tokio::task::spawn_blocking(move || locate_blocking(&pattern, &roots, &ignore)).await?
    }
}

fn locate_blocking(
    pattern: &str,
    roots: &[PathBuf],
    ignore: &[String],
) -> Result<Option<PathBuf>, LocateError> {
    let matcher = compile_glob(pattern)?;
    let ignore = compile_ignore(ignore)?;
    let preference = extension_preference(pattern);
    let (base, depth) = literal_base(pattern);

    if Path::new(pattern).is_absolute() {
        return search(None, Path::new(&base), depth, &matcher, &ignore, &preference);
    }

    for root in roots {
        let dir = if base.is_empty() {
            root.clone()
        } else {
            root.join(&base)
        };
        if let Some(found) = search(Some(root), &dir, depth, &matcher, &ignore, &preference)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

fn search(
    root: Option<&Path>,
    dir: &Path,
    depth: Option<usize>,
    matcher: &GlobMatcher,
    ignore: &GlobSet,
    preference: &[String],
) -> Result<Option<PathBuf>, LocateError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut walker = WalkDir::new(dir).min_depth(1).follow_links(true);
    if let Some(depth) = depth {
        walker = walker.max_depth(depth);
    }

    let mut best: Option<(usize, String, PathBuf)> = None;
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                log::debug!("Skipping unreadable entry below {}: {err}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = match root {
            Some(root) => path.strip_prefix(root).unwrap_or(path),
            None => path,
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        if !matcher.is_match(&relative) || ignore.is_match(&relative) {
            continue;
        }

        let rank = preference
            .iter()
            .position(|ext| relative.ends_with(&format!(".{ext}")))
            .unwrap_or(preference.len());
        let better = match &best {
            Some((best_rank, best_rel, _)) => (rank, &relative) < (*best_rank, best_rel),
            None => true,
        };
        if better {
            best = Some((rank, relative, path.to_path_buf()));
        }
    }

    if let Some((_, relative, _)) = &best {
        log::debug!("Matched {relative} in {}", dir.display());
    }
    Ok(best.map(|(_, _, path)| path))
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, LocateError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| LocateError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn compile_ignore(patterns: &[String]) -> Result<GlobSet, LocateError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| LocateError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| LocateError::InvalidPattern {
        pattern: patterns.join(","),
        source,
    })
}

/// Alternatives of a trailing `.{a,b,c}` group, in order.
fn extension_preference(pattern: &str) -> Vec<String> {
    let Some(group) = pattern
        .strip_suffix('}')
        .and_then(|rest| rest.rsplit_once(".{"))
        .map(|(_, group)| group)
    else {
        return Vec::new();
    };
    group.split(',').map(str::to_string).collect()
}

/// Leading segments without glob syntax, and how deep the rest may reach
/// (`None` when a `**` segment is present).
fn literal_base(pattern: &str) -> (String, Option<usize>) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let is_literal = |segment: &str| !segment.contains(['*', '?', '[', '{']);

    let literal = segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .take_while(|segment| is_literal(segment))
        .count();
    let rest = &segments[literal..];
    let depth = if rest.iter().any(|segment| segment.contains("**")) {
        None
    } else {
        Some(rest.len())
    };

    let base = segments[..literal].join("/");
    let base = if base.is_empty() && pattern.starts_with('/') {
        "/".to_string()
    } else {
        base
    };
    (base, depth)
}
