//! Project-layout aware rewriting of candidate paths.

use std::path::Path;

use crate::error::AdjustError;
use crate::plan::{normalize_separators, posix_join};
use crate::tsconfig::TsConfig;

const DEFAULT_SOURCE_DIR: &str = "src";
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Rewrites one candidate path. Applied entry by entry, so a plan keeps its
/// length and order.
pub trait PathAdjuster: Send + Sync {
    fn adjust(
        &self,
        path: &str,
        layout: Option<&TsConfig>,
        root: &Path,
    ) -> Result<String, AdjustError>;
}

/// Maps source paths to their compiled location: resolves `paths` aliases,
/// swaps the source root for `outDir` and `.ts` style extensions for `.js`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutDirAdjuster;

impl PathAdjuster for OutDirAdjuster {
    fn adjust(
        &self,
        path: &str,
        layout: Option<&TsConfig>,
        root: &Path,
    ) -> Result<String, AdjustError> {
        let path = normalize_separators(path);

        if Path::new(&path).is_absolute() {
            let base = normalize_separators(&root.to_string_lossy());
            let base = base.trim_end_matches('/');
            let Some(relative) = path
                .strip_prefix(base)
                .and_then(|rest| rest.strip_prefix('/'))
            else {
                return Ok(path);
            };
            let adjusted = adjust_relative(relative, layout)?;
            return Ok(format!("{base}/{adjusted}"));
        }

        adjust_relative(&path, layout)
    }
}

fn adjust_relative(path: &str, layout: Option<&TsConfig>) -> Result<String, AdjustError> {
    let options = layout.map(|config| &config.compiler_options);

    let mut path = match options {
        Some(options) => resolve_alias(path, options)?.unwrap_or_else(|| path.to_string()),
        None => path.to_string(),
    };

    if [".js", ".mjs", ".cjs"].iter().any(|ext| path.ends_with(ext)) {
        return Ok(path);
    }

    let source_dir = options
        .and_then(|o| o.root_dir.as_deref())
        .map(trim_dir)
        .filter(|dir| !dir.is_empty())
        .unwrap_or(DEFAULT_SOURCE_DIR);
    let output_dir = options
        .and_then(|o| o.out_dir.as_deref())
        .map(trim_dir)
        .filter(|dir| !dir.is_empty())
        .unwrap_or(DEFAULT_OUTPUT_DIR);

    let stripped = trim_dir(&path);
    if stripped == source_dir {
        path = output_dir.to_string();
    } else if let Some(rest) = stripped
        .strip_prefix(source_dir)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        path = format!("{output_dir}/{rest}");
    }

    for (from, to) in [(".mts", ".mjs"), (".cts", ".cjs"), (".ts", ".js")] {
        if let Some(stem) = path.strip_suffix(from) {
            return Ok(format!("{stem}{to}"));
        }
    }

    Ok(path)
}

/// Apply the first matching `paths` alias, if any.
fn resolve_alias(
    path: &str,
    options: &crate::tsconfig::CompilerOptions,
) -> Result<Option<String>, AdjustError> {
    let base_url = options.base_url.as_deref().map(trim_dir).unwrap_or("");

    for (pattern, targets) in options.aliases() {
        let captured = match pattern.split_once('*') {
            None if pattern == path => String::new(),
            None => continue,
            Some((prefix, suffix)) => {
                if suffix.contains('*') {
                    return Err(AdjustError::InvalidAlias(pattern.to_string()));
                }
                if path.len() < prefix.len() + suffix.len()
                    || !path.starts_with(prefix)
                    || !path.ends_with(suffix)
                {
                    continue;
                }
                path[prefix.len()..path.len() - suffix.len()].to_string()
            }
        };

        let target = targets
            .first()
            .ok_or_else(|| AdjustError::EmptyAlias(pattern.to_string()))?;
        if target.matches('*').count() > 1 {
            return Err(AdjustError::InvalidAlias(target.to_string()));
        }
        let replaced = target.replacen('*', &captured, 1);
        let resolved = posix_join(base_url, &replaced);
        log::debug!("Resolved alias '{pattern}': {path} -> {resolved}");
        return Ok(Some(resolved));
    }

    Ok(None)
}

fn trim_dir(dir: &str) -> &str {
    let mut dir = dir.trim();
    while let Some(rest) = dir.strip_prefix("./") {
        dir = rest;
    }
    if dir == "." {
        return "";
    }
    dir.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsconfig::parse_tsconfig;
    use std::path::PathBuf;

    fn adjust(path: &str, layout: Option<&TsConfig>) -> String {
        OutDirAdjuster
            .adjust(path, layout, &PathBuf::from("/project"))
            .unwrap()
    }

    #[test]
    fn source_root_maps_to_dist_by_default() {
        assert_eq!(adjust("src/data-source", None), "dist/data-source");
        assert_eq!(
            adjust("src/{db,database}/data-source", None),
            "dist/{db,database}/data-source"
        );
        assert_eq!(adjust("./src/data-source", None), "dist/data-source");
        assert_eq!(adjust("data-source", None), "data-source");
        assert_eq!(adjust("srcs/data-source", None), "srcs/data-source");
    }

    #[test]
    fn layout_overrides_directories() {
        let layout =
            parse_tsconfig(r#"{"compilerOptions": {"rootDir": "./app", "outDir": "./build/"}}"#)
                .unwrap();
        assert_eq!(adjust("app/data-source", Some(&layout)), "build/data-source");
        assert_eq!(adjust("src/data-source", Some(&layout)), "src/data-source");
    }

    #[test]
    fn typescript_extensions_become_javascript() {
        assert_eq!(adjust("src/data-source.ts", None), "dist/data-source.js");
        assert_eq!(adjust("src/data-source.mts", None), "dist/data-source.mjs");
        assert_eq!(adjust("config.cts", None), "config.cjs");
        assert_eq!(adjust("src/data-source.js", None), "src/data-source.js");
    }

    #[test]
    fn absolute_paths_inside_root_are_adjusted() {
        assert_eq!(
            adjust("/project/src/data-source", None),
            "/project/dist/data-source"
        );
        assert_eq!(adjust("/elsewhere/src/data-source", None), "/elsewhere/src/data-source");
    }

    #[test]
    fn windows_separators_are_normalized() {
        assert_eq!(adjust("src\\db\\data-source", None), "dist/db/data-source");
    }

    #[test]
    fn aliases_resolve_before_output_mapping() {
        let layout = parse_tsconfig(
            r#"{"compilerOptions": {"baseUrl": ".", "paths": {"@/*": ["src/*"], "@config": ["config/main"]}}}"#,
        )
        .unwrap();
        assert_eq!(adjust("@/db/data-source", Some(&layout)), "dist/db/data-source");
        assert_eq!(adjust("@config", Some(&layout)), "config/main");
        assert_eq!(adjust("data-source", Some(&layout)), "data-source");
    }

    #[test]
    fn alias_with_two_wildcards_is_rejected() {
        let layout =
            parse_tsconfig(r#"{"compilerOptions": {"paths": {"@/*/x/*": ["src/*"]}}}"#).unwrap();
        let err = OutDirAdjuster
            .adjust("@/a/x/b", Some(&layout), &PathBuf::from("/project"))
            .unwrap_err();
        assert!(matches!(err, AdjustError::InvalidAlias(_)));
    }
}
