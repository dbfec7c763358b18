//! Project-layout configuration (`tsconfig.json`).
//!
//! Only the compiler options that influence where compiled files end up are
//! parsed: `outDir`, `rootDir`, `baseUrl` and `paths`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::context::ProjectLayout;
use crate::error::LayoutError;

pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TsConfig {
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    pub out_dir: Option<String>,
    pub root_dir: Option<String>,
    pub base_url: Option<String>,
    /// Alias pattern -> ordered replacement targets. Declaration order is kept.
    pub paths: serde_json::Map<String, serde_json::Value>,
}

impl CompilerOptions {
    /// Alias entries in declaration order. Non-string targets are skipped.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.paths.iter().map(|(pattern, targets)| {
            let targets = match targets {
                serde_json::Value::Array(items) => {
                    items.iter().filter_map(|t| t.as_str()).collect()
                }
                serde_json::Value::String(single) => vec![single.as_str()],
                _ => Vec::new(),
            };
            (pattern.as_str(), targets)
        })
    }
}

/// Reads the project-layout configuration a resolution call should use.
#[async_trait]
pub trait LayoutReader: Send + Sync {
    /// `Ok(None)` when no configuration exists.
    async fn read(
        &self,
        root: &Path,
        layout: &ProjectLayout,
    ) -> Result<Option<TsConfig>, LayoutError>;
}

/// Reads `tsconfig.json` from disk, tolerating comments and trailing commas.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsConfigReader;

#[async_trait]
impl LayoutReader for TsConfigReader {
    async fn read(
        &self,
        root: &Path,
        layout: &ProjectLayout,
    ) -> Result<Option<TsConfig>, LayoutError> {
        let path = match layout {
            ProjectLayout::Inline(config) => return Ok(Some(config.clone())),
            ProjectLayout::Discover => root.join(TSCONFIG_FILE_NAME),
            ProjectLayout::File(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    root.join(path)
                };
                if tokio::fs::metadata(&path)
                    .await
                    .map(|meta| meta.is_dir())
                    .unwrap_or(false)
                {
                    path.join(TSCONFIG_FILE_NAME)
                } else {
                    path
                }
            }
        };

        read_tsconfig_file(&path).await
    }
}

/// Parse a tsconfig file. A missing file is `Ok(None)`.
pub async fn read_tsconfig_file(path: &Path) -> Result<Option<TsConfig>, LayoutError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No layout configuration at {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(LayoutError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_tsconfig(&raw).map_err(|source| LayoutError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded layout configuration from {}", path.display());
    Ok(Some(config))
}

pub fn parse_tsconfig(raw: &str) -> Result<TsConfig, serde_json::Error> {
    serde_json::from_str(&strip_jsonc(raw))
}

/// Remove `//` and `/* */` comments and trailing commas, leaving string
/// literals untouched.
fn strip_jsonc(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                out.push(c);
                i += 1;
                while i < chars.len() {
                    let s = chars[i];
                    out.push(s);
                    i += 1;
                    if s == '\\' {
                        if let Some(&escaped) = chars.get(i) {
                            out.push(escaped);
                            i += 1;
                        }
                    } else if s == '"' {
                        break;
                    }
                }
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                let next = chars[i + 1..]
                    .iter()
                    .copied()
                    .find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
