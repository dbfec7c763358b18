use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tsconfig::TsConfig;

/// Hints for a single resolution call. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LookupContext {
    /// Base name tried before the fallback name. A source extension suffix is stripped.
    pub file_name: Option<String>,

    /// Absolute directory (extra search root) or relative directory pattern
    /// (prefixed onto every base name).
    pub directory: Option<String>,

    /// Use candidate paths literally, without project-layout adjustment.
    pub preserve_file_paths: bool,

    /// Where the project-layout configuration comes from.
    #[serde(rename = "tsconfig")]
    pub project_layout: ProjectLayout,
}

impl LookupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn preserving_file_paths(mut self) -> Self {
        self.preserve_file_paths = true;
        self
    }

    pub fn with_project_layout(mut self, layout: ProjectLayout) -> Self {
        self.project_layout = layout;
        self
    }

    /// The file-name hint, exactly as given, if non-empty.
    pub(crate) fn file_name_hint(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }

    /// The directory hint, exactly as given, if non-empty.
    pub(crate) fn directory_hint(&self) -> Option<&str> {
        self.directory.as_deref().filter(|dir| !dir.is_empty())
    }
}

/// Source of the project-layout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectLayout {
    /// Look for `tsconfig.json` in the project root.
    #[default]
    Discover,
    /// A configuration file, or a directory containing `tsconfig.json`.
    File(PathBuf),
    /// An already parsed configuration.
    Inline(TsConfig),
}
