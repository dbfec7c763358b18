use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FindError>;

/// Hard failures of a resolution call. "Nothing found" is `Ok(None)`, not an error.
#[derive(Error, Debug)]
pub enum FindError {
    #[error("Failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("Project layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Path adjustment error: {0}")]
    Adjustment(#[from] AdjustError),

    #[error("Invalid project root: {0}")]
    InvalidRoot(#[source] std::io::Error),
}

/// Failure while executing a located module.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to spawn module runtime '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Module evaluation failed (exit status {status}): {stderr}")]
    Execution { status: String, stderr: String },

    #[error("Module runtime produced invalid output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("Module runtime produced no export description")]
    MissingOutput,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure of the file locator for a single candidate. Never fatal.
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Locator task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure while reading the project-layout configuration.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed layout configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while rewriting a candidate path.
#[derive(Error, Debug)]
pub enum AdjustError {
    #[error("Invalid path alias '{0}': at most one '*' is allowed")]
    InvalidAlias(String),

    #[error("Path alias '{0}' has no targets")]
    EmptyAlias(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn invalid_root_keeps_io_cause() {
        let err = FindError::InvalidRoot(io::Error::new(io::ErrorKind::NotFound, "cwd removed"));
        assert_eq!(err.to_string(), "Invalid project root: cwd removed");

        let cause = err
            .source()
            .and_then(|source| source.downcast_ref::<io::Error>())
            .expect("io cause");
        assert_eq!(cause.kind(), io::ErrorKind::NotFound);
    }
}
