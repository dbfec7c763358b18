//! Module loading. Loading a module executes it.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::LoadError;
use crate::exports::ExportShape;

const BRIDGE_SCRIPT: &str = include_str!("bridge.mjs");
const OUTPUT_MARKER: &str = "@@datasource-finder@@";
pub const MODULE_PATH_ENV: &str = "DATA_SOURCE_MODULE_PATH";

#[async_trait]
pub trait ModuleLoader: Send + Sync {
    type Exports: ExportShape + Send + Sync;

    /// Execute the module at `path` and return its exports.
    async fn load(&self, path: &Path) -> Result<Self::Exports, LoadError>;
}

/// Loads modules by running a JavaScript runtime over an embedded bridge
/// script that prints a JSON description of the module namespace.
#[derive(Debug, Clone)]
pub struct RuntimeModuleLoader {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl Default for RuntimeModuleLoader {
    fn default() -> Self {
        Self::new("node")
    }
}

impl RuntimeModuleLoader {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Arguments placed before the bridge script, e.g. `--import tsx`.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--input-type=module")
            .arg("--eval")
            .arg(BRIDGE_SCRIPT)
            .env(MODULE_PATH_ENV, path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

#[async_trait]
impl ModuleLoader for RuntimeModuleLoader {
    type Exports = Value;

    async fn load(&self, path: &Path) -> Result<Value, LoadError> {
        log::debug!("Loading {} with {}", path.display(), self.program);
        let output = self
            .command(path)
            .output()
            .await
            .map_err(|source| LoadError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(LoadError::Execution {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_runtime_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract the export description following the last output marker. Anything
/// the module printed before it is ignored.
pub fn parse_runtime_output(stdout: &str) -> Result<Value, LoadError> {
    let (_, payload) = stdout
        .rsplit_once(OUTPUT_MARKER)
        .ok_or(LoadError::MissingOutput)?;
    Ok(serde_json::from_str(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exports::{select_instance, ExportSlot, InstanceOfPredicate};

    #[test]
    fn output_after_marker_is_parsed() {
        let stdout = format!(
            "connecting...\n{OUTPUT_MARKER}{}\n",
            r#"{"default": {"@instanceof": {"$symbol": "DataSource"}, "options": {"type": "sqlite"}}}"#
        );
        let exports = parse_runtime_output(&stdout).unwrap();
        let (slot, value) = select_instance(&exports, &InstanceOfPredicate::data_source()).unwrap();
        assert_eq!(slot, ExportSlot::Default);
        assert_eq!(value["options"]["type"], "sqlite");
    }

    #[test]
    fn missing_marker_is_an_error() {
        let err = parse_runtime_output("hello\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingOutput));
    }

    #[test]
    fn garbage_after_marker_is_an_error() {
        let err = parse_runtime_output(&format!("{OUTPUT_MARKER}{{nope")).unwrap_err();
        assert!(matches!(err, LoadError::InvalidOutput(_)));
    }

    #[test]
    fn command_places_runtime_args_first() {
        let loader = RuntimeModuleLoader::new("node")
            .with_args(["--import", "tsx"])
            .with_working_dir("/project");
        let command = loader.command(Path::new("/project/src/data-source.ts"));
        let std_command = command.as_std();
        let args: Vec<_> = std_command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[..4], ["--import", "tsx", "--input-type=module", "--eval"]);
        assert_eq!(std_command.get_current_dir(), Some(Path::new("/project")));
    }

    #[tokio::test]
    async fn missing_runtime_is_a_spawn_error() {
        let loader = RuntimeModuleLoader::new("datasource-finder-no-such-runtime");
        let err = loader
            .load(Path::new("/nonexistent/data-source.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Spawn { .. }));
    }
}
