use std::env;

pub const CODE_TRANSFORMATION_ENV: &str = "DATA_SOURCE_CODE_TRANSFORMATION";

/// How source files reach the module loader.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CodeTransformation {
    /// Compiled output is loaded; candidate paths are mapped to the build directory.
    #[default]
    None,
    /// The loader executes source files directly; paths stay as written.
    JustInTime,
}

impl CodeTransformation {
    /// Read the mode from `DATA_SOURCE_CODE_TRANSFORMATION`, falling back to `None`.
    pub fn from_env() -> Self {
        match env::var(CODE_TRANSFORMATION_ENV) {
            Ok(raw) => Self::parse(&raw).unwrap_or_else(|| {
                log::warn!("Ignoring unsupported {CODE_TRANSFORMATION_ENV} value '{raw}'");
                Self::None
            }),
            Err(_) => Self::None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "jit" | "just-in-time" | "just_in_time" => Some(Self::JustInTime),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }

    pub fn is_just_in_time(self) -> bool {
        self == Self::JustInTime
    }
}
