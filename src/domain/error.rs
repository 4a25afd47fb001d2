//! Domain error types.

/// Top-level error type for dualthrust.
#[derive(Debug, thiserror::Error)]
pub enum DualThrustError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DualThrustError> for std::process::ExitCode {
    fn from(err: &DualThrustError) -> Self {
        let code: u8 = match err {
            DualThrustError::Io(_) => 1,
            DualThrustError::ConfigParse { .. }
            | DualThrustError::ConfigMissing { .. }
            | DualThrustError::ConfigInvalid { .. } => 2,
            DualThrustError::Data { .. } => 3,
            DualThrustError::InvalidParameter { .. } => 4,
            DualThrustError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
