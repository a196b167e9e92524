//! Domain error types.

/// Top-level error type for fxcross.
#[derive(Debug, thiserror::Error)]
pub enum FxcrossError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read {path}: {reason}")]
    DataRead { path: String, reason: String },

    #[error("missing column {column} in {path}")]
    MissingColumn { path: String, column: String },

    #[error("malformed data in {path} at line {line}: {reason}")]
    MalformedData {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("duplicate timestamp {timestamp} in {path}")]
    DuplicateTimestamp { path: String, timestamp: String },

    #[error("no price data in {path}")]
    NoData { path: String },

    #[error("failed to write report {path}: {reason}")]
    ReportWrite { path: String, reason: String },
}

impl FxcrossError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        FxcrossError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&FxcrossError> for std::process::ExitCode {
    fn from(err: &FxcrossError) -> Self {
        let code: u8 = match err {
            FxcrossError::ConfigParse { .. } | FxcrossError::ConfigInvalid { .. } => 2,
            FxcrossError::DataRead { .. }
            | FxcrossError::MissingColumn { .. }
            | FxcrossError::MalformedData { .. }
            | FxcrossError::DuplicateTimestamp { .. }
            | FxcrossError::NoData { .. } => 3,
            FxcrossError::ReportWrite { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
