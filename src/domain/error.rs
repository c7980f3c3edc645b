//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for aavc.
#[derive(Debug, thiserror::Error)]
pub enum AavcError {
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

    #[error("no price data for {ticker} between {start} and {end}")]
    TickerNotFound {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("failed to fetch prices for {ticker}: {reason}")]
    DataFetch { ticker: String, reason: String },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid parameters for {strategy}: {reason}")]
    InvalidParameters { strategy: String, reason: String },

    #[error("failed to write log {path}: {reason}")]
    LogWrite { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AavcError {
    pub(crate) fn invalid_params(strategy: &str, reason: impl Into<String>) -> Self {
        AavcError::InvalidParameters {
            strategy: strategy.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AavcError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl AavcError {
    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            AavcError::Io(_) | AavcError::LogWrite { .. } => 1,
            AavcError::ConfigParse { .. }
            | AavcError::ConfigMissing { .. }
            | AavcError::ConfigInvalid { .. } => 2,
            AavcError::DataFetch { .. } => 3,
            AavcError::UnknownStrategy { .. } | AavcError::InvalidParameters { .. } => 4,
            AavcError::TickerNotFound { .. } => 5,
        }
    }
}

impl From<&AavcError> for std::process::ExitCode {
    fn from(err: &AavcError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
