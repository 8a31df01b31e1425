//! Domain error types.

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("price source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },

    #[error("invalid risk parameters: {reason}")]
    InvalidRiskParameters { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    /// Shorthand for the series-length precondition failure.
    pub fn too_few_bars(bars: usize, minimum: usize) -> Self {
        TradesimError::InsufficientData {
            reason: format!("have {bars} bars, need at least {minimum}"),
        }
    }

    /// Process exit status for this failure category.
    pub fn exit_code(&self) -> u8 {
        match self {
            TradesimError::Io(_) => 1,
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. } => 2,
            TradesimError::SourceUnavailable { .. } => 3,
            TradesimError::InvalidRiskParameters { .. } => 4,
            TradesimError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
