//! Domain error types.
//!
//! The simulation core itself never fails mid-run: insufficient history
//! resolves to an absent value and malformed rule vocabulary resolves to
//! "no match". These errors cover the edges around the core (construction,
//! configuration, data loading and report writing).

/// Top-level error type for botsim.
#[derive(Debug, thiserror::Error)]
pub enum BotsimError {
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

    #[error("invalid rule [{section}]: {reason}")]
    RuleInvalid { section: String, reason: String },

    #[error("no logic rules defined")]
    NoRules,

    #[error("price series length mismatch: close={close}, high={high}, low={low}")]
    SeriesLength {
        close: usize,
        high: usize,
        low: usize,
    },

    #[error("failed to load price data from {source_name}: {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("failed to write report {path}: {reason}")]
    ReportWrite { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BotsimError> for std::process::ExitCode {
    fn from(err: &BotsimError) -> Self {
        let code: u8 = match err {
            BotsimError::Io(_) => 1,
            BotsimError::ConfigParse { .. }
            | BotsimError::ConfigMissing { .. }
            | BotsimError::ConfigInvalid { .. } => 2,
            BotsimError::RuleInvalid { .. } | BotsimError::NoRules => 4,
            BotsimError::SeriesLength { .. } | BotsimError::DataLoad { .. } => 5,
            BotsimError::ReportWrite { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
