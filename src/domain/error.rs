//! Domain error types.
//!
//! Only configuration and data-loading problems are fatal; per-bar data gaps
//! are handled inside the engine and surface as diagnostics counters, never
//! as errors.

/// Top-level error type for reclaimer.
#[derive(Debug, thiserror::Error)]
pub enum ReclaimerError {
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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} at {timeframe}")]
    NoData { symbol: String, timeframe: String },

    #[error("insufficient data for {symbol} at {timeframe}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        timeframe: String,
        bars: usize,
        minimum: usize,
    },

    #[error("unknown timeframe: {input:?}")]
    UnknownTimeframe { input: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ReclaimerError> for std::process::ExitCode {
    fn from(err: &ReclaimerError) -> Self {
        let code: u8 = match err {
            ReclaimerError::Io(_) => 1,
            ReclaimerError::ConfigParse { .. }
            | ReclaimerError::ConfigMissing { .. }
            | ReclaimerError::ConfigInvalid { .. } => 2,
            ReclaimerError::Data { .. }
            | ReclaimerError::NoData { .. }
            | ReclaimerError::InsufficientData { .. } => 3,
            ReclaimerError::UnknownTimeframe { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
