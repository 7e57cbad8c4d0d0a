//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stockpulse.
#[derive(Debug, thiserror::Error)]
pub enum StockpulseError {
    #[error("insufficient data for {context}: have {available} bars, need {required}")]
    InsufficientData {
        context: String,
        available: usize,
        required: usize,
    },

    #[error("row {row} ({date}) is missing {field}: {content}")]
    DataIntegrity {
        row: usize,
        date: NaiveDate,
        field: String,
        content: String,
    },

    #[error("invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error("no data available for {symbol}")]
    DataUnavailable { symbol: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("unknown strategy '{name}' (expected 'rsi' or 'macd')")]
    UnknownStrategy { name: String },

    #[error("invalid lookback period '{value}'")]
    InvalidPeriod { value: String },

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

    #[error("prediction failed: {reason}")]
    Prediction { reason: String },

    #[error("sentiment unavailable: {reason}")]
    Sentiment { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockpulseError {
    pub fn insufficient(context: &str, available: usize, required: usize) -> Self {
        StockpulseError::InsufficientData {
            context: context.to_string(),
            available,
            required,
        }
    }

    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StockpulseError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&StockpulseError> for std::process::ExitCode {
    fn from(err: &StockpulseError) -> Self {
        let code: u8 = match err {
            StockpulseError::Io(_) | StockpulseError::Json(_) => 1,
            StockpulseError::ConfigParse { .. }
            | StockpulseError::ConfigMissing { .. }
            | StockpulseError::ConfigInvalid { .. }
            | StockpulseError::UnknownStrategy { .. }
            | StockpulseError::InvalidPeriod { .. } => 2,
            StockpulseError::DataSource { .. } | StockpulseError::InvalidSeries { .. } => 3,
            StockpulseError::DataUnavailable { .. } | StockpulseError::InsufficientData { .. } => 5,
            StockpulseError::DataIntegrity { .. } => 6,
            StockpulseError::Prediction { .. } | StockpulseError::Sentiment { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
