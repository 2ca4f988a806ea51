use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("Store unavailable: connection lock poisoned")]
    StoreLockPoisoned,

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl From<validator::ValidationErrors> for WeatherError {
    fn from(errors: validator::ValidationErrors) -> Self {
        WeatherError::Validation(errors.to_string())
    }
}

impl WeatherError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        WeatherError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// True when the caller supplied bad input (4xx-equivalent); everything
    /// else is a failure on our side (5xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WeatherError::MalformedRecord { .. }
                | WeatherError::InvalidFileName(_)
                | WeatherError::Validation(_)
        )
    }
}
