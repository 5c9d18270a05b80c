use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    FormatError(#[from] std::fmt::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl ExplainError {
    /// Transport, status and decode failures all count as one "request failed".
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            ExplainError::ApiError(_)
                | ExplainError::StatusError { .. }
                | ExplainError::SerializationError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExplainError>;
