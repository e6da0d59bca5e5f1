use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error, Clone)]
pub enum AppError {
    /// Represents data validation errors (e.g., a wizard flow missing its mandatory field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., invalid environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents a failure reported by the external zero-shot classifier.
    #[error("Oracle classifier error: {0}")]
    Oracle(String),

    /// Represents a failure reported by the external NER collaborator.
    #[error("NER error: {0}")]
    Ner(String),

    /// Represents errors from the persistence collaborator.
    #[error("Store error: {0}")]
    Store(String),

    /// A confidence score outside the [0, 1] contract. This indicates a
    /// misbehaving oracle and is treated as fatal rather than clamped.
    #[error("Confidence score {0} is outside [0, 1]")]
    ScoreOutOfRange(f32),

    /// A wizard start was requested while the user already has one in progress.
    #[error("A dialogue session is already in progress for user '{0}'")]
    SessionConflict(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Validation(format!("URL parse error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Validation(format!("Date parse error: {}", err))
    }
}
