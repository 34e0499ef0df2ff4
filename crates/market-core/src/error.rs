//! Error Types

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Core error types
#[derive(Error, Debug)]
pub enum MarketError {
    /// Persistent storage unavailable or rejected the operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored session data could not be decoded
    #[error("Corrupt session data: {0}")]
    CorruptSession(String),

    /// Login response did not carry the fields a session needs
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Backend payload did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarketError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(_) => "Unable to log in. Please check your credentials.".into(),
            Self::Storage(_) | Self::CorruptSession(_) => {
                "Your session could not be restored. Please log in again.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}
