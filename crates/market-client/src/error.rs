//! Client Error Types

use market_core::MarketError;
use market_payments::PaymentError;
use thiserror::Error;

/// Result type alias for client calls
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Call needs a session and there is none
    #[error("Not authenticated")]
    Unauthenticated,

    #[error(transparent)]
    Core(#[from] MarketError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl ClientError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "The server is unreachable. Please try again.".into(),
            Self::Status { status: 401 | 403, .. } | Self::Unauthenticated => {
                "Your session has expired. Please log in again.".into()
            }
            Self::Core(e) => e.user_message(),
            Self::Payment(e) => e.user_message(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
