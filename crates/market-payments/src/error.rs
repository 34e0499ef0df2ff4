//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Top-up request rejected before it reached the backend
    #[error("Invalid top-up: {0}")]
    InvalidTopup(String),

    /// Backend refused to create a gateway payment
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Reconciliation call failed (network or non-2xx)
    #[error("Reconciliation failed: {0}")]
    Reconciliation(String),

    /// No session to attach to a payment call
    #[error("Not authenticated")]
    Unauthenticated,
}

impl PaymentError {
    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidTopup(reason) => reason.clone(),
            Self::Gateway(message) => message.clone(),
            Self::Unauthenticated => "Please log in again to continue.".into(),
            Self::Reconciliation(_) => "An error occurred processing your request.".into(),
        }
    }
}
