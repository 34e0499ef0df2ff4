//! Wallet Top-Up
//!
//! Two ways to add funds: a direct credit (demo path, no gateway) or a
//! hosted gateway checkout, where the backend signs a payment URL and the
//! browser is redirected to it.
//!
//! ```text
//! ┌─────────────┐  POST /payment/vnpay/create  ┌─────────────┐
//! │ Wallet page │─────────────────────────────▶│   Backend   │
//! └─────────────┘◀──────── paymentUrl ─────────└─────────────┘
//!        │ redirect
//!        ▼
//! ┌─────────────┐        redirect back          ┌──────────────┐
//! │   Gateway   │──────────────────────────────▶│ /vnpay-return│
//! └─────────────┘                               └──────────────┘
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};

/// Smallest accepted top-up
pub const MIN_TOPUP: Decimal = dec!(10);

const DEFAULT_GATEWAY_ERROR: &str = "Failed to create payment";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopupMethod {
    /// Credit the wallet directly
    Direct,
    /// Redirect through the payment gateway
    #[default]
    #[serde(rename = "vnpay")]
    Gateway,
}

/// Validated top-up request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupRequest {
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl TopupRequest {
    /// Validate form input. `user_id` is the session's string id.
    pub fn new(user_id: &str, amount: Decimal) -> Result<Self> {
        if amount < MIN_TOPUP {
            return Err(PaymentError::InvalidTopup(format!("Minimum top-up is {MIN_TOPUP}")));
        }
        let user_id = user_id
            .trim()
            .parse()
            .map_err(|_| PaymentError::InvalidTopup(format!("Invalid user id: {user_id}")))?;
        Ok(Self { user_id, amount })
    }

    /// Parse the amount field of the top-up form
    pub fn parse_amount(raw: &str) -> Result<Decimal> {
        raw.trim()
            .parse()
            .map_err(|_| PaymentError::InvalidTopup("Amount is required".into()))
    }
}

/// Backend reply to a gateway checkout request (also used for error bodies)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopupResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl CreateTopupResponse {
    /// Payment URL to redirect to, or the backend's explanation
    pub fn into_payment_url(self) -> Result<String> {
        if self.success {
            if let Some(url) = self.payment_url.as_deref().filter(|u| !u.is_empty()) {
                return Ok(url.to_string());
            }
        }
        Err(self.into_error())
    }

    /// Error carrying `error`, else `message`, with `hint` appended
    pub fn into_error(self) -> PaymentError {
        let mut text = self
            .error
            .or(self.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_GATEWAY_ERROR.into());
        if let Some(hint) = self.hint.filter(|h| !h.is_empty()) {
            text.push_str("\n\n");
            text.push_str(&hint);
        }
        PaymentError::Gateway(text)
    }
}
