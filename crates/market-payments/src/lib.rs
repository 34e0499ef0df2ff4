//! # market-payments
//!
//! Wallet top-up and payment-gateway return handling for the carbon-credit
//! marketplace.
//!
//! ## Gateway round trip
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │ Wallet page │────▶│  Gateway hosted │────▶│  /vnpay-return   │
//! │  (top-up)   │     │  checkout page  │     │ (ReturnFlow)     │
//! └─────────────┘     └─────────────────┘     └────────┬─────────┘
//!                                                      │
//!                     ┌────────────────────────────────┼──────────────┐
//!                     ▼                                ▼              ▼
//!              session guard                 PaymentOutcome    reconciliation
//!          (wait ≤ grace window)          (pure, from query)  (fire-and-forget)
//! ```
//!
//! The outcome shown to the user is computed from the redirect parameters
//! only. The backend reconciliation call runs alongside it and its result is
//! logged, never displayed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_payments::{GatewayQuery, ReturnFlow, SESSION_GRACE};
//!
//! let flow = ReturnFlow::new(sessions, api_client);
//! if let Some(route) = flow.check_session(sleep(SESSION_GRACE)).await.redirect() {
//!     navigate(route);
//! }
//!
//! let query = GatewayQuery::parse(&location.search);
//! let outcome = flow.outcome(&query);
//! spawn(async move { flow.reconcile(&query).await; });
//! ```

mod error;
mod flow;
mod gateway;
mod response_code;
mod topup;

pub use error::{PaymentError, Result};
pub use flow::{
    Reconciler, Reconciliation, ReturnFlow, SESSION_GRACE, SessionCheck, reconciliation_error,
};
pub use gateway::{
    AMOUNT_PARAM, GatewayQuery, INVALID_RESPONSE_MESSAGE, PaymentOutcome, RESPONSE_CODE_PARAM,
    RecoveryAction, TXN_REF_PARAM, format_amount,
};
pub use response_code::{Locale, ResponseCode, fallback_message};
pub use topup::{CreateTopupResponse, MIN_TOPUP, TopupMethod, TopupRequest};
