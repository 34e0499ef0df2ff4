//! # market-client
//!
//! Typed REST client for the carbon-market backend.
//!
//! ## Endpoints
//!
//! - **Auth**: login (stores the session), register, logout
//! - **Wallet**: balance, history, direct credit, gateway checkout
//! - **Payment**: gateway return confirmation (implements [`Reconciler`])
//! - **Listings / transactions / credits**: marketplace reads and purchase
//! - **Admin**: back-office actions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_client::{ApiClient, ClientConfig};
//! use market_core::SessionService;
//!
//! let sessions = SessionService::in_memory();
//! let api = ApiClient::new(&ClientConfig::from_env(), sessions)?;
//! let session = api.login("owner@example.com", "secret").await?;
//! let wallet = api.wallet(&session.user.id).await?;
//! ```
//!
//! [`Reconciler`]: market_payments::Reconciler

pub mod admin;
pub mod api;
mod auth;
pub mod cache;
pub mod config;
pub mod error;

pub use admin::{BalanceKind, ReportRange, TransactionAction, UserAction};
pub use api::ApiClient;
pub use cache::QueryCache;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
