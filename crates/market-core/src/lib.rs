//! # market-core
//!
//! Session ownership, route gating and domain models for the carbon-credit
//! marketplace front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SessionService                          │
//! │  ┌──────────────┐   ┌────────────────┐   ┌───────────────┐   │
//! │  │SessionStorage│──▶│ get/set/clear  │──▶│ watch channel │   │
//! │  │ (localStorage│   │                │   │  (subscribe)  │   │
//! │  │  or memory)  │   └────────────────┘   └───────┬───────┘   │
//! │  └──────────────┘                                │           │
//! └──────────────────────────────────────────────────┼───────────┘
//!                                                    ▼
//!                                  authorize(state, route.access())
//! ```
//!
//! Pages never touch storage directly: they ask the `SessionService` and the
//! one `authorize` function in [`access`].

pub mod access;
pub mod auth;
pub mod error;
pub mod model;
pub mod session;

pub use access::{Access, AdminSection, Decision, Route, authorize, resolve};
pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use error::{MarketError, Result};
pub use session::{
    AuthUser, MemoryStorage, Session, SessionService, SessionState, SessionStorage, UserRole,
};
