//! Authentication payloads
//!
//! Wire types for the login/register endpoints and the mapping from a login
//! response to a stored [`Session`].

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};
use crate::session::{AuthUser, Session, UserRole};

/// Backend role name that grants admin access
pub const ADMIN_ROLE: &str = "ADMIN";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Login/register response body
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl AuthResponse {
    /// Role granted by the backend role list
    pub fn role(&self) -> UserRole {
        let is_admin = self
            .roles
            .as_deref()
            .is_some_and(|roles| roles.iter().any(|r| r == ADMIN_ROLE));
        if is_admin { UserRole::Admin } else { UserRole::Owner }
    }

    /// Build the session to persist after a successful login.
    ///
    /// `submitted_email` is what the user typed; it backs the profile when
    /// the response omits the email or full name.
    pub fn into_session(self, submitted_email: &str) -> Result<Session> {
        let role = self.role();
        let (Some(user_id), Some(token)) = (self.user_id, self.token.filter(|t| !t.is_empty()))
        else {
            return Err(MarketError::Auth("login response missing userId or token".into()));
        };

        let name = self
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| display_name_from_email(submitted_email), str::to_string);

        let user = AuthUser {
            id: user_id.to_string(),
            email: self.email.unwrap_or_else(|| submitted_email.to_string()),
            name,
            role,
        };

        Ok(Session::new(token, user))
    }
}

/// Local part of an email, or the whole string when there is none
fn display_name_from_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}
