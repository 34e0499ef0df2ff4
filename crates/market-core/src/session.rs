//! Session Management
//!
//! The session is the client-held bearer token plus the cached user profile.
//! Both live in persistent key/value storage (`localStorage` in the browser)
//! and are only ever read or written through [`SessionService`], which also
//! publishes every change so pages can await a restored session instead of
//! polling storage.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use futures::future;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{MarketError, Result};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the serialized user record
pub const USER_KEY: &str = "auth_user";

/// Marketplace roles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Credit owner / trader
    #[default]
    Owner,
    /// Back-office administrator
    Admin,
}

impl UserRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }
}

/// Cached user profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// An authenticated session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential
    pub token: String,

    /// User profile captured at login
    pub user: AuthUser,
}

impl Session {
    pub fn new(token: impl Into<String>, user: AuthUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == UserRole::Admin
    }
}

/// Where the session lifecycle currently stands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Startup hydration has not finished yet
    #[default]
    Restoring,
    /// No session in storage
    Anonymous,
    /// Token and user both present
    Authenticated(Session),
}

impl SessionState {
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub const fn is_restoring(&self) -> bool {
        matches!(self, Self::Restoring)
    }

    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Persistent key/value storage (the browser's `localStorage` contract)
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory storage (for native use and tests)
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

fn poisoned<T>(_: T) -> MarketError {
    MarketError::Storage("storage lock poisoned".into())
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.remove(key);
        Ok(())
    }
}

struct Inner {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

/// Single owner of the token/user pair.
///
/// Cloning is cheap; all clones share the same storage and change channel.
#[derive(Clone)]
pub struct SessionService {
    inner: Arc<Inner>,
}

impl SessionService {
    /// Create a service over `storage`. The state starts as
    /// [`SessionState::Restoring`] until [`restore`](Self::restore) runs.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::Restoring);
        Self {
            inner: Arc::new(Inner { storage, state }),
        }
    }

    /// In-memory service
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Hydrate from storage and publish the result
    pub fn restore(&self) -> Option<Session> {
        let session = self.get();
        let state = session
            .clone()
            .map_or(SessionState::Anonymous, SessionState::Authenticated);
        self.inner.state.send_replace(state);
        session
    }

    /// Read the persisted session.
    ///
    /// Returns `None` unless both token and user are present. A user record
    /// that fails to decode is removed from storage.
    pub fn get(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(MarketError::CorruptSession(reason)) => {
                tracing::warn!(reason = %reason, "Discarding corrupt stored user");
                if let Err(e) = self.inner.storage.remove_item(USER_KEY) {
                    tracing::warn!(error = %e, "Failed to remove corrupt user record");
                }
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session storage unavailable");
                None
            }
        }
    }

    fn load(&self) -> Result<Option<Session>> {
        let storage = &self.inner.storage;
        let Some(user) = storage.get_item(USER_KEY)? else {
            return Ok(None);
        };
        let user: AuthUser = serde_json::from_str(&user)
            .map_err(|e| MarketError::CorruptSession(e.to_string()))?;
        let token = storage.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty());
        Ok(token.map(|token| Session::new(token, user)))
    }

    /// Bearer token, if a session exists
    pub fn token(&self) -> Option<String> {
        self.get().map(|s| s.token)
    }

    /// Persist `session` and notify subscribers
    pub fn set(&self, session: Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.inner.storage.set_item(USER_KEY, &user)?;
        self.inner.storage.set_item(TOKEN_KEY, &session.token)?;

        tracing::debug!(user_id = %session.user.id, role = session.user.role.as_str(), "Session stored");
        self.inner.state.send_replace(SessionState::Authenticated(session));
        Ok(())
    }

    /// Remove the session and notify subscribers
    pub fn clear(&self) -> Result<()> {
        self.inner.storage.remove_item(TOKEN_KEY)?;
        self.inner.storage.remove_item(USER_KEY)?;

        tracing::debug!("Session cleared");
        self.inner.state.send_replace(SessionState::Anonymous);
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Change notifications (login, logout, restore)
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Wait for a session until `deadline` resolves.
    ///
    /// Returns immediately when storage already holds a session. Otherwise
    /// waits for the next authenticated state change or for `deadline`,
    /// then re-reads storage. Storage is the only source of the answer, so a
    /// stale published state never counts. `None` means the caller should
    /// treat the user as logged out.
    pub async fn wait_ready<F>(&self, deadline: F) -> Option<Session>
    where
        F: Future<Output = ()>,
    {
        if let Some(session) = self.get() {
            return Some(session);
        }

        let mut changes = self.subscribe();
        // Only changes published from here on count
        changes.borrow_and_update();
        let signalled = async move {
            while changes.changed().await.is_ok() {
                if changes.borrow_and_update().is_authenticated() {
                    break;
                }
            }
        };

        futures::pin_mut!(signalled);
        futures::pin_mut!(deadline);

        future::select(signalled, deadline).await;
        self.get()
    }
}
