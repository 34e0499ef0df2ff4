//! Payment-Return Flow
//!
//! Drives the `/vnpay-return` page:
//!
//! 1. **Session guard**: the redirect can land before the session has been
//!    restored. Wait up to the grace window for it before sending the user
//!    to the login page.
//! 2. **Outcome**: computed locally from the query string
//!    ([`PaymentOutcome::from_query`]).
//! 3. **Reconciliation**: the full query is forwarded to the backend so it
//!    can confirm the payment server-side. The call is fire-and-forget; its
//!    result is logged and never changes what the page shows.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use market_core::{Route, Session, SessionService};

use crate::error::{PaymentError, Result};
use crate::gateway::{GatewayQuery, PaymentOutcome};
use crate::response_code::Locale;

/// How long the return page waits for a lagging session restore
pub const SESSION_GRACE: Duration = Duration::from_secs(1);

/// Backend endpoint that confirms a gateway redirect
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Reconciler {
    /// Forward the redirect query, authenticated with `token` when present
    async fn reconcile(&self, query: &GatewayQuery, token: Option<&str>)
    -> Result<serde_json::Value>;
}

/// Result of the session guard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCheck {
    Present(Session),
    /// Still absent after the grace window
    Missing,
}

impl SessionCheck {
    /// Where to send the user, if anywhere
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::Present(_) => None,
            Self::Missing => Some(Route::Login),
        }
    }
}

/// What happened to the reconciliation call
#[derive(Clone, Debug, PartialEq)]
pub enum Reconciliation {
    Confirmed(serde_json::Value),
    Failed(String),
    /// Redirect was not well formed; nothing sent
    Skipped,
}

/// Return-page controller
pub struct ReturnFlow<R> {
    sessions: SessionService,
    reconciler: Arc<R>,
    locale: Locale,
}

impl<R> Clone for ReturnFlow<R> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            reconciler: self.reconciler.clone(),
            locale: self.locale,
        }
    }
}

impl<R: Reconciler> ReturnFlow<R> {
    pub fn new(sessions: SessionService, reconciler: Arc<R>) -> Self {
        Self {
            sessions,
            reconciler,
            locale: Locale::default(),
        }
    }

    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Confirm a session exists, waiting until `grace` resolves for one to
    /// be restored.
    pub async fn check_session<F>(&self, grace: F) -> SessionCheck
    where
        F: Future<Output = ()>,
    {
        if let Some(session) = self.sessions.wait_ready(grace).await {
            return SessionCheck::Present(session);
        }

        tracing::warn!("No authentication found, redirecting to login");
        SessionCheck::Missing
    }

    /// Outcome to render; a pure function of the query
    pub fn outcome(&self, query: &GatewayQuery) -> PaymentOutcome {
        PaymentOutcome::from_query(query, self.locale)
    }

    /// Forward the redirect to the backend.
    ///
    /// Never fails: errors are logged and reported as
    /// [`Reconciliation::Failed`].
    pub async fn reconcile(&self, query: &GatewayQuery) -> Reconciliation {
        if !query.is_well_formed() {
            tracing::debug!("Skipping reconciliation for malformed redirect");
            return Reconciliation::Skipped;
        }

        let token = self.sessions.token();
        match self.reconciler.reconcile(query, token.as_deref()).await {
            Ok(body) => {
                tracing::info!(txn_ref = ?query.txn_ref(), "Payment processed");
                Reconciliation::Confirmed(body)
            }
            Err(e) => {
                tracing::error!(txn_ref = ?query.txn_ref(), error = %e, "Failed to process payment");
                Reconciliation::Failed(e.to_string())
            }
        }
    }
}

/// Map a transport failure into the reconciliation error
pub fn reconciliation_error(e: impl std::fmt::Display) -> PaymentError {
    PaymentError::Reconciliation(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::INVALID_RESPONSE_MESSAGE;
    use market_core::{AuthUser, UserRole};
    use std::sync::Mutex;

    /// Records every call; fails when `fail` is set
    #[derive(Default)]
    struct RecordingReconciler {
        calls: Mutex<Vec<(String, Option<String>)>>,
        fail: bool,
    }

    impl RecordingReconciler {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Reconciler for RecordingReconciler {
        async fn reconcile(
            &self,
            query: &GatewayQuery,
            token: Option<&str>,
        ) -> Result<serde_json::Value> {
            self.calls
                .lock()
                .unwrap()
                .push((query.as_str().to_string(), token.map(str::to_string)));
            if self.fail {
                Err(reconciliation_error("502 Bad Gateway"))
            } else {
                Ok(serde_json::json!({ "success": true }))
            }
        }
    }

    fn session() -> Session {
        Session::new(
            "jwt",
            AuthUser {
                id: "1".into(),
                email: "owner@example.com".into(),
                name: "owner".into(),
                role: UserRole::Owner,
            },
        )
    }

    const SUCCESS_QUERY: &str = "vnp_Amount=5000000&vnp_ResponseCode=00&vnp_TxnRef=ABC123";

    #[tokio::test]
    async fn test_session_arriving_within_grace_is_kept() {
        let sessions = SessionService::in_memory();
        let flow = ReturnFlow::new(sessions.clone(), Arc::new(RecordingReconciler::default()));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            sessions.set(session()).unwrap();
        });

        let check = flow.check_session(tokio::time::sleep(SESSION_GRACE)).await;
        assert_eq!(check, SessionCheck::Present(session()));
        assert_eq!(check.redirect(), None);
    }

    #[tokio::test]
    async fn test_restored_anonymous_user_reaches_grace_window() {
        let sessions = SessionService::in_memory();
        sessions.restore();

        // The route guard lets the page mount and run its own check
        let state = sessions.state();
        assert_eq!(
            market_core::resolve(&state, &format!("/vnpay-return?{SUCCESS_QUERY}")),
            market_core::Decision::Allow
        );

        let flow = ReturnFlow::new(sessions.clone(), Arc::new(RecordingReconciler::default()));
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            sessions.set(session()).unwrap();
        });

        let check = flow.check_session(tokio::time::sleep(SESSION_GRACE)).await;
        assert_eq!(check.redirect(), None);
    }

    #[tokio::test]
    async fn test_missing_session_redirects_to_login() {
        let flow = ReturnFlow::new(
            SessionService::in_memory(),
            Arc::new(RecordingReconciler::default()),
        );

        let check = flow
            .check_session(tokio::time::sleep(Duration::from_millis(30)))
            .await;
        assert_eq!(check, SessionCheck::Missing);
        assert_eq!(check.redirect(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_existing_session_skips_wait() {
        let sessions = SessionService::in_memory();
        sessions.set(session()).unwrap();
        let flow = ReturnFlow::new(sessions, Arc::new(RecordingReconciler::default()));

        // A deadline that never fires proves no waiting happens.
        let check = flow.check_session(futures::future::pending()).await;
        assert!(matches!(check, SessionCheck::Present(_)));
    }

    #[tokio::test]
    async fn test_reconcile_forwards_query_and_token() {
        let sessions = SessionService::in_memory();
        sessions.set(session()).unwrap();
        let reconciler = Arc::new(RecordingReconciler::default());
        let flow = ReturnFlow::new(sessions, reconciler.clone());

        let query = GatewayQuery::parse(&format!("?{SUCCESS_QUERY}&vnp_SecureHash=ff"));
        let result = flow.reconcile(&query).await;

        assert!(matches!(result, Reconciliation::Confirmed(_)));
        assert_eq!(
            reconciler.calls(),
            vec![(
                format!("{SUCCESS_QUERY}&vnp_SecureHash=ff"),
                Some("jwt".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_reconcile_failure_leaves_outcome_unchanged() {
        let flow = ReturnFlow::new(
            SessionService::in_memory(),
            Arc::new(RecordingReconciler::failing()),
        );
        let query = GatewayQuery::parse(SUCCESS_QUERY);

        let before = flow.outcome(&query);
        let result = flow.reconcile(&query).await;
        let after = flow.outcome(&query);

        assert!(matches!(result, Reconciliation::Failed(_)));
        assert_eq!(before, after);
        assert!(after.success);
        assert_eq!(after.display_amount, "50,000");
    }

    #[tokio::test]
    async fn test_malformed_redirect_is_not_forwarded() {
        let reconciler = Arc::new(RecordingReconciler::default());
        let flow = ReturnFlow::new(SessionService::in_memory(), reconciler.clone());
        let query = GatewayQuery::parse("vnp_TxnRef=ABC");

        assert_eq!(flow.reconcile(&query).await, Reconciliation::Skipped);
        assert!(reconciler.calls().is_empty());
        assert_eq!(flow.outcome(&query).message, INVALID_RESPONSE_MESSAGE);
    }

    #[test]
    fn test_locale_switch() {
        let flow = ReturnFlow::new(
            SessionService::in_memory(),
            Arc::new(RecordingReconciler::default()),
        )
        .with_locale(Locale::En);
        let outcome = flow.outcome(&GatewayQuery::parse("vnp_ResponseCode=24&vnp_TxnRef=Z"));
        assert_eq!(outcome.message, "Transaction failed: you cancelled the payment.");
    }
}
