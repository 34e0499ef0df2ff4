//! Application context shared by every page

use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use market_client::{ApiClient, ClientConfig, ClientError};
use market_core::{SessionService, SessionState};
use market_payments::{Locale, ReturnFlow};

use crate::storage::{LocalStorage, api_base_url};

#[derive(Clone)]
pub struct AppContext {
    pub sessions: SessionService,
    pub api: ApiClient,
    pub locale: Locale,
    /// Mirrors the session service so views re-render on login/logout
    pub session: RwSignal<SessionState>,
}

impl AppContext {
    /// Build the context, restore the persisted session and start mirroring
    /// session changes into a signal.
    pub fn init() -> Result<Self, ClientError> {
        let sessions = SessionService::new(Arc::new(LocalStorage));
        let api = ApiClient::new(&ClientConfig::with_base_url(api_base_url()), sessions.clone())?;

        let session = RwSignal::new(sessions.state());
        let mut changes = sessions.subscribe();
        spawn_local(async move {
            while changes.changed().await.is_ok() {
                let state = changes.borrow_and_update().clone();
                session.set(state);
            }
        });

        if let Some(restored) = sessions.restore() {
            tracing::debug!(user_id = %restored.user.id, "Session restored");
        }
        session.set(sessions.state());

        Ok(Self {
            sessions,
            api,
            locale: Locale::default(),
            session,
        })
    }

    pub fn return_flow(&self) -> ReturnFlow<ApiClient> {
        ReturnFlow::new(self.sessions.clone(), Arc::new(self.api.clone())).with_locale(self.locale)
    }

    /// Signed-in user id, if any
    pub fn user_id(&self) -> Option<String> {
        self.session
            .with_untracked(|state| state.session().map(|s| s.user.id.clone()))
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}
