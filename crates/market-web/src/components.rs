//! UI Components

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::NavigateOptions;
use leptos_router::components::Redirect;
use leptos_router::hooks::{use_location, use_navigate};
use market_client::ClientError;
use market_core::{AdminSection, Decision, resolve};

use crate::state::use_app;

/// Fetch state held by a page
pub type Loaded<T> = Option<Result<T, String>>;

/// Run `fut` once and expose its result as a signal
pub fn load<T, F>(fut: F) -> ReadSignal<Loaded<T>>
where
    T: Send + Sync + 'static,
    F: Future<Output = Result<T, ClientError>> + 'static,
{
    let (value, set_value) = signal(None);
    spawn_local(async move {
        set_value.set(Some(fut.await.map_err(|e| e.user_message())));
    });
    value
}

/// Renders its children only when the current route allows it
#[component]
pub fn Guarded(children: ChildrenFn) -> impl IntoView {
    let session = use_app().session;
    let location = use_location();
    // Children are rebuilt only when the decision itself changes
    let decision = Memo::new(move |_| {
        let path = location.pathname.get();
        session.with(|state| resolve(state, &path))
    });

    move || {
        match decision.get() {
            Decision::Allow => children().into_any(),
            Decision::Loading => view! { <p class="loading">"Loading..."</p> }.into_any(),
            Decision::Redirect(route) => view! { <Redirect path=route.path() /> }.into_any(),
        }
    }
}

/// Top navigation with logout
#[component]
pub fn NavBar() -> impl IntoView {
    let app = use_app();
    let session = app.session;
    let navigate = use_navigate();

    let logout = move |_| {
        if let Err(e) = app.api.logout() {
            tracing::error!(error = %e, "Logout failed");
        }
        navigate(
            "/login",
            NavigateOptions {
                replace: true,
                ..Default::default()
            },
        );
    };

    view! {
        <nav class="navbar">
            <a href="/dashboard" class="brand">"Carbon Market"</a>
            <a href="/wallet">"Wallet"</a>
            <a href="/listings">"Listings"</a>
            <a href="/credits">"Credits"</a>
            <a href="/transactions">"Transactions"</a>
            <Show when=move || session.with(|s| s.session().is_some_and(|s| s.is_admin()))>
                <a href="/admin/dashboard">"Admin"</a>
            </Show>
            <span class="user">
                {move || session.with(|s| s.session().map(|s| s.user.name.clone()).unwrap_or_default())}
            </span>
            <button class="btn" on:click=logout>"Logout"</button>
        </nav>
    }
}

/// Admin section tabs
#[component]
pub fn AdminNav() -> impl IntoView {
    view! {
        <nav class="admin-nav">
            {AdminSection::ALL
                .iter()
                .map(|section| {
                    let href = format!("/admin/{}", section.slug());
                    view! { <a href=href>{section.title()}</a> }
                })
                .collect_view()}
        </nav>
    }
}

/// Loading / error / content switch for a fetched value
pub fn render_loaded<T, V>(
    value: &Loaded<T>,
    content: impl FnOnce(&T) -> V,
) -> AnyView
where
    V: IntoView + 'static,
{
    match value {
        None => view! { <p class="loading">"Loading..."</p> }.into_any(),
        Some(Err(message)) => view! { <p class="error">{message.clone()}</p> }.into_any(),
        Some(Ok(value)) => content(value).into_any(),
    }
}
