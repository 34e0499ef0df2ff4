//! Login and Registration Pages

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use market_core::{AdminSection, RegisterRequest, Route};

use crate::state::use_app;

#[component]
pub fn LoginPage() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (loading, set_loading) = signal(false);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get() {
            return;
        }
        set_loading.set(true);
        set_error.set(None);

        let api = app.api.clone();
        let navigate = navigate.clone();
        let (email, password) = (email.get(), password.get());
        spawn_local(async move {
            match api.login(&email, &password).await {
                Ok(session) => {
                    let home = if session.is_admin() {
                        Route::Admin(AdminSection::Dashboard)
                    } else {
                        Route::Dashboard
                    };
                    navigate(&home.path(), Default::default());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Login failed");
                    set_error.set(Some(e.user_message()));
                }
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <h1>"Sign in"</h1>
            <form on:submit=submit>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                    {move || if loading.get() { "..." } else { "Login" }}
                </button>
            </form>
            {move || error.get().map(|message| view! { <p class="toast error">{message}</p> })}
            <a href="/register">"Create an account"</a>
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();
    let (full_name, set_full_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal(None::<String>);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        set_error.set(None);

        let api = app.api.clone();
        let navigate = navigate.clone();
        let request = RegisterRequest {
            email: email.get().trim().to_string(),
            password: password.get(),
            full_name: full_name.get().trim().to_string(),
        };
        spawn_local(async move {
            match api.register(&request).await {
                Ok(_) => navigate(&Route::Login.path(), Default::default()),
                Err(e) => {
                    tracing::warn!(error = %e, "Registration failed");
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <h1>"Create account"</h1>
            <form on:submit=submit>
                <input
                    type="text"
                    placeholder="Full name"
                    prop:value=move || full_name.get()
                    on:input=move |ev| set_full_name.set(event_target_value(&ev))
                />
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <button type="submit" class="btn btn-primary">"Register"</button>
            </form>
            {move || error.get().map(|message| view! { <p class="toast error">{message}</p> })}
            <a href="/login">"Already registered? Sign in"</a>
        </div>
    }
}
