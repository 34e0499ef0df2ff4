//! Dashboard and Profile Pages

use leptos::prelude::*;
use market_core::model::{Transaction, WalletSummary};

use crate::components::{load, render_loaded};
use crate::state::use_app;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app = use_app();
    let user_id = app.user_id().unwrap_or_default();

    let wallet = {
        let api = app.api.clone();
        let user_id = user_id.clone();
        load(async move { api.wallet(&user_id).await })
    };
    let recent = {
        let api = app.api.clone();
        load(async move {
            let mut rows = api.my_transactions(&user_id).await?;
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows.truncate(5);
            Ok(rows)
        })
    };

    view! {
        <div class="dashboard">
            <h1>"Dashboard"</h1>
            <section class="card">
                <h2>"Balance"</h2>
                {move || render_loaded(&wallet.get(), |w: &WalletSummary| {
                    view! { <p class="amount">{format!("{} {}", w.balance, w.currency)}</p> }
                })}
                <a href="/wallet" class="btn">"Top up"</a>
            </section>
            <section class="card">
                <h2>"Recent transactions"</h2>
                {move || render_loaded(&recent.get(), |rows: &Vec<Transaction>| {
                    rows.iter()
                        .map(|tx| view! {
                            <div class="row">
                                <span>{tx.listing_name.clone()}</span>
                                <span>{format!("{:?}", tx.side)}</span>
                                <span>{tx.total_amount.to_string()}</span>
                                <span>{format!("{:?}", tx.status)}</span>
                            </div>
                        })
                        .collect_view()
                })}
            </section>
        </div>
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = use_app().session;

    move || {
        session.with(|state| {
            state.session().map(|s| {
                let user = s.user.clone();
                view! {
                    <div class="profile">
                        <h1>{user.name}</h1>
                        <dl>
                            <dt>"Email"</dt>
                            <dd>{user.email}</dd>
                            <dt>"Role"</dt>
                            <dd>{user.role.as_str()}</dd>
                            <dt>"User ID"</dt>
                            <dd>{user.id}</dd>
                        </dl>
                    </div>
                }
            })
        })
    }
}
