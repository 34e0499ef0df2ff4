//! Wallet Page
//!
//! Balance, history and the top-up form. A gateway top-up leaves the app
//! for the hosted checkout and comes back through `/vnpay-return`.

use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::model::{WalletSummary, WalletTransaction};
use market_payments::{MIN_TOPUP, TopupMethod, TopupRequest};

use crate::components::{Loaded, load, render_loaded};
use crate::state::use_app;
use crate::storage::redirect_to;

#[component]
pub fn WalletPage() -> impl IntoView {
    let app = use_app();
    let user_id = app.user_id().unwrap_or_default();

    let (wallet, set_wallet) = signal::<Loaded<WalletSummary>>(None);
    let history = {
        let api = app.api.clone();
        let user_id = user_id.clone();
        load(async move { api.wallet_transactions(&user_id).await })
    };

    {
        let api = app.api.clone();
        let user_id = user_id.clone();
        spawn_local(async move {
            set_wallet.set(Some(api.wallet(&user_id).await.map_err(|e| e.user_message())));
        });
    }

    let on_credited = move |summary: WalletSummary| set_wallet.set(Some(Ok(summary)));

    view! {
        <div class="wallet">
            <h1>"Wallet"</h1>
            <section class="balance">
                {move || render_loaded(&wallet.get(), |w: &WalletSummary| {
                    view! { <p class="amount">{format!("{} {}", w.balance, w.currency)}</p> }
                })}
            </section>
            <TopupForm on_credited=on_credited />
            <section class="history">
                <h2>"History"</h2>
                {move || render_loaded(&history.get(), |rows: &Vec<WalletTransaction>| {
                    rows.iter()
                        .map(|row| view! {
                            <div class="row">
                                <span>{row.description.clone()}</span>
                                <span>{format!("{:?}", row.kind)}</span>
                                <span>{row.amount.to_string()}</span>
                                <span>{row.created_at.format("%Y-%m-%d %H:%M").to_string()}</span>
                            </div>
                        })
                        .collect_view()
                })}
            </section>
        </div>
    }
}

#[component]
fn TopupForm(on_credited: impl Fn(WalletSummary) + Clone + Send + Sync + 'static) -> impl IntoView {
    let app = use_app();
    let (amount, set_amount) = signal(String::new());
    let (method, set_method) = signal(TopupMethod::Gateway);
    let (error, set_error) = signal(None::<String>);
    let (busy, set_busy) = signal(false);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        set_error.set(None);

        let request = TopupRequest::parse_amount(&amount.get())
            .map_err(market_client::ClientError::from)
            .and_then(|value| app.api.topup_request(value));
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                set_error.set(Some(e.user_message()));
                return;
            }
        };

        set_busy.set(true);
        let api = app.api.clone();
        let on_credited = on_credited.clone();
        let method = method.get();
        spawn_local(async move {
            match method {
                TopupMethod::Gateway => match api.create_gateway_topup(&request).await {
                    Ok(url) => redirect_to(&url),
                    Err(e) => set_error.set(Some(e.user_message())),
                },
                TopupMethod::Direct => match api.direct_topup(&request).await {
                    Ok(summary) => on_credited(summary),
                    Err(e) => set_error.set(Some(e.user_message())),
                },
            }
            set_busy.set(false);
        });
    };

    view! {
        <form class="topup" on:submit=submit>
            <h2>"Top up"</h2>
            <input
                type="number"
                min=MIN_TOPUP.to_string()
                placeholder="Amount"
                prop:value=move || amount.get()
                on:input=move |ev| set_amount.set(event_target_value(&ev))
            />
            <label>
                <input
                    type="radio"
                    name="method"
                    prop:checked=move || method.get() == TopupMethod::Gateway
                    on:change=move |_| set_method.set(TopupMethod::Gateway)
                />
                "VNPay"
            </label>
            <label>
                <input
                    type="radio"
                    name="method"
                    prop:checked=move || method.get() == TopupMethod::Direct
                    on:change=move |_| set_method.set(TopupMethod::Direct)
                />
                "Direct credit"
            </label>
            <button type="submit" class="btn btn-primary" disabled=move || busy.get()>
                {move || if busy.get() { "..." } else { "Top up" }}
            </button>
            {move || error.get().map(|message| view! { <p class="toast error">{message}</p> })}
        </form>
    }
}
