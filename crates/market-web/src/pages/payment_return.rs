//! Gateway Return Page
//!
//! Landing page for the payment gateway redirect. The outcome is rendered
//! straight from the query string; the session check and the backend
//! confirmation run alongside it.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use market_payments::{GatewayQuery, Locale, PaymentOutcome, RecoveryAction, SESSION_GRACE};

use crate::state::use_app;
use crate::storage::{location_search, sleep};

#[component]
pub fn PaymentReturnPage() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();
    let flow = app.return_flow();
    let locale = flow.locale();

    let query = GatewayQuery::parse(&location_search());
    let outcome = flow.outcome(&query);

    {
        let flow = flow.clone();
        spawn_local(async move {
            if let Some(route) = flow.check_session(sleep(SESSION_GRACE)).await.redirect() {
                navigate(
                    &route.path(),
                    NavigateOptions {
                        replace: true,
                        ..Default::default()
                    },
                );
            }
        });
    }

    spawn_local(async move {
        flow.reconcile(&query).await;
    });

    let actions = outcome
        .actions()
        .into_iter()
        .map(|action| {
            let class = if action == RecoveryAction::Dashboard {
                "btn btn-primary"
            } else {
                "btn"
            };
            view! { <a href=action.path() class=class>{action.label(locale)}</a> }
        })
        .collect_view();

    view! {
        <div class="payment-return">
            <OutcomeCard outcome=outcome locale=locale />
            <div class="actions">{actions}</div>
        </div>
    }
}

#[component]
fn OutcomeCard(outcome: PaymentOutcome, locale: Locale) -> impl IntoView {
    let class = if outcome.success { "card success" } else { "card failure" };
    let title = match (locale, outcome.success) {
        (Locale::Vi, true) => "Thanh toán thành công",
        (Locale::Vi, false) => "Thanh toán thất bại",
        (Locale::En, true) => "Payment successful",
        (Locale::En, false) => "Payment failed",
    };

    let details = (!outcome.transaction_reference.is_empty()).then(|| {
        view! {
            <dl>
                <dt>"Ref"</dt>
                <dd>{outcome.transaction_reference}</dd>
                <dt>"Amount"</dt>
                <dd>{format!("{} VND", outcome.display_amount)}</dd>
            </dl>
        }
    });

    view! {
        <div class=class>
            <h1>{title}</h1>
            <p class="message">{outcome.message}</p>
            {details}
        </div>
    }
}
