//! Admin back-office
//!
//! One page per section; rows are rendered from the JSON the admin
//! endpoints return.

use chrono::{Datelike, NaiveDate, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_client::{ApiClient, ReportRange, TransactionAction, UserAction};
use market_core::AdminSection;
use serde_json::Value;

use crate::components::{AdminNav, Loaded, render_loaded};
use crate::state::use_app;

#[component]
pub fn AdminPage(section: AdminSection) -> impl IntoView {
    let api = use_app().api;
    let (data, set_data) = signal::<Loaded<Value>>(None);
    let reload = {
        let api = api.clone();
        move || {
            let api = api.clone();
            spawn_local(async move {
                set_data.set(Some(fetch_section(&api, section).await.map_err(|e| e.user_message())));
            });
        }
    };
    reload();

    let body = match section {
        AdminSection::Reports => view! { <ReportPanel /> }.into_any(),
        _ => view! {
            {move || render_loaded(&data.get(), |value: &Value| rows(value, section))}
        }
        .into_any(),
    };

    view! {
        <div class="admin">
            <AdminNav />
            <h1>{section.title()}</h1>
            <ActionBar section=section api=api on_done=reload />
            {body}
        </div>
    }
}

async fn fetch_section(api: &ApiClient, section: AdminSection) -> market_client::Result<Value> {
    match section {
        AdminSection::Dashboard | AdminSection::Users => api.admin_users().await,
        AdminSection::Transactions => api.admin_transactions().await,
        AdminSection::Wallets => api.admin_wallets().await,
        AdminSection::Listings => api.admin_listings().await,
        AdminSection::Reports => Ok(Value::Null),
    }
}

fn rows(value: &Value, section: AdminSection) -> AnyView {
    let items = value
        .as_array()
        .cloned()
        .or_else(|| value.get("content").and_then(Value::as_array).cloned())
        .unwrap_or_default();

    if section == AdminSection::Dashboard {
        return view! { <p class="stat">{format!("{} users", items.len())}</p> }.into_any();
    }

    items
        .into_iter()
        .map(|item| {
            let id = item.get("id").map(Value::to_string).unwrap_or_default();
            view! {
                <div class="row">
                    <span class="id">{id}</span>
                    <code>{item.to_string()}</code>
                </div>
            }
        })
        .collect_view()
        .into_any()
}

/// Id field plus the actions the section supports
#[component]
fn ActionBar(
    section: AdminSection,
    api: ApiClient,
    on_done: impl Fn() + Clone + Send + Sync + 'static,
) -> impl IntoView {
    let (target, set_target) = signal(String::new());
    let (notice, set_notice) = signal(None::<String>);

    let actions: Vec<(&'static str, AdminAction)> = match section {
        AdminSection::Users => vec![
            ("Approve", AdminAction::User(UserAction::Approve)),
            ("Ban", AdminAction::User(UserAction::Ban)),
        ],
        AdminSection::Transactions => vec![
            ("Confirm", AdminAction::Transaction(TransactionAction::Confirm)),
            ("Complete", AdminAction::Transaction(TransactionAction::Complete)),
            ("Cancel", AdminAction::Transaction(TransactionAction::Cancel)),
        ],
        AdminSection::Listings => vec![
            ("Approve", AdminAction::ApproveListing),
            ("Delete", AdminAction::DeleteListing),
        ],
        _ => Vec::new(),
    };
    if actions.is_empty() {
        return ().into_any();
    }

    let buttons = actions
        .into_iter()
        .map(|(label, action)| {
            let api = api.clone();
            let on_done = on_done.clone();
            let run = move |_| {
                let Ok(id) = target.get().trim().parse::<i64>() else {
                    set_notice.set(Some("Enter a numeric id".into()));
                    return;
                };
                let api = api.clone();
                let on_done = on_done.clone();
                spawn_local(async move {
                    match action.apply(&api, id).await {
                        Ok(_) => {
                            set_notice.set(Some(format!("{label}: done")));
                            on_done();
                        }
                        Err(e) => set_notice.set(Some(e.user_message())),
                    }
                });
            };
            view! { <button class="btn" on:click=run>{label}</button> }
        })
        .collect_view();

    view! {
        <div class="action-bar">
            <input
                type="text"
                placeholder="ID"
                prop:value=move || target.get()
                on:input=move |ev| set_target.set(event_target_value(&ev))
            />
            {buttons}
            {move || notice.get().map(|message| view! { <span class="toast">{message}</span> })}
        </div>
    }
    .into_any()
}

#[derive(Clone, Copy)]
enum AdminAction {
    User(UserAction),
    Transaction(TransactionAction),
    ApproveListing,
    DeleteListing,
}

impl AdminAction {
    async fn apply(self, api: &ApiClient, id: i64) -> market_client::Result<Value> {
        match self {
            Self::User(action) => api.admin_user_action(id, action).await,
            Self::Transaction(action) => api.admin_transaction_action(id, action).await,
            Self::ApproveListing => api.admin_approve_listing(id).await,
            Self::DeleteListing => api.admin_delete_listing(id).await,
        }
    }
}

#[component]
fn ReportPanel() -> impl IntoView {
    let api = use_app().api;
    let today = Utc::now().date_naive();
    let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);

    let (start, set_start) = signal(month_start.to_string());
    let (end, set_end) = signal(today.to_string());
    let (report, set_report) = signal::<Loaded<Value>>(None);

    let run = move |_| {
        let (Ok(start), Ok(end)) = (start.get().parse(), end.get().parse()) else {
            set_report.set(Some(Err("Invalid date range".into())));
            return;
        };
        let api = api.clone();
        set_report.set(None);
        spawn_local(async move {
            let result = api.admin_report(ReportRange { start, end }).await;
            set_report.set(Some(result.map_err(|e| e.user_message())));
        });
    };

    view! {
        <div class="report">
            <input type="date" prop:value=move || start.get() on:input=move |ev| set_start.set(event_target_value(&ev)) />
            <input type="date" prop:value=move || end.get() on:input=move |ev| set_end.set(event_target_value(&ev)) />
            <button class="btn btn-primary" on:click=run>"Generate"</button>
            {move || render_loaded(&report.get(), |value: &Value| {
                view! { <pre>{serde_json::to_string_pretty(value).unwrap_or_default()}</pre> }
            })}
        </div>
    }
}
