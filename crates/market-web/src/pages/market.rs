//! Marketplace Pages: listings, purchase, trades and certificates

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use market_core::model::{CreditCertificate, Listing, ListingStatus, Transaction};

use crate::components::{load, render_loaded};
use crate::state::use_app;

#[component]
pub fn ListingsPage() -> impl IntoView {
    let api = use_app().api;
    let listings = load(async move { api.open_listings().await });

    view! {
        <div class="listings">
            <h1>"Marketplace"</h1>
            {move || render_loaded(&listings.get(), |items: &Vec<Listing>| {
                items.iter()
                    .map(|listing| {
                        let href = format!("/listings/{}", listing.id);
                        view! {
                            <a class="card listing" href=href>
                                <h2>{listing.name.clone()}</h2>
                                <p>{listing.location.clone()}</p>
                                <p>{format!("{} credits @ {}", listing.available_credits, listing.price_per_credit)}</p>
                            </a>
                        }
                    })
                    .collect_view()
            })}
        </div>
    }
}

#[component]
pub fn ListingDetailPage() -> impl IntoView {
    let app = use_app();
    let params = use_params_map();
    let id = params.with_untracked(|p| p.get("id").unwrap_or_default());

    let listing = {
        let api = app.api.clone();
        let id = id.clone();
        load(async move { api.listing(&id).await })
    };
    let (notice, set_notice) = signal(None::<String>);

    let buy = move |_| {
        let api = app.api.clone();
        let buyer = app.user_id().and_then(|u| u.parse::<i64>().ok());
        let listing_id = id.parse::<i64>().ok();
        let (Some(buyer), Some(listing_id)) = (buyer, listing_id) else {
            set_notice.set(Some("Unable to purchase this listing.".into()));
            return;
        };
        spawn_local(async move {
            match api.purchase(listing_id, buyer).await {
                Ok(tx) => set_notice.set(Some(format!("Order {} created", tx.id))),
                Err(e) => {
                    tracing::warn!(error = %e, listing_id, "Purchase failed");
                    set_notice.set(Some(e.user_message()));
                }
            }
        });
    };

    view! {
        <div class="listing-detail">
            {move || render_loaded(&listing.get(), |l: &Listing| {
                view! {
                    <h1>{l.name.clone()}</h1>
                    <p>{l.summary.clone()}</p>
                    <dl>
                        <dt>"Seller"</dt><dd>{l.location.clone()}</dd>
                        <dt>"Credits"</dt><dd>{l.total_credits.to_string()}</dd>
                        <dt>"Price"</dt><dd>{l.price_per_credit.to_string()}</dd>
                        <dt>"Vintage"</dt><dd>{l.vintage_year}</dd>
                    </dl>
                }
            })}
            <Show when=move || listing.with(|l| matches!(l, Some(Ok(l)) if l.status == ListingStatus::Active))>
                <button class="btn btn-primary" on:click=buy.clone()>"Buy"</button>
            </Show>
            {move || notice.get().map(|message| view! { <p class="toast">{message}</p> })}
        </div>
    }
}

#[component]
pub fn TransactionsPage() -> impl IntoView {
    let app = use_app();
    let user_id = app.user_id().unwrap_or_default();
    let api = app.api;
    let rows = load(async move { api.my_transactions(&user_id).await });

    view! {
        <div class="transactions">
            <h1>"Transactions"</h1>
            {move || render_loaded(&rows.get(), |rows: &Vec<Transaction>| {
                rows.iter()
                    .map(|tx| view! {
                        <div class="row">
                            <span>{tx.id.clone()}</span>
                            <span>{tx.listing_name.clone()}</span>
                            <span>{format!("{:?}", tx.side)}</span>
                            <span>{tx.total_amount.to_string()}</span>
                            <span>{format!("{:?}", tx.status)}</span>
                            <span>{tx.created_at.format("%Y-%m-%d").to_string()}</span>
                        </div>
                    })
                    .collect_view()
            })}
        </div>
    }
}

#[component]
pub fn CreditsPage() -> impl IntoView {
    let app = use_app();
    let user_id = app.user_id().unwrap_or_default();
    let api = app.api;
    let certificates = load(async move { Ok(api.portfolio(&user_id).await) });

    view! {
        <div class="credits">
            <h1>"My credits"</h1>
            {move || render_loaded(&certificates.get(), |certs: &Vec<CreditCertificate>| {
                if certs.is_empty() {
                    return view! { <p>"No certificates yet."</p> }.into_any();
                }
                certs.iter()
                    .map(|c| view! {
                        <div class="row">
                            <span>{c.project_name.clone()}</span>
                            <span>{c.quantity.to_string()}</span>
                            <span>{c.certification.clone()}</span>
                            <span>{format!("{:?}", c.status)}</span>
                            <span>{c.expires_at.clone()}</span>
                        </div>
                    })
                    .collect_view()
                    .into_any()
            })}
        </div>
    }
}
