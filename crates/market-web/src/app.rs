//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};
use market_core::AdminSection;

use crate::components::{Guarded, NavBar};
use crate::pages::{
    AdminPage, CreditsPage, DashboardPage, ListingDetailPage, ListingsPage, LoginPage,
    PaymentReturnPage, ProfilePage, RegisterPage, TransactionsPage, WalletPage,
};
use crate::state::AppContext;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let app = match AppContext::init() {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start");
            return view! { <p class="error">{e.user_message()}</p> }.into_any();
        }
    };
    let session = app.session;
    provide_context(app);

    view! {
        <Router>
            <Show when=move || session.with(|s| s.is_authenticated())>
                <NavBar />
            </Show>
            <main class="app">
                <Routes fallback=|| view! { <Redirect path="/dashboard" /> }>
                    <Route path=path!("/login") view=|| view! { <Guarded><LoginPage /></Guarded> } />
                    <Route path=path!("/register") view=|| view! { <Guarded><RegisterPage /></Guarded> } />
                    <Route path=path!("/dashboard") view=|| view! { <Guarded><DashboardPage /></Guarded> } />
                    <Route path=path!("/wallet") view=|| view! { <Guarded><WalletPage /></Guarded> } />
                    <Route path=path!("/listings") view=|| view! { <Guarded><ListingsPage /></Guarded> } />
                    <Route path=path!("/listings/:id") view=|| view! { <Guarded><ListingDetailPage /></Guarded> } />
                    <Route path=path!("/credits") view=|| view! { <Guarded><CreditsPage /></Guarded> } />
                    <Route path=path!("/transactions") view=|| view! { <Guarded><TransactionsPage /></Guarded> } />
                    <Route path=path!("/profile") view=|| view! { <Guarded><ProfilePage /></Guarded> } />
                    <Route path=path!("/vnpay-return") view=|| view! { <Guarded><PaymentReturnPage /></Guarded> } />
                    <Route path=path!("/admin/dashboard") view=|| admin(AdminSection::Dashboard) />
                    <Route path=path!("/admin/users") view=|| admin(AdminSection::Users) />
                    <Route path=path!("/admin/transactions") view=|| admin(AdminSection::Transactions) />
                    <Route path=path!("/admin/wallets") view=|| admin(AdminSection::Wallets) />
                    <Route path=path!("/admin/listings") view=|| admin(AdminSection::Listings) />
                    <Route path=path!("/admin/reports") view=|| admin(AdminSection::Reports) />
                </Routes>
            </main>
        </Router>
    }
    .into_any()
}

fn admin(section: AdminSection) -> impl IntoView {
    view! { <Guarded><AdminPage section=section /></Guarded> }
}
