//! Route Table and Authorization
//!
//! Every page the front end serves, the access level it needs, and the one
//! function that decides whether the current session may see it.
//!
//! ```text
//!   path ──▶ Route::parse ──▶ Route::access ──┐
//!                                             ├──▶ authorize ──▶ Allow | Loading | Redirect(route)
//!   SessionState ─────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Access level required by a route
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Public,
    /// The page waits for the session itself and redirects when it never
    /// arrives
    Deferred,
    Authenticated,
    Admin,
}

/// Back-office sections
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminSection {
    Dashboard,
    Users,
    Transactions,
    Wallets,
    Listings,
    Reports,
}

impl AdminSection {
    pub const ALL: [Self; 6] = [
        Self::Dashboard,
        Self::Users,
        Self::Transactions,
        Self::Wallets,
        Self::Listings,
        Self::Reports,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Users => "users",
            Self::Transactions => "transactions",
            Self::Wallets => "wallets",
            Self::Listings => "listings",
            Self::Reports => "reports",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Admin Dashboard",
            Self::Users => "Users",
            Self::Transactions => "Transactions",
            Self::Wallets => "Wallets",
            Self::Listings => "Listings",
            Self::Reports => "Reports",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }
}

/// Front-end routes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Wallet,
    Listings,
    ListingDetail(String),
    Credits,
    Transactions,
    Profile,
    /// Landing page for the payment gateway redirect
    PaymentReturn,
    Admin(AdminSection),
}

impl Route {
    /// Resolve a path. Unknown paths resolve to `None`; the router sends
    /// them to the dashboard.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["wallet"] => Self::Wallet,
            ["listings"] => Self::Listings,
            ["listings", id] => Self::ListingDetail((*id).to_string()),
            ["credits"] => Self::Credits,
            ["transactions"] => Self::Transactions,
            ["profile"] => Self::Profile,
            ["vnpay-return"] => Self::PaymentReturn,
            ["admin", section] => Self::Admin(AdminSection::from_slug(section)?),
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::Wallet => "/wallet".into(),
            Self::Listings => "/listings".into(),
            Self::ListingDetail(id) => format!("/listings/{id}"),
            Self::Credits => "/credits".into(),
            Self::Transactions => "/transactions".into(),
            Self::Profile => "/profile".into(),
            Self::PaymentReturn => "/vnpay-return".into(),
            Self::Admin(section) => format!("/admin/{}", section.slug()),
        }
    }

    pub const fn access(&self) -> Access {
        match self {
            Self::Login | Self::Register => Access::Public,
            Self::PaymentReturn => Access::Deferred,
            Self::Admin(_) => Access::Admin,
            _ => Access::Authenticated,
        }
    }
}

/// Outcome of an authorization check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Render the page
    Allow,
    /// Session hydration still running
    Loading,
    /// Navigate elsewhere (replacing history)
    Redirect(Route),
}

/// Decide whether `state` may see a page requiring `access`.
pub fn authorize(state: &SessionState, access: Access) -> Decision {
    if access == Access::Public {
        return Decision::Allow;
    }

    match state {
        SessionState::Restoring => Decision::Loading,
        SessionState::Anonymous if access == Access::Deferred => Decision::Allow,
        SessionState::Anonymous => Decision::Redirect(Route::Login),
        SessionState::Authenticated(session) => {
            if access == Access::Admin && !session.is_admin() {
                Decision::Redirect(Route::Dashboard)
            } else {
                Decision::Allow
            }
        }
    }
}

/// Resolve `path` and authorize it in one step. Unknown paths redirect to
/// the dashboard.
pub fn resolve(state: &SessionState, path: &str) -> Decision {
    match Route::parse(path) {
        Some(route) => authorize(state, route.access()),
        None => Decision::Redirect(Route::Dashboard),
    }
}
