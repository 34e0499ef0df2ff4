//! Page Components

mod admin;
mod dashboard;
mod login;
mod market;
mod payment_return;
mod wallet;

pub use admin::AdminPage;
pub use dashboard::{DashboardPage, ProfilePage};
pub use login::{LoginPage, RegisterPage};
pub use market::{CreditsPage, ListingDetailPage, ListingsPage, TransactionsPage};
pub use payment_return::PaymentReturnPage;
pub use wallet::WalletPage;
