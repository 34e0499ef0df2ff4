//! Domain Models
//!
//! View models for the marketplace pages and the backend payloads they are
//! mapped from. All monetary values use `rust_decimal`.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency label shown next to wallet balances
pub const WALLET_CURRENCY: &str = "CO2e";

/// Parse a backend timestamp (RFC 3339 or zone-less ISO local time, taken as UTC)
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp_or_now(raw: Option<&str>) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(Utc::now)
}

// ============================================================================
// Listings
// ============================================================================

/// Paged envelope (`{ content: [...] }`)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

/// Listing as returned by the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub carbon_amount: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub seller_id: Option<i64>,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub seller_email: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Active,
    SoldOut,
    Draft,
}

/// Listing as shown in the marketplace
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub location: String,
    pub price_per_credit: Decimal,
    pub total_credits: Decimal,
    pub available_credits: Decimal,
    pub status: ListingStatus,
    pub certification: String,
    pub vintage_year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub summary: String,
    pub category: String,
}

impl From<ListingResponse> for Listing {
    fn from(resp: ListingResponse) -> Self {
        let created_at = timestamp_or_now(resp.created_at.as_deref());
        let carbon = resp.carbon_amount.unwrap_or_default();
        let status = if resp.status.as_deref() == Some("OPEN") {
            ListingStatus::Active
        } else {
            ListingStatus::Draft
        };

        Self {
            id: resp.id.to_string(),
            name: resp.title.unwrap_or_else(|| "Listing".into()),
            location: resp.seller_name.unwrap_or_else(|| "Unknown location".into()),
            price_per_credit: resp.price.unwrap_or_default(),
            total_credits: carbon,
            available_credits: carbon,
            status,
            certification: "Verified".into(),
            vintage_year: created_at.year(),
            created_at,
            updated_at: created_at,
            summary: resp.description.unwrap_or_default(),
            category: "Carbon Credit".into(),
        }
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// Order transaction as returned by the backend
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub buyer_id: Option<i64>,
    #[serde(default)]
    pub seller_id: Option<i64>,
    #[serde(default)]
    pub listing_id: Option<i64>,
    #[serde(default)]
    pub listing_title: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TransactionResponse {
    fn is_buyer(&self, user_id: &str) -> bool {
        self.buyer_id.map(|id| id.to_string()).as_deref() == Some(user_id)
    }

    fn id_or_temp(&self, prefix: &str) -> String {
        self.id.map_or_else(
            || format!("{prefix}-{}", Utc::now().timestamp_millis()),
            |id| id.to_string(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    fn from_backend(status: Option<&str>) -> Self {
        match status {
            Some("COMPLETED") => Self::Completed,
            Some("CANCELLED") => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// Trade as seen by one user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub listing_id: String,
    pub listing_name: String,
    pub side: TradeSide,
    pub quantity: u32,
    pub price_per_credit: Decimal,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Map a backend transaction from the point of view of `user_id`
    pub fn for_user(resp: &TransactionResponse, user_id: &str) -> Self {
        let amount = resp.amount.unwrap_or_default();
        Self {
            id: resp.id_or_temp("temp"),
            listing_id: resp.listing_id.map(|id| id.to_string()).unwrap_or_default(),
            listing_name: resp.listing_title.clone().unwrap_or_else(|| "Listing".into()),
            side: if resp.is_buyer(user_id) { TradeSide::Buy } else { TradeSide::Sell },
            quantity: 1,
            price_per_credit: amount,
            total_amount: amount,
            status: TransactionStatus::from_backend(resp.status.as_deref()),
            created_at: timestamp_or_now(resp.created_at.as_deref()),
        }
    }
}

/// Purchase request body
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub listing_id: i64,
    pub buyer_id: i64,
}

// ============================================================================
// Wallet
// ============================================================================

/// Wallet balance as returned by the backend
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalanceResponse {
    pub user_id: i64,
    #[serde(default)]
    pub carbon_balance: Option<Decimal>,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletSummary {
    pub id: String,
    pub user_id: String,
    pub balance: Decimal,
    pub currency: String,
    pub last_updated: DateTime<Utc>,
}

impl From<WalletBalanceResponse> for WalletSummary {
    fn from(resp: WalletBalanceResponse) -> Self {
        Self {
            id: resp.user_id.to_string(),
            user_id: resp.user_id.to_string(),
            balance: resp.carbon_balance.or(resp.balance).unwrap_or_default(),
            currency: WALLET_CURRENCY.into(),
            last_updated: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletEntryKind {
    TopUp,
    Purchase,
    Sale,
}

/// Wallet history row
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,
    pub kind: WalletEntryKind,
    pub amount: Decimal,
    /// Not reported by the backend yet; always zero
    pub balance_after: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    pub fn for_user(resp: &TransactionResponse, user_id: &str) -> Self {
        Self {
            id: resp.id_or_temp("wallet"),
            kind: if resp.is_buyer(user_id) {
                WalletEntryKind::Purchase
            } else {
                WalletEntryKind::Sale
            },
            amount: resp.amount.unwrap_or_default(),
            balance_after: Decimal::ZERO,
            description: resp
                .listing_title
                .clone()
                .unwrap_or_else(|| "Transaction".into()),
            created_at: timestamp_or_now(resp.created_at.as_deref()),
        }
    }
}

// ============================================================================
// Credits
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificateStatus {
    Valid,
    Expired,
    Pending,
}

/// Carbon-credit certificate in a portfolio
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCertificate {
    pub id: String,
    pub project_name: String,
    pub quantity: Decimal,
    pub certification: String,
    pub issued_date: String,
    pub expires_at: String,
    pub status: CertificateStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_listing_mapping() {
        let resp: ListingResponse = serde_json::from_value(serde_json::json!({
            "id": 12,
            "title": "Mangrove restoration",
            "description": "Blue carbon",
            "carbonAmount": "150.5",
            "price": 12,
            "status": "OPEN",
            "createdAt": "2023-06-01T08:30:00",
            "sellerId": 4,
            "sellerName": "Ca Mau"
        }))
        .unwrap();

        let listing = Listing::from(resp);
        assert_eq!(listing.id, "12");
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.total_credits, dec!(150.5));
        assert_eq!(listing.available_credits, dec!(150.5));
        assert_eq!(listing.price_per_credit, dec!(12));
        assert_eq!(listing.vintage_year, 2023);
        assert_eq!(listing.location, "Ca Mau");
    }

    #[test]
    fn test_listing_defaults() {
        let resp: ListingResponse =
            serde_json::from_value(serde_json::json!({ "id": 1, "status": "CLOSED" })).unwrap();
        let listing = Listing::from(resp);
        assert_eq!(listing.name, "Listing");
        assert_eq!(listing.location, "Unknown location");
        assert_eq!(listing.status, ListingStatus::Draft);
        assert_eq!(listing.price_per_credit, Decimal::ZERO);
    }

    #[test]
    fn test_transaction_side_and_status() {
        let resp = TransactionResponse {
            id: Some(5),
            buyer_id: Some(7),
            seller_id: Some(8),
            listing_id: Some(3),
            amount: Some(dec!(99.90)),
            status: Some("CANCELLED".into()),
            ..Default::default()
        };

        let buyer_view = Transaction::for_user(&resp, "7");
        assert_eq!(buyer_view.side, TradeSide::Buy);
        assert_eq!(buyer_view.status, TransactionStatus::Failed);
        assert_eq!(buyer_view.total_amount, dec!(99.90));
        assert_eq!(buyer_view.listing_name, "Listing");

        let seller_view = Transaction::for_user(&resp, "8");
        assert_eq!(seller_view.side, TradeSide::Sell);

        let wallet_row = WalletTransaction::for_user(&resp, "7");
        assert_eq!(wallet_row.kind, WalletEntryKind::Purchase);
        assert_eq!(wallet_row.description, "Transaction");
    }

    #[test]
    fn test_transaction_status_mapping() {
        assert_eq!(TransactionStatus::from_backend(Some("COMPLETED")), TransactionStatus::Completed);
        assert_eq!(TransactionStatus::from_backend(Some("CONFIRMED")), TransactionStatus::Pending);
        assert_eq!(TransactionStatus::from_backend(None), TransactionStatus::Pending);
    }

    #[test]
    fn test_wallet_balance_precedence() {
        let summary = WalletSummary::from(WalletBalanceResponse {
            user_id: 2,
            carbon_balance: Some(dec!(10)),
            balance: Some(dec!(99)),
        });
        assert_eq!(summary.balance, dec!(10));
        assert_eq!(summary.currency, WALLET_CURRENCY);

        let summary = WalletSummary::from(WalletBalanceResponse {
            user_id: 2,
            carbon_balance: None,
            balance: Some(dec!(99)),
        });
        assert_eq!(summary.balance, dec!(99));

        let summary = WalletSummary::from(WalletBalanceResponse { user_id: 2, ..Default::default() });
        assert_eq!(summary.balance, Decimal::ZERO);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp(Some("2024-01-02T03:04:05Z")).is_some());
        assert!(parse_timestamp(Some("2024-01-02T03:04:05.123456")).is_some());
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
