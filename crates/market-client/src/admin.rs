//! Admin back-office endpoints
//!
//! Admin views always read fresh data, so nothing here goes through the
//! query cache. Payloads are passed through as JSON.

use chrono::NaiveDate;
use reqwest::Method;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::Result;

/// Reason sent when the admin leaves the adjustment reason blank
pub const DEFAULT_ADJUSTMENT_REASON: &str = "Admin adjustment";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserAction {
    Approve,
    Ban,
}

impl UserAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Ban => "ban",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionAction {
    Confirm,
    Complete,
    Cancel,
}

impl TransactionAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

/// Which wallet balance an adjustment applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceKind {
    Money,
    Carbon,
}

impl BalanceKind {
    const fn endpoint(self) -> &'static str {
        match self {
            Self::Money => "adjust",
            Self::Carbon => "adjust-carbon",
        }
    }
}

/// Inclusive date range for the comprehensive report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRange {
    /// Query string covering whole days, start 00:00:00 to end 23:59:59
    pub fn query(&self) -> String {
        format!(
            "startDate={}T00:00:00&endDate={}T23:59:59",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl ApiClient {
    async fn admin_get(&self, path: &str) -> Result<Value> {
        self.send_json(self.request(Method::GET, path)).await
    }

    async fn admin_call(&self, method: Method, path: &str) -> Result<Value> {
        let value = self.send_json(self.request(method, path)).await?;
        tracing::info!(path, "Admin action applied");
        Ok(value)
    }

    // Users

    pub async fn admin_users(&self) -> Result<Value> {
        self.admin_get("admin/users").await
    }

    pub async fn admin_user_action(&self, user_id: i64, action: UserAction) -> Result<Value> {
        self.admin_call(Method::POST, &format!("admin/users/{user_id}/{}", action.as_str()))
            .await
    }

    pub async fn admin_assign_role(&self, user_id: i64, role: &str) -> Result<Value> {
        self.admin_call(Method::POST, &format!("admin/users/{user_id}/roles/{role}"))
            .await
    }

    // Listings

    pub async fn admin_listings(&self) -> Result<Value> {
        self.admin_get("admin/listings").await
    }

    pub async fn admin_listing_stats(&self) -> Result<Value> {
        self.admin_get("admin/listings/stats").await
    }

    pub async fn admin_approve_listing(&self, listing_id: i64) -> Result<Value> {
        let value = self
            .admin_call(Method::PUT, &format!("admin/listings/{listing_id}/approve"))
            .await?;
        self.cache.invalidate("listings/");
        Ok(value)
    }

    pub async fn admin_reject_listing(&self, listing_id: i64, reason: &str) -> Result<Value> {
        let path = format!("admin/listings/{listing_id}/reject");
        let value = self
            .send_json(self.request(Method::PUT, &path).query(&[("reason", reason)]))
            .await?;
        self.cache.invalidate("listings/");
        tracing::info!(listing_id, "Listing rejected");
        Ok(value)
    }

    pub async fn admin_delete_listing(&self, listing_id: i64) -> Result<Value> {
        let value = self
            .admin_call(Method::DELETE, &format!("admin/listings/{listing_id}"))
            .await?;
        self.cache.invalidate("listings/");
        Ok(value)
    }

    // Transactions

    pub async fn admin_transactions(&self) -> Result<Value> {
        self.admin_get("admin/transactions").await
    }

    pub async fn admin_transaction_action(
        &self,
        transaction_id: i64,
        action: TransactionAction,
    ) -> Result<Value> {
        let path = format!("admin/transactions/{transaction_id}/{}", action.as_str());
        let value = self.admin_call(Method::PUT, &path).await?;
        self.cache.invalidate("transactions/");
        Ok(value)
    }

    // Wallets

    pub async fn admin_wallets(&self) -> Result<Value> {
        self.admin_get("admin/wallets").await
    }

    pub async fn admin_wallet_transactions(&self, limit: u32) -> Result<Value> {
        self.admin_get(&format!("admin/wallets/transactions?limit={limit}"))
            .await
    }

    /// Adjust a user's balance by `amount` (may be negative)
    pub async fn admin_adjust_balance(
        &self,
        user_id: i64,
        kind: BalanceKind,
        amount: Decimal,
        reason: &str,
    ) -> Result<Value> {
        let reason = if reason.trim().is_empty() { DEFAULT_ADJUSTMENT_REASON } else { reason };
        let path = format!("admin/wallets/user/{user_id}/{}", kind.endpoint());
        let amount = amount.to_string();
        let value = self
            .send_json(
                self.request(Method::POST, &path)
                    .query(&[("amount", amount.as_str()), ("reason", reason)]),
            )
            .await?;
        self.cache.invalidate("wallet/");
        tracing::info!(user_id, ?kind, %amount, "Wallet balance adjusted");
        Ok(value)
    }

    // Reports

    pub async fn admin_report(&self, range: ReportRange) -> Result<Value> {
        self.admin_get(&format!("admin/dashboard/reports/comprehensive?{}", range.query()))
            .await
    }
}
