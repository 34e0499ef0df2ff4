//! Marketplace API Client
//!
//! One `reqwest` client shared by every page. The bearer token is read from
//! the [`SessionService`] on each request, so a login or logout takes effect
//! immediately without rebuilding the client.

use async_trait::async_trait;
use market_core::model::{
    CreditCertificate, Listing, ListingResponse, Page, PurchaseRequest, Transaction,
    TransactionResponse, WalletBalanceResponse, WalletSummary, WalletTransaction,
};
use market_core::SessionService;
use market_payments::{
    CreateTopupResponse, GatewayQuery, Reconciler, TopupRequest, reconciliation_error,
};
use reqwest::{Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Typed client for the marketplace REST API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    pub(crate) sessions: SessionService,
    pub(crate) cache: QueryCache,
}

impl ApiClient {
    /// Create a client for `config.base_url`
    pub fn new(config: &ClientConfig, sessions: SessionService) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Config("API base URL is empty".into()));
        }

        Ok(Self {
            http: build_http(config)?,
            base_url,
            sessions,
            cache: QueryCache::new(chrono::Duration::seconds(config.cache_ttl_secs)),
        })
    }

    /// Create from environment variables
    pub fn from_env(sessions: SessionService) -> Result<Self> {
        Self::new(&ClientConfig::from_env(), sessions)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request builder with the bearer token attached when a session exists
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_as(method, path, self.sessions.token().as_deref())
    }

    /// Request builder authenticated with an explicit token
    fn request_as(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the raw response, turning non-2xx into [`ClientError::Status`]
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "API request failed");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Send and decode the body. An empty body decodes as JSON `null`.
    pub(crate) async fn send_json(&self, builder: RequestBuilder) -> Result<serde_json::Value> {
        let text = self.send(builder).await?.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// GET through the read cache; `path` (with its query) is the cache key
    pub(crate) async fn get_cached<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        if let Some(value) = self.cache.get(path) {
            tracing::trace!(path, "cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        let value = self.send_json(self.request(Method::GET, path)).await?;
        self.cache.put(path, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    pub(crate) async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        self.send_json(self.request(Method::POST, path).json(body)).await
    }

    // ========================================================================
    // Wallet
    // ========================================================================

    pub async fn wallet(&self, user_id: &str) -> Result<WalletSummary> {
        let resp: WalletBalanceResponse = self
            .get_cached(&format!("wallet/{user_id}/balance"))
            .await?;
        Ok(resp.into())
    }

    /// Wallet history, derived from the user's trades
    pub async fn wallet_transactions(&self, user_id: &str) -> Result<Vec<WalletTransaction>> {
        let rows = self.my_transaction_rows(user_id).await?;
        Ok(rows
            .iter()
            .map(|tx| WalletTransaction::for_user(tx, user_id))
            .collect())
    }

    /// Credit the wallet directly, without the gateway
    pub async fn direct_topup(&self, request: &TopupRequest) -> Result<WalletSummary> {
        let path = format!("wallet/{}/credit?amount={}", request.user_id, request.amount);
        let value = self.send_json(self.request(Method::POST, &path)).await?;
        self.cache.invalidate("wallet/");
        tracing::info!(user_id = request.user_id, amount = %request.amount, "Wallet credited");
        Ok(serde_json::from_value::<WalletBalanceResponse>(value)?.into())
    }

    // ========================================================================
    // Payment gateway
    // ========================================================================

    /// Ask the backend for a signed gateway checkout URL
    pub async fn create_gateway_topup(&self, request: &TopupRequest) -> Result<String> {
        let response = self
            .request(Method::POST, "payment/vnpay/create")
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let body: CreateTopupResponse = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Gateway checkout rejected");
            return Err(body.into_error().into());
        }

        let url = body.into_payment_url()?;
        tracing::info!(user_id = request.user_id, amount = %request.amount, "Gateway checkout created");
        Ok(url)
    }

    /// Forward a gateway redirect query to the backend for confirmation
    pub async fn confirm_gateway_return(&self, query: &GatewayQuery) -> Result<serde_json::Value> {
        self.confirm_gateway_return_as(query, self.sessions.token().as_deref())
            .await
    }

    async fn confirm_gateway_return_as(
        &self,
        query: &GatewayQuery,
        token: Option<&str>,
    ) -> Result<serde_json::Value> {
        let path = if query.is_empty() {
            "payment/vnpay/return".to_string()
        } else {
            format!("payment/vnpay/return?{}", query.as_str())
        };
        let value = self
            .send_json(self.request_as(Method::GET, &path, token))
            .await?;
        self.cache.invalidate("wallet/");
        Ok(value)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    pub async fn open_listings(&self) -> Result<Vec<Listing>> {
        let page: Page<ListingResponse> = self.get_cached("listings/open?page=0&size=50").await?;
        Ok(page.content.into_iter().map(Listing::from).collect())
    }

    pub async fn listing(&self, id: &str) -> Result<Listing> {
        let resp: ListingResponse = self.get_cached(&format!("listings/{id}")).await?;
        Ok(resp.into())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    async fn my_transaction_rows(&self, user_id: &str) -> Result<Vec<TransactionResponse>> {
        let rows: Option<Vec<TransactionResponse>> = self
            .get_cached(&format!("transactions/mine?userId={user_id}"))
            .await?;
        Ok(rows.unwrap_or_default())
    }

    pub async fn my_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let rows = self.my_transaction_rows(user_id).await?;
        Ok(rows
            .iter()
            .map(|tx| Transaction::for_user(tx, user_id))
            .collect())
    }

    /// Buy a listing
    pub async fn purchase(&self, listing_id: i64, buyer_id: i64) -> Result<Transaction> {
        let body = PurchaseRequest {
            listing_id,
            buyer_id,
        };
        let value = self.post_json("transactions", &body).await?;
        self.cache.invalidate("transactions/");
        self.cache.invalidate("wallet/");
        self.cache.invalidate("listings/");

        let resp: TransactionResponse = serde_json::from_value(value)?;
        Ok(Transaction::for_user(&resp, &buyer_id.to_string()))
    }

    // ========================================================================
    // Credits
    // ========================================================================

    /// Certificates held by `user_id`; empty when the endpoint is unavailable
    pub async fn portfolio(&self, user_id: &str) -> Vec<CreditCertificate> {
        self.get_cached(&format!("credits/portfolio/{user_id}"))
            .await
            .unwrap_or_else(|e: ClientError| {
                tracing::warn!(error = %e, "credits portfolio endpoint not available");
                Vec::new()
            })
    }

    /// All issued certificates; empty when the endpoint is unavailable
    pub async fn certificates(&self) -> Vec<CreditCertificate> {
        self.get_cached("credits").await.unwrap_or_else(|e: ClientError| {
            tracing::warn!(error = %e, "credits list endpoint not available");
            Vec::new()
        })
    }

    /// Parse a top-up form amount and build the request for the current user
    pub fn topup_request(&self, amount: Decimal) -> Result<TopupRequest> {
        let session = self.sessions.get().ok_or(ClientError::Unauthenticated)?;
        Ok(TopupRequest::new(&session.user.id, amount)?)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_http(config: &ClientConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()?)
}

#[cfg(target_arch = "wasm32")]
fn build_http(_config: &ClientConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::new())
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Reconciler for ApiClient {
    async fn reconcile(
        &self,
        query: &GatewayQuery,
        token: Option<&str>,
    ) -> market_payments::Result<serde_json::Value> {
        self.confirm_gateway_return_as(query, token)
            .await
            .map_err(reconciliation_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::{AuthUser, Session, UserRole};
    use market_payments::{PaymentError, ReturnFlow, Reconciliation};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn owner_session() -> Session {
        Session::new(
            "jwt-token",
            AuthUser {
                id: "7".into(),
                email: "owner@example.com".into(),
                name: "owner".into(),
                role: UserRole::Owner,
            },
        )
    }

    async fn client(server: &MockServer, session: Option<Session>) -> ApiClient {
        let sessions = SessionService::in_memory();
        if let Some(session) = session {
            sessions.set(session).unwrap();
        }
        let config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
        ApiClient::new(&config, sessions).unwrap()
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/wallet/7/balance"))
            .and(header("authorization", "Bearer jwt-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "userId": 7, "carbonBalance": 42.5 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        let wallet = api.wallet("7").await.unwrap();
        assert_eq!(wallet.balance, dec!(42.5));
        assert_eq!(wallet.currency, "CO2e");
    }

    #[tokio::test]
    async fn test_reads_are_cached_until_invalidated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/wallet/7/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "userId": 7, "balance": 5 })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/wallet/7/credit"))
            .and(query_param("amount", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "userId": 7, "balance": 55 })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        api.wallet("7").await.unwrap();
        api.wallet("7").await.unwrap();

        let request = TopupRequest::new("7", dec!(50)).unwrap();
        let credited = api.direct_topup(&request).await.unwrap();
        assert_eq!(credited.balance, dec!(55));

        api.wallet("7").await.unwrap();
    }

    #[tokio::test]
    async fn test_gateway_topup_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment/vnpay/create"))
            .and(body_json(json!({ "userId": 7, "amount": 100000.0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "paymentUrl": "https://sandbox.vnpayment.vn/pay?x=1"
            })))
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        let request = api.topup_request(dec!(100000)).unwrap();
        let url = api.create_gateway_topup(&request).await.unwrap();
        assert_eq!(url, "https://sandbox.vnpayment.vn/pay?x=1");
    }

    #[tokio::test]
    async fn test_gateway_topup_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment/vnpay/create"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "VNPay not configured",
                "hint": "Set vnpay.tmnCode"
            })))
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        let request = TopupRequest::new("7", dec!(20)).unwrap();
        let err = api.create_gateway_topup(&request).await.unwrap_err();
        match err {
            ClientError::Payment(PaymentError::Gateway(message)) => {
                assert_eq!(message, "VNPay not configured\n\nSet vnpay.tmnCode");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_topup_request_needs_session() {
        let server = MockServer::start().await;
        let api = client(&server, None).await;
        assert!(matches!(
            api.topup_request(dec!(100)),
            Err(ClientError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_listings_page_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/listings/open"))
            .and(query_param("page", "0"))
            .and(query_param("size", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "id": 1, "title": "Forest", "status": "OPEN", "price": 10, "carbonAmount": 3 },
                    { "id": 2, "status": "PENDING" }
                ]
            })))
            .mount(&server)
            .await;

        let api = client(&server, None).await;
        let listings = api.open_listings().await.unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].name, "Forest");
        assert_eq!(listings[1].name, "Listing");
    }

    #[tokio::test]
    async fn test_purchase_maps_buyer_side() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transactions"))
            .and(body_json(json!({ "listingId": 3, "buyerId": 7 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11, "buyerId": 7, "sellerId": 2, "listingId": 3,
                "amount": 120, "status": "PENDING"
            })))
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        let tx = api.purchase(3, 7).await.unwrap();
        assert_eq!(tx.id, "11");
        assert_eq!(tx.side, market_core::model::TradeSide::Buy);
    }

    #[tokio::test]
    async fn test_credits_degrade_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/credits/portfolio/7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        assert!(api.portfolio("7").await.is_empty());
        assert!(api.certificates().await.is_empty());
    }

    #[tokio::test]
    async fn test_status_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/listings/99"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let api = client(&server, None).await;
        let err = api.listing("99").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_reconciler_forwards_full_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/payment/vnpay/return"))
            .and(query_param("vnp_ResponseCode", "00"))
            .and(query_param("vnp_TxnRef", "ABC123"))
            .and(query_param("vnp_SecureHash", "deadbeef"))
            .and(header("authorization", "Bearer jwt-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        let flow = ReturnFlow::new(api.sessions().clone(), Arc::new(api));
        let query = GatewayQuery::parse(
            "?vnp_ResponseCode=00&vnp_TxnRef=ABC123&vnp_Amount=5000000&vnp_SecureHash=deadbeef",
        );

        let result = flow.reconcile(&query).await;
        assert_eq!(result, Reconciliation::Confirmed(json!({ "success": true })));
    }

    #[tokio::test]
    async fn test_reconciler_uses_given_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/payment/vnpay/return"))
            .and(header("authorization", "Bearer restored-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        let query = GatewayQuery::parse("vnp_ResponseCode=00&vnp_TxnRef=ABC123");
        let body = api.reconcile(&query, Some("restored-token")).await.unwrap();
        assert_eq!(body, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_reconciler_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/payment/vnpay/return"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let api = client(&server, Some(owner_session())).await;
        let flow = ReturnFlow::new(api.sessions().clone(), Arc::new(api));
        let query = GatewayQuery::parse("vnp_ResponseCode=24&vnp_TxnRef=X1&vnp_Amount=100");

        let before = flow.outcome(&query);
        let result = flow.reconcile(&query).await;
        assert!(matches!(result, Reconciliation::Failed(_)));
        assert_eq!(flow.outcome(&query), before);
    }
}
