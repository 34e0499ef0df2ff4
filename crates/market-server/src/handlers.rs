//! HTTP Handlers

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::state::AppState;

/// Largest request body forwarded upstream
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe one connection and are never forwarded
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::HOST,
    header::TRANSFER_ENCODING,
    header::CONTENT_LENGTH,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub upstream: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("Backend unreachable: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Body(_) => (StatusCode::PAYLOAD_TOO_LARGE, "BAD_REQUEST_BODY"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                code: code.into(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        upstream: state.upstream.to_string(),
    })
}

/// Forward an `/api/...` request to the backend and relay the answer.
///
/// Path and query are kept verbatim, so gateway redirect parameters reach
/// the backend exactly as the gateway signed them.
pub async fn proxy(State(state): State<AppState>, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
    let target = format!("{}{path_and_query}", state.upstream);
    let body = to_bytes(body, MAX_BODY_BYTES).await?;

    tracing::debug!(method = %parts.method, %target, "Proxying request");

    let upstream = state
        .http
        .request(parts.method, &target)
        .headers(forwardable(&parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(%target, error = %e, "Upstream request failed");
            e
        })?;

    let status = upstream.status();
    let headers = forwardable(upstream.headers());
    let bytes = upstream.bytes().await?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in &HOP_BY_HOP {
        out.remove(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_router;
    use axum::http::Method;
    use tower::ServiceExt;
    use wiremock::matchers::{body_string, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn app(upstream: &str, static_dir: &std::path::Path) -> axum::Router {
        build_router(AppState::new(upstream).unwrap(), static_dir)
    }

    #[tokio::test]
    async fn test_proxy_forwards_query_and_auth() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/payment/vnpay/return"))
            .and(query_param("vnp_ResponseCode", "00"))
            .and(query_param("vnp_TxnRef", "ABC123"))
            .and(header_eq("authorization", "Bearer jwt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-backend", "1")
                    .set_body_string(r#"{"success":true}"#),
            )
            .expect(1)
            .mount(&backend)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let response = app(&backend.uri(), dir.path())
            .oneshot(
                Request::builder()
                    .uri("/api/payment/vnpay/return?vnp_ResponseCode=00&vnp_TxnRef=ABC123")
                    .header(header::AUTHORIZATION, "Bearer jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-backend"], "1");
        assert_eq!(body_text(response).await, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn test_proxy_forwards_body_and_status() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .and(body_string(r#"{"email":"a@b.c","password":"x"}"#))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"Invalid credentials"}"#))
            .mount(&backend)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let response = app(&backend.uri(), dir.path())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/users/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"a@b.c","password":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let response = app("http://127.0.0.1:9", dir.path())
            .oneshot(Request::builder().uri("/api/listings/open").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("UPSTREAM_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_spa_fallback_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

        let router = app("http://127.0.0.1:9", dir.path());

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/vnpay-return?vnp_ResponseCode=00").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<html>app</html>");

        let response = router
            .oneshot(Request::builder().uri("/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = app("http://localhost:8083/", dir.path())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#""upstream":"http://localhost:8083""#));
    }
}
