//! carbon-market web server
//!
//! Serves the compiled WASM front end and forwards `/api/*` to the
//! marketplace backend, so the browser sees a single origin.
//!
//! ```text
//! browser ──▶ /api/*      ──▶ proxy ──▶ backend (MARKET_API_UPSTREAM)
//!         ──▶ /health
//!         ──▶ everything else ──▶ STATIC_DIR (index.html fallback)
//! ```

mod handlers;
mod state;

use std::path::Path;

use axum::{
    Router,
    routing::{any, get},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{health_check, proxy};
use crate::state::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let state = AppState::new(&config.upstream)?;

    if !config.static_dir.join("index.html").exists() {
        tracing::warn!(
            static_dir = %config.static_dir.display(),
            "index.html not found - build the front end first"
        );
    }

    let app = build_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("carbon-market web running on http://{}", config.bind_addr);
    tracing::info!("  /api/*  -> {}", config.upstream);
    tracing::info!("  static  -> {}", config.static_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes: health, API proxy, static bundle with SPA fallback
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/{*path}", any(proxy))
        .fallback_service(spa)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
