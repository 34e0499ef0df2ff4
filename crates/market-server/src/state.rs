//! Application State and Configuration

use std::path::PathBuf;
use std::sync::Arc;

/// Server settings, read from the environment
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Backend origin; `/api/...` paths are forwarded to it unchanged
    pub upstream: String,

    /// Compiled front-end bundle
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5173".into(),
            upstream: "http://localhost:8083".into(),
            static_dir: PathBuf::from("dist"),
        }
    }
}

impl ServerConfig {
    /// `BIND_ADDR`, `MARKET_API_UPSTREAM`, `STATIC_DIR`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            upstream: std::env::var("MARKET_API_UPSTREAM").unwrap_or(defaults.upstream),
            static_dir: std::env::var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Client used to reach the backend
    pub http: reqwest::Client,

    /// Backend origin without a trailing slash
    pub upstream: Arc<str>,
}

impl AppState {
    pub fn new(upstream: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            upstream: Arc::from(upstream.trim_end_matches('/')),
        })
    }
}
