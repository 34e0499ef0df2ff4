//! Client configuration

/// Backend location and transport settings
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API root, including the `/api` prefix
    pub base_url: String,

    /// Request timeout in seconds (native targets only)
    pub timeout_secs: u64,

    /// How long cached reads stay fresh
    pub cache_ttl_secs: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8083/api".into(),
            timeout_secs: 30,
            cache_ttl_secs: 60,
        }
    }
}

impl ClientConfig {
    /// `MARKET_API_URL`, `MARKET_API_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("MARKET_API_URL").unwrap_or(defaults.base_url);
        let timeout_secs = std::env::var("MARKET_API_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            base_url,
            timeout_secs,
            ..defaults
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
