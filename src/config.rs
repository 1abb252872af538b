//! Environment-driven configuration.
//!
//! Values are read once at startup (after loading `.env` if present) and then
//! passed around explicitly; nothing below re-reads the environment.

/// Optional override for the dashboard's backend base URL.
pub const API_URL_ENV: &str = "FORECAST_API_URL";
/// Bearer credential for the completion proxy.
pub const COMPLETION_KEY_ENV: &str = "OPENAI_API_KEY";
pub const COMPLETION_URL_ENV: &str = "COMPLETION_API_URL";
pub const PROXY_BIND_ENV: &str = "PROXY_BIND_ADDRESS";

pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_PROXY_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Backend base URL override (empty values count as unset).
    pub api_url_override: Option<String>,
    pub completion_api_key: Option<String>,
    pub completion_url: String,
    pub proxy_bind: String,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_url_override: non_empty(API_URL_ENV),
            completion_api_key: non_empty(COMPLETION_KEY_ENV),
            completion_url: non_empty(COMPLETION_URL_ENV)
                .unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
            proxy_bind: non_empty(PROXY_BIND_ENV).unwrap_or_else(|| DEFAULT_PROXY_BIND.to_string()),
        }
    }
}
