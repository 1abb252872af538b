//! Backend base-URL resolution.
//!
//! The dashboard and the backend usually share a host and differ only in port,
//! so when the client knows the location it was opened from it derives
//! `<protocol>//<hostname>:8000`. A headless invocation has no such location and
//! falls back to a fixed local default.

use reqwest::Url;

use crate::error::AppError;

/// Base URL used when no page location is available.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Port the forecast/chat service listens on.
pub const SERVICE_PORT: u16 = 8000;

/// The location the dashboard was opened from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme including the trailing colon (`http:` / `https:`).
    pub protocol: String,
    pub hostname: String,
}

impl PageLocation {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let url = Url::parse(raw)
            .map_err(|e| AppError::new(2, format!("Invalid page URL '{raw}': {e}")))?;
        let hostname = url
            .host_str()
            .ok_or_else(|| AppError::new(2, format!("Page URL '{raw}' has no host.")))?;
        Ok(Self {
            protocol: format!("{}:", url.scheme()),
            hostname: hostname.to_string(),
        })
    }
}

/// Where the client is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeContext {
    /// No page location (pre-render / scripted use).
    Headless,
    Page(PageLocation),
}

/// Resolve the backend base URL for `context`.
///
/// Pure: the same context and override always yield the same string.
pub fn api_base(context: &RuntimeContext, override_url: Option<&str>) -> String {
    let RuntimeContext::Page(location) = context else {
        return DEFAULT_API_BASE.to_string();
    };

    if let Some(url) = override_url.filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    format!("{}//{}:{SERVICE_PORT}", location.protocol, location.hostname)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(raw: &str) -> RuntimeContext {
        RuntimeContext::Page(PageLocation::parse(raw).unwrap())
    }

    #[test]
    fn headless_uses_fixed_default_even_with_override() {
        assert_eq!(api_base(&RuntimeContext::Headless, None), "http://localhost:8000");
        assert_eq!(
            api_base(&RuntimeContext::Headless, Some("https://api.example.com/")),
            "http://localhost:8000"
        );
    }

    #[test]
    fn override_wins_in_page_context_and_loses_trailing_slash() {
        let ctx = page("http://dashboard.local:3000/");
        assert_eq!(
            api_base(&ctx, Some("https://api.example.com/")),
            "https://api.example.com"
        );
        assert_eq!(api_base(&ctx, Some("https://api.example.com")), "https://api.example.com");
    }

    #[test]
    fn derives_same_host_with_service_port() {
        assert_eq!(api_base(&page("http://10.0.0.5:3000/"), None), "http://10.0.0.5:8000");
        assert_eq!(api_base(&page("https://sales.example.com/"), None), "https://sales.example.com:8000");
        assert_eq!(api_base(&page("http://dash.local/"), Some("")), "http://dash.local:8000");
    }

    #[test]
    fn resolution_is_idempotent() {
        let ctx = page("http://dashboard.local:3000/");
        assert_eq!(api_base(&ctx, None), api_base(&ctx, None));
        let over = Some("http://backend:9000/");
        assert_eq!(api_base(&ctx, over), api_base(&ctx, over));
    }

    #[test]
    fn rejects_page_urls_without_host() {
        assert!(PageLocation::parse("not a url").is_err());
        assert!(PageLocation::parse("mailto:someone@example.com").is_err());
    }
}
