//! HTTP seam used by the forecast loader and the chat client.
//!
//! The loader and the chat client only need "status + body text", so the
//! transport reduces every exchange to an `HttpResponse`. JSON decoding happens
//! above this layer, which keeps the malformed-body handling in one place.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{AppError, TransportError};

/// Status code and raw body text of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError>;
}

/// Blocking `reqwest` transport.
///
/// No request timeout is configured: a hung backend keeps the request pending.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        read_response(resp)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        read_response(resp)
    }
}

fn read_response(resp: reqwest::blocking::Response) -> Result<HttpResponse, TransportError> {
    let status = resp.status().as_u16();
    let body = resp.text().map_err(|e| TransportError::Body(e.to_string()))?;
    Ok(HttpResponse { status, body })
}
