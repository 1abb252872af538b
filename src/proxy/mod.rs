//! Completion proxy: `POST /api/analyze`.
//!
//! Wraps whatever JSON the caller posts into a fixed analyst prompt, forwards it
//! to the chat-completion endpoint with the configured bearer key, and returns
//! the endpoint's JSON untouched. No validation of the input or the key, no
//! timeout, and no reshaping of upstream errors.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::error::AppError;

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const COMPLETION_MODEL: &str = "gpt-4o-mini";
pub const SYSTEM_PROMPT: &str = "You are a retail AI analyst.";
pub const USER_PROMPT_PREFIX: &str = "Analyze this sales forecast data and give business insights:\n";

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    completion_url: String,
    api_key: String,
}

impl ProxyState {
    pub fn new(completion_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            completion_url: completion_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        if settings.completion_api_key.is_none() {
            warn!("no completion API key configured; upstream calls will be unauthenticated");
        }
        Self::new(
            settings.completion_url.clone(),
            settings.completion_api_key.clone().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Error)]
enum ProxyError {
    #[error("request body is not JSON: {0}")]
    Body(#[from] serde_json::Error),
    #[error("completion request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!("{self}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(ANALYZE_PATH, post(analyze))
        .with_state(state)
}

/// Chat-completion payload embedding `data` in the analyst prompt.
pub fn build_completion_request(data: &Value) -> Value {
    json!({
        "model": COMPLETION_MODEL,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": format!("{USER_PROMPT_PREFIX}{data}") },
        ],
    })
}

async fn analyze(State(state): State<ProxyState>, body: Bytes) -> Result<Json<Value>, ProxyError> {
    let data: Value = serde_json::from_slice(&body)?;
    let payload = build_completion_request(&data);

    info!(url = %state.completion_url, "forwarding analysis request");
    let resp = state
        .client
        .post(&state.completion_url)
        .header("Authorization", format!("Bearer {}", state.api_key))
        .json(&payload)
        .send()
        .await?;

    let upstream_status = resp.status();
    let answer: Value = resp.json().await?;
    info!(status = upstream_status.as_u16(), "completion response relayed");
    Ok(Json(answer))
}

/// Bind `bind` and serve the proxy until the process is stopped.
pub async fn serve(bind: &str, state: ProxyState) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::new(4, format!("Failed to bind {bind}: {e}")))?;
    info!("completion proxy listening on http://{bind}{ANALYZE_PATH}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| AppError::new(4, format!("Proxy server error: {e}")))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;
    use axum_test::TestServer;

    use super::*;

    /// Fake completion endpoint that echoes what it received.
    async fn spawn_upstream(status: StatusCode) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(payload): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                (
                    status,
                    Json(json!({ "id": "cmpl-1", "auth": auth, "received": payload })),
                )
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    #[test]
    fn prompt_embeds_compact_client_json() {
        let payload = build_completion_request(&json!([{ "ds": "2024-01-01", "yhat": 10 }]));
        assert_eq!(payload["model"], COMPLETION_MODEL);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(
            payload["messages"][1]["content"],
            "Analyze this sales forecast data and give business insights:\n[{\"ds\":\"2024-01-01\",\"yhat\":10}]"
        );
    }

    #[tokio::test]
    async fn relays_upstream_json_unmodified() {
        let upstream = spawn_upstream(StatusCode::OK).await;
        let server = TestServer::new(router(ProxyState::new(upstream, "sk-test"))).unwrap();

        let response = server
            .post(ANALYZE_PATH)
            .json(&json!({ "forecast": [{ "ds": "2024-01-01", "yhat": 10 }] }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["id"], "cmpl-1");
        assert_eq!(body["auth"], "Bearer sk-test");
        assert_eq!(body["received"]["model"], COMPLETION_MODEL);
    }

    #[tokio::test]
    async fn upstream_errors_pass_through_as_is() {
        let upstream = spawn_upstream(StatusCode::UNAUTHORIZED).await;
        let server = TestServer::new(router(ProxyState::new(upstream, ""))).unwrap();

        let response = server.post(ANALYZE_PATH).json(&json!({})).await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["auth"].as_str().map(str::trim), Some("Bearer"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_server_error() {
        let upstream = spawn_upstream(StatusCode::OK).await;
        let server = TestServer::new(router(ProxyState::new(upstream, "sk-test"))).unwrap();

        let response = server.post(ANALYZE_PATH).text("not json").expect_failure().await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
