//! "Ask AI" request cycle against `POST <apiBase>/chat`.
//!
//! Each ask is independent: no history, no input validation, no cancellation.

use serde_json::Value;
use tracing::{info, warn};

use crate::data::transport::Transport;
use crate::domain::{ChatExchange, ChatRequest};
use crate::error::{FetchError, unreachable_guidance};

pub const CHAT_PATH: &str = "/chat";

/// Shown when the backend answered with a failure status and no answer text.
pub const REQUEST_FAILED: &str = "Request failed.";

/// Send `question` and return the text to show in the answer slot.
///
/// Any failure of the request/parse cycle yields the connectivity guidance for
/// `api_base`.
pub fn resolve_answer(transport: &dyn Transport, api_base: &str, question: &str) -> String {
    match request_answer(transport, api_base, question) {
        Ok(answer) => answer,
        Err(err) => {
            warn!(%api_base, "chat request failed: {err}");
            unreachable_guidance(api_base)
        }
    }
}

/// Ask the exchange's current question and overwrite its answer.
pub fn ask(exchange: &mut ChatExchange, transport: &dyn Transport, api_base: &str) {
    exchange.answer = resolve_answer(transport, api_base, &exchange.question);
}

fn request_answer(transport: &dyn Transport, api_base: &str, question: &str) -> Result<String, FetchError> {
    let url = format!("{api_base}{CHAT_PATH}");
    let body = serde_json::to_value(ChatRequest { question })
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    info!(%url, chars = question.chars().count(), "sending question");
    let resp = transport.post_json(&url, &body)?;
    let value: Value = serde_json::from_str(&resp.body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    Ok(answer_from(&value, resp.is_success()))
}

/// Pick the answer text out of a decoded `/chat` body.
pub fn answer_from(body: &Value, success: bool) -> String {
    match body.get("answer").and_then(Value::as_str) {
        Some(answer) if !answer.is_empty() => answer.to_string(),
        _ if success => String::new(),
        _ => REQUEST_FAILED.to_string(),
    }
}
