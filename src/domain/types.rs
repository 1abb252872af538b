//! Shared domain types.
//!
//! Wire-facing types derive serde so the same structs are used for decoding
//! backend bodies and for building request payloads.

use serde::{Deserialize, Serialize};

/// One labeled time/value pair produced by the backend's forecast model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Date label, shown as-is (never parsed or re-sorted).
    pub ds: String,
    /// Predicted value.
    pub yhat: f64,
}

/// Normalized result of a successful `/forecast` load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastData {
    /// Points in the order the backend sent them.
    pub points: Vec<ForecastPoint>,
    /// Natural-language summary; empty when the backend sent none.
    pub insight: String,
}

/// Body of `POST <apiBase>/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub question: &'a str,
}

/// The "Ask AI" slot: the question being edited and the last answer shown.
///
/// No history is kept; every resolved ask overwrites `answer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatExchange {
    pub question: String,
    pub answer: String,
}
