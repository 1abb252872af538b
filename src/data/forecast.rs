//! `/forecast` loading and response normalization.
//!
//! The backend has shipped two body shapes over time (a bare list of points, or
//! an object bundling the list with an insight string). Rather than guessing
//! at the call site, the decoded body is classified once into
//! `ForecastResponse` and then normalized; every missing or mistyped field
//! falls back to an empty default.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::transport::Transport;
use crate::domain::{ForecastData, ForecastPoint};
use crate::error::FetchError;
use crate::view::ViewState;

pub const FORECAST_PATH: &str = "/forecast";

/// Decoded `/forecast` body, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastResponse {
    /// Bare ordered list of points.
    Series(Vec<Value>),
    /// `{ forecast?: [...], insight?: string }`, fields kept raw until normalization.
    Bundle {
        forecast: Option<Value>,
        insight: Option<Value>,
    },
    /// `null`, scalars, anything else.
    Unrecognized,
}

impl ForecastResponse {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Series(items),
            Value::Object(mut map) => Self::Bundle {
                forecast: map.remove("forecast"),
                insight: map.remove("insight"),
            },
            _ => Self::Unrecognized,
        }
    }

    /// Never fails: unusable parts become empty.
    pub fn normalize(self) -> ForecastData {
        match self {
            Self::Series(items) => ForecastData {
                points: parse_points(items),
                insight: String::new(),
            },
            Self::Bundle { forecast, insight } => ForecastData {
                points: match forecast {
                    Some(Value::Array(items)) => parse_points(items),
                    _ => Vec::new(),
                },
                insight: match insight {
                    Some(Value::String(text)) => text,
                    _ => String::new(),
                },
            },
            Self::Unrecognized => ForecastData::default(),
        }
    }
}

fn parse_points(items: Vec<Value>) -> Vec<ForecastPoint> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<ForecastPoint>(item) {
            Ok(point) => Some(point),
            Err(e) => {
                debug!(index, "skipping forecast row: {e}");
                None
            }
        })
        .collect()
}

/// Issue `GET <api_base>/forecast` and normalize the body.
pub fn fetch_forecast(transport: &dyn Transport, api_base: &str) -> Result<ForecastData, FetchError> {
    let url = format!("{api_base}{FORECAST_PATH}");
    info!(%url, "loading forecast");

    let resp = transport.get(&url)?;
    if !resp.is_success() {
        match error_detail(&resp.body) {
            Some(detail) => warn!(status = resp.status, %detail, "forecast request rejected"),
            None => warn!(status = resp.status, "forecast request rejected"),
        }
        return Err(FetchError::HttpStatus(resp.status));
    }

    let value: Value = serde_json::from_str(&resp.body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    let data = ForecastResponse::from_json(value).normalize();
    info!(points = data.points.len(), has_insight = !data.insight.is_empty(), "forecast loaded");
    Ok(data)
}

/// Run one complete load cycle, driving `view` from loading to its settled state.
pub fn load_forecast(view: &mut ViewState, transport: &dyn Transport, api_base: &str) {
    view.begin_load();
    let outcome = fetch_forecast(transport, api_base);
    view.settle_load(outcome, api_base);
}

/// The backend reports rejections as `{"detail": "..."}`.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}
