//! Forecast view state and the render derivation.
//!
//! `ViewState` is the single record behind the forecast panel. It only changes
//! through the transition methods below; `render()` turns it into exactly one
//! of four `RenderState`s, with a pending load taking precedence over an error,
//! and an error over data.

use crate::domain::{ForecastData, ForecastPoint};
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    loading: bool,
    error: Option<String>,
    forecast: Vec<ForecastPoint>,
    insight: String,
}

/// What the forecast panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState<'a> {
    Loading,
    Error(&'a str),
    /// Load succeeded with no points.
    Empty,
    Data {
        points: &'a [ForecastPoint],
        /// `None` when there is no insight text to show.
        insight: Option<&'a str>,
    },
}

impl ViewState {
    /// Initial state: the load starts as soon as the dashboard is mounted.
    pub fn new() -> Self {
        Self {
            loading: true,
            error: None,
            forecast: Vec::new(),
            insight: String::new(),
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn forecast(&self) -> &[ForecastPoint] {
        &self.forecast
    }

    pub fn insight(&self) -> &str {
        &self.insight
    }

    /// A fresh attempt: pending, with any previous error cleared.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Apply the outcome of a load and leave the loading state.
    ///
    /// `api_base` is the base the request was sent to; it ends up in the error
    /// text when the backend could not be reached.
    pub fn settle_load(&mut self, outcome: Result<ForecastData, FetchError>, api_base: &str) {
        match outcome {
            Ok(data) => {
                self.forecast = data.points;
                self.insight = data.insight;
            }
            Err(err) => self.error = Some(err.user_message(api_base)),
        }
        self.loading = false;
    }

    pub fn render(&self) -> RenderState<'_> {
        if self.loading {
            return RenderState::Loading;
        }
        if let Some(error) = &self.error {
            return RenderState::Error(error);
        }
        if self.forecast.is_empty() {
            return RenderState::Empty;
        }
        RenderState::Data {
            points: &self.forecast,
            insight: Some(self.insight.as_str()).filter(|s| !s.is_empty()),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(points: &[(&str, f64)], insight: &str) -> ForecastData {
        ForecastData {
            points: points
                .iter()
                .map(|&(ds, yhat)| ForecastPoint {
                    ds: ds.to_string(),
                    yhat,
                })
                .collect(),
            insight: insight.to_string(),
        }
    }

    #[test]
    fn starts_loading_and_suppresses_everything_else() {
        let view = ViewState::new();
        assert!(view.loading());
        assert_eq!(view.render(), RenderState::Loading);
    }

    #[test]
    fn settles_into_each_terminal_state() {
        let mut view = ViewState::new();
        view.settle_load(Ok(data(&[], "")), "http://localhost:8000");
        assert_eq!(view.render(), RenderState::Empty);

        let mut view = ViewState::new();
        view.settle_load(Ok(data(&[("2024-01-01", 1.0)], "")), "http://localhost:8000");
        assert!(matches!(view.render(), RenderState::Data { insight: None, .. }));

        let mut view = ViewState::new();
        view.settle_load(Err(FetchError::HttpStatus(404)), "http://localhost:8000");
        assert_eq!(view.render(), RenderState::Error("HTTP 404"));
    }

    #[test]
    fn error_takes_precedence_over_stale_data() {
        let mut view = ViewState::new();
        view.settle_load(Ok(data(&[("2024-01-01", 1.0)], "up")), "http://localhost:8000");
        view.begin_load();
        assert_eq!(view.render(), RenderState::Loading);
        view.settle_load(Err(FetchError::HttpStatus(503)), "http://localhost:8000");

        assert_eq!(view.forecast().len(), 1);
        assert_eq!(view.render(), RenderState::Error("HTTP 503"));
    }

    #[test]
    fn begin_load_clears_previous_error() {
        let mut view = ViewState::new();
        view.settle_load(Err(FetchError::HttpStatus(500)), "http://localhost:8000");
        view.begin_load();
        assert!(view.loading());
        assert_eq!(view.error(), None);
    }

    #[test]
    fn bare_list_clears_stale_insight() {
        let mut view = ViewState::new();
        view.settle_load(Ok(data(&[("2024-01-01", 1.0)], "old insight")), "http://localhost:8000");
        assert_eq!(view.insight(), "old insight");
        view.begin_load();
        view.settle_load(Ok(data(&[("2024-01-02", 2.0)], "")), "http://localhost:8000");
        assert_eq!(view.insight(), "");
    }
}
