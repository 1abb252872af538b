//! Formatted terminal output for the derived forecast view and chat answers.

use crate::domain::ForecastPoint;
use crate::plot::render_forecast_plot;
use crate::view::{RenderState, ViewState};

/// Chart dimensions for `format_view`.
#[derive(Debug, Clone, Copy)]
pub struct PlotSize {
    pub width: usize,
    pub height: usize,
}

/// Render the view the same way the dashboard would, as plain text.
pub fn format_view(view: &ViewState, api_base: &str, plot: Option<PlotSize>) -> String {
    let mut out = String::new();
    out.push_str("=== AI Sales Forecast Dashboard ===\n");
    out.push_str(&format!("Backend: {api_base}\n\n"));

    match view.render() {
        RenderState::Loading => out.push_str("Loading forecast...\n"),
        RenderState::Error(message) => out.push_str(&format!("Error: {message}\n")),
        RenderState::Empty => out.push_str("No forecast data.\n"),
        RenderState::Data { points, insight } => {
            out.push_str(&format_forecast_table(points));
            if let Some(size) = plot {
                out.push('\n');
                out.push_str(&render_forecast_plot(points, size.width, size.height));
            }
            if let Some(text) = insight {
                out.push_str("\nInsight:\n");
                out.push_str(text);
                out.push('\n');
            }
        }
    }

    out
}

/// Two-column table of the forecast in backend order.
pub fn format_forecast_table(points: &[ForecastPoint]) -> String {
    let ds_width = points
        .iter()
        .map(|p| p.ds.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = String::new();
    out.push_str(&format!("{:<ds_width$}  {:>12}\n", "ds", "yhat"));
    for p in points {
        out.push_str(&format!("{:<ds_width$}  {:>12.2}\n", p.ds, p.yhat));
    }
    out
}

/// The answer slot as printed by `dash ask`.
pub fn format_answer(question: &str, answer: &str) -> String {
    let shown = if answer.is_empty() { "(no answer)" } else { answer };
    format!("Q: {question}\nA: {shown}\n")
}
