//! Ratatui-based dashboard.
//!
//! Renders the forecast panel (progress, error banner, placeholder, or chart
//! with insight) and the "Ask AI" panel. Requests run on worker threads owned by
//! `Dashboard`; the event loop applies their results between key presses.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::dashboard::Dashboard;
use crate::cli::ClientArgs;
use crate::config::Settings;
use crate::data::HttpTransport;
use crate::domain::ForecastPoint;
use crate::error::AppError;
use crate::view::RenderState;

mod plotters_chart;

use plotters_chart::{ForecastChart, label_at};

/// Start the dashboard.
pub fn run(args: &ClientArgs, settings: Settings) -> Result<(), AppError> {
    let context = args.runtime_context()?;
    let transport = Arc::new(HttpTransport::new()?);
    let dashboard = Dashboard::new(transport, context, settings.api_url_override);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App {
        dashboard,
        editing: false,
    };
    app.dashboard.mount();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    dashboard: Dashboard,
    editing: bool,
}

impl App {
    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.dashboard.pump() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            match code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Enter => {
                    self.editing = false;
                    self.dashboard.ask();
                }
                KeyCode::Backspace => {
                    self.dashboard.question_mut().pop();
                }
                KeyCode::Char(c) => self.dashboard.question_mut().push(c),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('i') | KeyCode::Enter => self.editing = true,
            KeyCode::Char('a') => {
                self.dashboard.ask();
            }
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(9),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_forecast(frame, chunks[1]);
        self.draw_ask(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "AI Sales Forecast Dashboard",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("backend: {}", self.dashboard.api_base()),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        match self.dashboard.view().render() {
            RenderState::Loading => {
                let msg = Paragraph::new("Loading forecast...").style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
            }
            RenderState::Error(message) => {
                let msg = Paragraph::new(format!("Error: {message}"))
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: false });
                frame.render_widget(msg, inner);
            }
            RenderState::Empty => {
                frame.render_widget(Paragraph::new("No forecast data."), inner);
            }
            RenderState::Data { points, insight } => {
                let chart_area = match insight {
                    Some(text) => {
                        let cols = Layout::default()
                            .direction(Direction::Horizontal)
                            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                            .split(inner);
                        let panel = Paragraph::new(text)
                            .wrap(Wrap { trim: true })
                            .block(Block::default().title("Insight").borders(Borders::ALL));
                        frame.render_widget(panel, cols[1]);
                        cols[0]
                    }
                    None => inner,
                };
                draw_chart(frame, chart_area, points);
            }
        }
    }

    fn draw_ask(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let chat = self.dashboard.chat();
        let (title, style) = if self.editing {
            ("Ask AI (Enter send, Esc stop editing)", Style::default().fg(Color::Yellow))
        } else {
            ("Ask AI", Style::default())
        };
        let cursor = if self.editing { "▏" } else { "" };
        let input = Paragraph::new(format!("{}{cursor}", chat.question))
            .style(style)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(input, rows[0]);

        let answer = Paragraph::new(chat.answer.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Answer").borders(Borders::ALL));
        frame.render_widget(answer, rows[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "i/Enter edit question  a ask  q quit";
        let mut status = match self.dashboard.loaded_at() {
            Some(at) => format!("loaded {}", at.format("%H:%M:%S")),
            None => "loading...".to_string(),
        };
        let pending = self.dashboard.asks_in_flight();
        if pending > 0 {
            status.push_str(&format!(" | asking ({pending} in flight)"));
        }

        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, points: &[ForecastPoint]) {
    let (line, x_bounds, y_bounds) = chart_series(points);
    let labels: Vec<String> = points.iter().map(|p| p.ds.clone()).collect();

    let (chart_rect, insets) = chart_layout(area);
    frame.render_widget(
        ForecastChart {
            line: &line,
            labels: &labels,
            x_bounds,
            y_bounds,
        },
        chart_rect,
    );
    if let Some(insets) = insets {
        draw_axis_ticks(frame, area, chart_rect, insets, &labels, x_bounds, y_bounds);
    }
}

/// Line series plus padded bounds. Points are positioned by sequence index.
fn chart_series(points: &[ForecastPoint]) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let line: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.yhat))
        .collect();

    // Half a slot of room on each side keeps a single point drawable.
    let x_bounds = [-0.5, points.len() as f64 - 0.5];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in &line {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    (line, x_bounds, [y_min - pad, y_max + pad])
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    labels: &[String],
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let style = Style::default().fg(Color::Gray);

    // x: first, middle and last `ds` labels.
    let y = chart.y + chart.height;
    if y < inner.y + inner.height {
        let last = labels.len().saturating_sub(1);
        let mut positions = vec![0, last / 2, last];
        positions.dedup();
        for index in positions {
            let label = label_at(labels, index as f64);
            if label.is_empty() {
                continue;
            }
            let u = (index as f64 - x_bounds[0]) / (x_bounds[1] - x_bounds[0]);
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let len = label.chars().count() as u16;
            let start = x
                .saturating_sub(len / 2)
                .max(inner.x)
                .min((inner.x + inner.width).saturating_sub(len));
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: start,
                    y,
                    width: len.min(inner.width),
                    height: 1,
                },
            );
        }
    }

    // y: evenly spaced values.
    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let value = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{value:.0}");
        let len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: len,
                height: 1,
            },
        );
    }

    let y_label = Paragraph::new("yhat").style(style.add_modifier(Modifier::BOLD));
    frame.render_widget(
        y_label,
        Rect {
            x: inner.x,
            y: inner.y,
            width: insets.left.saturating_sub(1),
            height: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<ForecastPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &yhat)| ForecastPoint {
                ds: format!("2024-01-{:02}", i + 1),
                yhat,
            })
            .collect()
    }

    #[test]
    fn series_follow_sequence_order() {
        let (line, x_bounds, y_bounds) = chart_series(&points(&[5.0, 1.0, 3.0]));
        assert_eq!(line, vec![(0.0, 5.0), (1.0, 1.0), (2.0, 3.0)]);
        assert_eq!(x_bounds, [-0.5, 2.5]);
        assert!(y_bounds[0] < 1.0 && y_bounds[1] > 5.0);
    }

    #[test]
    fn flat_series_still_has_a_y_range() {
        let (_, x_bounds, y_bounds) = chart_series(&points(&[7.0]));
        assert!(x_bounds[1] > x_bounds[0]);
        assert!(y_bounds[0] < 7.0 && y_bounds[1] > 7.0);
    }

    #[test]
    fn layout_skips_insets_in_tiny_areas() {
        let (rect, insets) = chart_layout(Rect::new(0, 0, 15, 6));
        assert!(insets.is_none());
        assert_eq!(rect, Rect::new(0, 0, 15, 6));

        let (rect, insets) = chart_layout(Rect::new(0, 0, 80, 20));
        assert!(insets.is_some());
        assert_eq!(rect, Rect::new(8, 1, 70, 17));
    }
}
