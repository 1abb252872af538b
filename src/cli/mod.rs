//! Command-line parsing for the forecast dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the request/state code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::locator::{PageLocation, RuntimeContext};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dash", version, about = "AI Sales Forecast Dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(TuiArgs),
    /// Load the forecast once and print the rendered view.
    Forecast(ForecastArgs),
    /// Ask the backend a question and print the answer.
    Ask(AskArgs),
    /// Serve the completion proxy (`POST /api/analyze`).
    Proxy(ProxyArgs),
    /// Print the backend base URL that would be used.
    BaseUrl(ClientArgs),
}

/// Options shared by every command that talks to the backend.
#[derive(Debug, Parser, Clone)]
pub struct ClientArgs {
    /// Address the dashboard is opened from; the backend is looked up on the same host.
    #[arg(long, env = "DASHBOARD_PAGE_URL", default_value = "http://localhost/")]
    pub page_url: String,

    /// Run without a page location (always uses the local default backend).
    #[arg(long)]
    pub headless: bool,
}

impl ClientArgs {
    pub fn runtime_context(&self) -> Result<RuntimeContext, AppError> {
        if self.headless {
            return Ok(RuntimeContext::Headless);
        }
        Ok(RuntimeContext::Page(PageLocation::parse(&self.page_url)?))
    }
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Write logs to this file (the dashboard owns the terminal, so nothing is logged otherwise).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Skip the ASCII chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct AskArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Question to send (sent as-is, empty allowed).
    #[arg(default_value = "")]
    pub question: String,
}

#[derive(Debug, Parser, Clone)]
pub struct ProxyArgs {
    /// Listen address (defaults to PROXY_BIND_ADDRESS or 127.0.0.1:3000).
    #[arg(long)]
    pub bind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_flag_wins_over_page_url() {
        let cli = Cli::parse_from(["dash", "forecast", "--headless", "--page-url", "http://x:3000/"]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.client.runtime_context().unwrap(), RuntimeContext::Headless);
    }

    #[test]
    fn page_url_becomes_page_context() {
        let cli = Cli::parse_from(["dash", "ask", "--page-url", "https://sales.example.com/", "why?"]);
        let Command::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.question, "why?");
        assert_eq!(
            args.client.runtime_context().unwrap(),
            RuntimeContext::Page(PageLocation {
                protocol: "https:".to_string(),
                hostname: "sales.example.com".to_string(),
            })
        );
    }
}
