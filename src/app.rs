//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads settings from the environment
//! - installs logging
//! - dispatches to the dashboard, one-shot commands, or the proxy server

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AskArgs, ClientArgs, Command, ForecastArgs, ProxyArgs, TuiArgs};
use crate::config::Settings;
use crate::data::HttpTransport;
use crate::data::chat;
use crate::data::forecast::load_forecast;
use crate::data::locator::api_base;
use crate::domain::ChatExchange;
use crate::error::AppError;
use crate::report::{PlotSize, format_answer, format_view};
use crate::view::ViewState;

pub mod dashboard;

/// Entry point for the `dash` binary.
pub fn run() -> Result<(), AppError> {
    // `dash` and `dash --page-url ...` behave like `dash tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = Settings::from_env();

    match cli.command {
        Command::Tui(args) => handle_tui(args, settings),
        Command::Forecast(args) => handle_forecast(args, settings),
        Command::Ask(args) => handle_ask(args, settings),
        Command::Proxy(args) => handle_proxy(args, settings),
        Command::BaseUrl(args) => handle_base_url(args, settings),
    }
}

fn handle_tui(args: TuiArgs, settings: Settings) -> Result<(), AppError> {
    if let Some(path) = &args.log_file {
        init_file_logging(path)?;
    }
    crate::tui::run(&args.client, settings)
}

fn handle_forecast(args: ForecastArgs, settings: Settings) -> Result<(), AppError> {
    init_stderr_logging();
    let base = resolve_base(&args.client, &settings)?;
    let transport = HttpTransport::new()?;

    let mut view = ViewState::new();
    load_forecast(&mut view, &transport, &base);

    let plot = (!args.no_plot).then_some(PlotSize {
        width: args.width,
        height: args.height,
    });
    print!("{}", format_view(&view, &base, plot));
    Ok(())
}

fn handle_ask(args: AskArgs, settings: Settings) -> Result<(), AppError> {
    init_stderr_logging();
    let base = resolve_base(&args.client, &settings)?;
    let transport = HttpTransport::new()?;

    let mut exchange = ChatExchange {
        question: args.question,
        answer: String::new(),
    };
    chat::ask(&mut exchange, &transport, &base);
    print!("{}", format_answer(&exchange.question, &exchange.answer));
    Ok(())
}

fn handle_proxy(args: ProxyArgs, settings: Settings) -> Result<(), AppError> {
    init_stderr_logging();
    let bind = args.bind.unwrap_or_else(|| settings.proxy_bind.clone());
    let state = crate::proxy::ProxyState::from_settings(&settings);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::new(4, format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(crate::proxy::serve(&bind, state))
}

fn handle_base_url(args: ClientArgs, settings: Settings) -> Result<(), AppError> {
    println!("{}", resolve_base(&args, &settings)?);
    Ok(())
}

fn resolve_base(args: &ClientArgs, settings: &Settings) -> Result<String, AppError> {
    let context = args.runtime_context()?;
    Ok(api_base(&context, settings.api_url_override.as_deref()))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_file_logging(path: &Path) -> Result<(), AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Rewrite argv so `dash` defaults to `dash tui`.
///
/// Rules:
/// - `dash`                       -> `dash tui`
/// - `dash --page-url URL ...`    -> `dash tui --page-url URL ...`
/// - `dash --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_dashboard() {
        assert_eq!(rewrite_args(args(&["dash"])), args(&["dash", "tui"]));
        assert_eq!(
            rewrite_args(args(&["dash", "--headless"])),
            args(&["dash", "tui", "--headless"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(args(&["dash", "--help"])), args(&["dash", "--help"]));
        assert_eq!(
            rewrite_args(args(&["dash", "ask", "hello"])),
            args(&["dash", "ask", "hello"])
        );
    }

    #[test]
    fn base_url_follows_context_and_override() {
        let settings = Settings {
            api_url_override: Some("http://backend.internal:9000/".to_string()),
            ..Settings::default()
        };
        let page = ClientArgs {
            page_url: "http://dash.local:3000/".to_string(),
            headless: false,
        };
        assert_eq!(resolve_base(&page, &settings).unwrap(), "http://backend.internal:9000");

        let headless = ClientArgs { headless: true, ..page };
        assert_eq!(resolve_base(&headless, &settings).unwrap(), "http://localhost:8000");
    }
}
