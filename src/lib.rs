//! `forecast-dashboard` library crate.
//!
//! The binary (`dash`) is a thin wrapper around this library so that:
//!
//! - request/state logic is testable without spawning processes or a terminal
//! - the same view model drives the interactive dashboard and the one-shot commands

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod plot;
pub mod proxy;
pub mod report;
pub mod tui;
pub mod view;
