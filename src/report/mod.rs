//! Text reports for the non-interactive commands.
//!
//! Formatting lives here so the loader and view state stay free of
//! presentation concerns, and so output changes stay localized.

pub mod format;

pub use format::*;
