//! Domain types shared by the loader, the chat client, and the front ends.
//!
//! - forecast points and the normalized load result (`ForecastPoint`, `ForecastData`)
//! - the ephemeral question/answer pair (`ChatExchange`)
//! - the `/chat` request body (`ChatRequest`)

pub mod types;

pub use types::*;
