//! Error types.
//!
//! - `AppError`: process-level failure with an exit code (CLI/terminal/server).
//! - `FetchError`: recoverable request failures, converted into text shown on screen.
//! - `TransportError`: what a transport reports when it could not produce a response.

use thiserror::Error;

/// Shell command that starts the forecast/chat backend.
pub const BACKEND_START_COMMAND: &str = "cd backend && uvicorn main:app --reload --port 8000";

#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

/// Failure of a single backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was obtained (host down, connection refused, DNS failure).
    #[error("Failed to fetch: {0}")]
    NetworkUnreachable(String),
    /// A response arrived with a non-2xx status.
    #[error("HTTP {0}")]
    HttpStatus(u16),
    /// The body could not be read or decoded as JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Text shown to the user for this failure.
    ///
    /// Only `NetworkUnreachable` gets remediation text; everything else is shown as-is.
    pub fn user_message(&self, api_base: &str) -> String {
        match self {
            FetchError::NetworkUnreachable(_) => unreachable_guidance(api_base),
            other => other.to_string(),
        }
    }
}

/// Remediation text for a backend that could not be reached at `api_base`.
pub fn unreachable_guidance(api_base: &str) -> String {
    format!(
        "Cannot reach the backend at {api_base}. Is it running? Start it with: {BACKEND_START_COMMAND}"
    )
}

/// Transport-level failure (no usable HTTP response).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Unreachable(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unreachable(detail) => FetchError::NetworkUnreachable(detail),
            TransportError::Body(detail) => FetchError::MalformedResponse(detail),
        }
    }
}
