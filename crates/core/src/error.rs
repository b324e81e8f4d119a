//! Unified error types for ladle.
//!
//! Every variant's Display starts with a stable code so callers can branch on
//! the failure kind. Fetch failures carry the URL and a truncated body snippet.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;

/// Maximum number of characters kept from a response body for diagnostics.
pub const SNIPPET_CHARS: usize = 500;

/// Unified error types for the extraction pipeline and record store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or unparsable input (e.g., empty URL, unsupported scheme).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Target host resolves to a private or reserved address.
    #[error("PRIVATE_ADDRESS: {0}")]
    PrivateAddress(String),

    /// Document fetch exceeded its time budget.
    #[error("FETCH_TIMEOUT: {url} after {timeout_ms}ms")]
    FetchTimeout { url: String, timeout_ms: u64 },

    /// Non-2xx response from the document host.
    #[error("FETCH_FAILED: status {status} for {url}. Snippet: {snippet}")]
    FetchFailed { status: u16, url: String, snippet: String },

    /// A bot-challenge or consent interstitial was served instead of content.
    #[error("BLOCKED: interstitial '{marker}' detected for {url}. Snippet: {snippet}")]
    Blocked { url: String, marker: String, snippet: String },

    /// Transport-level failure (DNS, TLS, connection reset, body read).
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Response body exceeded the configured byte limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// The language model returned nothing usable.
    #[error("EXTRACTION_FAILED: {0}")]
    ExtractionFailed(String),

    /// Missing or rejected credentials, invalid settings.
    #[error("CONFIGURATION_ERROR: {0}")]
    Configuration(String),

    /// No record exists for the given id.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored payload could not be encoded or decoded.
    #[error("STORE_ERROR: {0}")]
    Serialization(String),
}

impl Error {
    /// Build a [`Error::FetchFailed`] with a diagnostic snippet of the body.
    pub fn fetch_failed(status: u16, url: impl Into<String>, body: &str) -> Self {
        Error::FetchFailed { status, url: url.into(), snippet: body_snippet(body) }
    }

    /// Build a [`Error::Blocked`] with a diagnostic snippet of the body.
    pub fn blocked(url: impl Into<String>, marker: impl Into<String>, body: &str) -> Self {
        Error::Blocked { url: url.into(), marker: marker.into(), snippet: body_snippet(body) }
    }
}

/// Collapse whitespace and keep the first [`SNIPPET_CHARS`] characters.
pub fn body_snippet(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(SNIPPET_CHARS).collect()
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Configuration(err.to_string())
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::ExtractionFailed(_) => -32000,
            Error::NotFound(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) | Error::Serialization(_) => -32002,
            Error::PrivateAddress(_) => -32004,
            Error::Blocked { .. } => -32005,
            Error::FetchTimeout { .. } => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::FetchFailed { .. } => -32008,
            Error::HttpError(_) => -32009,
            Error::Configuration(_) => -32010,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
