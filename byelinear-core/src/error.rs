//! Error types for the migration engine

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for migration operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP-layer failure
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// HTTP 200 response carrying a non-empty `errors` array
    #[error("GitHub GraphQL API error: {}", join_messages(.0))]
    RemoteValidation(Vec<RemoteError>),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Per-issue export deadline exceeded
    #[error("Export timed out after {0:?}")]
    Timeout(Duration),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The repository has already handed out the issue number we wanted
    #[error("Issue number {wanted} is already taken (next free number is at least {next})")]
    NumberTaken { wanted: u64, next: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Response headers attached to a transport failure, if any
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Error::Transport(err) => err.headers.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError {
            status: err.status(),
            headers: None,
            message: err.to_string(),
        })
    }
}

/// Failure below the GraphQL/REST layer
///
/// Keeps the response head when one was received so callers can still
/// inspect rate-limit headers on a non-2xx status.
#[derive(Debug, Clone)]
pub struct TransportError {
    /// HTTP status, when a response was received
    pub status: Option<StatusCode>,
    /// Response headers, when a response was received
    pub headers: Option<HeaderMap>,
    /// Human-readable failure description
    pub message: String,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "request failed with status {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<ErrorLocation>,
}

/// Source position of a GraphQL error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

fn join_messages(errors: &[RemoteError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
