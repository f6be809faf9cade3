//! # Provider Error Types Module
//!
//! This module defines the error type returned by every AI provider call.
//! The responder treats all variants the same way (log and move on to the
//! next provider), but keeping them distinct makes the logs useful.

/// Longest response body kept in a [`ProviderError::Status`] message
pub const MAX_ERROR_BODY_CHARS: usize = 300;

/// Custom error types for provider invocations
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Network or connection failure before a response was received
    Transport(String),
    /// The per-call timeout elapsed
    Timeout(String),
    /// The provider answered with a non-2xx status
    Status { status: u16, body: String },
    /// The response body did not have the expected JSON shape
    Malformed(String),
    /// The call succeeded but carried no usable text
    EmptyResponse,
}

impl ProviderError {
    /// Build a status error, keeping only the head of the response body
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
            Some((cut, _)) => format!("{}…", &body[..cut]),
            None => body.to_string(),
        };
        ProviderError::Status { status, body }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Transport(msg) => write!(f, "Transport error: {msg}"),
            ProviderError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            ProviderError::Status { status, body } => {
                write!(f, "HTTP status {status}: {body}")
            }
            ProviderError::Malformed(msg) => write!(f, "Malformed response: {msg}"),
            ProviderError::EmptyResponse => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Malformed(err.to_string())
    }
}
