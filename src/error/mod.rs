//! Centralized client error handling for the loan console
//!
//! Every remote call, validation guard and file operation reports through
//! `ClientError`, so callers can map failures to one user-visible message.

use serde::Deserialize;
use thiserror::Error;

/// Message shown when the backend could not be reached at all
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the loan service. Check your connection and retry.";

/// Client error type covering local guards and remote failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Not authenticated: please log in")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Not loaded: {0}")]
    NotLoaded(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl ClientError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Unauthenticated => "UNAUTHENTICATED",
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::Remote { .. } => "REMOTE_ERROR",
            ClientError::NetworkUnavailable(_) => "NETWORK_UNAVAILABLE",
            ClientError::NotLoaded(_) => "NOT_LOADED",
            ClientError::Forbidden(_) => "FORBIDDEN",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Io(_) => "IO_ERROR",
        }
    }

    /// Text shown to the admin. Remote messages are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated => "Your session has expired. Please log in again.".to_string(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Remote { message, .. } => message.clone(),
            ClientError::NetworkUnavailable(_) => CONNECTIVITY_MESSAGE.to_string(),
            ClientError::NotLoaded(what) => format!("{} has not been loaded yet", what),
            ClientError::Forbidden(msg) => msg.clone(),
            ClientError::Decode(_) => "The server returned an unexpected response.".to_string(),
            ClientError::Io(msg) => msg.clone(),
        }
    }

    /// Whether the failed action can be offered again as-is
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Remote { .. } | ClientError::NetworkUnavailable(_)
        )
    }

    /// Build a remote error from a non-2xx status and the raw response body
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = extract_message(body)
            .or_else(|| reason.map(str::to_string))
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        ClientError::Remote { status, message }
    }
}

/// Error bodies the backend is known to produce
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Message { message: String },
    Nested { error: NestedError },
    Flat { error: String },
}

#[derive(Deserialize)]
struct NestedError {
    message: String,
}

fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed {
        ErrorBody::Message { message } => message,
        ErrorBody::Nested { error } => error.message,
        ErrorBody::Flat { error } => error,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

// Convenience conversions from common error types

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Remote {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::NetworkUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

/// Result type alias using ClientError
pub type ClientResult<T> = Result<T, ClientError>;
