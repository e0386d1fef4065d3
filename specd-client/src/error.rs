//! Error types for the specd client

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the specd client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API answered with an error status
    #[error("API error (status {status}): {}", .messages.join("; "))]
    Api {
        /// HTTP status code
        status: u16,
        /// Messages from the `errors` array, or the raw body when it had none
        messages: Vec<String>,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    errors: Vec<String>,
}

impl ClientError {
    /// Build an API error from a status code and the raw response body
    pub fn from_body(status: u16, body: &str) -> Self {
        let messages = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => parsed.errors,
            _ if body.trim().is_empty() => vec!["Unknown error".to_string()],
            _ => vec![body.trim().to_string()],
        };
        Self::Api { status, messages }
    }

    /// Messages reported by the API, empty for transport errors
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Api { messages, .. } => messages,
            _ => &[],
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (400..500).contains(status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}
