//! Error type for the dashboard REST client.
//!
//! Every endpoint returns [`ApiError`] on failure. Callers that render
//! messages to users go through [`ApiError::display_message`], which
//! implements the server-message -> transport-message -> default
//! fallback chain; callers that care about "resource not materialized
//! yet" semantics check [`ApiError::is_not_found`].

/// Shown when neither the server nor the transport produced a usable
/// message.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors from the dashboard REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Best message extracted from the response body.
        message: String,
    },

    /// The response decoded but did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for responses that mean "resource not materialized yet":
    /// HTTP 404, or a server message containing "not found".
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Api { status: 404, .. } => true,
            ApiError::Api { message, .. } => {
                message.to_ascii_lowercase().contains("not found")
            }
            ApiError::Request(e) => {
                e.status().is_some_and(|s| s == reqwest::StatusCode::NOT_FOUND)
            }
            ApiError::Decode(_) => false,
        }
    }

    /// Human-readable message suitable for direct display.
    ///
    /// Prefers the server-provided message, then the transport error
    /// text, then `default`.
    pub fn display_message(&self, default: &str) -> String {
        match self {
            ApiError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Request(e) => e.to_string(),
            _ => default.to_string(),
        }
    }
}
