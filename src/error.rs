//! Error types for Red Canary API operations.

use thiserror::Error;

/// Errors that can occur during Red Canary API operations.
#[derive(Debug, Error)]
pub enum CanaryError {
    /// Configuration is missing or incomplete.
    #[error("Red Canary configuration required: {0}")]
    ConfigMissing(String),

    /// API request failed with a non-2xx status.
    #[error("Red Canary API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// A field was absent from a resource even after hydration.
    #[error("{kind} has no field '{field}'")]
    MissingField { kind: &'static str, field: String },

    /// A snippet carried no self URL, so it cannot be hydrated.
    #[error("{kind} snippet has no self URL to hydrate from")]
    MissingSelfUrl { kind: &'static str },

    /// The response body did not have the expected `data` envelope.
    #[error("Malformed {kind} response: {reason}")]
    MalformedResponse { kind: &'static str, reason: String },
}

/// Result type alias for Red Canary operations.
pub type Result<T> = core::result::Result<T, CanaryError>;
