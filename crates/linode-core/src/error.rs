//! Error types for Linode API operations.
//!
//! This module provides the error taxonomy shared by every resource crate, including
//! HTTP status code mapping and the error body format returned by the Linode API.

use serde::Deserialize;
use thiserror::Error;

/// Main error type for Linode API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The request could not be delivered or the response could not be read
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The caller cancelled the request before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with details
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The API rejected the request because of rate limiting
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Linode API is unavailable or failed server-side
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other non-success HTTP status
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Flattened error reasons
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A timestamp field did not match any accepted layout
    #[error("Unrecognized timestamp format: {0}")]
    TimestampFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Linode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the Linode API on non-success responses.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    /// Individual error reasons.
    #[serde(default)]
    pub errors: Vec<ApiErrorReason>,
}

/// A single reason from an [`ApiErrorBody`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorReason {
    /// Human-readable reason.
    pub reason: String,
    /// Offending request field, when the error concerns one.
    #[serde(default)]
    pub field: Option<String>,
}

impl ApiErrorBody {
    /// Render the reasons as a single message, falling back to the raw body text.
    #[must_use]
    pub fn message_or(body: &str) -> String {
        match serde_json::from_str::<Self>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => parsed
                .errors
                .iter()
                .map(|err| match &err.field {
                    Some(field) => format!("[{field}] {}", err.reason),
                    None => err.reason.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            _ => body.trim().to_string(),
        }
    }
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Api { .. } => "API_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::TimestampFormat(_) => "TIMESTAMP_FORMAT_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true for failures that originate below the resource layer
    /// (connectivity, timeouts and cancellation).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Cancelled)
    }

    /// Returns the HTTP status this error was derived from, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::RateLimited(_) => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
