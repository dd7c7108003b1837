//! The transport seam between resource mapping and HTTP.
//!
//! The fetch engine only needs to issue GET requests and receive successful bodies.
//! Implementations map non-success statuses to typed errors before returning, so
//! everything handed back as a [`RawResponse`] is ready to decode.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Header carrying the JSON filter expression of a listing request.
pub const FILTER_HEADER: &str = "X-Filter";

/// A GET request relative to the API base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    /// Path relative to the versioned base URL, e.g. `account/invoices`.
    pub path: String,
    /// Query parameter pairs.
    pub query: Vec<(&'static str, String)>,
    /// Extra request headers.
    pub headers: Vec<(&'static str, String)>,
}

impl ApiRequest {
    /// Create a request for the given path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Replace the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Look up a query parameter by name.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Look up a header by name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a `200 OK` response from a body.
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// HTTP collaborator consumed by the fetch engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a GET request.
    ///
    /// The request is abandoned when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns transport-kind errors for connectivity, timeout and cancellation failures,
    /// and HTTP-status derived errors for non-success responses.
    async fn get(&self, request: &ApiRequest, cancel: &CancellationToken) -> Result<RawResponse>;
}
