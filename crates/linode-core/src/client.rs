//! HTTP client configuration and the reqwest-backed transport.
//!
//! [`ServiceClient`] is the HTTP collaborator used by resource clients: it joins paths
//! onto the versioned base URL, authenticates with a bearer token, honours the caller's
//! cancellation token and maps non-success statuses to typed errors. It makes exactly
//! one attempt per request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{LinodeClientConfig, DEFAULT_API_URL};
use crate::error::{ApiErrorBody, Error, Result};
use crate::transport::{ApiRequest, RawResponse, Transport};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

const DEFAULT_USER_AGENT: &str = concat!("linode-core/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
///
/// Configures HTTP client behavior including timeouts and connection pooling.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable request/response logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    base_url: Url,
    http_config: ClientConfig,
    user_agent: String,
    token: Option<SecretString>,
}

impl ServiceClientBuilder {
    /// Create a builder for a versioned base URL, e.g. `https://api.linode.com/v4`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref();
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid base URL `{raw}`: {err}")))?;

        Ok(Self {
            base_url,
            http_config: ClientConfig::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
        })
    }

    /// Create a builder from a [`LinodeClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub fn from_config(config: &LinodeClientConfig) -> Result<Self> {
        let mut builder = Self::new(config.versioned_base_url()?)?;
        builder.http_config.timeout = config.timeout();
        builder.token.clone_from(&config.token);
        if let Some(user_agent) = &config.user_agent {
            builder.user_agent.clone_from(user_agent);
        }
        Ok(builder)
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<ServiceClient> {
        let http = ClientBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(self.http_config.timeout)
            .connect_timeout(self.http_config.connect_timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .gzip(self.http_config.enable_compression)
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        if !self.base_url.as_str().starts_with(DEFAULT_API_URL) {
            info!(base_url = %self.base_url, "using non-default Linode API endpoint");
        }
        if self.token.is_none() {
            debug!("building Linode client without a token");
        }

        Ok(ServiceClient {
            http,
            base_url: self.base_url,
            token: self.token,
            log_requests: self.http_config.enable_logging,
        })
    }
}

/// Reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    token: Option<SecretString>,
    log_requests: bool,
}

impl ServiceClient {
    /// Construct a client directly from a versioned base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ServiceClientBuilder::new(base_url)?.build()
    }

    /// Return the versioned base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }

    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse> {
        let url = self.build_url(&request.path)?;
        let mut builder = self
            .http
            .get(url)
            .query(&request.query)
            .header(ACCEPT, "application/json");

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        if self.log_requests {
            debug!(path = %request.path, query = ?request.query, "sending request");
        }

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(RawResponse {
                status: status.as_u16(),
                body: body.to_vec(),
            });
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!(path = %request.path, %status, "request failed");
        Err(map_status_to_error(status, &text))
    }
}

#[async_trait]
impl Transport for ServiceClient {
    async fn get(&self, request: &ApiRequest, cancel: &CancellationToken) -> Result<RawResponse> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!(path = %request.path, "request cancelled");
                Err(Error::Cancelled)
            }
            result = self.execute(request) => result,
        }
    }
}

/// Map a non-success status and body to a typed error.
#[must_use]
pub fn map_status_to_error(status: StatusCode, body: &str) -> Error {
    let message = ApiErrorBody::message_or(body);
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::BAD_REQUEST => Error::BadRequest(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        status if status.is_server_error() => {
            Error::ServiceUnavailable(format!("Linode API error {status}: {message}"))
        }
        status => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ServiceClient {
        ServiceClientBuilder::new(format!("{}/v4", server.uri()))
            .unwrap()
            .with_token("test-token")
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT));
        assert_eq!(config.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));
        assert!(config.enable_logging);
        assert!(config.enable_compression);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(60))
            .with_connect_timeout(Duration::from_secs(5))
            .with_pool_idle_timeout(Duration::from_secs(120))
            .with_pool_max_idle(20)
            .with_logging(false)
            .with_compression(false);

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert!(!config.enable_logging);
        assert!(!config.enable_compression);
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ServiceClient::new("https://api.linode.com/v4").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.linode.com/v4/");
        assert_eq!(
            client.build_url("/account/invoices").unwrap().as_str(),
            "https://api.linode.com/v4/account/invoices"
        );
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let err = ServiceClientBuilder::new("::not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_builder_from_config() {
        let config = LinodeClientConfig::new("http://localhost:9000")
            .unwrap()
            .with_api_version("v4beta")
            .with_token("abc");
        let client = ServiceClientBuilder::from_config(&config)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/v4beta/");
    }

    #[test]
    fn test_map_status_to_error() {
        let body = r#"{"errors":[{"reason":"Not found"}]}"#;
        assert_eq!(
            map_status_to_error(StatusCode::NOT_FOUND, body),
            Error::NotFound("Not found".into())
        );
        assert!(matches!(
            map_status_to_error(StatusCode::FORBIDDEN, body),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            map_status_to_error(StatusCode::TOO_MANY_REQUESTS, ""),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            map_status_to_error(StatusCode::BAD_GATEWAY, ""),
            Error::ServiceUnavailable(_)
        ));
        assert_eq!(
            map_status_to_error(StatusCode::CONFLICT, "busy"),
            Error::Api {
                status: 409,
                message: "busy".into()
            }
        );
    }

    #[tokio::test]
    async fn get_sends_auth_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/account/invoices"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Accept", "application/json"))
            .and(header("X-Filter", r#"{"label":"Invoice"}"#))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = ApiRequest::new("account/invoices")
            .with_query(vec![("page", "2".to_string())])
            .with_header("X-Filter", r#"{"label":"Invoice"}"#);

        let response = client
            .get(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"data":[]}"#.to_vec());
    }

    #[tokio::test]
    async fn get_maps_linode_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/account/invoices/1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errors": [{ "reason": "Not found" }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get(&ApiRequest::new("account/invoices/1"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, Error::NotFound("Not found".into()));
    }

    #[tokio::test]
    async fn get_maps_server_errors_without_retrying() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/account/payments"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get(&ApiRequest::new("account/payments"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn get_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = ServiceClientBuilder::new(server.uri())
            .unwrap()
            .with_http_config(ClientConfig::new().with_timeout(Duration::from_millis(100)))
            .build()
            .unwrap();

        let err = client
            .get(&ApiRequest::new("slow"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn get_abandons_request_on_cancel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client
            .get(&ApiRequest::new("slow"), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, Error::Cancelled);
    }
}
