//! Configuration structures for Linode clients.
//!
//! This module provides the top-level client configuration, including the API endpoint,
//! the API version, the personal access token and request timeouts.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.linode.com";

/// Default API version path segment.
pub const DEFAULT_API_VERSION: &str = "v4";

/// Environment variable holding the personal access token.
pub const TOKEN_ENV: &str = "LINODE_TOKEN";

/// Environment variable overriding the API endpoint.
pub const URL_ENV: &str = "LINODE_URL";

/// Environment variable overriding the API version.
pub const API_VERSION_ENV: &str = "LINODE_API_VERSION";

/// Configuration for a Linode client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LinodeClientConfig {
    /// API base URL, without the version segment
    #[validate(url)]
    pub api_url: String,

    /// API version path segment (e.g. `v4` or `v4beta`)
    #[validate(length(min = 1))]
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Personal access token; never serialized
    #[serde(skip)]
    pub token: Option<SecretString>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl LinodeClientConfig {
    /// Create a new client configuration for the given API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Build a configuration from `LINODE_TOKEN`, `LINODE_URL` and `LINODE_API_VERSION`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::new(var(URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string()))?;
        if let Some(version) = var(API_VERSION_ENV) {
            config.api_version = version;
        }
        if let Some(token) = var(TOKEN_ENV) {
            config = config.with_token(token);
        }

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the personal access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the API version path segment.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Expose the token for building the `Authorization` header.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.expose_secret())
    }

    /// The base URL including the version segment, with a trailing slash so relative
    /// resource paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn versioned_base_url(&self) -> Result<Url, Error> {
        let base = format!(
            "{}/{}/",
            self.api_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        );
        Url::parse(&base).map_err(|e| Error::ConfigError(format!("Invalid API URL: {e}")))
    }
}

impl Default for LinodeClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: default_api_version(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
        }
    }
}
