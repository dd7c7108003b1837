//! Asynchronous account billing client.

use crate::models::{Invoice, InvoiceItem, Payment};
use crate::Result;
use linode_core::client::{ClientConfig, ServiceClientBuilder};
use linode_core::config::LinodeClientConfig;
use linode_core::id::{InvoiceId, PaymentId};
use linode_core::pagination::{fetch_all, fetch_all_with_meta};
use linode_core::resource::{fetch_one, resource_path};
use linode_core::transport::Transport;
use linode_core::{ListMeta, ListOptions};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const USER_AGENT: &str = concat!("linode-account/", env!("CARGO_PKG_VERSION"));

const INVOICES_PATH: &str = "account/invoices";
const PAYMENTS_PATH: &str = "account/payments";

/// Builder for [`AccountClient`].
#[derive(Debug, Clone)]
pub struct AccountClientBuilder {
    inner: ServiceClientBuilder,
    cancel: CancellationToken,
}

impl AccountClientBuilder {
    /// Create a builder for a versioned base URL, e.g. `https://api.linode.com/v4`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let inner = ServiceClientBuilder::new(base_url)?.with_user_agent(USER_AGENT);
        Ok(Self {
            inner,
            cancel: CancellationToken::new(),
        })
    }

    /// Create a builder from a [`LinodeClientConfig`].
    pub fn from_config(config: &LinodeClientConfig) -> Result<Self> {
        let mut inner = ServiceClientBuilder::from_config(config)?;
        if config.user_agent.is_none() {
            inner = inner.with_user_agent(USER_AGENT);
        }
        Ok(Self {
            inner,
            cancel: CancellationToken::new(),
        })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Configure the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.with_token(token);
        self
    }

    /// Abandon in-flight requests when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AccountClient> {
        let inner = self.inner.build()?;
        Ok(AccountClient {
            transport: Arc::new(inner),
            cancel: self.cancel,
        })
    }
}

/// Asynchronous client for the account billing endpoints.
#[derive(Clone)]
pub struct AccountClient {
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
}

impl AccountClient {
    /// Construct a client directly from a versioned base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        AccountClientBuilder::new(base_url)?.build()
    }

    /// Construct a client from `LINODE_TOKEN`, `LINODE_URL` and `LINODE_API_VERSION`.
    pub fn from_env() -> Result<Self> {
        let config = LinodeClientConfig::from_env()?;
        AccountClientBuilder::from_config(&config)?.build()
    }

    /// Construct a client over any [`Transport`].
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cancel: CancellationToken::new(),
        }
    }

    /// Return a clone whose requests are abandoned when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            cancel,
        }
    }

    /// List the invoices of the account.
    pub async fn list_invoices(&self, opts: Option<&ListOptions>) -> Result<Vec<Invoice>> {
        debug!(options = ?opts, "listing invoices");
        fetch_all(self.transport.as_ref(), INVOICES_PATH, opts, &self.cancel).await
    }

    /// List invoices along with the pagination counters of the last page.
    pub async fn list_invoices_with_meta(
        &self,
        opts: Option<&ListOptions>,
    ) -> Result<(Vec<Invoice>, ListMeta)> {
        debug!(options = ?opts, "listing invoices with counters");
        fetch_all_with_meta(self.transport.as_ref(), INVOICES_PATH, opts, &self.cancel).await
    }

    /// Fetch a single invoice.
    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice> {
        debug!(invoice_id = %id, "fetching invoice");
        let path = resource_path(INVOICES_PATH, id);
        fetch_one(self.transport.as_ref(), &path, &self.cancel).await
    }

    /// List the items billed on an invoice.
    pub async fn list_invoice_items(
        &self,
        id: InvoiceId,
        opts: Option<&ListOptions>,
    ) -> Result<Vec<InvoiceItem>> {
        debug!(invoice_id = %id, options = ?opts, "listing invoice items");
        let path = format!("{}/items", resource_path(INVOICES_PATH, id));
        fetch_all(self.transport.as_ref(), &path, opts, &self.cancel).await
    }

    /// List the payments made on the account.
    pub async fn list_payments(&self, opts: Option<&ListOptions>) -> Result<Vec<Payment>> {
        debug!(options = ?opts, "listing payments");
        fetch_all(self.transport.as_ref(), PAYMENTS_PATH, opts, &self.cancel).await
    }

    /// List payments along with the pagination counters of the last page.
    pub async fn list_payments_with_meta(
        &self,
        opts: Option<&ListOptions>,
    ) -> Result<(Vec<Payment>, ListMeta)> {
        debug!(options = ?opts, "listing payments with counters");
        fetch_all_with_meta(self.transport.as_ref(), PAYMENTS_PATH, opts, &self.cancel).await
    }

    /// Fetch a single payment.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        debug!(payment_id = %id, "fetching payment");
        let path = resource_path(PAYMENTS_PATH, id);
        fetch_one(self.transport.as_ref(), &path, &self.cancel).await
    }
}
