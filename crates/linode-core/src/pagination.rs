//! Listing options and the paginated fetch engine.
//!
//! Listing endpoints wrap each page in an envelope carrying `data`, `page`, `pages` and
//! `results`. The engine walks pages sequentially, since whether to continue depends on
//! the counters of the page just received, and returns either every item in server
//! order or the first error encountered.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::query::QueryParams;
use crate::resource::Decodable;
use crate::transport::{ApiRequest, Transport, FILTER_HEADER};

/// Caller-supplied paging and filtering configuration.
///
/// Every field is optional: no page means "walk all pages starting at the first", no
/// page size means the provider default, no filter means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Fetch only this page (1-based).
    pub page: Option<u32>,
    /// Items per page, sent as given. The API rejects sizes outside 25..=500.
    pub page_size: Option<u32>,
    /// JSON filter expression sent in the `X-Filter` header.
    pub filter: Option<String>,
}

impl ListOptions {
    /// Create empty options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page: None,
            page_size: None,
            filter: None,
        }
    }

    /// Request a single explicit page.
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set a raw filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the filter from a JSON value.
    #[must_use]
    pub fn with_filter_json(mut self, filter: &serde_json::Value) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    /// The explicit page requested by the caller, ignoring zero.
    #[must_use]
    pub fn explicit_page(&self) -> Option<u32> {
        self.page.filter(|page| *page > 0)
    }

    /// Build the request for one page of `path`.
    #[must_use]
    pub fn request_for_page(&self, path: &str, page: u32) -> ApiRequest {
        let mut params = QueryParams::new();
        params.push("page", page);
        params.push_opt("page_size", self.page_size);

        let request = ApiRequest::new(path).with_query(params.into_pairs());
        match self.filter.as_deref().filter(|f| !f.is_empty()) {
            Some(filter) => request.with_header(FILTER_HEADER, filter),
            None => request,
        }
    }
}

/// Pagination counters observed on the last page of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListMeta {
    /// Last page fetched.
    pub page: u32,
    /// Total pages reported by the server.
    pub pages: u32,
    /// Total items reported by the server.
    pub results: u32,
}

/// Wire envelope of a listing page.
#[derive(Debug, Deserialize)]
struct PageEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    page: u32,
    #[serde(default)]
    pages: u32,
    #[serde(default)]
    results: u32,
}

/// Fetch every item of a listing, following the page counters.
///
/// # Errors
///
/// Returns the first error encountered; items from earlier pages are discarded.
pub async fn fetch_all<T, C>(
    transport: &C,
    path: &str,
    options: Option<&ListOptions>,
    cancel: &CancellationToken,
) -> Result<Vec<T>>
where
    T: Decodable,
    C: Transport + ?Sized,
{
    fetch_all_with_meta(transport, path, options, cancel)
        .await
        .map(|(items, _)| items)
}

/// Like [`fetch_all`], also returning the counters of the last page.
///
/// # Errors
///
/// Returns the first error encountered; items from earlier pages are discarded.
pub async fn fetch_all_with_meta<T, C>(
    transport: &C,
    path: &str,
    options: Option<&ListOptions>,
    cancel: &CancellationToken,
) -> Result<(Vec<T>, ListMeta)>
where
    T: Decodable,
    C: Transport + ?Sized,
{
    let default_options = ListOptions::default();
    let options = options.unwrap_or(&default_options);
    let single_page = options.explicit_page();
    let mut page = single_page.unwrap_or(1);
    let mut items = Vec::new();

    loop {
        if cancel.is_cancelled() {
            warn!(path = %path, page, "listing cancelled");
            return Err(Error::Cancelled);
        }

        let request = options.request_for_page(path, page);
        let response = transport.get(&request, cancel).await?;
        let (page_items, meta) = decode_page::<T>(&response.body).map_err(|err| match err {
            Error::Decode(message) => Error::Decode(format!("page {page} of `{path}`: {message}")),
            other => other,
        })?;

        if meta.page != 0 && meta.page != page {
            warn!(path = %path, requested = page, received = meta.page, "page counter mismatch");
        }

        debug!(
            path = %path,
            page,
            pages = meta.pages,
            count = page_items.len(),
            "received page"
        );

        items.extend(page_items);

        if single_page.is_some() || page >= meta.pages {
            return Ok((items, ListMeta { page, ..meta }));
        }
        page += 1;
    }
}

/// Decode one listing page body into its items and counters.
///
/// # Errors
///
/// Returns [`Error::Decode`] on a shape mismatch, or whatever
/// [`Decodable::from_wire`] reports for an item.
pub fn decode_page<T: Decodable>(body: &[u8]) -> Result<(Vec<T>, ListMeta)> {
    let envelope: PageEnvelope<T::Wire> =
        serde_json::from_slice(body).map_err(|err| Error::Decode(err.to_string()))?;

    let meta = ListMeta {
        page: envelope.page,
        pages: envelope.pages,
        results: envelope.results,
    };
    let items = envelope
        .data
        .into_iter()
        .map(T::from_wire)
        .collect::<Result<Vec<_>>>()?;

    Ok((items, meta))
}
