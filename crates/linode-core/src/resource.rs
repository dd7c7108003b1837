//! Typed decoding and single-resource fetch.
//!
//! Every record fetched from the API implements [`Decodable`]: the body is first
//! decoded structurally into the record's wire form, then [`Decodable::from_wire`]
//! post-processes the fields whose wire representation needs more than serde
//! (timestamps, mostly).

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::{ApiRequest, Transport};

/// A record that can be produced from an API response body.
pub trait Decodable: Sized {
    /// Structural wire form decoded by serde.
    type Wire: DeserializeOwned;

    /// Convert the wire form into the public record.
    ///
    /// # Errors
    ///
    /// Returns an error when a post-processed field is invalid, e.g.
    /// [`Error::TimestampFormat`].
    fn from_wire(wire: Self::Wire) -> Result<Self>;
}

/// Implement [`Decodable`] for records whose wire form is the record itself.
#[macro_export]
macro_rules! plain_decodable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::resource::Decodable for $ty {
                type Wire = Self;

                fn from_wire(wire: Self) -> $crate::Result<Self> {
                    Ok(wire)
                }
            }
        )+
    };
}

/// Decode a response body into a record.
///
/// # Errors
///
/// Returns [`Error::Decode`] on a shape mismatch, or whatever
/// [`Decodable::from_wire`] reports.
pub fn decode<T: Decodable>(body: &[u8]) -> Result<T> {
    let wire = serde_json::from_slice::<T::Wire>(body).map_err(|err| {
        Error::Decode(format!(
            "expected {}: {err}",
            std::any::type_name::<T>()
        ))
    })?;
    T::from_wire(wire)
}

/// Fetch and decode a single resource.
///
/// `path` must already contain any identifier, e.g. `account/invoices/123`.
///
/// # Errors
///
/// Propagates transport and status errors unchanged and reports decode failures.
pub async fn fetch_one<T, C>(transport: &C, path: &str, cancel: &CancellationToken) -> Result<T>
where
    T: Decodable,
    C: Transport + ?Sized,
{
    let request = ApiRequest::new(path);
    let response = transport.get(&request, cancel).await?;
    debug!(path = %path, bytes = response.body.len(), "decoding resource");
    decode(&response.body)
}

/// Format an API path from a template and an identifier, trimming stray slashes.
#[must_use]
pub fn resource_path(base: &str, id: impl std::fmt::Display) -> String {
    format!("{}/{id}", base.trim_end_matches('/'))
}
