//! # linode-core
//!
//! Core types and utilities for working with the Linode v4 API.
//!
//! This crate provides the error taxonomy, client configuration, the HTTP transport
//! and the generic fetch machinery shared by every resource crate.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`config`] - Configuration structures for Linode clients
//! - [`client`] - HTTP client settings and the reqwest-backed [`client::ServiceClient`]
//! - [`transport`] - The transport seam consumed by the fetch engine
//! - [`resource`] - Typed single-resource fetch and the [`resource::Decodable`] capability
//! - [`pagination`] - Listing options and the paginated fetch engine
//! - [`timestamp`] - Normalization of the API's timestamp formats
//! - [`id`] - Strongly-typed integer identifiers for Linode resources
//! - [`query`] - Query parameter builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod timestamp;
pub mod transport;

// Re-export commonly used types
pub use error::{Error, Result};
pub use pagination::{ListMeta, ListOptions};
pub use resource::Decodable;
pub use tokio_util::sync::CancellationToken;
