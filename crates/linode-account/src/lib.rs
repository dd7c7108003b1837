//! Linode account billing client.
//!
//! Provides typed models and an asynchronous client for the invoice and payment
//! endpoints under `account/`.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{AccountClient, AccountClientBuilder};
pub use models::{Invoice, InvoiceItem, InvoiceTaxSummary, Payment};

/// Convenient result alias that reuses the shared Linode error type.
pub type Result<T> = linode_core::Result<T>;
