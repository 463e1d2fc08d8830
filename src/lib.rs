#![deny(missing_docs)]
#![deny(warnings)]

//! # Record Gateway
//!
//! An HTTP gateway that turns schemaless JSON request bodies into partial-update operations
//! on a key-value document store, plus a thin pass-through to an external identity provider.
//!
//! ## Overview
//!
//! Any JSON object can be written to a record. Partial updates are compiled into an aliased
//! update clause, so attribute names never appear literally and store-reserved words such as
//! `status` or `date` are safe to update:
//!
//! ```rust
//! use record_gateway::{common::{attribute::AttributeMap, key::RecordKey}, write::update};
//! use serde_json::json;
//!
//! let body = AttributeMap::try_from(json!({"userId": "u1", "status": "active"})).unwrap();
//! let update_op = update::compile(&RecordKey::new("userId", "u1"), body).unwrap();
//! assert_eq!(update_op.clause, "SET #status = :status");
//! assert_eq!(update_op.name_aliases["#status"], "status");
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Attribute values, records, keys and placeholders
//! - [`mod@write`] - Partial-update compilation
//! - [`mod@read`] - Equality filters for bulk reads
//! - [`mod@store`] - The record store interface and its DynamoDB and in-memory backends
//! - [`mod@identity`] - Identity provider pass-through
//! - [`mod@http`] - The axum router
//! - [`mod@config`] - Process configuration

/// Common types shared by reads and writes.
pub mod common;

/// Process configuration.
pub mod config;

mod error;

/// HTTP routes and error responses.
pub mod http;

pub mod identity;

/// Read operations: filters applied to bulk reads.
pub mod read;

pub mod store;

/// Write operations: partial-update compilation.
pub mod write;

pub use error::{Error, Result};
