//! Record store abstraction.
//!
//! [RecordStore] is the CRUD surface compiled operations run against. Each call is a single,
//! independent store request: there is no transaction spanning calls, and concurrent writes to
//! the same key are settled by the store (last write wins).

/// DynamoDB-backed store.
pub mod dynamodb;

/// In-memory reference store.
pub mod memory;

use crate::{
    common::{attribute::Record, key::RecordKey},
    read::filter::Filter,
    write::update::UpdateOp,
};

use async_trait::async_trait;

/// Record store errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying store request failed.
    #[error("store request failed: {source}")]
    Backend {
        /// The store client error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// An item came back without a usable key attribute.
    #[error("malformed item: {0}")]
    MalformedItem(String),
    /// No record exists under the key.
    #[error("could not find a record with {} \"{}\"", .0.name, .0.value)]
    NotFound(RecordKey),
    /// Converting between attribute values and store values failed.
    #[error("failed to convert attributes: {0}")]
    Serialization(#[from] serde_dynamo::Error),
}

impl Error {
    /// Wrap a store client error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend {
            source: Box::new(err),
        }
    }
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// CRUD operations on records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Retrieve a record; [Error::NotFound] when absent.
    async fn get(&self, key: &RecordKey) -> Result<Record>;
    /// Write a whole record, replacing any record under the same key.
    async fn create(&self, record: Record) -> Result<()>;
    /// Apply a compiled partial update; attributes not named in it are left untouched.
    ///
    /// Fails with [Error::NotFound] rather than creating a partial record when the key is absent.
    async fn update(&self, update_op: UpdateOp) -> Result<()>;
    /// Remove a record. Removing an absent record succeeds.
    async fn delete(&self, key: &RecordKey) -> Result<()>;
    /// Every record passing `filter` (all records when `None`), fully materialized.
    ///
    /// Results are not paginated for the caller.
    async fn scan(&self, filter: Option<&Filter>) -> Result<Vec<Record>>;
}
