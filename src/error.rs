//! Error taxonomy shared by the compiler, the filter builder and the HTTP layer.

use crate::{identity, store};

/// Errors raised while turning a request into a store operation, or while running it.
///
/// Validation and compiler errors are detected before any store call is made.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two attribute names normalize to the same placeholder token.
    #[error("attributes `{first}` and `{second}` both map to placeholder `{placeholder}`")]
    AliasCollision {
        /// The attribute that claimed the placeholder first.
        first: String,
        /// The attribute that collided with it.
        second: String,
        /// The shared placeholder.
        placeholder: String,
    },
    /// Nothing is left to update once the key attribute is excluded.
    #[error("no attributes to update besides the key attribute `{key}`")]
    EmptyUpdate {
        /// The key attribute name.
        key: String,
    },
    /// Failure reported by the identity provider transport.
    #[error(transparent)]
    Identity(#[from] identity::Error),
    /// An attribute name that cannot be aliased.
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),
    /// An attribute maintained by the gateway itself was sent in an update.
    #[error("`{0}` is set when the record is created and cannot be updated")]
    ReadOnlyAttribute(String),
    /// Failure reported by the record store, including a missing record.
    #[error(transparent)]
    Store(#[from] store::Error),
    /// The request body or parameters have the wrong shape.
    #[error("{0}")]
    Validation(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
