//! Read operations.
//!
//! Single records are read by key straight from the store; bulk reads take an optional
//! equality filter built from one query parameter.

/// Equality filter for bulk reads.
pub mod filter;
