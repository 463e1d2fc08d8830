//! Write operations.
//!
//! Whole-record writes go to the store unchanged; partial updates are compiled first.

/// Partial-update compiler.
pub mod update;
