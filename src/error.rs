//! Error taxonomy for the access layer.
//!
//! Validation failures (`InvalidPath`, `InvalidOperation`) are raised
//! synchronously before any I/O. Store failures propagate unchanged via
//! [`Error::Store`]. Soft conditions (querying a relation with `equal_to`,
//! flattening an object with no cached value) are logged with
//! `tracing::warn!` and never surface here.

use thiserror::Error;

use crate::store::traits::StoreError;

/// Errors surfaced by [`Query`](crate::Query), [`Object`](crate::Object)
/// and [`Relation`](crate::Relation) operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or malformed path input.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The operation requires a specific path depth (or a live reference)
    /// and the bound path does not satisfy it.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A terminal read expected at least one result and got none.
    #[error("query at '{path}' returned no results")]
    EmptyResult { path: String },

    /// Failure surfaced by the underlying store transport.
    #[error(transparent)]
    Store(#[from] StoreError),
}
