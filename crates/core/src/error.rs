//! Error types for docsync
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::path::PathParseError;
use crate::types::{DocumentId, Revision};
use crate::value::{FieldPathError, LimitError};
use thiserror::Error;

/// Result type alias for docsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for docsync
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unpersisted reference pushed into a reference array
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Revision mismatch on a guarded full replace
    ///
    /// Another actor committed between the caller's read and this replace.
    /// Never resolved silently; the caller decides whether to reload and retry.
    #[error("revision mismatch: expected {expected}, found {actual}")]
    RevisionMismatch {
        /// Revision the caller read before computing the replacement
        expected: Revision,
        /// Revision actually stored
        actual: Revision,
    },

    /// Document not found (deleted concurrently or never created)
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Invalid operation or state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Field path failed to parse
    #[error("invalid field path: {0}")]
    InvalidPath(#[from] PathParseError),

    /// Path traversal failed while applying an operator
    #[error("path error: {0}")]
    PathError(#[from] FieldPathError),

    /// Document limit violation
    #[error("limit exceeded: {0}")]
    LimitExceeded(#[from] LimitError),
}

impl Error {
    /// Whether this error is a revision conflict the caller may retry
    /// after reloading
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::RevisionMismatch { .. })
    }
}
