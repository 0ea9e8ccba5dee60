//! Core types and traits for docsync
//!
//! This crate defines the foundational types used throughout the system:
//! - DocumentId / Revision: identifiers and optimistic-concurrency tokens
//! - FieldPath: paths into documents, ordered for deterministic synthesis
//! - FieldValue: document values with limit validation
//! - Schema: per-field kind declarations (scalar vs reference array)
//! - UpdateOperator: atomic update instructions and their application
//! - Error: error type hierarchy
//! - StoreAdapter: the seam to the document store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod operator;
pub mod path;
pub mod schema;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use operator::{apply_operator, apply_operators, UpdateOperator};
pub use path::{FieldPath, PathParseError, PathSegment};
pub use schema::{FieldKind, Schema};
pub use traits::{StoreAdapter, StoredDocument};
pub use types::{DocumentId, Revision};
pub use value::{
    get_at_path, get_at_path_mut, set_at_path, FieldPathError, FieldValue, LimitError,
    MAX_ARRAY_LEN, MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH,
};
