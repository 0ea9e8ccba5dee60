//! docsync - document mutation tracking and synchronization engine
//!
//! docsync lets callers mutate an in-memory representation of a stored
//! document and persist those mutations without losing concurrent updates:
//! tracked incremental edits become atomic operators (push/pull/set) that
//! compose at the store, and unclassifiable edits fall back to a
//! revision-guarded full replace scoped to the touched fields.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use docsync::{Collection, MemoryStore, Schema};
//!
//! let store = Arc::new(MemoryStore::new());
//! let authors = Collection::new(
//!     "authors",
//!     Schema::new().scalar("name").reference_array("books"),
//!     store.clone(),
//! );
//! let books = Collection::new("books", Schema::new().scalar("title"), store);
//!
//! let mut isaac = authors
//!     .create(serde_json::json!({ "name": "Asimov", "books": [] }).into())
//!     .unwrap();
//! let foundation = books
//!     .create(serde_json::json!({ "title": "Foundation" }).into())
//!     .unwrap();
//!
//! // Track an append, persist it as an atomic push
//! isaac.push("books", foundation.fields().clone()).unwrap();
//! authors.persist(&mut isaac).unwrap();
//!
//! let reloaded = authors.load(&isaac.id()).unwrap();
//! assert_eq!(reloaded.fields()["books"].as_array().unwrap().len(), 1);
//! ```

// Re-export the public API from the member crates
pub use docsync_client::{
    normalize_reference, synthesize, Collection, DocumentInstance, MutationLog, MutationRecord,
    SynthesisPlan,
};
pub use docsync_core::{
    apply_operator, apply_operators, get_at_path, get_at_path_mut, set_at_path, DocumentId, Error,
    FieldKind, FieldPath, FieldPathError, FieldValue, LimitError, PathParseError, PathSegment,
    Result, Revision, Schema, StoreAdapter, StoredDocument, UpdateOperator, MAX_ARRAY_LEN,
    MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH,
};
pub use docsync_store::MemoryStore;
