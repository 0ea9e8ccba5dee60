//! Shared test utilities for the integration test suite.
//!
//! Import via `mod common;` from the suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

pub use docsync::{
    Collection, DocumentId, DocumentInstance, Error, FieldValue, MemoryStore, Revision, Schema,
    StoreAdapter, StoredDocument, UpdateOperator,
};

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once per process (RUST_LOG controls verbosity).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// The author/book fixture from the reproduction scenario:
/// authors carry a name and a reference array of book ids.
pub struct Library {
    pub store: Arc<MemoryStore>,
    pub authors: Collection<MemoryStore>,
    pub books: Collection<MemoryStore>,
}

impl Library {
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::new());
        let authors = Collection::new(
            "authors",
            Schema::new().scalar("name").reference_array("books"),
            store.clone(),
        );
        let books = Collection::new(
            "books",
            Schema::new().scalar("title").scalar("author"),
            store.clone(),
        );
        Library {
            store,
            authors,
            books,
        }
    }

    /// Create an author with an empty books array.
    pub fn author(&self, name: &str) -> DocumentInstance {
        self.authors
            .create(fields(serde_json::json!({ "name": name, "books": [] })))
            .expect("failed to create author")
    }

    /// Create a book and return its id.
    pub fn book(&self, title: &str) -> DocumentId {
        self.books
            .create(fields(serde_json::json!({ "title": title })))
            .expect("failed to create book")
            .id()
    }

    /// The stored books array of an author, as id strings.
    pub fn stored_books(&self, author: &DocumentId) -> Vec<String> {
        let doc = self.authors.load(author).expect("author not found");
        doc.fields()["books"]
            .as_array()
            .expect("books is not an array")
            .iter()
            .map(|v| v.as_str().expect("book ref is not a string").to_string())
            .collect()
    }
}

/// Shorthand for building a FieldValue from a json literal.
pub fn fields(value: serde_json::Value) -> FieldValue {
    FieldValue::from_value(value)
}
