//! Per-field schema declarations
//!
//! The schema tells the client which fields are reference arrays so that
//! values pushed into them are normalized to stored identifiers before the
//! mutation log ever sees them. Fields not declared default to Scalar.

use crate::path::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Plain value: string, number, bool, object, non-reference array
    Scalar,
    /// Ordered sequence of identifiers pointing to other documents
    ReferenceArray,
}

/// Field kind declarations for one document collection
///
/// # Examples
///
/// ```
/// use docsync_core::schema::{Schema, FieldKind};
///
/// let schema = Schema::new()
///     .scalar("name")
///     .reference_array("books");
///
/// assert!(schema.is_reference_array(&"books".parse().unwrap()));
/// assert_eq!(schema.kind(&"name".parse().unwrap()), FieldKind::Scalar);
/// // Undeclared fields default to Scalar
/// assert_eq!(schema.kind(&"bio".parse().unwrap()), FieldKind::Scalar);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: BTreeMap<FieldPath, FieldKind>,
}

impl Schema {
    /// Create an empty schema (all fields Scalar)
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a scalar field (builder pattern)
    ///
    /// # Panics
    ///
    /// Panics if the path string is invalid.
    pub fn scalar(mut self, path: &str) -> Self {
        let path = path.parse().expect("invalid path in Schema::scalar");
        self.fields.insert(path, FieldKind::Scalar);
        self
    }

    /// Declare a reference-array field (builder pattern)
    ///
    /// # Panics
    ///
    /// Panics if the path string is invalid.
    pub fn reference_array(mut self, path: &str) -> Self {
        let path = path
            .parse()
            .expect("invalid path in Schema::reference_array");
        self.fields.insert(path, FieldKind::ReferenceArray);
        self
    }

    /// Kind of the field at `path` (Scalar when undeclared)
    pub fn kind(&self, path: &FieldPath) -> FieldKind {
        self.fields
            .get(path)
            .copied()
            .unwrap_or(FieldKind::Scalar)
    }

    /// Whether the field at `path` is a reference array
    pub fn is_reference_array(&self, path: &FieldPath) -> bool {
        self.kind(path) == FieldKind::ReferenceArray
    }

    /// Iterate over declared reference-array paths
    pub fn reference_arrays(&self) -> impl Iterator<Item = &FieldPath> {
        self.fields
            .iter()
            .filter(|(_, kind)| **kind == FieldKind::ReferenceArray)
            .map(|(path, _)| path)
    }
}
