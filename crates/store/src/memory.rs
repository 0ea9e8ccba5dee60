//! In-memory store adapter
//!
//! ## Design
//!
//! Documents are stored as MessagePack-encoded records behind a single
//! `parking_lot::RwLock`. Every mutating operation holds the write lock for
//! its whole read-modify-write, which is what makes `atomic_update`
//! indivisible relative to any other concurrent update on the same
//! document: two independent pushes to the same array path both land,
//! in lock-acquisition order.
//!
//! ## Revisions
//!
//! Every committed write increments the document's revision.
//! `conditional_replace` compares revisions before writing and fails with
//! `RevisionMismatch` without touching the document on a mismatch.

use docsync_core::error::{Error, Result};
use docsync_core::operator::{apply_operators, UpdateOperator};
use docsync_core::traits::{StoreAdapter, StoredDocument};
use docsync_core::types::{DocumentId, Revision};
use docsync_core::value::FieldValue;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;
use tracing::{debug, trace};

/// Internal record for one stored document
///
/// Serialized with MessagePack; the revision is the optimistic-concurrency
/// token handed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocRecord {
    id: DocumentId,
    fields: FieldValue,
    revision: Revision,
    created_at: i64,
    updated_at: i64,
}

impl DocRecord {
    fn new(id: DocumentId, fields: FieldValue) -> Self {
        let now = now_millis();
        DocRecord {
            id,
            fields,
            revision: Revision::FIRST,
            created_at: now,
            updated_at: now,
        }
    }

    /// Increment revision and update timestamp after a modification
    fn touch(&mut self) {
        self.revision = self.revision.next();
        self.updated_at = now_millis();
    }

    fn to_stored(&self) -> StoredDocument {
        StoredDocument {
            fields: self.fields.clone(),
            revision: self.revision,
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn encode(record: &DocRecord) -> Result<Vec<u8>> {
    rmp_serde::to_vec(record).map_err(|e| Error::SerializationError(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<DocRecord> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationError(e.to_string()))
}

/// In-memory document store
///
/// Implements [`StoreAdapter`] with the two guarantees the persistence
/// coordinator relies on: indivisible atomic updates and revision-guarded
/// replaces. Safe to share across threads behind an `Arc`.
///
/// # Example
///
/// ```
/// use docsync_store::MemoryStore;
/// use docsync_core::{FieldValue, StoreAdapter, UpdateOperator};
///
/// let store = MemoryStore::new();
/// let fields: FieldValue = serde_json::json!({ "name": "Asimov", "books": [] }).into();
/// let (id, _) = store.create(fields).unwrap();
///
/// let op = UpdateOperator::push("books", vec![FieldValue::from("b1")]);
/// let doc = store.atomic_update(&id, &[op]).unwrap();
/// assert_eq!(doc.fields["books"].as_array().unwrap().len(), 1);
/// ```
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<DocumentId, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Remove every document
    pub fn clear(&self) {
        self.docs.write().clear();
        debug!("store cleared");
    }
}

impl StoreAdapter for MemoryStore {
    fn create(&self, mut fields: FieldValue) -> Result<(DocumentId, StoredDocument)> {
        if !fields.is_object() {
            return Err(Error::InvalidOperation(
                "document root must be an object".to_string(),
            ));
        }
        fields.validate()?;

        let id = DocumentId::new();
        // Stamp the assigned id into the root so loaded snapshots carry it
        fields
            .as_object_mut()
            .unwrap()
            .insert("_id".to_string(), serde_json::Value::String(id.to_string()));

        let record = DocRecord::new(id, fields);
        let bytes = encode(&record)?;

        let mut docs = self.docs.write();
        docs.insert(id, bytes);
        debug!(%id, "document created");
        Ok((id, record.to_stored()))
    }

    fn load(&self, id: &DocumentId) -> Result<StoredDocument> {
        let docs = self.docs.read();
        let bytes = docs.get(id).ok_or(Error::DocumentNotFound(*id))?;
        let record = decode(bytes)?;
        trace!(%id, revision = %record.revision, "document loaded");
        Ok(record.to_stored())
    }

    fn atomic_update(&self, id: &DocumentId, ops: &[UpdateOperator]) -> Result<StoredDocument> {
        // Write lock held across the whole read-modify-write: this is the
        // indivisibility guarantee for the operator batch.
        let mut docs = self.docs.write();
        let bytes = docs.get(id).ok_or(Error::DocumentNotFound(*id))?;
        let mut record = decode(bytes)?;

        // Apply against a scratch copy; commit only if every operator succeeds
        let mut fields = record.fields.clone();
        apply_operators(&mut fields, ops)?;
        fields.validate()?;

        record.fields = fields;
        record.touch();
        let encoded = encode(&record)?;
        docs.insert(*id, encoded);
        debug!(%id, revision = %record.revision, ops = ops.len(), "atomic update applied");
        Ok(record.to_stored())
    }

    fn conditional_replace(
        &self,
        id: &DocumentId,
        mut fields: FieldValue,
        expected: Revision,
    ) -> Result<StoredDocument> {
        if !fields.is_object() {
            return Err(Error::InvalidOperation(
                "document root must be an object".to_string(),
            ));
        }
        fields.validate()?;

        let mut docs = self.docs.write();
        let bytes = docs.get(id).ok_or(Error::DocumentNotFound(*id))?;
        let mut record = decode(bytes)?;

        if record.revision != expected {
            debug!(%id, %expected, actual = %record.revision, "conditional replace rejected");
            return Err(Error::RevisionMismatch {
                expected,
                actual: record.revision,
            });
        }

        // The id is immutable; a replace cannot rewrite it
        fields
            .as_object_mut()
            .unwrap()
            .insert("_id".to_string(), serde_json::Value::String(id.to_string()));

        record.fields = fields;
        record.touch();
        let encoded = encode(&record)?;
        docs.insert(*id, encoded);
        debug!(%id, revision = %record.revision, "conditional replace applied");
        Ok(record.to_stored())
    }

    fn delete(&self, id: &DocumentId) -> Result<bool> {
        let removed = self.docs.write().remove(id).is_some();
        if removed {
            debug!(%id, "document deleted");
        }
        Ok(removed)
    }
}
