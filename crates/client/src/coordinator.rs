//! Persistence coordination
//!
//! ## Design
//!
//! [`Collection`] is a stateless facade: it holds only an `Arc` to the
//! store adapter and an `Arc<Schema>`. Multiple collections over the same
//! store are safe; all cross-caller consistency lives in the store's
//! atomic-update and revision-token primitives.
//!
//! ## Persist algorithm
//!
//! 1. Empty mutation log: no-op.
//! 2. Synthesize operators. No untracked paths: one atomic update carries
//!    every operator; the store applies them indivisibly, so independent
//!    appends from other actors compose instead of being overwritten.
//! 3. Untracked paths present: flush the operators first (if any), then
//!    re-read the document, overlay the local values for exactly the
//!    untracked paths on the fresh fields, and issue a conditional replace
//!    guarded by the revision of that fresh read. A mismatch surfaces as
//!    `RevisionMismatch`; it is never resolved by re-applying stale data.
//! 4. On success the instance adopts the store's response and the log is
//!    cleared.
//!
//! A failed persist leaves the remaining log intact for retry. Operators
//! the store has already acknowledged are removed from the log even when a
//! later step fails: retrying them would append the same elements twice.

use crate::document::DocumentInstance;
use crate::reference::normalize_reference;
use crate::synthesize::synthesize;
use docsync_core::error::{Error, Result};
use docsync_core::operator::UpdateOperator;
use docsync_core::path::FieldPath;
use docsync_core::schema::Schema;
use docsync_core::traits::{StoreAdapter, StoredDocument};
use docsync_core::types::DocumentId;
use docsync_core::value::{get_at_path, set_at_path, FieldValue};
use std::sync::Arc;
use tracing::{debug, trace};

/// Facade over one document collection
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use docsync_client::Collection;
/// use docsync_core::{FieldValue, Schema};
/// use docsync_store::MemoryStore;
///
/// let store = Arc::new(MemoryStore::new());
/// let authors = Collection::new(
///     "authors",
///     Schema::new().scalar("name").reference_array("books"),
///     store,
/// );
///
/// let mut isaac = authors
///     .create(serde_json::json!({ "name": "Asimov", "books": [] }).into())
///     .unwrap();
/// let book = docsync_core::DocumentId::new();
/// isaac.push("books", book).unwrap();
/// authors.persist(&mut isaac).unwrap();
/// assert!(!isaac.is_dirty());
/// ```
pub struct Collection<S: StoreAdapter> {
    name: String,
    schema: Arc<Schema>,
    store: Arc<S>,
}

impl<S: StoreAdapter> Clone for Collection<S> {
    fn clone(&self) -> Self {
        Collection {
            name: self.name.clone(),
            schema: self.schema.clone(),
            store: self.store.clone(),
        }
    }
}

impl<S: StoreAdapter> Collection<S> {
    /// Create a collection facade over a store
    pub fn new(name: impl Into<String>, schema: Schema, store: Arc<S>) -> Self {
        Collection {
            name: name.into(),
            schema: Arc::new(schema),
            store,
        }
    }

    /// Collection name (used for logging only)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection's schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create a document, normalizing any reference-array fields
    ///
    /// Elements of declared reference arrays may arrive as bare ids or full
    /// snapshots; both are reduced to identifiers before the store sees them.
    pub fn create(&self, mut fields: FieldValue) -> Result<DocumentInstance> {
        self.normalize_reference_fields(&mut fields)?;
        let (id, stored) = self.store.create(fields)?;
        debug!(collection = %self.name, %id, "created");
        Ok(DocumentInstance::new(
            id,
            stored.fields,
            stored.revision,
            self.schema.clone(),
        ))
    }

    /// Load a document into a fresh instance
    pub fn load(&self, id: &DocumentId) -> Result<DocumentInstance> {
        let stored = self.store.load(id)?;
        trace!(collection = %self.name, %id, revision = %stored.revision, "loaded");
        Ok(DocumentInstance::new(
            *id,
            stored.fields,
            stored.revision,
            self.schema.clone(),
        ))
    }

    /// Persist an instance's tracked mutations
    ///
    /// On success the instance reflects the store's merged state (which may
    /// include concurrent remote updates) and its log is empty. On failure
    /// the unacknowledged part of the log is intact; the caller decides
    /// whether to reload and retry.
    pub fn persist(&self, instance: &mut DocumentInstance) -> Result<()> {
        if instance.mutation_log().is_empty() {
            trace!(collection = %self.name, id = %instance.id(), "persist no-op");
            return Ok(());
        }

        let id = instance.id();
        let plan = synthesize(instance.mutation_log());
        debug!(
            collection = %self.name,
            %id,
            operators = plan.operators.len(),
            full_replace = plan.full_replace.len(),
            "persisting"
        );

        if plan.full_replace.is_empty() {
            // Pure operator path: one indivisible update, no read required.
            let stored = self.store.atomic_update(&id, &plan.operators)?;
            instance.refresh(stored);
            return Ok(());
        }

        if !plan.operators.is_empty() {
            self.store.atomic_update(&id, &plan.operators)?;
            // Acknowledged: a retry after a later failure must not re-push.
            for op in &plan.operators {
                instance.log_mut().remove(op.path());
            }
        }

        let stored = self.replace_untracked(instance, &plan.full_replace)?;
        instance.refresh(stored);
        Ok(())
    }

    /// Fresh-read, revision-guarded replace scoped to the untracked paths
    fn replace_untracked(
        &self,
        instance: &DocumentInstance,
        paths: &std::collections::BTreeSet<FieldPath>,
    ) -> Result<StoredDocument> {
        let fresh = self.store.load(&instance.id())?;
        let mut fields = fresh.fields;

        for path in paths {
            // A path absent from the local view has nothing to overlay;
            // the fresh value stands.
            if let Some(local) = instance.field_at(path) {
                let local = local.clone();
                set_at_path(&mut fields, path, local)?;
            }
        }

        self.store
            .conditional_replace(&instance.id(), fields, fresh.revision)
    }

    /// Atomic push directly against the store, without a loaded instance
    ///
    /// The value is normalized for reference-array paths. Composes with any
    /// concurrent atomic update on the same document.
    pub fn push_atomic(
        &self,
        id: &DocumentId,
        path: impl AsRef<str>,
        element: impl Into<FieldValue>,
    ) -> Result<StoredDocument> {
        let path: FieldPath = path.as_ref().parse()?;
        let element = element.into();
        let element = if self.schema.is_reference_array(&path) {
            FieldValue::from(normalize_reference(&element)?)
        } else {
            element
        };

        debug!(collection = %self.name, %id, %path, "atomic push");
        self.store.atomic_update(
            id,
            &[UpdateOperator::PushElements {
                path,
                elements: vec![element],
            }],
        )
    }

    /// Delete a document; returns true if it existed
    pub fn delete(&self, id: &DocumentId) -> Result<bool> {
        let removed = self.store.delete(id)?;
        if removed {
            debug!(collection = %self.name, %id, "deleted");
        }
        Ok(removed)
    }

    /// Normalize every declared reference-array field present in `fields`
    fn normalize_reference_fields(&self, fields: &mut FieldValue) -> Result<()> {
        for path in self.schema.reference_arrays() {
            let Some(value) = get_at_path(fields, path) else {
                continue;
            };
            let elements = value.as_array().ok_or_else(|| {
                Error::InvalidOperation(format!(
                    "reference-array field {} must be an array",
                    path
                ))
            })?;
            let normalized: Result<Vec<FieldValue>> = elements
                .iter()
                .map(|e| {
                    normalize_reference(&FieldValue::from_value(e.clone())).map(FieldValue::from)
                })
                .collect();
            set_at_path(fields, path, FieldValue::from(normalized?))?;
        }
        Ok(())
    }
}
