//! Loaded document instances
//!
//! A [`DocumentInstance`] is an independently owned snapshot of a stored
//! document plus its mutation log. Instances are never shared between
//! concurrent callers; cross-instance consistency is mediated entirely
//! through the store's atomic-update and revision-token primitives.
//!
//! Every tracked mutation is applied locally through the same operator
//! routine the store uses, so the instance's view always matches what a
//! successful persist will produce.

use crate::mutation::MutationLog;
use crate::reference::normalize_reference;
use docsync_core::error::{Error, Result};
use docsync_core::operator::{apply_operator, UpdateOperator};
use docsync_core::path::FieldPath;
use docsync_core::schema::Schema;
use docsync_core::traits::StoredDocument;
use docsync_core::types::{DocumentId, Revision};
use docsync_core::value::{get_at_path, get_at_path_mut, FieldValue};
use std::sync::Arc;

/// A loaded document with mutation tracking
#[derive(Debug, Clone)]
pub struct DocumentInstance {
    id: DocumentId,
    fields: FieldValue,
    revision: Revision,
    log: MutationLog,
    schema: Arc<Schema>,
}

impl DocumentInstance {
    /// Build an instance from a store response
    pub fn new(
        id: DocumentId,
        fields: FieldValue,
        revision: Revision,
        schema: Arc<Schema>,
    ) -> Self {
        DocumentInstance {
            id,
            fields,
            revision,
            log: MutationLog::new(),
            schema,
        }
    }

    /// The document's store-assigned identifier
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Revision this instance last saw from the store
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The instance's current view of the document
    pub fn fields(&self) -> &FieldValue {
        &self.fields
    }

    /// Whether any unpersisted mutation is recorded
    pub fn is_dirty(&self) -> bool {
        !self.log.is_empty()
    }

    /// The mutation log (read access)
    pub fn mutation_log(&self) -> &MutationLog {
        &self.log
    }

    /// Read the value at `path`
    pub fn field(&self, path: impl AsRef<str>) -> Result<Option<&FieldValue>> {
        let path: FieldPath = path.as_ref().parse()?;
        Ok(get_at_path(&self.fields, &path))
    }

    /// Append an element to the array field at `path`
    ///
    /// For a reference-array field the element is normalized to its stored
    /// identifier first, whether it arrives as a bare id or as a full
    /// document snapshot. The append is applied to the local view and
    /// recorded in the mutation log; persist turns it into a push operator,
    /// never a wholesale set of the local array.
    pub fn push(&mut self, path: impl AsRef<str>, element: impl Into<FieldValue>) -> Result<()> {
        let path: FieldPath = path.as_ref().parse()?;
        let element = element.into();
        let element = if self.schema.is_reference_array(&path) {
            FieldValue::from(normalize_reference(&element)?)
        } else {
            element
        };

        apply_operator(
            &mut self.fields,
            &UpdateOperator::PushElements {
                path: path.clone(),
                elements: vec![element.clone()],
            },
        )?;
        self.log.record_append(path, element);
        Ok(())
    }

    /// Replace the field at `path` wholesale
    ///
    /// For a reference-array field the new value must be an array; every
    /// element is normalized to its stored identifier.
    pub fn set(&mut self, path: impl AsRef<str>, value: impl Into<FieldValue>) -> Result<()> {
        let path: FieldPath = path.as_ref().parse()?;
        let value = value.into();
        let value = if self.schema.is_reference_array(&path) {
            let elements = value.as_array().ok_or_else(|| {
                Error::InvalidOperation(format!(
                    "reference-array field {} must be set to an array",
                    path
                ))
            })?;
            let normalized: Result<Vec<FieldValue>> = elements
                .iter()
                .map(|e| {
                    normalize_reference(&FieldValue::from_value(e.clone())).map(FieldValue::from)
                })
                .collect();
            FieldValue::from(normalized?)
        } else {
            value
        };

        apply_operator(
            &mut self.fields,
            &UpdateOperator::SetField {
                path: path.clone(),
                value: value.clone(),
            },
        )?;
        self.log.record_replace(path, value);
        Ok(())
    }

    /// Remove every element equal to `matcher` from the array at `path`
    ///
    /// For a reference-array field the matcher is normalized first, so
    /// pulling by snapshot and pulling by id remove the same elements.
    pub fn pull(&mut self, path: impl AsRef<str>, matcher: impl Into<FieldValue>) -> Result<()> {
        let path: FieldPath = path.as_ref().parse()?;
        let matcher = matcher.into();
        let matcher = if self.schema.is_reference_array(&path) {
            FieldValue::from(normalize_reference(&matcher)?)
        } else {
            matcher
        };

        apply_operator(
            &mut self.fields,
            &UpdateOperator::PullElements {
                path: path.clone(),
                matcher: matcher.clone(),
            },
        )?;
        self.log.record_removal(path, matcher);
        Ok(())
    }

    /// Untracked escape hatch: direct mutable access to the value at `path`
    ///
    /// The tracker cannot classify edits made through the returned
    /// reference, so the path is marked `Untracked` and persist falls back
    /// to a fresh-read, revision-guarded full replace scoped to it.
    /// Returns None (and records nothing) if the path does not exist.
    pub fn field_mut(&mut self, path: impl AsRef<str>) -> Result<Option<&mut FieldValue>> {
        let path: FieldPath = path.as_ref().parse()?;
        if get_at_path(&self.fields, &path).is_none() {
            return Ok(None);
        }
        self.log.mark_untracked(path.clone());
        Ok(get_at_path_mut(&mut self.fields, &path))
    }

    /// Value at a parsed path (used by the coordinator for replace overlays)
    pub(crate) fn field_at(&self, path: &FieldPath) -> Option<&FieldValue> {
        get_at_path(&self.fields, path)
    }

    /// Mutable access to the log (coordinator bookkeeping)
    pub(crate) fn log_mut(&mut self) -> &mut MutationLog {
        &mut self.log
    }

    /// Adopt the store's post-persist state and empty the log
    pub(crate) fn refresh(&mut self, stored: StoredDocument) {
        self.fields = stored.fields;
        self.revision = stored.revision;
        self.log.clear();
    }
}
