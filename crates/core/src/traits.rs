//! Store adapter seam
//!
//! The store owns durability and routing; this crate only relies on two of
//! its guarantees:
//!
//! 1. All operators in one `atomic_update` apply indivisibly relative to
//!    any other concurrent atomic update on the same document.
//! 2. `conditional_replace` commits only when the expected revision still
//!    matches, converting a lost-update race into a detectable
//!    [`Error::RevisionMismatch`](crate::error::Error::RevisionMismatch).

use crate::error::Result;
use crate::operator::UpdateOperator;
use crate::types::{DocumentId, Revision};
use crate::value::FieldValue;

/// A document's authoritative state as returned by the store
///
/// Every store operation that touches a document returns the post-operation
/// state, so callers can refresh their instances without a second read.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Root object of the document
    pub fields: FieldValue,
    /// Revision after the operation
    pub revision: Revision,
}

/// Executes atomic updates and full-document replaces
///
/// Implementations must be safe to share across threads; concurrent callers
/// hold independent document instances and meet only here.
pub trait StoreAdapter: Send + Sync {
    /// Create a document, assigning its id
    ///
    /// The root of `fields` must be an object. The store writes the assigned
    /// id into the root as `_id` so any loaded snapshot can be normalized
    /// back to its identifier.
    fn create(&self, fields: FieldValue) -> Result<(DocumentId, StoredDocument)>;

    /// Load a document's current fields and revision
    fn load(&self, id: &DocumentId) -> Result<StoredDocument>;

    /// Apply all operators indivisibly, without requiring a prior read
    ///
    /// Either every operator applies or none does.
    fn atomic_update(&self, id: &DocumentId, ops: &[UpdateOperator]) -> Result<StoredDocument>;

    /// Replace the document's fields, guarded by the expected revision
    fn conditional_replace(
        &self,
        id: &DocumentId,
        fields: FieldValue,
        expected: Revision,
    ) -> Result<StoredDocument>;

    /// Delete a document; returns true if it existed
    fn delete(&self, id: &DocumentId) -> Result<bool>;
}
