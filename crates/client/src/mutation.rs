//! Mutation tracking
//!
//! ## Design
//!
//! Each loaded document instance carries a [`MutationLog`]: one tagged
//! [`MutationRecord`] per touched field path, populated only through the
//! dedicated mutation entry points. Intent is never inferred by diffing
//! before/after snapshots.
//!
//! ## Incompatibility lattice
//!
//! A path holds at most one record. Recording a second mutation of an
//! incompatible kind (e.g. a replace after an append) collapses the path to
//! `Untracked`: the tracker does not merge incompatible intents, because
//! that would amount to re-deriving the equivalent atomic operator, which
//! synthesis already owns. `Untracked` is absorbing; only a successful
//! persist clears it.

use docsync_core::path::FieldPath;
use docsync_core::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Recorded intent for one field path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MutationRecord {
    /// Field replaced wholesale
    Replaced(FieldValue),
    /// Elements appended to an array field, in call order
    ArrayAppended(Vec<FieldValue>),
    /// Equality matchers for elements removed from an array field
    ArrayRemoved(Vec<FieldValue>),
    /// Field touched by means the tracker cannot classify
    ///
    /// Forces a revision-guarded full replace scoped to this field.
    Untracked,
}

/// Per-instance log of tracked mutations
///
/// Keyed by [`FieldPath`] in a `BTreeMap`, so iteration order (and therefore
/// synthesized operator order) is deterministic and stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationLog {
    entries: BTreeMap<FieldPath, MutationRecord>,
}

impl MutationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an element appended to the array at `path`
    ///
    /// Appends accumulate in call order. An append on a path currently
    /// holding any other record kind collapses the path to `Untracked`.
    pub fn record_append(&mut self, path: FieldPath, element: FieldValue) {
        match self.entries.entry(path) {
            Entry::Vacant(e) => {
                e.insert(MutationRecord::ArrayAppended(vec![element]));
            }
            Entry::Occupied(mut e) => match e.get_mut() {
                MutationRecord::ArrayAppended(elements) => elements.push(element),
                _ => {
                    e.insert(MutationRecord::Untracked);
                }
            },
        }
    }

    /// Record a wholesale replacement of the field at `path`
    ///
    /// A replace overwrites a previous replace (last write wins). On a path
    /// holding an append or removal record it collapses to `Untracked`.
    pub fn record_replace(&mut self, path: FieldPath, value: FieldValue) {
        match self.entries.entry(path) {
            Entry::Vacant(e) => {
                e.insert(MutationRecord::Replaced(value));
            }
            Entry::Occupied(mut e) => match e.get() {
                MutationRecord::Replaced(_) => {
                    e.insert(MutationRecord::Replaced(value));
                }
                _ => {
                    e.insert(MutationRecord::Untracked);
                }
            },
        }
    }

    /// Record a removal matcher for the array at `path`
    pub fn record_removal(&mut self, path: FieldPath, matcher: FieldValue) {
        match self.entries.entry(path) {
            Entry::Vacant(e) => {
                e.insert(MutationRecord::ArrayRemoved(vec![matcher]));
            }
            Entry::Occupied(mut e) => match e.get_mut() {
                MutationRecord::ArrayRemoved(matchers) => matchers.push(matcher),
                _ => {
                    e.insert(MutationRecord::Untracked);
                }
            },
        }
    }

    /// Mark `path` as touched by unclassifiable means
    pub fn mark_untracked(&mut self, path: FieldPath) {
        self.entries.insert(path, MutationRecord::Untracked);
    }

    /// Record for `path`, if any
    pub fn get(&self, path: &FieldPath) -> Option<&MutationRecord> {
        self.entries.get(path)
    }

    /// Iterate records in path order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &MutationRecord)> {
        self.entries.iter()
    }

    /// Whether any mutation has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of touched paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop the record for `path` (used after the store acknowledged it)
    pub fn remove(&mut self, path: &FieldPath) -> Option<MutationRecord> {
        self.entries.remove(path)
    }

    /// Empty the log (after a successful persist)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
