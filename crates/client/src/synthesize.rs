//! Operator synthesis
//!
//! Converts a [`MutationLog`] into the minimal set of atomic update
//! operators, plus the set of paths that cannot be expressed as operators
//! and force a revision-guarded full replace.
//!
//! The one rule that matters: an `ArrayAppended` record becomes a
//! `PushElements` operator, never a `SetField` of the locally known array.
//! The local array may be stale relative to concurrent remote appends;
//! setting it wholesale would silently discard any element another actor
//! appended between load and persist. A push carries only the local
//! additions and composes with remote pushes at the store.

use crate::mutation::{MutationLog, MutationRecord};
use docsync_core::operator::UpdateOperator;
use docsync_core::path::FieldPath;
use std::collections::BTreeSet;

/// Output of synthesis: operators plus paths needing a full replace
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SynthesisPlan {
    /// Atomic operators, in deterministic path order
    pub operators: Vec<UpdateOperator>,
    /// Paths whose records are `Untracked`
    ///
    /// These force the coordinator into a fresh-read, revision-guarded
    /// replace scoped to exactly these fields.
    pub full_replace: BTreeSet<FieldPath>,
}

impl SynthesisPlan {
    /// Whether the plan carries no work at all
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty() && self.full_replace.is_empty()
    }
}

/// Synthesize operators from a mutation log
///
/// Deterministic: the log is a `BTreeMap`, so for a given log the output
/// sequence is uniquely determined and stable across repeated calls.
pub fn synthesize(log: &MutationLog) -> SynthesisPlan {
    let mut plan = SynthesisPlan::default();

    for (path, record) in log.iter() {
        match record {
            MutationRecord::Replaced(value) => {
                plan.operators.push(UpdateOperator::SetField {
                    path: path.clone(),
                    value: value.clone(),
                });
            }
            MutationRecord::ArrayAppended(elements) => {
                plan.operators.push(UpdateOperator::PushElements {
                    path: path.clone(),
                    elements: elements.clone(),
                });
            }
            MutationRecord::ArrayRemoved(matchers) => {
                for matcher in matchers {
                    plan.operators.push(UpdateOperator::PullElements {
                        path: path.clone(),
                        matcher: matcher.clone(),
                    });
                }
            }
            MutationRecord::Untracked => {
                plan.full_replace.insert(path.clone());
            }
        }
    }

    plan
}
