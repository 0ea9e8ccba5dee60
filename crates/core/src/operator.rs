//! Atomic update operators
//!
//! An UpdateOperator is a store-executed instruction applied indivisibly
//! relative to other concurrent operators on the same document. Operators
//! are produced transiently by synthesis and never persisted as state.
//!
//! The same application routine runs in two places: at the store (under its
//! lock, against the authoritative document) and locally on a loaded
//! instance (so the caller's view matches what a successful persist
//! produces). Two independent `PushElements` on the same path compose:
//! both element sequences end up in the array, in arrival order.

use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::value::{get_at_path_mut, set_at_path, value_type_name, FieldValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single atomic update instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateOperator {
    /// Replace the value at path wholesale
    SetField {
        /// The path to set
        path: FieldPath,
        /// The value to set
        value: FieldValue,
    },
    /// Append elements to the array at path, in order
    PushElements {
        /// The array path
        path: FieldPath,
        /// Elements to append
        elements: Vec<FieldValue>,
    },
    /// Remove every array element equal to the matcher
    PullElements {
        /// The array path
        path: FieldPath,
        /// Equality matcher
        matcher: FieldValue,
    },
}

impl UpdateOperator {
    /// Create a SetField operator
    ///
    /// # Panics
    ///
    /// Panics if the path string is invalid.
    pub fn set(path: impl AsRef<str>, value: FieldValue) -> Self {
        UpdateOperator::SetField {
            path: path
                .as_ref()
                .parse()
                .expect("invalid path in UpdateOperator::set"),
            value,
        }
    }

    /// Create a PushElements operator
    ///
    /// # Panics
    ///
    /// Panics if the path string is invalid.
    pub fn push(path: impl AsRef<str>, elements: Vec<FieldValue>) -> Self {
        UpdateOperator::PushElements {
            path: path
                .as_ref()
                .parse()
                .expect("invalid path in UpdateOperator::push"),
            elements,
        }
    }

    /// Create a PullElements operator
    ///
    /// # Panics
    ///
    /// Panics if the path string is invalid.
    pub fn pull(path: impl AsRef<str>, matcher: FieldValue) -> Self {
        UpdateOperator::PullElements {
            path: path
                .as_ref()
                .parse()
                .expect("invalid path in UpdateOperator::pull"),
            matcher,
        }
    }

    /// The path this operator touches
    pub fn path(&self) -> &FieldPath {
        match self {
            UpdateOperator::SetField { path, .. } => path,
            UpdateOperator::PushElements { path, .. } => path,
            UpdateOperator::PullElements { path, .. } => path,
        }
    }
}

impl fmt::Display for UpdateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOperator::SetField { path, value } => write!(f, "SET {} = {}", path, value),
            UpdateOperator::PushElements { path, elements } => {
                write!(f, "PUSH {} << {} element(s)", path, elements.len())
            }
            UpdateOperator::PullElements { path, matcher } => {
                write!(f, "PULL {} == {}", path, matcher)
            }
        }
    }
}

/// Apply one operator to a document's root fields
///
/// - `SetField` replaces the value at path, creating intermediate objects.
/// - `PushElements` appends to the array at path; a missing field becomes
///   an empty array first; a present non-array value is an error.
/// - `PullElements` removes equal elements; a missing field is a no-op;
///   a present non-array value is an error.
///
/// Errors leave `fields` untouched for `PushElements`/`PullElements`;
/// callers composing several operators clone first and commit on success.
pub fn apply_operator(fields: &mut FieldValue, op: &UpdateOperator) -> Result<()> {
    match op {
        UpdateOperator::SetField { path, value } => {
            set_at_path(fields, path, value.clone())?;
            Ok(())
        }
        UpdateOperator::PushElements { path, elements } => {
            if get_at_path_mut(fields, path).is_none() {
                set_at_path(fields, path, FieldValue::array())?;
            }
            let target = get_at_path_mut(fields, path).expect("just created");
            match target.as_inner_mut() {
                serde_json::Value::Array(arr) => {
                    arr.extend(elements.iter().map(|e| e.as_inner().clone()));
                    Ok(())
                }
                other => Err(Error::InvalidOperation(format!(
                    "cannot push to {}: field is {}, not an array",
                    path,
                    value_type_name(other)
                ))),
            }
        }
        UpdateOperator::PullElements { path, matcher } => {
            let target = match get_at_path_mut(fields, path) {
                Some(target) => target,
                None => return Ok(()),
            };
            match target.as_inner_mut() {
                serde_json::Value::Array(arr) => {
                    arr.retain(|e| e != matcher.as_inner());
                    Ok(())
                }
                other => Err(Error::InvalidOperation(format!(
                    "cannot pull from {}: field is {}, not an array",
                    path,
                    value_type_name(other)
                ))),
            }
        }
    }
}

/// Apply a sequence of operators in order
///
/// Fails on the first operator error. Callers needing all-or-nothing
/// semantics apply against a clone and swap on success, which is what the
/// in-memory store does under its write lock.
pub fn apply_operators(fields: &mut FieldValue, ops: &[UpdateOperator]) -> Result<()> {
    for op in ops {
        apply_operator(fields, op)?;
    }
    Ok(())
}
