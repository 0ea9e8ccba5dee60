//! Field values and document limits
//!
//! This module defines:
//! - FieldValue: newtype wrapper around serde_json::Value
//! - Document limits: MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH, MAX_ARRAY_LEN
//! - Path traversal: get_at_path, get_at_path_mut, set_at_path
//!
//! # Document Size Limits
//!
//! Limits are checked on create and replace at the store:
//!
//! | Limit | Value | Constant |
//! |-------|-------|----------|
//! | Max document size | 16 MB | [`MAX_DOCUMENT_SIZE`] |
//! | Max nesting depth | 100 levels | [`MAX_NESTING_DEPTH`] |
//! | Max array length | 1M elements | [`MAX_ARRAY_LEN`] |

use crate::path::{FieldPath, PathSegment};
use crate::types::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Document Size Limits
// =============================================================================

/// Maximum document size in bytes (16 MB)
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum nesting depth of a document (100 levels)
///
/// Prevents stack overflow during recursive traversal and serialization.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Maximum array length in elements (1 million elements)
pub const MAX_ARRAY_LEN: usize = 1_000_000;

/// Error type for document limit violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// Document exceeds maximum size
    #[error("document size {size} exceeds maximum of {max} bytes")]
    DocumentTooLarge {
        /// Actual document size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Document nesting exceeds maximum depth
    #[error("document nesting depth {depth} exceeds maximum of {max} levels")]
    NestingTooDeep {
        /// Actual nesting depth
        depth: usize,
        /// Maximum allowed depth
        max: usize,
    },

    /// Array exceeds maximum length
    #[error("array length {len} exceeds maximum of {max} elements")]
    ArrayTooLong {
        /// Actual array length
        len: usize,
        /// Maximum allowed length
        max: usize,
    },
}

// =============================================================================
// FieldValue
// =============================================================================

/// Field value wrapper
///
/// Newtype around serde_json::Value providing:
/// - Direct access to underlying serde_json::Value via Deref/DerefMut
/// - Easy construction from common types (including [`DocumentId`])
/// - Document limit validation
///
/// # Examples
///
/// ```
/// use docsync_core::value::FieldValue;
///
/// let obj = FieldValue::object();
/// let arr = FieldValue::array();
/// let s = FieldValue::from("hello");
/// let n = FieldValue::from(42i64);
///
/// assert!(obj.is_object());
/// assert!(arr.is_array());
/// assert_eq!(n.as_i64(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct FieldValue(serde_json::Value);

impl FieldValue {
    /// Create a null value
    pub fn null() -> Self {
        FieldValue(serde_json::Value::Null)
    }

    /// Create an empty object
    pub fn object() -> Self {
        FieldValue(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Create an empty array
    pub fn array() -> Self {
        FieldValue(serde_json::Value::Array(Vec::new()))
    }

    /// Create from a serde_json::Value
    pub fn from_value(value: serde_json::Value) -> Self {
        FieldValue(value)
    }

    /// Get the underlying serde_json::Value
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Get a reference to the underlying serde_json::Value
    pub fn as_inner(&self) -> &serde_json::Value {
        &self.0
    }

    /// Get a mutable reference to the underlying serde_json::Value
    pub fn as_inner_mut(&mut self) -> &mut serde_json::Value {
        &mut self.0
    }

    /// Serialize to compact JSON string
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Approximate size in bytes (for limit checking)
    ///
    /// Based on the JSON string representation; actual in-memory size differs.
    pub fn size_bytes(&self) -> usize {
        self.to_json_string().len()
    }

    /// Maximum nesting depth of this value
    ///
    /// Returns 0 for primitives, counts nested objects/arrays.
    pub fn nesting_depth(&self) -> usize {
        fn depth_of(value: &serde_json::Value) -> usize {
            match value {
                serde_json::Value::Null
                | serde_json::Value::Bool(_)
                | serde_json::Value::Number(_)
                | serde_json::Value::String(_) => 0,
                serde_json::Value::Array(arr) => 1 + arr.iter().map(depth_of).max().unwrap_or(0),
                serde_json::Value::Object(obj) => 1 + obj.values().map(depth_of).max().unwrap_or(0),
            }
        }
        depth_of(&self.0)
    }

    /// Longest array anywhere in this value (including nested arrays)
    pub fn max_array_len(&self) -> usize {
        fn max_len(value: &serde_json::Value) -> usize {
            match value {
                serde_json::Value::Null
                | serde_json::Value::Bool(_)
                | serde_json::Value::Number(_)
                | serde_json::Value::String(_) => 0,
                serde_json::Value::Array(arr) => {
                    let nested = arr.iter().map(max_len).max().unwrap_or(0);
                    arr.len().max(nested)
                }
                serde_json::Value::Object(obj) => obj.values().map(max_len).max().unwrap_or(0),
            }
        }
        max_len(&self.0)
    }

    /// Validate all document limits
    ///
    /// Checks size, nesting depth, and array lengths.
    /// Returns the first violation encountered, if any.
    pub fn validate(&self) -> Result<(), LimitError> {
        let size = self.size_bytes();
        if size > MAX_DOCUMENT_SIZE {
            return Err(LimitError::DocumentTooLarge {
                size,
                max: MAX_DOCUMENT_SIZE,
            });
        }
        let depth = self.nesting_depth();
        if depth > MAX_NESTING_DEPTH {
            return Err(LimitError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        let len = self.max_array_len();
        if len > MAX_ARRAY_LEN {
            return Err(LimitError::ArrayTooLong {
                len,
                max: MAX_ARRAY_LEN,
            });
        }
        Ok(())
    }
}

impl FromStr for FieldValue {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(FieldValue)
    }
}

impl Deref for FieldValue {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for FieldValue {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::null()
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue(v)
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(v: FieldValue) -> Self {
        v.0
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue(serde_json::Value::Bool(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue(serde_json::Value::Number(v.into()))
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue(serde_json::Value::Number(v.into()))
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue(serde_json::Value::Number(v.into()))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue(serde_json::Value::String(v.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue(serde_json::Value::String(v))
    }
}

impl From<DocumentId> for FieldValue {
    /// Identifiers are stored in their canonical string form
    fn from(id: DocumentId) -> Self {
        FieldValue(serde_json::Value::String(id.to_string()))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        FieldValue(serde_json::Value::Array(
            v.into_iter().map(|x| x.into().0).collect(),
        ))
    }
}

// =============================================================================
// Path Traversal Error
// =============================================================================

/// Error type for path traversal operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldPathError {
    /// Type mismatch during path traversal
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Path at which the mismatch occurred
        path: FieldPath,
        /// Expected type
        expected: &'static str,
        /// Actual type found
        found: &'static str,
    },

    /// Array index out of bounds
    #[error("index out of bounds at {path}: {index} >= {len}")]
    IndexOutOfBounds {
        /// Path at which the index was applied
        path: FieldPath,
        /// The requested index
        index: usize,
        /// The array length
        len: usize,
    },
}

/// Human-readable type name for error messages
pub(crate) fn value_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// =============================================================================
// Path Traversal
// =============================================================================

/// Get value at path within a document
///
/// Traverses the document following the path segments, returning a reference
/// to the value at the specified location, or None if the path does not
/// exist or a segment hits a value of the wrong type.
///
/// # Examples
///
/// ```
/// use docsync_core::value::{FieldValue, get_at_path};
/// use docsync_core::path::FieldPath;
///
/// let doc: FieldValue = serde_json::json!({
///     "user": { "name": "Alice", "scores": [100, 95] }
/// }).into();
///
/// let path: FieldPath = "user.scores[1]".parse().unwrap();
/// assert_eq!(get_at_path(&doc, &path).unwrap().as_i64(), Some(95));
/// ```
pub fn get_at_path<'a>(value: &'a FieldValue, path: &FieldPath) -> Option<&'a FieldValue> {
    let mut current: &serde_json::Value = value.as_inner();

    for segment in path.segments() {
        match (segment, current) {
            (PathSegment::Key(key), serde_json::Value::Object(obj)) => {
                current = obj.get(key)?;
            }
            (PathSegment::Index(idx), serde_json::Value::Array(arr)) => {
                current = arr.get(*idx)?;
            }
            _ => return None,
        }
    }

    // SAFETY: FieldValue is #[repr(transparent)] over serde_json::Value,
    // so the layouts are identical and the lifetime stays tied to `value`.
    Some(unsafe { &*(current as *const serde_json::Value as *const FieldValue) })
}

/// Get mutable reference to value at path within a document
///
/// Same traversal as [`get_at_path`], returning a mutable reference.
pub fn get_at_path_mut<'a>(
    value: &'a mut FieldValue,
    path: &FieldPath,
) -> Option<&'a mut FieldValue> {
    let mut current: &mut serde_json::Value = value.as_inner_mut();

    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), serde_json::Value::Object(obj)) => obj.get_mut(key)?,
            (PathSegment::Index(idx), serde_json::Value::Array(arr)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }

    // SAFETY: FieldValue is #[repr(transparent)] over serde_json::Value,
    // so the layouts are identical and the lifetime stays tied to `value`.
    Some(unsafe { &mut *(current as *mut serde_json::Value as *mut FieldValue) })
}

/// Set value at path within a document
///
/// Creates intermediate objects and arrays as needed when the path doesn't
/// exist. The type of intermediate container is determined by the next
/// segment in the path. Existing array indices must be in bounds.
///
/// # Examples
///
/// ```
/// use docsync_core::value::{FieldValue, set_at_path, get_at_path};
/// use docsync_core::path::FieldPath;
///
/// let mut doc = FieldValue::object();
/// let path: FieldPath = "user.profile.name".parse().unwrap();
/// set_at_path(&mut doc, &path, FieldValue::from("Alice")).unwrap();
/// assert_eq!(get_at_path(&doc, &path).unwrap().as_str(), Some("Alice"));
/// ```
pub fn set_at_path(
    root: &mut FieldValue,
    path: &FieldPath,
    value: FieldValue,
) -> Result<(), FieldPathError> {
    let segments = path.segments();
    let (parent_segments, last_segment) = segments.split_at(segments.len() - 1);
    let last_segment = &last_segment[0];

    let mut current = root.as_inner_mut();

    // Navigate to the parent, creating intermediates
    for (i, segment) in parent_segments.iter().enumerate() {
        let next_segment = &segments[i + 1];
        let here = FieldPath::from_segments(segments[..=i].to_vec()).unwrap();

        match segment {
            PathSegment::Key(key) => {
                if !current.is_object() {
                    return Err(FieldPathError::TypeMismatch {
                        path: here,
                        expected: "object",
                        found: value_type_name(current),
                    });
                }
                let obj = current.as_object_mut().unwrap();
                if !obj.contains_key(key) {
                    let new_container = match next_segment {
                        PathSegment::Key(_) => serde_json::Value::Object(serde_json::Map::new()),
                        PathSegment::Index(_) => serde_json::Value::Array(Vec::new()),
                    };
                    obj.insert(key.clone(), new_container);
                }
                current = obj.get_mut(key).unwrap();
            }
            PathSegment::Index(idx) => {
                let len = match current.as_array() {
                    Some(arr) => arr.len(),
                    None => {
                        return Err(FieldPathError::TypeMismatch {
                            path: here,
                            expected: "array",
                            found: value_type_name(current),
                        })
                    }
                };
                if *idx >= len {
                    return Err(FieldPathError::IndexOutOfBounds {
                        path: here,
                        index: *idx,
                        len,
                    });
                }
                current = &mut current.as_array_mut().unwrap()[*idx];
            }
        }
    }

    // Set the value at the last segment
    match last_segment {
        PathSegment::Key(key) => {
            let obj = match current.as_object_mut() {
                Some(obj) => obj,
                None => {
                    return Err(FieldPathError::TypeMismatch {
                        path: path.clone(),
                        expected: "object",
                        found: value_type_name(current),
                    })
                }
            };
            obj.insert(key.clone(), value.into_inner());
        }
        PathSegment::Index(idx) => {
            let arr = match current.as_array_mut() {
                Some(arr) => arr,
                None => {
                    return Err(FieldPathError::TypeMismatch {
                        path: path.clone(),
                        expected: "array",
                        found: value_type_name(current),
                    })
                }
            };
            if *idx >= arr.len() {
                return Err(FieldPathError::IndexOutOfBounds {
                    path: path.clone(),
                    index: *idx,
                    len: arr.len(),
                });
            }
            arr[*idx] = value.into_inner();
        }
    }

    Ok(())
}
