//! Reference normalization
//!
//! Values pushed into reference-array fields arrive in two shapes: a bare
//! identifier string, or a full document snapshot carrying its `_id`.
//! Normalization reduces both to the stored identifier before the mutation
//! log sees them, so downstream synthesis has a single code path and the
//! log never holds mixed-type payloads.

use docsync_core::error::{Error, Result};
use docsync_core::types::DocumentId;
use docsync_core::value::FieldValue;

/// Reduce a reference value to its stored identifier
///
/// - A string matching the identifier format passes through unchanged.
/// - An object snapshot must carry a well-formed `_id`; a snapshot without
///   one was never persisted and cannot be referenced.
/// - Anything else is an invalid reference.
///
/// Idempotent: normalizing the result of a normalization yields the same
/// identifier.
pub fn normalize_reference(value: &FieldValue) -> Result<DocumentId> {
    match value.as_inner() {
        serde_json::Value::String(s) => DocumentId::from_string(s)
            .ok_or_else(|| Error::InvalidReference(format!("malformed identifier: {:?}", s))),
        serde_json::Value::Object(obj) => match obj.get("_id") {
            Some(serde_json::Value::String(s)) => DocumentId::from_string(s).ok_or_else(|| {
                Error::InvalidReference(format!("snapshot carries malformed _id: {:?}", s))
            }),
            Some(other) => Err(Error::InvalidReference(format!(
                "snapshot _id must be a string, found {}",
                other
            ))),
            None => Err(Error::InvalidReference(
                "snapshot has no _id; was it ever persisted?".to_string(),
            )),
        },
        other => Err(Error::InvalidReference(format!(
            "expected identifier or document snapshot, found {}",
            other
        ))),
    }
}
