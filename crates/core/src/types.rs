//! Core identifier types
//!
//! This module defines the foundational identifiers:
//! - DocumentId: store-assigned unique identifier for a stored document
//! - Revision: optimistic-concurrency token guarding full replaces

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Store-assigned unique identifier for a document
///
/// A DocumentId is a wrapper around a UUID v4. Ids are assigned by the
/// store on create and never change for the lifetime of the document.
/// Reference-array fields hold DocumentIds in their canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random DocumentId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a DocumentId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a DocumentId from its string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this DocumentId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optimistic-concurrency token for a stored document
///
/// Every committed write at the store increments the revision. A full
/// replace is only applied when the caller's expected revision matches the
/// stored one; a mismatch means another actor committed in between and the
/// replace would lose that actor's update.
///
/// The token is opaque to callers: it can be compared and carried around,
/// never derived or computed client-side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Revision(u64);

impl Revision {
    /// The revision of a freshly created document
    pub const FIRST: Revision = Revision(1);

    /// The revision after one more committed write
    pub fn next(self) -> Revision {
        Revision(self.0 + 1)
    }

    /// Raw counter value, for logging and assertions
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
