//! Field paths into documents
//!
//! A FieldPath names a location inside a document: a sequence of object
//! keys with optional array indices, e.g. `books`, `profile.name`,
//! `items[0].qty`. Paths are the keys of the mutation log and of update
//! operators, so they are `Ord` — iteration over a `BTreeMap<FieldPath, _>`
//! is deterministic, which makes operator synthesis stable across calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for field path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty key in path
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),
    /// Unclosed bracket
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Invalid array index
    #[error("invalid array index at position {0}: {1}")]
    InvalidIndex(usize, String),
    /// Unexpected character
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    /// The empty path does not name a field
    #[error("empty path")]
    Empty,
}

/// A segment in a field path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key: `.foo`
    Key(String),
    /// Array index: `[0]`
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A path to a field within a document
///
/// Unlike a generic JSON pointer, a FieldPath is never empty: documents are
/// objects at the root and every tracked mutation targets a named field.
///
/// # Path Syntax
///
/// | Syntax | Meaning | Example |
/// |--------|---------|---------|
/// | `key` | Object property | `books` |
/// | `key1.key2` | Nested property | `user.name` |
/// | `key[n]` | Property then index | `items[0]` |
///
/// # Examples
///
/// ```
/// use docsync_core::path::FieldPath;
///
/// let books = FieldPath::field("books");
/// let nested: FieldPath = "user.address.city".parse().unwrap();
/// let indexed: FieldPath = "items[0].qty".parse().unwrap();
///
/// assert!(FieldPath::field("user").is_ancestor_of(&nested));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Create a single-key path naming a top-level field
    pub fn field(key: impl Into<String>) -> Self {
        FieldPath {
            segments: vec![PathSegment::Key(key.into())],
        }
    }

    /// Create a path from a vector of segments
    ///
    /// Returns None for an empty segment list.
    pub fn from_segments(segments: Vec<PathSegment>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(FieldPath { segments })
        }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Get the number of segments in the path (always at least 1)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// Get the parent path (None if this is a top-level field)
    pub fn parent(&self) -> Option<FieldPath> {
        if self.segments.len() <= 1 {
            None
        } else {
            let mut parent = self.clone();
            parent.segments.pop();
            Some(parent)
        }
    }

    /// Get the last segment
    pub fn last_segment(&self) -> &PathSegment {
        // Invariant: segments is non-empty
        self.segments.last().unwrap()
    }

    /// Check if this path is an ancestor of another (or equal)
    ///
    /// A path is an ancestor if it is a prefix of the other path.
    /// A path is considered an ancestor of itself.
    pub fn is_ancestor_of(&self, other: &FieldPath) -> bool {
        if self.segments.len() > other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| a == b)
    }

    /// Check if this path is a descendant of another (or equal)
    pub fn is_descendant_of(&self, other: &FieldPath) -> bool {
        other.is_ancestor_of(self)
    }

    /// Check if two paths overlap (one is ancestor/descendant of the other)
    ///
    /// Overlapping paths touch the same region of a document; a full
    /// replace of one would clobber a concurrent write to the other.
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        self.is_ancestor_of(other) || self.is_descendant_of(other)
    }

    /// Convert to a string representation
    pub fn to_path_string(&self) -> String {
        let mut result = String::new();
        for seg in &self.segments {
            match seg {
                PathSegment::Key(k) => {
                    if !result.is_empty() {
                        result.push('.');
                    }
                    result.push_str(k);
                }
                PathSegment::Index(i) => {
                    result.push('[');
                    result.push_str(&i.to_string());
                    result.push(']');
                }
            }
        }
        result
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    /// Parse a path from a string
    ///
    /// Supported syntax:
    /// - `foo` - object key
    /// - `foo.bar` - nested keys
    /// - `foo[0]` - key then index
    /// - `foo[0].bar` - mixed
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }

        let mut segments = Vec::new();
        let chars: Vec<char> = s.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '.' {
                // Start of a key segment
                i += 1;
                if i >= chars.len() {
                    return Err(PathParseError::EmptyKey(i));
                }
            }

            if chars[i] == '[' {
                // Array index segment; indices never lead a path
                if segments.is_empty() {
                    return Err(PathParseError::UnexpectedChar('[', i));
                }
                let start = i;
                i += 1;
                let idx_start = i;

                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }

                if i >= chars.len() {
                    return Err(PathParseError::UnclosedBracket(start));
                }

                let idx_str: String = chars[idx_start..i].iter().collect();
                let idx = idx_str
                    .parse::<usize>()
                    .map_err(|_| PathParseError::InvalidIndex(idx_start, idx_str))?;

                segments.push(PathSegment::Index(idx));
                i += 1; // Skip closing bracket
            } else if chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '-' {
                // Key segment
                let key_start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '-')
                {
                    i += 1;
                }
                let key: String = chars[key_start..i].iter().collect();
                segments.push(PathSegment::Key(key));
            } else {
                return Err(PathParseError::UnexpectedChar(chars[i], i));
            }
        }

        FieldPath::from_segments(segments).ok_or(PathParseError::Empty)
    }
}
