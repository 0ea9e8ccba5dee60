//! Mutation tracking and persistence coordination for docsync
//!
//! This crate is the synchronization engine: it decides, for every field of
//! a loaded document, whether it was locally modified and how, and turns
//! that intent into update instructions that stay consistent with
//! concurrent atomic operations from other actors.
//!
//! - [`MutationLog`]: one tagged record per touched field path
//! - [`normalize_reference`]: reduces pushed references (bare id or full
//!   snapshot) to stored identifiers
//! - [`synthesize`]: mutation log -> atomic operators + full-replace set
//! - [`DocumentInstance`]: an independently owned loaded document
//! - [`Collection`]: the persistence coordinator facade
//!
//! The defect class this design eliminates: synthesizing a wholesale
//! `SetField` from a locally mutated array. A local append always persists
//! as a push of the appended elements alone, so an element appended by
//! another actor between load and persist is never discarded.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod document;
pub mod mutation;
pub mod reference;
pub mod synthesize;

pub use coordinator::Collection;
pub use document::DocumentInstance;
pub use mutation::{MutationLog, MutationRecord};
pub use reference::normalize_reference;
pub use synthesize::{synthesize, SynthesisPlan};
