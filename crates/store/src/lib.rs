//! In-memory store adapter for docsync
//!
//! Provides [`MemoryStore`], an implementation of
//! [`StoreAdapter`](docsync_core::StoreAdapter) backed by a single
//! lock-protected map of MessagePack-encoded document records. It exists to
//! give the client crate and the test suite a store with the two guarantees
//! the persistence coordinator needs: indivisible atomic updates and
//! revision-guarded full replaces.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;

pub use memory::MemoryStore;
