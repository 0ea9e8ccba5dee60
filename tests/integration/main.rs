//! Integration Tests
//!
//! Cross-crate tests organized by dimension:
//! - scenarios: the end-to-end author/book flows, including the
//!   push-then-atomic-push interleaving that historically lost an element
//! - concurrency: composition of atomic updates and conflict detection
//!   under real threads
//! - properties: proptest properties for append composition and
//!   reference normalization

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod properties;
mod scenarios;
