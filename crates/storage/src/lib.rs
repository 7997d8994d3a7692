//! Storage layer for Trellis.
//!
//! Provides [`MemoryStore`], a thread-safe in-memory implementation of
//! [`trellis_core::CollectionStore`] with edge endpoint indexes and
//! all-or-nothing transactions. It backs the embedded facade and every test
//! suite; any other store implementing the trait can take its place.

#![warn(missing_docs)]

pub mod collection;
pub mod memory;

pub use collection::CollectionData;
pub use memory::MemoryStore;
