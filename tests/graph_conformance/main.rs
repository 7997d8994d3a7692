//! Graph Conformance Test Suite
//!
//! Exercises the public `trellis` surface end to end against the in-memory
//! store.
//!
//! ## Test Groups
//!
//! - **Definitions**: relation laws, shared definitions
//! - **Catalog**: lifecycle, edit and delete propagation, collection dropping
//! - **Integrity**: guarded edge writes, cascading removal across graphs
//! - **Concurrency**: competing catalog mutations, catalogs sharing a store
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test graph_conformance
//! ```

mod test_utils;

// Definitions
mod relation_laws;

mod edit_propagation;

// Integrity
mod cross_graph_cascade;
mod guarded_edges;
mod routeplanner;

// Concurrency
mod concurrency;
mod shared_store;
