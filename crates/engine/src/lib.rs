//! Graph engine for Trellis.
//!
//! Graph definitions, the catalog that persists them, runtime graph handles
//! and cascading deletion, all on top of any [`trellis_core::CollectionStore`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;

pub use config::GraphConfig;
pub use graph::{
    CascadeDeletionEngine, CascadePlan, CollectionProxy, EdgeDefinition, EdgeProxy, GraphCatalog,
    GraphDescriptor, GraphHandle, VertexProxy,
};
