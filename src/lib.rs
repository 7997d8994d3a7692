//! Trellis: named graphs over document and edge collections.
//!
//! A graph groups edge definitions (`edge collection: [from] -> [to]`) and
//! orphan vertex collections under a name. Edge collections can be shared
//! between graphs that agree on their definition. Writes made through a
//! graph's proxies keep edges valid: edge endpoints must match the
//! definition, and removing a document removes every edge that would dangle,
//! in every graph.
//!
//! # Quick Start
//!
//! ```
//! use trellis::prelude::*;
//! use serde_json::json;
//!
//! let catalog = trellis::open_in_memory().unwrap();
//! let graph = catalog
//!     .create_graph(
//!         "routeplanner",
//!         edge_definitions([relation("germanHighway", "germanCity", "germanCity").unwrap()]),
//!         vec![],
//!     )
//!     .unwrap();
//!
//! let cities = graph.vertex_collection("germanCity").unwrap();
//! cities.save(json!({"_key": "Berlin"})).unwrap();
//! cities.save(json!({"_key": "Hamburg"})).unwrap();
//! graph
//!     .edge_collection("germanHighway")
//!     .unwrap()
//!     .save("germanCity/Berlin", "germanCity/Hamburg", json!({"distance": 289}))
//!     .unwrap();
//!
//! cities.remove("Berlin", &graph.remove_options()).unwrap();
//! assert!(graph.edges("germanCity/Hamburg").unwrap().is_empty());
//! ```

#![warn(missing_docs)]

use std::sync::Arc;

pub use trellis_core::{
    Body, CollectionStore, CollectionType, Document, DocumentId, DocumentMeta, EdgeDirection,
    RemoveOptions, Revision, StoreTransaction, TrellisError, TrellisResult, WriteOptions,
};
pub use trellis_engine::graph::relation::{
    edge_definitions, extend_edge_definitions_list, relation, undirected_relation, Collections,
};
pub use trellis_engine::{
    CascadeDeletionEngine, CascadePlan, CollectionProxy, EdgeDefinition, EdgeProxy, GraphCatalog,
    GraphConfig, GraphDescriptor, GraphHandle, VertexProxy,
};
pub use trellis_storage::MemoryStore;

/// Open a catalog over a fresh [`MemoryStore`] with default settings.
pub fn open_in_memory() -> TrellisResult<GraphCatalog> {
    GraphCatalog::with_defaults(MemoryStore::shared())
}

/// Open a catalog over `store` with `config`.
pub fn open(store: Arc<dyn CollectionStore>, config: GraphConfig) -> TrellisResult<GraphCatalog> {
    GraphCatalog::open(store, config)
}

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        edge_definitions, extend_edge_definitions_list, relation, undirected_relation,
        CollectionProxy, EdgeDefinition, GraphCatalog, GraphConfig, GraphHandle, RemoveOptions,
        TrellisError, TrellisResult,
    };
}
