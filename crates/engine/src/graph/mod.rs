//! General graphs over document and edge collections.
//!
//! A graph is a named set of edge definitions plus orphan vertex
//! collections. Edge collections may be shared between graphs as long as
//! every graph agrees on the definition.
//!
//! - [`relation`]: building and normalizing edge definitions
//! - [`GraphCatalog`]: persisted graph descriptors and definition changes
//! - [`GraphHandle`]: a bound graph with guarded collection proxies
//! - [`CascadeDeletionEngine`]: removal of dangling edges across all graphs

pub mod catalog;
pub mod handle;
pub mod index;
pub mod integrity;
pub mod keys;
pub mod proxy;
pub mod relation;
pub mod types;

pub use catalog::GraphCatalog;
pub use handle::GraphHandle;
pub use index::EdgeCollectionIndex;
pub use integrity::{CascadeDeletionEngine, CascadePlan};
pub use proxy::{CollectionProxy, EdgeProxy, VertexProxy};
pub use relation::{
    edge_definitions, extend_edge_definitions_list, relation, sort_edge_definition,
    undirected_relation, validate_edge_definition, Collections,
};
pub use types::{EdgeDefinition, GraphDescriptor};
