//! Edge-collection index over every graph in the catalog.
//!
//! Maps each edge collection to its one canonical definition and the graphs
//! that use it, and each vertex collection to the edge collections whose
//! definition mentions it. Cross-graph checks and cascade discovery read this
//! instead of scanning every descriptor.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use trellis_core::{TrellisError, TrellisResult};

use super::types::{EdgeDefinition, GraphDescriptor};

/// Definition of one edge collection and the graphs using it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Canonical definition shared by every graph in `graphs`.
    pub definition: EdgeDefinition,
    /// Graphs using this edge collection.
    pub graphs: BTreeSet<String>,
}

/// Catalog-wide index of edge definitions.
#[derive(Debug, Default)]
pub struct EdgeCollectionIndex {
    edges: FxHashMap<String, IndexEntry>,
    by_vertex: FxHashMap<String, BTreeSet<String>>,
}

impl EdgeCollectionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a set of persisted descriptors.
    pub fn build<'a>(descriptors: impl IntoIterator<Item = &'a GraphDescriptor>) -> Self {
        let mut index = Self::new();
        for desc in descriptors {
            index.insert_graph(desc);
        }
        index
    }

    /// Number of indexed edge collections.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True if no edge collection is indexed.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Entry for `edge_collection`.
    pub fn entry(&self, edge_collection: &str) -> Option<&IndexEntry> {
        self.edges.get(edge_collection)
    }

    /// Canonical definition for `edge_collection`.
    pub fn definition(&self, edge_collection: &str) -> Option<&EdgeDefinition> {
        self.edges.get(edge_collection).map(|e| &e.definition)
    }

    /// Fail with `CollectionUseInMultiGraphs` if a graph other than `except`
    /// uses `def.collection` with a different definition.
    pub fn check_compatible(&self, def: &EdgeDefinition, except: Option<&str>) -> TrellisResult<()> {
        if let Some(entry) = self.edges.get(&def.collection) {
            let others = entry
                .graphs
                .iter()
                .any(|g| Some(g.as_str()) != except);
            if others && entry.definition != *def {
                return Err(TrellisError::CollectionUseInMultiGraphs {
                    collection: def.collection.clone(),
                });
            }
        }
        Ok(())
    }

    /// Register every definition of `desc`.
    ///
    /// An entry that already exists keeps its definition.
    pub fn insert_graph(&mut self, desc: &GraphDescriptor) {
        for def in &desc.edge_definitions {
            match self.edges.get_mut(&def.collection) {
                Some(entry) => {
                    if entry.definition != *def {
                        tracing::warn!(
                            target: "trellis::graph",
                            graph = %desc.name,
                            collection = %def.collection,
                            "Conflicting edge definition in stored graph, keeping the first one"
                        );
                    }
                    entry.graphs.insert(desc.name.clone());
                }
                None => {
                    for vertex in def.vertex_collections() {
                        self.by_vertex
                            .entry(vertex.to_string())
                            .or_default()
                            .insert(def.collection.clone());
                    }
                    let mut graphs = BTreeSet::new();
                    graphs.insert(desc.name.clone());
                    self.edges.insert(
                        def.collection.clone(),
                        IndexEntry {
                            definition: def.clone(),
                            graphs,
                        },
                    );
                }
            }
        }
    }

    /// Unregister every definition of `desc`. Entries left without graphs are removed.
    pub fn remove_graph(&mut self, desc: &GraphDescriptor) {
        for def in &desc.edge_definitions {
            let now_unused = match self.edges.get_mut(&def.collection) {
                Some(entry) => {
                    entry.graphs.remove(&desc.name);
                    entry.graphs.is_empty()
                }
                None => false,
            };
            if now_unused {
                if let Some(entry) = self.edges.remove(&def.collection) {
                    self.unlink_vertices(&entry.definition);
                }
            }
        }
    }

    /// Swap the indexed state of a graph from `old` to `new`.
    pub fn replace_graph(&mut self, old: &GraphDescriptor, new: &GraphDescriptor) {
        self.remove_graph(old);
        self.insert_graph(new);
    }

    /// Definitions whose `from` or `to` includes `vertex_collection`, ordered
    /// by edge collection name.
    pub fn definitions_touching(&self, vertex_collection: &str) -> Vec<EdgeDefinition> {
        self.by_vertex
            .get(vertex_collection)
            .map(|edge_collections| {
                edge_collections
                    .iter()
                    .filter_map(|c| self.definition(c).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Graphs using `edge_collection`.
    pub fn graphs_using(&self, edge_collection: &str) -> BTreeSet<String> {
        self.edges
            .get(edge_collection)
            .map(|e| e.graphs.clone())
            .unwrap_or_default()
    }

    fn unlink_vertices(&mut self, def: &EdgeDefinition) {
        for vertex in def.vertex_collections() {
            let empty = match self.by_vertex.get_mut(vertex) {
                Some(set) => {
                    set.remove(&def.collection);
                    set.is_empty()
                }
                None => false,
            };
            if empty {
                self.by_vertex.remove(vertex);
            }
        }
    }
}
