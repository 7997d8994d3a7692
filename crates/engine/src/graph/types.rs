//! Graph definition types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use trellis_core::Revision;

/// A relation: documents in `collection` connect a vertex in one of `from`
/// to a vertex in one of `to`.
///
/// `from` and `to` are kept sorted and de-duplicated, so two definitions
/// describe the same relation exactly when they are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeDefinition {
    /// Edge collection name.
    pub collection: String,
    /// Collections `_from` may point into.
    pub from: Vec<String>,
    /// Collections `_to` may point into.
    pub to: Vec<String>,
}

impl EdgeDefinition {
    /// True if `collection` is one of the `from` or `to` collections.
    pub fn mentions(&self, collection: &str) -> bool {
        self.from.iter().any(|c| c == collection) || self.to.iter().any(|c| c == collection)
    }

    /// True if an edge from a document in `from` to a document in `to` conforms.
    pub fn permits(&self, from: &str, to: &str) -> bool {
        self.from.iter().any(|c| c == from) && self.to.iter().any(|c| c == to)
    }

    /// Union of `from` and `to`, sorted.
    pub fn vertex_collections(&self) -> BTreeSet<&str> {
        self.from
            .iter()
            .chain(self.to.iter())
            .map(String::as_str)
            .collect()
    }
}

impl fmt::Display for EdgeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] -> [{}]",
            self.collection,
            self.from.join(", "),
            self.to.join(", ")
        )
    }
}

/// Persisted description of one named graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDescriptor {
    /// Unique graph name.
    pub name: String,
    /// Edge definitions in declaration order.
    pub edge_definitions: Vec<EdgeDefinition>,
    /// Vertex collections not used by any edge definition.
    pub orphan_collections: BTreeSet<String>,
    /// Revision of the stored descriptor document.
    pub revision: Revision,
}

impl GraphDescriptor {
    /// Definition for `edge_collection`, if this graph uses it.
    pub fn definition(&self, edge_collection: &str) -> Option<&EdgeDefinition> {
        self.edge_definitions
            .iter()
            .find(|d| d.collection == edge_collection)
    }

    /// Names of the edge collections, in declaration order.
    pub fn edge_collections(&self) -> impl Iterator<Item = &str> {
        self.edge_definitions.iter().map(|d| d.collection.as_str())
    }

    /// Vertex collections of all edge definitions plus the orphans.
    pub fn vertex_collections(&self) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = self.orphan_collections.clone();
        for def in &self.edge_definitions {
            out.extend(def.vertex_collections().into_iter().map(str::to_string));
        }
        out
    }

    /// True if `collection` appears anywhere in this graph: as an edge
    /// collection, in a `from`/`to` set, or as an orphan.
    pub fn references(&self, collection: &str) -> bool {
        self.orphan_collections.contains(collection)
            || self
                .edge_definitions
                .iter()
                .any(|d| d.collection == collection || d.mentions(collection))
    }

    /// True if an edge definition other than `except` mentions `collection`.
    pub fn used_by_other_definition(&self, collection: &str, except: &str) -> bool {
        self.edge_definitions
            .iter()
            .filter(|d| d.collection != except)
            .any(|d| d.mentions(collection))
    }
}

/// On-disk form of a descriptor. The graph name is the document key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphRecord {
    #[serde(default)]
    pub edge_definitions: Vec<EdgeDefinition>,
    #[serde(default)]
    pub orphan_collections: Vec<String>,
}

impl GraphRecord {
    pub fn from_descriptor(desc: &GraphDescriptor) -> Self {
        Self {
            edge_definitions: desc.edge_definitions.clone(),
            orphan_collections: desc.orphan_collections.iter().cloned().collect(),
        }
    }

    pub fn into_descriptor(self, name: String, revision: Revision) -> GraphDescriptor {
        GraphDescriptor {
            name,
            edge_definitions: self.edge_definitions,
            orphan_collections: self.orphan_collections.into_iter().collect(),
            revision,
        }
    }
}
