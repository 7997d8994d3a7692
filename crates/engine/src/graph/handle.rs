//! Runtime handle bound to one graph.

use std::collections::BTreeMap;
use std::fmt;

use trellis_core::{
    Document, DocumentId, EdgeDirection, RemoveOptions, Revision, TrellisError, TrellisResult,
};

use super::catalog::GraphCatalog;
use super::integrity::CascadeDeletionEngine;
use super::proxy::{EdgeProxy, VertexProxy};
use super::types::{EdgeDefinition, GraphDescriptor};

/// A graph bound to its collections.
///
/// Built from a [`GraphDescriptor`] by [`GraphCatalog::graph`] or
/// [`GraphCatalog::create_graph`]. Every definition change made through the
/// handle rebuilds all proxies from the new descriptor; proxies are only
/// lent out by shared reference, so none outlives a rebind.
///
/// Changes made anywhere else are not seen until [`GraphHandle::reload`].
/// That includes an edit of a shared edge collection through another graph,
/// or through another catalog over the same store: until then this handle's
/// [`EdgeProxy`]s keep checking saves against the definition they were bound
/// with.
#[derive(Debug)]
pub struct GraphHandle {
    catalog: GraphCatalog,
    descriptor: GraphDescriptor,
    edge_collections: BTreeMap<String, EdgeProxy>,
    vertex_collections: BTreeMap<String, VertexProxy>,
}

impl GraphHandle {
    pub(crate) fn bind(catalog: GraphCatalog, descriptor: GraphDescriptor) -> Self {
        let mut handle = Self {
            catalog,
            descriptor: descriptor.clone(),
            edge_collections: BTreeMap::new(),
            vertex_collections: BTreeMap::new(),
        };
        handle.update_bind_collections(descriptor);
        handle
    }

    /// Replace the descriptor and rebuild every proxy from it.
    pub fn update_bind_collections(&mut self, descriptor: GraphDescriptor) {
        let store = self.catalog.store().clone();
        let cascade = CascadeDeletionEngine::new(self.catalog.clone());

        self.edge_collections = descriptor
            .edge_definitions
            .iter()
            .map(|def| {
                (
                    def.collection.clone(),
                    EdgeProxy::new(def.clone(), store.clone(), cascade.clone()),
                )
            })
            .collect();
        self.vertex_collections = descriptor
            .vertex_collections()
            .into_iter()
            .map(|name| {
                let proxy = VertexProxy::new(name.clone(), store.clone(), cascade.clone());
                (name, proxy)
            })
            .collect();

        tracing::debug!(
            target: "trellis::graph",
            graph = %descriptor.name,
            revision = descriptor.revision,
            edge_collections = self.edge_collections.len(),
            vertex_collections = self.vertex_collections.len(),
            "Bound graph collections"
        );
        self.descriptor = descriptor;
    }

    /// Re-read the descriptor from the catalog and rebind.
    ///
    /// Picks up changes made through other handles or other catalogs,
    /// including edits propagated from other graphs sharing an edge
    /// collection.
    pub fn reload(&mut self) -> TrellisResult<()> {
        let descriptor = self.catalog.load(&self.descriptor.name)?;
        self.update_bind_collections(descriptor);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Graph name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Revision of the descriptor this handle is bound to.
    pub fn revision(&self) -> Revision {
        self.descriptor.revision
    }

    /// The bound descriptor.
    pub fn descriptor(&self) -> &GraphDescriptor {
        &self.descriptor
    }

    /// Edge definitions in declaration order.
    pub fn edge_definitions(&self) -> &[EdgeDefinition] {
        &self.descriptor.edge_definitions
    }

    /// Orphan collections, sorted.
    pub fn orphan_collections(&self) -> Vec<String> {
        self.descriptor.orphan_collections.iter().cloned().collect()
    }

    /// Removal options from the catalog's configuration.
    pub fn remove_options(&self) -> RemoveOptions {
        self.catalog.config().remove_options()
    }

    /// Proxy for one of the graph's edge collections.
    pub fn edge_collection(&self, name: &str) -> TrellisResult<&EdgeProxy> {
        self.edge_collections
            .get(name)
            .ok_or_else(|| TrellisError::EdgeCollectionDoesNotExist {
                collection: name.to_string(),
            })
    }

    /// Proxy for one of the graph's vertex collections, orphans included.
    pub fn vertex_collection(&self, name: &str) -> TrellisResult<&VertexProxy> {
        self.vertex_collections
            .get(name)
            .ok_or_else(|| TrellisError::VertexCollectionDoesNotExist {
                collection: name.to_string(),
            })
    }

    /// Edge collection names, sorted.
    pub fn edge_collection_names(&self) -> Vec<&str> {
        self.edge_collections.keys().map(String::as_str).collect()
    }

    /// Vertex collection names, sorted.
    pub fn vertex_collection_names(&self) -> Vec<&str> {
        self.vertex_collections.keys().map(String::as_str).collect()
    }

    // =========================================================================
    // Graph-wide edge queries
    // =========================================================================

    /// Edges of any of the graph's edge collections incident to `vertex`.
    pub fn edges(&self, vertex: &str) -> TrellisResult<Vec<Document>> {
        self.collect_edges(vertex, EdgeDirection::Any)
    }

    /// Edges of the graph ending at `vertex`.
    pub fn in_edges(&self, vertex: &str) -> TrellisResult<Vec<Document>> {
        self.collect_edges(vertex, EdgeDirection::In)
    }

    /// Edges of the graph starting at `vertex`.
    pub fn out_edges(&self, vertex: &str) -> TrellisResult<Vec<Document>> {
        self.collect_edges(vertex, EdgeDirection::Out)
    }

    fn collect_edges(&self, vertex: &str, direction: EdgeDirection) -> TrellisResult<Vec<Document>> {
        let vertex = DocumentId::parse(vertex)?;
        let store = self.catalog.store();
        let mut out = Vec::new();
        for name in self.edge_collections.keys() {
            out.extend(store.edges(name, &vertex, direction)?);
        }
        Ok(out)
    }

    /// The vertex an edge of this graph starts at.
    pub fn from_vertex(&self, edge: &str) -> TrellisResult<Document> {
        let edge = self.edge_document(edge)?;
        let from = edge
            .from
            .ok_or_else(|| TrellisError::invalid_handle(edge.id.to_string()))?;
        self.fetch(&from)
    }

    /// The vertex an edge of this graph ends at.
    pub fn to_vertex(&self, edge: &str) -> TrellisResult<Document> {
        let edge = self.edge_document(edge)?;
        let to = edge
            .to
            .ok_or_else(|| TrellisError::invalid_handle(edge.id.to_string()))?;
        self.fetch(&to)
    }

    fn edge_document(&self, edge: &str) -> TrellisResult<Document> {
        let id = DocumentId::parse(edge)?;
        self.edge_collection(id.collection())?;
        self.fetch(&id)
    }

    fn fetch(&self, id: &DocumentId) -> TrellisResult<Document> {
        self.catalog
            .store()
            .document(id)?
            .ok_or_else(|| TrellisError::document_not_found(id))
    }

    // =========================================================================
    // Definition changes
    // =========================================================================

    /// Add an edge definition. See [`GraphCatalog::extend_edge_definitions`].
    pub fn extend_edge_definitions(&mut self, definition: EdgeDefinition) -> TrellisResult<()> {
        let desc = self
            .catalog
            .extend_edge_definitions(&self.descriptor.name, definition)?;
        self.update_bind_collections(desc);
        Ok(())
    }

    /// Change an edge definition in every graph using it.
    /// See [`GraphCatalog::edit_edge_definitions`].
    pub fn edit_edge_definitions(&mut self, definition: EdgeDefinition) -> TrellisResult<()> {
        let desc = self
            .catalog
            .edit_edge_definitions(&self.descriptor.name, definition)?;
        self.update_bind_collections(desc);
        Ok(())
    }

    /// Remove an edge definition. See [`GraphCatalog::delete_edge_definition`].
    pub fn delete_edge_definition(
        &mut self,
        edge_collection: &str,
        drop_collection: bool,
    ) -> TrellisResult<()> {
        let desc = self.catalog.delete_edge_definition(
            &self.descriptor.name,
            edge_collection,
            drop_collection,
        )?;
        self.update_bind_collections(desc);
        Ok(())
    }

    /// Add an orphan collection. See [`GraphCatalog::add_vertex_collection`].
    pub fn add_vertex_collection(
        &mut self,
        collection: &str,
        create_collection: Option<bool>,
    ) -> TrellisResult<()> {
        let desc = self.catalog.add_vertex_collection(
            &self.descriptor.name,
            collection,
            create_collection,
        )?;
        self.update_bind_collections(desc);
        Ok(())
    }

    /// Remove an orphan collection. See [`GraphCatalog::remove_vertex_collection`].
    pub fn remove_vertex_collection(
        &mut self,
        collection: &str,
        drop_collection: bool,
    ) -> TrellisResult<()> {
        let desc = self.catalog.remove_vertex_collection(
            &self.descriptor.name,
            collection,
            drop_collection,
        )?;
        self.update_bind_collections(desc);
        Ok(())
    }
}

impl fmt::Display for GraphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let defs: Vec<String> = self
            .descriptor
            .edge_definitions
            .iter()
            .map(ToString::to_string)
            .collect();
        let orphans: Vec<&str> = self
            .descriptor
            .orphan_collections
            .iter()
            .map(String::as_str)
            .collect();
        write!(
            f,
            "[ Graph {} EdgeDefinitions: [{}] VertexCollections: [{}] ]",
            self.descriptor.name,
            defs.join(", "),
            orphans.join(", ")
        )
    }
}
