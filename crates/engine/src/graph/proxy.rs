//! Guarded collection proxies.
//!
//! A [`GraphHandle`](super::GraphHandle) exposes each of its collections
//! through a proxy. Reads, queries and updates go straight to the store.
//! Saving an edge is checked against the edge collection's definition, and
//! removing any document runs the cascade over every graph.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use trellis_core::{
    endpoints_of, into_body, CollectionStore, CollectionType, Document, DocumentId, DocumentMeta,
    EdgeDirection, RemoveOptions, TrellisError, TrellisResult, WriteOptions,
};

use super::integrity::{CascadeDeletionEngine, CascadePlan};
use super::types::EdgeDefinition;

/// Operations shared by vertex and edge proxies.
///
/// `id` arguments accept a full `collection/key` handle of this collection or
/// a bare key.
pub trait CollectionProxy {
    /// Collection name.
    fn name(&self) -> &str;

    /// Collection kind.
    fn kind(&self) -> CollectionType;

    /// The store behind this proxy.
    fn store(&self) -> &dyn CollectionStore;

    /// Remove a document and every edge depending on it.
    fn remove(&self, id: &str, options: &RemoveOptions) -> TrellisResult<CascadePlan>;

    /// Resolve `id` against this collection.
    fn qualify(&self, id: &str) -> TrellisResult<DocumentId> {
        DocumentId::qualify(self.name(), id)
    }

    /// Fetch a document. Fails with `DocumentNotFound` if absent.
    fn document(&self, id: &str) -> TrellisResult<Document> {
        let id = self.qualify(id)?;
        self.store()
            .document(&id)?
            .ok_or_else(|| TrellisError::document_not_found(&id))
    }

    /// True if the document exists.
    fn exists(&self, id: &str) -> TrellisResult<bool> {
        let id = self.qualify(id)?;
        Ok(self.store().document(&id)?.is_some())
    }

    /// Number of documents.
    fn count(&self) -> TrellisResult<usize> {
        self.store().count(self.name())
    }

    /// All documents, ordered by key.
    fn all(&self) -> TrellisResult<Vec<Document>> {
        self.store().all(self.name())
    }

    /// Documents whose attributes include every attribute of `example`.
    fn by_example(&self, example: Value) -> TrellisResult<Vec<Document>> {
        let example = into_body(example)?;
        Ok(self
            .all()?
            .into_iter()
            .filter(|doc| doc.matches(&example))
            .collect())
    }

    /// Replace a document's attributes.
    fn replace(&self, id: &str, data: Value, options: &WriteOptions) -> TrellisResult<DocumentMeta> {
        let id = self.qualify(id)?;
        self.store().replace(&id, into_body(data)?, options)
    }

    /// Merge attributes into a document.
    fn update(&self, id: &str, data: Value, options: &WriteOptions) -> TrellisResult<DocumentMeta> {
        let id = self.qualify(id)?;
        self.store().update(&id, into_body(data)?, options)
    }
}

// =============================================================================
// VertexProxy
// =============================================================================

/// Proxy for a vertex collection of a graph.
pub struct VertexProxy {
    name: String,
    store: Arc<dyn CollectionStore>,
    cascade: CascadeDeletionEngine,
}

impl VertexProxy {
    pub(crate) fn new(
        name: String,
        store: Arc<dyn CollectionStore>,
        cascade: CascadeDeletionEngine,
    ) -> Self {
        Self {
            name,
            store,
            cascade,
        }
    }

    /// Insert a vertex.
    pub fn save(&self, data: Value) -> TrellisResult<DocumentMeta> {
        self.store
            .insert(&self.name, into_body(data)?, None, &WriteOptions::default())
    }
}

impl CollectionProxy for VertexProxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CollectionType {
        CollectionType::Document
    }

    fn store(&self) -> &dyn CollectionStore {
        self.store.as_ref()
    }

    fn remove(&self, id: &str, options: &RemoveOptions) -> TrellisResult<CascadePlan> {
        let id = self.qualify(id)?;
        self.cascade.remove_vertex(&id, options)
    }
}

impl fmt::Debug for VertexProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexProxy").field("name", &self.name).finish()
    }
}

// =============================================================================
// EdgeProxy
// =============================================================================

/// Proxy for an edge collection of a graph, bound to its definition.
pub struct EdgeProxy {
    definition: EdgeDefinition,
    store: Arc<dyn CollectionStore>,
    cascade: CascadeDeletionEngine,
}

impl EdgeProxy {
    pub(crate) fn new(
        definition: EdgeDefinition,
        store: Arc<dyn CollectionStore>,
        cascade: CascadeDeletionEngine,
    ) -> Self {
        Self {
            definition,
            store,
            cascade,
        }
    }

    /// The definition saves are checked against.
    pub fn definition(&self) -> &EdgeDefinition {
        &self.definition
    }

    /// Insert an edge from `from` to `to`.
    ///
    /// Fails with `InvalidDocumentHandle` if either endpoint is not a
    /// `collection/key` handle and with `InvalidEdge` if the endpoint
    /// collections do not conform to the definition. Nothing is written on
    /// failure.
    pub fn save(&self, from: &str, to: &str, data: Value) -> TrellisResult<DocumentMeta> {
        let from = DocumentId::parse(from)?;
        let to = DocumentId::parse(to)?;
        self.save_checked(from, to, into_body(data)?)
    }

    /// Insert an edge whose `_from` and `_to` are attributes of `doc`.
    pub fn save_document(&self, doc: Value) -> TrellisResult<DocumentMeta> {
        let body = into_body(doc)?;
        let (from, to) = endpoints_of(&body)?
            .ok_or_else(|| TrellisError::invalid_handle("edge without _from and _to"))?;
        self.save_checked(from, to, body)
    }

    fn save_checked(
        &self,
        from: DocumentId,
        to: DocumentId,
        body: trellis_core::Body,
    ) -> TrellisResult<DocumentMeta> {
        if !self.definition.permits(from.collection(), to.collection()) {
            return Err(TrellisError::InvalidEdge {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.store.insert(
            &self.definition.collection,
            body,
            Some((from, to)),
            &WriteOptions::default(),
        )
    }

    /// Edges of this collection incident to `vertex`.
    pub fn edges(&self, vertex: &str) -> TrellisResult<Vec<Document>> {
        self.edges_in_direction(vertex, EdgeDirection::Any)
    }

    /// Edges of this collection ending at `vertex`.
    pub fn in_edges(&self, vertex: &str) -> TrellisResult<Vec<Document>> {
        self.edges_in_direction(vertex, EdgeDirection::In)
    }

    /// Edges of this collection starting at `vertex`.
    pub fn out_edges(&self, vertex: &str) -> TrellisResult<Vec<Document>> {
        self.edges_in_direction(vertex, EdgeDirection::Out)
    }

    fn edges_in_direction(
        &self,
        vertex: &str,
        direction: EdgeDirection,
    ) -> TrellisResult<Vec<Document>> {
        let vertex = DocumentId::parse(vertex)?;
        self.store
            .edges(&self.definition.collection, &vertex, direction)
    }
}

impl CollectionProxy for EdgeProxy {
    fn name(&self) -> &str {
        &self.definition.collection
    }

    fn kind(&self) -> CollectionType {
        CollectionType::Edge
    }

    fn store(&self) -> &dyn CollectionStore {
        self.store.as_ref()
    }

    fn remove(&self, id: &str, options: &RemoveOptions) -> TrellisResult<CascadePlan> {
        let id = self.qualify(id)?;
        self.cascade.remove_edge(&id, options)
    }
}

impl fmt::Debug for EdgeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeProxy")
            .field("definition", &self.definition)
            .finish()
    }
}
