//! Graph catalog: create, load, drop and edit named graphs.
//!
//! Each graph is one descriptor document in the graphs collection, keyed by
//! graph name. The catalog also keeps an [`EdgeCollectionIndex`] over all
//! descriptors so that the one-definition-per-edge-collection rule is checked
//! without scanning the whole catalog on every mutation.
//!
//! The index is stamped with the graphs collection's
//! [`collection_version`](CollectionStore::collection_version). Every check
//! and every index read compares the stamp first and rebuilds from the stored
//! descriptors when another writer, such as a second catalog over the same
//! store, changed them.
//!
//! Every mutation validates first and writes second. Mutations are serialized
//! by a catalog-wide lock. The descriptor write runs in a transaction that
//! fails with `RevisionConflict` if the graphs collection changed after the
//! checks ran, so a concurrent writer outside this catalog never slips past
//! them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, info, warn};
use trellis_core::{
    into_body, CollectionStore, CollectionType, Document, DocumentId, StoreTransaction,
    TrellisError, TrellisResult, WriteOptions,
};

use super::handle::GraphHandle;
use super::index::EdgeCollectionIndex;
use super::keys::{validate_collection_name, validate_graph_name};
use super::relation::{sort_edge_definition, validate_edge_definition};
use super::types::{EdgeDefinition, GraphDescriptor, GraphRecord};
use crate::config::GraphConfig;

struct CatalogInner {
    store: Arc<dyn CollectionStore>,
    config: GraphConfig,
    index: RwLock<IndexState>,
    mutation: Mutex<()>,
}

struct IndexState {
    index: EdgeCollectionIndex,
    /// Graphs collection version the index reflects, `None` before the first build
    version: Option<u64>,
}

/// Registry of named graphs over a [`CollectionStore`].
///
/// Cheap to clone; clones share the index and the mutation lock. Separate
/// catalogs over one store stay consistent through the stored descriptors.
#[derive(Clone)]
pub struct GraphCatalog {
    inner: Arc<CatalogInner>,
}

impl fmt::Debug for GraphCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCatalog")
            .field("graphs_collection", &self.inner.config.graphs_collection)
            .field("edge_collections", &self.inner.index.read().index.len())
            .finish()
    }
}

impl GraphCatalog {
    /// Open a catalog, creating the graphs collection if needed and indexing
    /// every stored descriptor.
    pub fn open(store: Arc<dyn CollectionStore>, config: GraphConfig) -> TrellisResult<Self> {
        config.validate()?;
        let graphs = config.graphs_collection.as_str();
        match store.collection_type(graphs) {
            None => match store.create_collection(graphs, CollectionType::Document) {
                Ok(()) | Err(TrellisError::DuplicateName { .. }) => {}
                Err(e) => return Err(e),
            },
            Some(CollectionType::Document) => {}
            Some(actual) => {
                return Err(TrellisError::WrongCollectionType {
                    collection: graphs.to_string(),
                    expected: CollectionType::Document,
                    actual,
                })
            }
        }

        let catalog = Self {
            inner: Arc::new(CatalogInner {
                store,
                config,
                index: RwLock::new(IndexState {
                    index: EdgeCollectionIndex::new(),
                    version: None,
                }),
                mutation: Mutex::new(()),
            }),
        };
        catalog.reload_index()?;
        Ok(catalog)
    }

    /// Open with [`GraphConfig::default`].
    pub fn with_defaults(store: Arc<dyn CollectionStore>) -> TrellisResult<Self> {
        Self::open(store, GraphConfig::default())
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn CollectionStore> {
        &self.inner.store
    }

    /// Settings this catalog was opened with.
    pub fn config(&self) -> &GraphConfig {
        &self.inner.config
    }

    fn graphs_collection(&self) -> &str {
        &self.inner.config.graphs_collection
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// True if a graph with this name exists.
    pub fn exists(&self, name: &str) -> TrellisResult<bool> {
        match DocumentId::new(self.graphs_collection(), name) {
            Ok(id) => Ok(self.inner.store.document(&id)?.is_some()),
            Err(_) => Ok(false),
        }
    }

    /// Names of all graphs, sorted.
    pub fn list(&self) -> TrellisResult<Vec<String>> {
        let docs = self.inner.store.all(self.graphs_collection())?;
        let mut names: Vec<String> = docs.iter().map(|d| d.key().to_string()).collect();
        names.sort();
        Ok(names)
    }

    /// Descriptors of all graphs, sorted by name.
    pub fn list_descriptors(&self) -> TrellisResult<Vec<GraphDescriptor>> {
        let mut descriptors = self
            .inner
            .store
            .all(self.graphs_collection())?
            .into_iter()
            .map(descriptor_from_document)
            .collect::<TrellisResult<Vec<_>>>()?;
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(descriptors)
    }

    fn read_descriptor(&self, name: &str) -> TrellisResult<GraphDescriptor> {
        let id = DocumentId::new(self.graphs_collection(), name)
            .map_err(|_| TrellisError::graph_not_found(name))?;
        match self.inner.store.document(&id)? {
            Some(doc) => descriptor_from_document(doc),
            None => Err(TrellisError::graph_not_found(name)),
        }
    }

    /// Load a graph descriptor.
    ///
    /// Fails with `GraphNotFound` if absent and `CollectionNotFound` if a
    /// collection of one of its edge definitions no longer exists.
    pub fn load(&self, name: &str) -> TrellisResult<GraphDescriptor> {
        let desc = self.read_descriptor(name)?;
        for def in &desc.edge_definitions {
            let names = std::iter::once(def.collection.as_str()).chain(def.vertex_collections());
            for collection in names {
                if !self.inner.store.exists(collection) {
                    return Err(TrellisError::collection_not_found(collection));
                }
            }
        }
        Ok(desc)
    }

    /// Load a graph and bind a handle to it.
    pub fn graph(&self, name: &str) -> TrellisResult<GraphHandle> {
        let desc = self.load(name)?;
        Ok(GraphHandle::bind(self.clone(), desc))
    }

    /// Canonical definition of an edge collection, if any graph uses it.
    pub fn definition(&self, edge_collection: &str) -> TrellisResult<Option<EdgeDefinition>> {
        self.refresh_index()?;
        Ok(self.inner.index.read().index.definition(edge_collection).cloned())
    }

    /// Every definition, across all graphs, whose `from` or `to` includes
    /// `vertex_collection`.
    pub fn definitions_touching(
        &self,
        vertex_collection: &str,
    ) -> TrellisResult<Vec<EdgeDefinition>> {
        self.refresh_index()?;
        Ok(self.inner.index.read().index.definitions_touching(vertex_collection))
    }

    /// Graphs using `edge_collection`.
    pub fn graphs_using(&self, edge_collection: &str) -> TrellisResult<BTreeSet<String>> {
        self.refresh_index()?;
        Ok(self.inner.index.read().index.graphs_using(edge_collection))
    }

    /// Rebuild the edge-collection index from the stored descriptors.
    pub fn reload_index(&self) -> TrellisResult<()> {
        let version = self.inner.store.collection_version(self.graphs_collection())?;
        self.rebuild_index(version)
    }

    /// Rebuild the index unless it already reflects the stored descriptors.
    /// Returns the graphs collection version the index was checked against.
    fn refresh_index(&self) -> TrellisResult<u64> {
        let version = self.inner.store.collection_version(self.graphs_collection())?;
        if self.inner.index.read().version != Some(version) {
            self.rebuild_index(version)?;
        }
        Ok(version)
    }

    /// The descriptors are read after `version`, so a write in between leaves
    /// the stamp behind the contents and the next refresh rebuilds again.
    fn rebuild_index(&self, version: u64) -> TrellisResult<()> {
        let descriptors = self.list_descriptors()?;
        let index = EdgeCollectionIndex::build(&descriptors);
        debug!(
            target: "trellis::graph",
            graphs = descriptors.len(),
            edge_collections = index.len(),
            version,
            "Rebuilt edge collection index"
        );
        *self.inner.index.write() = IndexState {
            index,
            version: Some(version),
        };
        Ok(())
    }

    // =========================================================================
    // Graph lifecycle
    // =========================================================================

    /// Create a graph.
    ///
    /// Checks run in this order and nothing is written until all pass:
    /// graph name, definition shape, reserved graphs collection, duplicate
    /// graph, edge collection used twice, conflicting definition in another
    /// graph, collection types.
    /// Missing collections are then created and the descriptor stored.
    pub fn create(
        &self,
        name: &str,
        edge_definitions: Vec<EdgeDefinition>,
        orphan_collections: Vec<String>,
    ) -> TrellisResult<GraphDescriptor> {
        validate_graph_name(name)?;
        let defs = canonical_definitions(edge_definitions)?;
        for orphan in &orphan_collections {
            validate_collection_name(orphan)?;
        }
        for def in &defs {
            self.check_definition_collections(def)?;
        }
        for orphan in &orphan_collections {
            self.check_not_graphs_collection(orphan)?;
        }

        let _guard = self.inner.mutation.lock();
        let expected = self.refresh_index()?;

        if self.exists(name)? {
            return Err(TrellisError::GraphDuplicate {
                graph: name.to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for def in &defs {
            if !seen.insert(def.collection.as_str()) {
                return Err(TrellisError::CollectionMultiUse {
                    collection: def.collection.clone(),
                });
            }
        }

        {
            let state = self.inner.index.read();
            for def in &defs {
                state.index.check_compatible(def, None)?;
            }
        }

        let orphans: BTreeSet<String> = orphan_collections
            .into_iter()
            .filter(|o| !defs.iter().any(|d| d.mentions(o)))
            .collect();

        self.check_collection_types(&defs, &orphans)?;
        self.ensure_collections(&defs, &orphans)?;

        let desc = GraphDescriptor {
            name: name.to_string(),
            edge_definitions: defs,
            orphan_collections: orphans,
            revision: 0,
        };
        let mut body = into_body(serde_json::to_value(GraphRecord::from_descriptor(&desc))?)?;
        body.insert("_key".to_string(), Value::String(name.to_string()));
        let graphs = self.graphs_collection();
        let mut revision = 0;
        let version = self.commit(expected, &mut |txn| {
            let meta = txn.insert(graphs, body.clone(), None).map_err(|e| match e {
                TrellisError::UniqueConstraintViolated { .. } => TrellisError::GraphDuplicate {
                    graph: name.to_string(),
                },
                other => other,
            })?;
            revision = meta.rev;
            Ok(())
        })?;
        let desc = GraphDescriptor { revision, ..desc };

        self.advance_index(expected, version, |index| index.insert_graph(&desc));
        info!(
            target: "trellis::graph",
            graph = %name,
            edge_definitions = desc.edge_definitions.len(),
            orphans = desc.orphan_collections.len(),
            "Created graph"
        );
        Ok(desc)
    }

    /// Create a graph and bind a handle to it.
    pub fn create_graph(
        &self,
        name: &str,
        edge_definitions: Vec<EdgeDefinition>,
        orphan_collections: Vec<String>,
    ) -> TrellisResult<GraphHandle> {
        let desc = self.create(name, edge_definitions, orphan_collections)?;
        Ok(GraphHandle::bind(self.clone(), desc))
    }

    /// Drop a graph.
    ///
    /// With `drop_collections`, every collection the graph references is
    /// dropped unless another graph still references it.
    pub fn drop(&self, name: &str, drop_collections: bool) -> TrellisResult<()> {
        let _guard = self.inner.mutation.lock();
        let expected = self.refresh_index()?;
        let desc = self.read_descriptor(name)?;

        let id = DocumentId::new(self.graphs_collection(), name)?;
        let version = self.commit(expected, &mut |txn| {
            txn.remove(&id, &WriteOptions::new().if_match(desc.revision))?;
            Ok(())
        })?;
        self.advance_index(expected, version, |index| index.remove_graph(&desc));

        if drop_collections {
            let remaining = self.list_descriptors()?;
            let mut candidates: BTreeSet<String> =
                desc.edge_collections().map(str::to_string).collect();
            candidates.extend(desc.vertex_collections());
            for collection in candidates {
                self.drop_if_unreferenced(&collection, &remaining)?;
            }
        }

        info!(target: "trellis::graph", graph = %name, drop_collections, "Dropped graph");
        Ok(())
    }

    // =========================================================================
    // Edge definition changes
    // =========================================================================

    /// Add an edge definition to a graph.
    ///
    /// The definition's vertex collections stop being orphans of the graph.
    pub fn extend_edge_definitions(
        &self,
        graph: &str,
        definition: EdgeDefinition,
    ) -> TrellisResult<GraphDescriptor> {
        validate_edge_definition(&definition)?;
        let def = sort_edge_definition(definition);
        self.check_definition_collections(&def)?;

        let _guard = self.inner.mutation.lock();
        let expected = self.refresh_index()?;
        let old = self.read_descriptor(graph)?;
        if old.definition(&def.collection).is_some() {
            return Err(TrellisError::CollectionMultiUse {
                collection: def.collection.clone(),
            });
        }
        self.inner.index.read().index.check_compatible(&def, None)?;
        self.check_collection_types(std::slice::from_ref(&def), &BTreeSet::new())?;
        self.ensure_collections(std::slice::from_ref(&def), &BTreeSet::new())?;

        let mut next = old.clone();
        next.orphan_collections.retain(|o| !def.mentions(o));
        next.edge_definitions.push(def);

        let (mut written, version) = self.write_descriptors(expected, vec![next])?;
        let desc = written.remove(0);
        self.advance_index(expected, version, |index| index.replace_graph(&old, &desc));
        info!(target: "trellis::graph", graph = %graph, "Extended edge definitions");
        Ok(desc)
    }

    /// Change the `from`/`to` sets of an edge collection the graph uses.
    ///
    /// The change is applied to every graph using the edge collection. In each
    /// of them, collections of the new definition leave the orphan set and
    /// collections of the old one that no other definition uses join it.
    /// Returns the updated descriptor of `graph`.
    pub fn edit_edge_definitions(
        &self,
        graph: &str,
        definition: EdgeDefinition,
    ) -> TrellisResult<GraphDescriptor> {
        validate_edge_definition(&definition)?;
        let def = sort_edge_definition(definition);
        self.check_definition_collections(&def)?;

        let _guard = self.inner.mutation.lock();
        let expected = self.refresh_index()?;
        let current = self.read_descriptor(graph)?;
        let old_def = current
            .definition(&def.collection)
            .cloned()
            .ok_or_else(|| TrellisError::EdgeCollectionNotUsed {
                collection: def.collection.clone(),
            })?;
        self.check_collection_types(std::slice::from_ref(&def), &BTreeSet::new())?;

        let new_collections = def.vertex_collections();
        let possible_orphans: Vec<String> = old_def
            .vertex_collections()
            .into_iter()
            .filter(|c| !new_collections.contains(c))
            .map(str::to_string)
            .collect();

        let affected: Vec<GraphDescriptor> = self
            .list_descriptors()?
            .into_iter()
            .filter(|d| d.definition(&def.collection).is_some())
            .collect();

        let updated: Vec<GraphDescriptor> = affected
            .iter()
            .map(|d| apply_edit(d, &def, &possible_orphans))
            .collect();

        self.ensure_collections(std::slice::from_ref(&def), &BTreeSet::new())?;
        let (written, version) = self.write_descriptors(expected, updated)?;

        self.advance_index(expected, version, |index| {
            for old in &affected {
                index.remove_graph(old);
            }
            for desc in &written {
                index.insert_graph(desc);
            }
        });

        info!(
            target: "trellis::graph",
            graph = %graph,
            collection = %def.collection,
            affected = written.len(),
            "Edited edge definition"
        );
        written
            .into_iter()
            .find(|d| d.name == graph)
            .ok_or_else(|| TrellisError::graph_not_found(graph))
    }

    /// Remove the definition of `edge_collection`.
    ///
    /// Every graph using the edge collection loses the definition; vertex
    /// collections no remaining definition of a graph uses become its
    /// orphans. With `drop_collection`, the edge collection is dropped when no
    /// graph references it any more. Returns the updated descriptor of `graph`.
    pub fn delete_edge_definition(
        &self,
        graph: &str,
        edge_collection: &str,
        drop_collection: bool,
    ) -> TrellisResult<GraphDescriptor> {
        let _guard = self.inner.mutation.lock();
        let expected = self.refresh_index()?;
        let current = self.read_descriptor(graph)?;
        let removed = current
            .definition(edge_collection)
            .cloned()
            .ok_or_else(|| TrellisError::EdgeCollectionNotUsed {
                collection: edge_collection.to_string(),
            })?;

        let affected: Vec<GraphDescriptor> = self
            .list_descriptors()?
            .into_iter()
            .filter(|d| d.definition(edge_collection) == Some(&removed))
            .collect();
        let updated: Vec<GraphDescriptor> =
            affected.iter().map(|d| apply_delete(d, &removed)).collect();
        let (written, version) = self.write_descriptors(expected, updated)?;

        self.advance_index(expected, version, |index| {
            for (old, new) in affected.iter().zip(written.iter()) {
                index.replace_graph(old, new);
            }
        });

        if drop_collection {
            let remaining = self.list_descriptors()?;
            self.drop_if_unreferenced(edge_collection, &remaining)?;
        }

        info!(
            target: "trellis::graph",
            graph = %graph,
            collection = %edge_collection,
            affected = written.len(),
            "Deleted edge definition"
        );
        written
            .into_iter()
            .find(|d| d.name == graph)
            .ok_or_else(|| TrellisError::graph_not_found(graph))
    }

    // =========================================================================
    // Orphan collections
    // =========================================================================

    /// Register `collection` as an orphan vertex collection of `graph`.
    ///
    /// `create_collection` defaults to the catalog's `create_collections`.
    pub fn add_vertex_collection(
        &self,
        graph: &str,
        collection: &str,
        create_collection: Option<bool>,
    ) -> TrellisResult<GraphDescriptor> {
        validate_collection_name(collection)?;
        self.check_not_graphs_collection(collection)?;
        let create = create_collection.unwrap_or(self.inner.config.create_collections);

        let _guard = self.inner.mutation.lock();
        let expected = self.refresh_index()?;
        let old = self.read_descriptor(graph)?;

        let missing = match self.inner.store.collection_type(collection) {
            None if create => true,
            None => {
                return Err(TrellisError::VertexCollectionDoesNotExist {
                    collection: collection.to_string(),
                })
            }
            Some(CollectionType::Document) => false,
            Some(actual) => {
                return Err(TrellisError::WrongCollectionType {
                    collection: collection.to_string(),
                    expected: CollectionType::Document,
                    actual,
                })
            }
        };
        if old.edge_definitions.iter().any(|d| d.mentions(collection)) {
            return Err(TrellisError::CollectionUsedInEdgeDefinition {
                collection: collection.to_string(),
            });
        }
        if old.orphan_collections.contains(collection) {
            return Err(TrellisError::CollectionUsedInOrphans {
                collection: collection.to_string(),
            });
        }

        if missing {
            self.ensure_collection(collection, CollectionType::Document)?;
        }
        let mut next = old.clone();
        next.orphan_collections.insert(collection.to_string());
        let (mut written, version) = self.write_descriptors(expected, vec![next])?;
        let desc = written.remove(0);
        self.advance_index(expected, version, |index| index.replace_graph(&old, &desc));
        info!(target: "trellis::graph", graph = %graph, collection = %collection, "Added vertex collection");
        Ok(desc)
    }

    /// Remove an orphan vertex collection from `graph`.
    ///
    /// With `drop_collection`, the collection is dropped unless another graph
    /// still references it.
    pub fn remove_vertex_collection(
        &self,
        graph: &str,
        collection: &str,
        drop_collection: bool,
    ) -> TrellisResult<GraphDescriptor> {
        let _guard = self.inner.mutation.lock();
        let expected = self.refresh_index()?;
        let old = self.read_descriptor(graph)?;

        if !self.inner.store.exists(collection) {
            return Err(TrellisError::VertexCollectionDoesNotExist {
                collection: collection.to_string(),
            });
        }
        if !old.orphan_collections.contains(collection) {
            return Err(TrellisError::NotInOrphanCollection {
                collection: collection.to_string(),
            });
        }

        let mut next = old.clone();
        next.orphan_collections.remove(collection);
        let (mut written, version) = self.write_descriptors(expected, vec![next])?;
        let desc = written.remove(0);
        self.advance_index(expected, version, |index| index.replace_graph(&old, &desc));

        if drop_collection {
            let remaining = self.list_descriptors()?;
            self.drop_if_unreferenced(collection, &remaining)?;
        }
        info!(target: "trellis::graph", graph = %graph, collection = %collection, "Removed vertex collection");
        Ok(desc)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// The graphs collection holds descriptors only.
    fn check_not_graphs_collection(&self, collection: &str) -> TrellisResult<()> {
        if collection == self.graphs_collection() {
            return Err(TrellisError::invalid_parameter(format!(
                "{} holds graph descriptors and cannot be part of a graph",
                collection
            )));
        }
        Ok(())
    }

    fn check_definition_collections(&self, def: &EdgeDefinition) -> TrellisResult<()> {
        self.check_not_graphs_collection(&def.collection)?;
        for vertex in def.vertex_collections() {
            self.check_not_graphs_collection(vertex)?;
        }
        Ok(())
    }

    /// Existing edge collections must be edges, existing orphans documents.
    fn check_collection_types(
        &self,
        defs: &[EdgeDefinition],
        orphans: &BTreeSet<String>,
    ) -> TrellisResult<()> {
        for def in defs {
            if let Some(actual) = self.inner.store.collection_type(&def.collection) {
                if actual != CollectionType::Edge {
                    return Err(TrellisError::WrongCollectionType {
                        collection: def.collection.clone(),
                        expected: CollectionType::Edge,
                        actual,
                    });
                }
            }
        }
        for orphan in orphans {
            let actual = if defs.iter().any(|d| &d.collection == orphan) {
                Some(CollectionType::Edge)
            } else {
                self.inner.store.collection_type(orphan)
            };
            if let Some(actual) = actual {
                if actual != CollectionType::Document {
                    return Err(TrellisError::WrongCollectionType {
                        collection: orphan.clone(),
                        expected: CollectionType::Document,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }

    /// Create missing collections: edge collections first, then vertices.
    fn ensure_collections(
        &self,
        defs: &[EdgeDefinition],
        orphans: &BTreeSet<String>,
    ) -> TrellisResult<()> {
        for def in defs {
            self.ensure_collection(&def.collection, CollectionType::Edge)?;
        }
        for def in defs {
            for vertex in def.vertex_collections() {
                self.ensure_collection(vertex, CollectionType::Document)?;
            }
        }
        for orphan in orphans {
            self.ensure_collection(orphan, CollectionType::Document)?;
        }
        Ok(())
    }

    fn ensure_collection(&self, name: &str, kind: CollectionType) -> TrellisResult<()> {
        if self.inner.store.exists(name) {
            return Ok(());
        }
        match self.inner.store.create_collection(name, kind) {
            Ok(()) | Err(TrellisError::DuplicateName { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Drop `collection` unless one of `remaining` references it.
    fn drop_if_unreferenced(
        &self,
        collection: &str,
        remaining: &[GraphDescriptor],
    ) -> TrellisResult<()> {
        if collection == self.graphs_collection() {
            warn!(
                target: "trellis::graph",
                collection = %collection,
                "Not dropping the graphs collection"
            );
            return Ok(());
        }
        if let Some(user) = remaining.iter().find(|d| d.references(collection)) {
            warn!(
                target: "trellis::graph",
                collection = %collection,
                graph = %user.name,
                "Collection still used by another graph, not dropping"
            );
            return Ok(());
        }
        if self.inner.store.exists(collection) {
            self.inner.store.drop_collection(collection)?;
            debug!(target: "trellis::graph", collection = %collection, "Dropped graph collection");
        }
        Ok(())
    }

    /// Replace descriptor documents in one commit, each guarded by its
    /// revision. Returns the descriptors with their new revisions and the
    /// graphs collection version after the write.
    fn write_descriptors(
        &self,
        expected: u64,
        descriptors: Vec<GraphDescriptor>,
    ) -> TrellisResult<(Vec<GraphDescriptor>, u64)> {
        let mut bodies = Vec::with_capacity(descriptors.len());
        for desc in &descriptors {
            let id = DocumentId::new(self.graphs_collection(), desc.name.as_str())?;
            let body = into_body(serde_json::to_value(GraphRecord::from_descriptor(desc))?)?;
            bodies.push((id, body, desc.revision));
        }

        let mut revisions = Vec::with_capacity(bodies.len());
        let version = self.commit(expected, &mut |txn| {
            revisions.clear();
            for (id, body, rev) in &bodies {
                let meta = txn.replace(id, body.clone(), &WriteOptions::new().if_match(*rev))?;
                revisions.push(meta.rev);
            }
            Ok(())
        })?;

        let written = descriptors
            .into_iter()
            .zip(revisions)
            .map(|(desc, revision)| GraphDescriptor { revision, ..desc })
            .collect();
        Ok((written, version))
    }

    /// Run `write` in a transaction on the graphs collection.
    ///
    /// Fails with `RevisionConflict` when the collection is no longer at
    /// `expected`, the version the caller's checks ran against. Returns the
    /// version after the write.
    fn commit(
        &self,
        expected: u64,
        write: &mut dyn FnMut(&mut dyn StoreTransaction) -> TrellisResult<()>,
    ) -> TrellisResult<u64> {
        let graphs = self.graphs_collection().to_string();
        let mut version = expected;
        self.inner
            .store
            .transaction(std::slice::from_ref(&graphs), &mut |txn| {
                let actual = txn.collection_version(&graphs)?;
                if actual != expected {
                    return Err(TrellisError::RevisionConflict {
                        id: graphs.clone(),
                        expected,
                        actual,
                    });
                }
                write(&mut *txn)?;
                version = txn.collection_version(&graphs)?;
                Ok(())
            })?;
        Ok(version)
    }

    /// Apply this catalog's own write to the index and stamp it with
    /// `version`. If the index moved off `expected` meanwhile it is left for
    /// the next refresh to rebuild.
    fn advance_index(
        &self,
        expected: u64,
        version: u64,
        update: impl FnOnce(&mut EdgeCollectionIndex),
    ) {
        let mut state = self.inner.index.write();
        if state.version == Some(expected) {
            update(&mut state.index);
            state.version = Some(version);
        }
    }
}

fn canonical_definitions(defs: Vec<EdgeDefinition>) -> TrellisResult<Vec<EdgeDefinition>> {
    defs.into_iter()
        .map(|def| {
            validate_edge_definition(&def)?;
            Ok(sort_edge_definition(def))
        })
        .collect()
}

fn descriptor_from_document(doc: Document) -> TrellisResult<GraphDescriptor> {
    let name = doc.key().to_string();
    let record: GraphRecord = serde_json::from_value(Value::Object(doc.body))?;
    let mut desc = record.into_descriptor(name, doc.rev);
    desc.edge_definitions = desc
        .edge_definitions
        .into_iter()
        .map(sort_edge_definition)
        .collect();
    Ok(desc)
}

/// `desc` with the definition of `def.collection` replaced by `def`.
fn apply_edit(
    desc: &GraphDescriptor,
    def: &EdgeDefinition,
    possible_orphans: &[String],
) -> GraphDescriptor {
    let mut next = desc.clone();
    for slot in next.edge_definitions.iter_mut() {
        if slot.collection == def.collection {
            *slot = def.clone();
        }
    }
    next.orphan_collections.retain(|o| !def.mentions(o));
    for candidate in possible_orphans {
        if !next.used_by_other_definition(candidate, &def.collection) {
            next.orphan_collections.insert(candidate.clone());
        }
    }
    next
}

/// `desc` without the definition `removed`.
fn apply_delete(desc: &GraphDescriptor, removed: &EdgeDefinition) -> GraphDescriptor {
    let mut next = desc.clone();
    next.edge_definitions
        .retain(|d| d.collection != removed.collection);
    for candidate in removed.vertex_collections() {
        if !next.edge_definitions.iter().any(|d| d.mentions(candidate)) {
            next.orphan_collections.insert(candidate.to_string());
        }
    }
    next
}
