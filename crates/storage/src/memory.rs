//! In-memory [`CollectionStore`].
//!
//! # Design
//!
//! - DashMap: collection name → `Arc<RwLock<CollectionData>>`, so a
//!   collection handle is cloned out of the map before it is locked and no
//!   DashMap shard lock is held across a collection lock
//! - AtomicU64: one revision counter and one key counter for the whole store
//! - Transactions take `write_arc()` guards on their write set in sorted name
//!   order and keep an undo log; an error from the action rolls every write
//!   back before the guards are released
//!
//! `wait_for_sync` is accepted and ignored: nothing here is durable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{ArcRwLockWriteGuard, RawRwLock, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;
use trellis_core::{
    endpoints_of, Body, CollectionStore, CollectionType, Document, DocumentId, DocumentMeta,
    EdgeDirection, Revision, StoreTransaction, TrellisError, TrellisResult, WriteOptions,
    HANDLE_SEP,
};

use crate::collection::CollectionData;

type SharedCollection = Arc<RwLock<CollectionData>>;
type WriteGuard = ArcRwLockWriteGuard<RawRwLock, CollectionData>;

const SYSTEM_FIELDS: [&str; 5] = ["_id", "_key", "_rev", "_from", "_to"];

/// Thread-safe in-memory document/edge store.
///
/// # Example
///
/// ```
/// use trellis_core::{CollectionStore, CollectionType};
/// use trellis_storage::MemoryStore;
///
/// let store = MemoryStore::shared();
/// store.create_collection("germanCity", CollectionType::Document).unwrap();
/// assert!(store.exists("germanCity"));
/// ```
pub struct MemoryStore {
    collections: DashMap<String, SharedCollection>,
    revision: AtomicU64,
    next_key: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            revision: AtomicU64::new(0),
            next_key: AtomicU64::new(0),
        }
    }

    /// Create an empty store behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Last revision handed out.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision.load(Ordering::Acquire)
    }

    #[inline]
    fn next_revision(&self) -> Revision {
        self.revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn generate_key(&self) -> String {
        (self.next_key.fetch_add(1, Ordering::AcqRel) + 1).to_string()
    }

    fn handle(&self, name: &str) -> TrellisResult<SharedCollection> {
        self.collections
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TrellisError::collection_not_found(name))
    }

    // ========================================================================
    // Write primitives shared by direct calls and transactions
    // ========================================================================

    fn insert_into(
        &self,
        data: &mut CollectionData,
        collection: &str,
        body: Body,
        endpoints: Option<(DocumentId, DocumentId)>,
    ) -> TrellisResult<DocumentMeta> {
        let prepared = Prepared::from_body(body)?;
        let endpoints = match data.kind() {
            CollectionType::Edge => match endpoints.or(prepared.endpoints) {
                Some(pair) => Some(pair),
                None => {
                    return Err(TrellisError::invalid_parameter(format!(
                        "edge document in {} requires _from and _to",
                        collection
                    )))
                }
            },
            CollectionType::Document => {
                if endpoints.is_some() {
                    return Err(TrellisError::invalid_parameter(format!(
                        "{} is not an edge collection",
                        collection
                    )));
                }
                None
            }
        };
        let key = match prepared.key {
            Some(key) => key,
            None => self.generate_key(),
        };
        let id = DocumentId::new(collection, key)?;
        if data.contains(id.key()) {
            return Err(TrellisError::UniqueConstraintViolated { id: id.to_string() });
        }
        let (from, to) = match endpoints {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };
        let doc = Document {
            id,
            rev: self.next_revision(),
            from,
            to,
            body: prepared.body,
        };
        let meta = doc.meta();
        data.put(doc);
        Ok(meta)
    }

    fn rewrite_in(
        &self,
        data: &mut CollectionData,
        id: &DocumentId,
        body: Body,
        options: &WriteOptions,
        merge: bool,
    ) -> TrellisResult<(DocumentMeta, Document)> {
        let current = data
            .get(id.key())
            .ok_or_else(|| TrellisError::document_not_found(id))?;
        check_revision(current, options)?;
        let prepared = Prepared::from_body(body)?;

        let mut next = current.clone();
        if merge {
            for (field, value) in prepared.body {
                if value.is_null() {
                    next.body.remove(&field);
                } else {
                    next.body.insert(field, value);
                }
            }
        } else {
            next.body = prepared.body;
        }
        if data.kind() == CollectionType::Edge {
            if let Some((from, to)) = prepared.endpoints {
                next.from = Some(from);
                next.to = Some(to);
            }
        }
        next.rev = self.next_revision();

        let meta = DocumentMeta {
            id: id.clone(),
            rev: next.rev,
            old_rev: Some(current.rev),
        };
        let old = data.put(next).ok_or_else(|| TrellisError::document_not_found(id))?;
        Ok((meta, old))
    }

    fn remove_from(
        &self,
        data: &mut CollectionData,
        id: &DocumentId,
        options: &WriteOptions,
    ) -> TrellisResult<(DocumentMeta, Document)> {
        let current = data
            .get(id.key())
            .ok_or_else(|| TrellisError::document_not_found(id))?;
        check_revision(current, options)?;
        let old = data
            .take(id.key())
            .ok_or_else(|| TrellisError::document_not_found(id))?;
        let meta = DocumentMeta {
            id: id.clone(),
            rev: self.next_revision(),
            old_rev: Some(old.rev),
        };
        Ok((meta, old))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collections", &self.collections.len())
            .field("revision", &self.revision())
            .finish()
    }
}

impl CollectionStore for MemoryStore {
    fn collection_type(&self, name: &str) -> Option<CollectionType> {
        let handle = self.handle(name).ok()?;
        let kind = handle.read().kind();
        Some(kind)
    }

    fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn create_collection(&self, name: &str, kind: CollectionType) -> TrellisResult<()> {
        if name.is_empty() || name.contains(HANDLE_SEP) {
            return Err(TrellisError::invalid_parameter(format!(
                "invalid collection name: {:?}",
                name
            )));
        }
        match self.collections.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(TrellisError::DuplicateName {
                collection: name.to_string(),
            }),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(CollectionData::new(kind))));
                debug!(target: "trellis::storage", collection = %name, kind = %kind, "Created collection");
                Ok(())
            }
        }
    }

    fn drop_collection(&self, name: &str) -> TrellisResult<()> {
        match self.collections.remove(name) {
            Some(_) => {
                debug!(target: "trellis::storage", collection = %name, "Dropped collection");
                Ok(())
            }
            None => Err(TrellisError::collection_not_found(name)),
        }
    }

    fn document(&self, id: &DocumentId) -> TrellisResult<Option<Document>> {
        let handle = self.handle(id.collection())?;
        let data = handle.read();
        Ok(data.get(id.key()).cloned())
    }

    fn insert(
        &self,
        collection: &str,
        body: Body,
        endpoints: Option<(DocumentId, DocumentId)>,
        _options: &WriteOptions,
    ) -> TrellisResult<DocumentMeta> {
        let handle = self.handle(collection)?;
        let mut data = handle.write();
        self.insert_into(&mut data, collection, body, endpoints)
    }

    fn replace(
        &self,
        id: &DocumentId,
        body: Body,
        options: &WriteOptions,
    ) -> TrellisResult<DocumentMeta> {
        let handle = self.handle(id.collection())?;
        let mut data = handle.write();
        self.rewrite_in(&mut data, id, body, options, false)
            .map(|(meta, _)| meta)
    }

    fn update(
        &self,
        id: &DocumentId,
        patch: Body,
        options: &WriteOptions,
    ) -> TrellisResult<DocumentMeta> {
        let handle = self.handle(id.collection())?;
        let mut data = handle.write();
        self.rewrite_in(&mut data, id, patch, options, true)
            .map(|(meta, _)| meta)
    }

    fn remove(&self, id: &DocumentId, options: &WriteOptions) -> TrellisResult<DocumentMeta> {
        let handle = self.handle(id.collection())?;
        let mut data = handle.write();
        self.remove_from(&mut data, id, options).map(|(meta, _)| meta)
    }

    fn all(&self, collection: &str) -> TrellisResult<Vec<Document>> {
        let handle = self.handle(collection)?;
        let data = handle.read();
        Ok(data.all())
    }

    fn count(&self, collection: &str) -> TrellisResult<usize> {
        let handle = self.handle(collection)?;
        let data = handle.read();
        Ok(data.len())
    }

    fn collection_version(&self, collection: &str) -> TrellisResult<u64> {
        let handle = self.handle(collection)?;
        let version = handle.read().version();
        Ok(version)
    }

    fn edges(
        &self,
        collection: &str,
        vertex: &DocumentId,
        direction: EdgeDirection,
    ) -> TrellisResult<Vec<Document>> {
        let handle = self.handle(collection)?;
        let data = handle.read();
        if data.kind() != CollectionType::Edge {
            return Err(TrellisError::WrongCollectionType {
                collection: collection.to_string(),
                expected: CollectionType::Edge,
                actual: data.kind(),
            });
        }
        Ok(data.edges(vertex, direction))
    }

    fn transaction(
        &self,
        write_collections: &[String],
        action: &mut dyn FnMut(&mut dyn StoreTransaction) -> TrellisResult<()>,
    ) -> TrellisResult<()> {
        let mut names: Vec<&String> = write_collections.iter().collect();
        names.sort();
        names.dedup();

        // Resolve every handle before taking any lock.
        let handles = names
            .iter()
            .map(|name| Ok(((*name).clone(), self.handle(name)?)))
            .collect::<TrellisResult<Vec<_>>>()?;

        let mut locked = FxHashMap::default();
        for (name, handle) in handles {
            locked.insert(name, handle.write_arc());
        }

        let mut txn = MemoryTransaction {
            store: self,
            locked,
            undo: Vec::new(),
        };
        match action(&mut txn) {
            Ok(()) => {
                debug!(
                    target: "trellis::storage",
                    collections = ?write_collections,
                    writes = txn.undo.len(),
                    "Transaction committed"
                );
                Ok(())
            }
            Err(e) => {
                let undone = txn.rollback();
                debug!(
                    target: "trellis::storage",
                    collections = ?write_collections,
                    undone,
                    error = %e,
                    "Transaction rolled back"
                );
                Err(e)
            }
        }
    }
}

// ============================================================================
// Transactions
// ============================================================================

enum Undo {
    /// Undo an insert
    Delete { collection: String, key: String },
    /// Undo a replace or remove
    Restore { collection: String, doc: Document },
}

struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    locked: FxHashMap<String, WriteGuard>,
    undo: Vec<Undo>,
}

impl MemoryTransaction<'_> {
    fn guard(&mut self, collection: &str) -> TrellisResult<&mut WriteGuard> {
        self.locked
            .get_mut(collection)
            .ok_or_else(|| TrellisError::CollectionNotLocked {
                collection: collection.to_string(),
            })
    }

    /// Apply the undo log in reverse. Returns the number of writes undone.
    fn rollback(&mut self) -> usize {
        let undone = self.undo.len();
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Delete { collection, key } => {
                    if let Some(data) = self.locked.get_mut(&collection) {
                        data.take(&key);
                    }
                }
                Undo::Restore { collection, doc } => {
                    if let Some(data) = self.locked.get_mut(&collection) {
                        data.put(doc);
                    }
                }
            }
        }
        undone
    }
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn document(&self, id: &DocumentId) -> TrellisResult<Option<Document>> {
        let data = self
            .locked
            .get(id.collection())
            .ok_or_else(|| TrellisError::CollectionNotLocked {
                collection: id.collection().to_string(),
            })?;
        Ok(data.get(id.key()).cloned())
    }

    fn collection_version(&self, collection: &str) -> TrellisResult<u64> {
        self.locked
            .get(collection)
            .map(|data| data.version())
            .ok_or_else(|| TrellisError::CollectionNotLocked {
                collection: collection.to_string(),
            })
    }

    fn insert(
        &mut self,
        collection: &str,
        body: Body,
        endpoints: Option<(DocumentId, DocumentId)>,
    ) -> TrellisResult<DocumentMeta> {
        let store = self.store;
        let data = self.guard(collection)?;
        let meta = store.insert_into(data, collection, body, endpoints)?;
        self.undo.push(Undo::Delete {
            collection: collection.to_string(),
            key: meta.id.key().to_string(),
        });
        Ok(meta)
    }

    fn replace(
        &mut self,
        id: &DocumentId,
        body: Body,
        options: &WriteOptions,
    ) -> TrellisResult<DocumentMeta> {
        let store = self.store;
        let data = self.guard(id.collection())?;
        let (meta, old) = store.rewrite_in(data, id, body, options, false)?;
        self.undo.push(Undo::Restore {
            collection: id.collection().to_string(),
            doc: old,
        });
        Ok(meta)
    }

    fn remove(&mut self, id: &DocumentId, options: &WriteOptions) -> TrellisResult<DocumentMeta> {
        let store = self.store;
        let data = self.guard(id.collection())?;
        let (meta, old) = store.remove_from(data, id, options)?;
        self.undo.push(Undo::Restore {
            collection: id.collection().to_string(),
            doc: old,
        });
        Ok(meta)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// A write body split into user attributes and interpreted system fields.
struct Prepared {
    key: Option<String>,
    endpoints: Option<(DocumentId, DocumentId)>,
    body: Body,
}

impl Prepared {
    fn from_body(mut body: Body) -> TrellisResult<Self> {
        let endpoints = endpoints_of(&body)?;
        let key = match body.get("_key") {
            Some(Value::String(key)) => Some(key.clone()),
            Some(other) => return Err(TrellisError::invalid_handle(other.to_string())),
            None => None,
        };
        for field in SYSTEM_FIELDS {
            body.remove(field);
        }
        Ok(Self {
            key,
            endpoints,
            body,
        })
    }
}

fn check_revision(current: &Document, options: &WriteOptions) -> TrellisResult<()> {
    match options.if_match {
        Some(expected) if expected != current.rev => Err(TrellisError::RevisionConflict {
            id: current.id.to_string(),
            expected,
            actual: current.rev,
        }),
        _ => Ok(()),
    }
}
