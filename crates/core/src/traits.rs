//! The document/edge store contract the graph engine is built on.
//!
//! The engine never touches storage directly: every read, write and
//! transaction goes through [`CollectionStore`]. Both traits are object safe
//! so the catalog can hold an `Arc<dyn CollectionStore>`.

use crate::error::TrellisResult;
use crate::types::{
    Body, CollectionType, Document, DocumentId, DocumentMeta, EdgeDirection, WriteOptions,
};

/// A generic document/edge store with named collections.
///
/// System fields in a write body (`_id`, `_key`, `_rev`, `_from`, `_to`) are
/// interpreted, not stored: `_key` on insert picks the key, `_from`/`_to` on
/// replace or update move an edge, the rest are ignored.
pub trait CollectionStore: Send + Sync {
    /// Type of the named collection, `None` if it does not exist.
    fn collection_type(&self, name: &str) -> Option<CollectionType>;

    /// True if the named collection exists.
    fn exists(&self, name: &str) -> bool {
        self.collection_type(name).is_some()
    }

    /// Names of all collections, sorted.
    fn collection_names(&self) -> Vec<String>;

    /// Create a collection. Fails with `DuplicateName` if it exists.
    fn create_collection(&self, name: &str, kind: CollectionType) -> TrellisResult<()>;

    /// Drop a collection and all its documents.
    fn drop_collection(&self, name: &str) -> TrellisResult<()>;

    /// Fetch a document, `None` if the key does not exist.
    fn document(&self, id: &DocumentId) -> TrellisResult<Option<Document>>;

    /// Insert a document. `endpoints` is required for edge collections and
    /// rejected for document collections.
    fn insert(
        &self,
        collection: &str,
        body: Body,
        endpoints: Option<(DocumentId, DocumentId)>,
        options: &WriteOptions,
    ) -> TrellisResult<DocumentMeta>;

    /// Replace a document's body.
    fn replace(&self, id: &DocumentId, body: Body, options: &WriteOptions)
        -> TrellisResult<DocumentMeta>;

    /// Merge `patch` into a document's body. `null` values remove attributes.
    fn update(&self, id: &DocumentId, patch: Body, options: &WriteOptions)
        -> TrellisResult<DocumentMeta>;

    /// Remove a document.
    fn remove(&self, id: &DocumentId, options: &WriteOptions) -> TrellisResult<DocumentMeta>;

    /// All documents of a collection, ordered by key.
    fn all(&self, collection: &str) -> TrellisResult<Vec<Document>>;

    /// Number of documents in a collection.
    fn count(&self, collection: &str) -> TrellisResult<usize>;

    /// Write counter of a collection.
    ///
    /// Advances on every document insert, replace, update and remove. Two
    /// equal readings mean no document of the collection changed in between.
    fn collection_version(&self, collection: &str) -> TrellisResult<u64>;

    /// Edges of `collection` incident to `vertex` in `direction`.
    fn edges(
        &self,
        collection: &str,
        vertex: &DocumentId,
        direction: EdgeDirection,
    ) -> TrellisResult<Vec<Document>>;

    /// Run `action` atomically with `write_collections` locked.
    ///
    /// Either every write made by `action` is applied or none is. An error
    /// returned by `action` is returned unchanged after rollback.
    fn transaction(
        &self,
        write_collections: &[String],
        action: &mut dyn FnMut(&mut dyn StoreTransaction) -> TrellisResult<()>,
    ) -> TrellisResult<()>;
}

/// Operations available inside [`CollectionStore::transaction`].
pub trait StoreTransaction {
    /// Read a document, including writes made earlier in this transaction.
    fn document(&self, id: &DocumentId) -> TrellisResult<Option<Document>>;

    /// [`CollectionStore::collection_version`] of a locked collection,
    /// including writes made earlier in this transaction.
    fn collection_version(&self, collection: &str) -> TrellisResult<u64>;

    /// Insert a document into a locked collection.
    fn insert(
        &mut self,
        collection: &str,
        body: Body,
        endpoints: Option<(DocumentId, DocumentId)>,
    ) -> TrellisResult<DocumentMeta>;

    /// Replace a document in a locked collection.
    fn replace(&mut self, id: &DocumentId, body: Body, options: &WriteOptions)
        -> TrellisResult<DocumentMeta>;

    /// Remove a document from a locked collection.
    fn remove(&mut self, id: &DocumentId, options: &WriteOptions) -> TrellisResult<DocumentMeta>;
}
