//! Per-collection data with edge endpoint indexes.
//!
//! # Design
//!
//! - FxHashMap: O(1) document lookup by key
//! - `from_index` / `to_index`: vertex handle → keys of incident edges, so
//!   `edges()` never scans the collection
//! - Every mutation goes through [`CollectionData::put`] or
//!   [`CollectionData::take`], which keep the indexes in step with `docs`
//!   and advance `version`

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use trellis_core::{CollectionType, Document, DocumentId, EdgeDirection};

type KeyList = SmallVec<[String; 4]>;

/// Documents of one collection.
#[derive(Debug)]
pub struct CollectionData {
    kind: CollectionType,
    docs: FxHashMap<String, Document>,
    from_index: FxHashMap<DocumentId, KeyList>,
    to_index: FxHashMap<DocumentId, KeyList>,
    version: u64,
}

impl CollectionData {
    /// Create an empty collection of the given kind.
    pub fn new(kind: CollectionType) -> Self {
        Self {
            kind,
            docs: FxHashMap::default(),
            from_index: FxHashMap::default(),
            to_index: FxHashMap::default(),
            version: 0,
        }
    }

    /// Collection kind.
    pub fn kind(&self) -> CollectionType {
        self.kind
    }

    /// Write counter, advanced by every `put` and successful `take`.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// True if the collection holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Look up a document by key.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.docs.get(key)
    }

    /// True if `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.docs.contains_key(key)
    }

    /// Store `doc`, returning the previous version under the same key.
    pub fn put(&mut self, doc: Document) -> Option<Document> {
        let key = doc.key().to_string();
        let old = self.detach(&key);
        if let Some(from) = &doc.from {
            self.from_index.entry(from.clone()).or_default().push(key.clone());
        }
        if let Some(to) = &doc.to {
            self.to_index.entry(to.clone()).or_default().push(key.clone());
        }
        self.docs.insert(key, doc);
        self.version += 1;
        old
    }

    /// Remove and return the document under `key`.
    pub fn take(&mut self, key: &str) -> Option<Document> {
        let doc = self.detach(key)?;
        self.version += 1;
        Some(doc)
    }

    fn detach(&mut self, key: &str) -> Option<Document> {
        let doc = self.docs.remove(key)?;
        if let Some(from) = &doc.from {
            unindex(&mut self.from_index, from, key);
        }
        if let Some(to) = &doc.to {
            unindex(&mut self.to_index, to, key);
        }
        Some(doc)
    }

    /// All documents, ordered by key.
    pub fn all(&self) -> Vec<Document> {
        let mut docs: Vec<Document> = self.docs.values().cloned().collect();
        docs.sort_by(|a, b| a.key().cmp(b.key()));
        docs
    }

    /// Edges incident to `vertex`, ordered by key, each reported once.
    pub fn edges(&self, vertex: &DocumentId, direction: EdgeDirection) -> Vec<Document> {
        let mut keys: Vec<&String> = Vec::new();
        if matches!(direction, EdgeDirection::Out | EdgeDirection::Any) {
            if let Some(list) = self.from_index.get(vertex) {
                keys.extend(list.iter());
            }
        }
        if matches!(direction, EdgeDirection::In | EdgeDirection::Any) {
            if let Some(list) = self.to_index.get(vertex) {
                keys.extend(list.iter());
            }
        }
        keys.sort();
        keys.dedup();
        keys.into_iter()
            .filter_map(|k| self.docs.get(k.as_str()).cloned())
            .collect()
    }
}

fn unindex(index: &mut FxHashMap<DocumentId, KeyList>, vertex: &DocumentId, key: &str) {
    if let Some(list) = index.get_mut(vertex) {
        list.retain(|k| k != key);
        if list.is_empty() {
            index.remove(vertex);
        }
    }
}
