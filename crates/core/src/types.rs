//! Document model shared by the store and the graph engine.
//!
//! A [`DocumentId`] is the `collection/key` handle every document is addressed
//! by. [`Document`] is the stored form: system fields (`_id`, `_key`, `_rev`,
//! and for edges `_from`/`_to`) live in typed fields, everything else in
//! `body`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TrellisError, TrellisResult};

/// Separator between collection and key in a document handle.
pub const HANDLE_SEP: char = '/';

/// JSON object body of a document.
pub type Body = Map<String, Value>;

/// Store-assigned revision, strictly increasing per store.
pub type Revision = u64;

// =============================================================================
// DocumentId
// =============================================================================

/// A document handle: `collection/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    collection: String,
    key: String,
}

impl DocumentId {
    /// Build a handle from its parts.
    ///
    /// Fails with `InvalidDocumentHandle` if either part is empty or contains `/`.
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> TrellisResult<Self> {
        let collection = collection.into();
        let key = key.into();
        if collection.is_empty()
            || key.is_empty()
            || collection.contains(HANDLE_SEP)
            || key.contains(HANDLE_SEP)
        {
            return Err(TrellisError::invalid_handle(format!(
                "{}{}{}",
                collection, HANDLE_SEP, key
            )));
        }
        Ok(Self { collection, key })
    }

    /// Parse a `collection/key` handle.
    pub fn parse(handle: &str) -> TrellisResult<Self> {
        match handle.split_once(HANDLE_SEP) {
            Some((collection, key)) => Self::new(collection, key)
                .map_err(|_| TrellisError::invalid_handle(handle)),
            None => Err(TrellisError::invalid_handle(handle)),
        }
    }

    /// Parse `handle`, qualifying a bare key with `collection`.
    ///
    /// A full handle naming a different collection is rejected.
    pub fn qualify(collection: &str, handle: &str) -> TrellisResult<Self> {
        if handle.contains(HANDLE_SEP) {
            let id = Self::parse(handle)?;
            if id.collection != collection {
                return Err(TrellisError::invalid_handle(handle));
            }
            Ok(id)
        } else {
            Self::new(collection, handle)
        }
    }

    /// Collection part of the handle.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Key part of the handle.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.collection, HANDLE_SEP, self.key)
    }
}

impl FromStr for DocumentId {
    type Err = TrellisError;

    fn from_str(s: &str) -> TrellisResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = TrellisError;

    fn try_from(s: String) -> TrellisResult<Self> {
        Self::parse(&s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> String {
        id.to_string()
    }
}

// =============================================================================
// Collections
// =============================================================================

/// Kind of a physical collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Plain documents (vertices)
    Document,
    /// Edge documents carrying `_from` / `_to`
    Edge,
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionType::Document => write!(f, "document"),
            CollectionType::Edge => write!(f, "edge"),
        }
    }
}

/// Which incident edges of a vertex to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeDirection {
    /// Edges with the vertex as `_to`
    In,
    /// Edges with the vertex as `_from`
    Out,
    /// Both, each edge reported once
    #[default]
    Any,
}

// =============================================================================
// Documents
// =============================================================================

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// `_id`
    pub id: DocumentId,
    /// `_rev`
    pub rev: Revision,
    /// `_from`, edges only
    pub from: Option<DocumentId>,
    /// `_to`, edges only
    pub to: Option<DocumentId>,
    /// User attributes, without system fields
    pub body: Body,
}

impl Document {
    /// Document key.
    pub fn key(&self) -> &str {
        self.id.key()
    }

    /// True if this document carries edge endpoints.
    pub fn is_edge(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Look up a user attribute.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// True if this edge has `vertex` as one of its endpoints.
    pub fn touches(&self, vertex: &DocumentId) -> bool {
        self.from.as_ref() == Some(vertex) || self.to.as_ref() == Some(vertex)
    }

    /// True if every attribute of `example` is present with an equal value.
    ///
    /// System fields in the example are compared against the typed fields.
    pub fn matches(&self, example: &Body) -> bool {
        example.iter().all(|(field, expected)| match field.as_str() {
            "_id" => expected.as_str() == Some(self.id.to_string().as_str()),
            "_key" => expected.as_str() == Some(self.key()),
            "_rev" => expected.as_str() == Some(self.rev.to_string().as_str()),
            "_from" => {
                expected.as_str().map(str::to_string) == self.from.as_ref().map(|f| f.to_string())
            }
            "_to" => {
                expected.as_str().map(str::to_string) == self.to.as_ref().map(|t| t.to_string())
            }
            _ => self.body.get(field) == Some(expected),
        })
    }

    /// Render as a JSON object with system fields.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::with_capacity(self.body.len() + 5);
        obj.insert("_id".to_string(), Value::String(self.id.to_string()));
        obj.insert("_key".to_string(), Value::String(self.key().to_string()));
        obj.insert("_rev".to_string(), Value::String(self.rev.to_string()));
        if let Some(from) = &self.from {
            obj.insert("_from".to_string(), Value::String(from.to_string()));
        }
        if let Some(to) = &self.to {
            obj.insert("_to".to_string(), Value::String(to.to_string()));
        }
        for (k, v) in &self.body {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    /// Metadata view of this document.
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id.clone(),
            rev: self.rev,
            old_rev: None,
        }
    }
}

/// Result of a write: the handle and its new revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    /// `_id`
    pub id: DocumentId,
    /// `_rev` after the write
    pub rev: Revision,
    /// `_rev` before the write, for replace/update/remove
    pub old_rev: Option<Revision>,
}

/// Options accepted by document writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Wait until the write is durable before returning
    pub wait_for_sync: bool,
    /// Fail with `RevisionConflict` unless the current revision matches
    pub if_match: Option<Revision>,
}

impl WriteOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `wait_for_sync`.
    pub fn wait_for_sync(mut self, wait: bool) -> Self {
        self.wait_for_sync = wait;
        self
    }

    /// Require the current revision to equal `rev`.
    pub fn if_match(mut self, rev: Revision) -> Self {
        self.if_match = Some(rev);
        self
    }
}

/// Options for removals; identical to [`WriteOptions`].
pub type RemoveOptions = WriteOptions;

/// Split a caller-supplied JSON value into a body, rejecting non-objects.
pub fn into_body(value: Value) -> TrellisResult<Body> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(TrellisError::invalid_parameter(format!(
            "document body must be an object, got {}",
            other
        ))),
    }
}

/// Extract `_from` / `_to` handles from a document body, if both are present.
pub fn endpoints_of(body: &Body) -> TrellisResult<Option<(DocumentId, DocumentId)>> {
    match (body.get("_from"), body.get("_to")) {
        (None, None) => Ok(None),
        (Some(Value::String(from)), Some(Value::String(to))) => {
            Ok(Some((DocumentId::parse(from)?, DocumentId::parse(to)?)))
        }
        (from, to) => Err(TrellisError::invalid_handle(format!(
            "{} -> {}",
            from.map(|v| v.to_string()).unwrap_or_default(),
            to.map(|v| v.to_string()).unwrap_or_default()
        ))),
    }
}
