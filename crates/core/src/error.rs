//! Error types shared by every Trellis crate.
//!
//! Every failure the catalog, the guarded proxies, the cascade engine or a
//! [`CollectionStore`](crate::traits::CollectionStore) can report is a
//! [`TrellisError`]. Each variant carries a stable numeric code
//! ([`TrellisError::code`]) so a transport layer can hand errors to clients
//! without string matching.

use thiserror::Error;

use crate::types::CollectionType;

/// Result alias used throughout Trellis.
pub type TrellisResult<T> = std::result::Result<T, TrellisError>;

/// Errors raised by graph definition, integrity enforcement and storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrellisError {
    // =========================================================================
    // Graph definition errors
    // =========================================================================
    /// Malformed relation arguments or names.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What was wrong with the argument
        reason: String,
    },

    /// An edge definition is missing its collection, `from` or `to` part.
    #[error("malformed edge definition: {reason}")]
    MalformedEdgeDefinition {
        /// What was missing
        reason: String,
    },

    /// A graph was created without a name.
    #[error("graph name is missing")]
    GraphCreateMissingName,

    /// A graph with this name already exists.
    #[error("graph already exists: {graph}")]
    GraphDuplicate {
        /// Graph name
        graph: String,
    },

    /// No graph with this name exists.
    #[error("graph not found: {graph}")]
    GraphNotFound {
        /// Graph name
        graph: String,
    },

    /// The same edge collection appears twice in one graph.
    #[error("multi use of edge collection in edge def: {collection}")]
    CollectionMultiUse {
        /// Edge collection name
        collection: String,
    },

    /// Another graph already uses this edge collection with a different definition.
    #[error("{collection} has a different definition in another graph")]
    CollectionUseInMultiGraphs {
        /// Edge collection name
        collection: String,
    },

    /// Edge endpoints are not permitted by the edge collection's definition.
    #[error("invalid edge between {from} and {to}. Doesn't conform to any edge definition")]
    InvalidEdge {
        /// `_from` handle
        from: String,
        /// `_to` handle
        to: String,
    },

    /// The graph does not use this edge collection.
    #[error("edge collection not used in graph: {collection}")]
    EdgeCollectionNotUsed {
        /// Edge collection name
        collection: String,
    },

    /// The vertex collection does not exist or is not part of the graph.
    #[error("vertex collection does not exist or is not part of the graph: {collection}")]
    VertexCollectionDoesNotExist {
        /// Collection name
        collection: String,
    },

    /// The edge collection is not part of the graph.
    #[error("edge collection does not exist or is not part of the graph: {collection}")]
    EdgeCollectionDoesNotExist {
        /// Collection name
        collection: String,
    },

    /// The collection is not an orphan collection of the graph.
    #[error("not in orphan collections of the graph: {collection}")]
    NotInOrphanCollection {
        /// Collection name
        collection: String,
    },

    /// The collection is already used in an edge definition of the graph.
    #[error("collection already used in edge definitions: {collection}")]
    CollectionUsedInEdgeDefinition {
        /// Collection name
        collection: String,
    },

    /// The collection is already an orphan collection of the graph.
    #[error("collection already used in orphans: {collection}")]
    CollectionUsedInOrphans {
        /// Collection name
        collection: String,
    },

    /// The collection exists with the wrong type.
    #[error("collection {collection} has type {actual}, expected {expected}")]
    WrongCollectionType {
        /// Collection name
        collection: String,
        /// Type required here
        expected: CollectionType,
        /// Type found in the store
        actual: CollectionType,
    },

    // =========================================================================
    // Document and storage errors
    // =========================================================================
    /// A document handle is not of the form `collection/key`.
    #[error("illegal document handle: {handle}")]
    InvalidDocumentHandle {
        /// The rejected handle
        handle: String,
    },

    /// The collection does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name
        collection: String,
    },

    /// A collection with this name already exists.
    #[error("duplicate collection name: {collection}")]
    DuplicateName {
        /// Collection name
        collection: String,
    },

    /// The document does not exist.
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// Document handle
        id: String,
    },

    /// A document with this key already exists.
    #[error("unique constraint violated: {id}")]
    UniqueConstraintViolated {
        /// Document handle
        id: String,
    },

    /// Optimistic revision check failed.
    #[error("conflict on {id}: expected revision {expected}, found {actual}")]
    RevisionConflict {
        /// Document handle
        id: String,
        /// Revision the writer expected
        expected: u64,
        /// Revision found in the store
        actual: u64,
    },

    /// A transaction wrote to a collection outside its write set.
    #[error("collection {collection} is not locked by this transaction")]
    CollectionNotLocked {
        /// Collection name
        collection: String,
    },

    /// A transaction action failed for a reason not covered by another variant.
    #[error("transaction aborted: {reason}")]
    TransactionAborted {
        /// Why the action failed
        reason: String,
    },

    /// Descriptor or document (de)serialization failed.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Underlying error message
        reason: String,
    },

    /// Configuration could not be parsed or is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: String,
    },
}

impl TrellisError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        TrellisError::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Create a MalformedEdgeDefinition error.
    pub fn malformed_edge_definition(reason: impl Into<String>) -> Self {
        TrellisError::MalformedEdgeDefinition {
            reason: reason.into(),
        }
    }

    /// Create a GraphNotFound error.
    pub fn graph_not_found(graph: impl Into<String>) -> Self {
        TrellisError::GraphNotFound {
            graph: graph.into(),
        }
    }

    /// Create a CollectionNotFound error.
    pub fn collection_not_found(collection: impl Into<String>) -> Self {
        TrellisError::CollectionNotFound {
            collection: collection.into(),
        }
    }

    /// Create a DocumentNotFound error.
    pub fn document_not_found(id: impl ToString) -> Self {
        TrellisError::DocumentNotFound { id: id.to_string() }
    }

    /// Create an InvalidDocumentHandle error.
    pub fn invalid_handle(handle: impl Into<String>) -> Self {
        TrellisError::InvalidDocumentHandle {
            handle: handle.into(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(reason: impl Into<String>) -> Self {
        TrellisError::Serialization {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        TrellisError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Numeric error code, stable across releases.
    pub fn code(&self) -> u32 {
        match self {
            TrellisError::InvalidParameter { .. } => 1936,
            TrellisError::MalformedEdgeDefinition { .. } => 1923,
            TrellisError::GraphCreateMissingName => 1922,
            TrellisError::GraphDuplicate { .. } => 1925,
            TrellisError::GraphNotFound { .. } => 1924,
            TrellisError::CollectionMultiUse { .. } => 1920,
            TrellisError::CollectionUseInMultiGraphs { .. } => 1921,
            TrellisError::InvalidEdge { .. } => 1906,
            TrellisError::EdgeCollectionNotUsed { .. } => 1930,
            TrellisError::VertexCollectionDoesNotExist { .. } => 1926,
            TrellisError::EdgeCollectionDoesNotExist { .. } => 1939,
            TrellisError::NotInOrphanCollection { .. } => 1928,
            TrellisError::CollectionUsedInEdgeDefinition { .. } => 1929,
            TrellisError::CollectionUsedInOrphans { .. } => 1938,
            TrellisError::WrongCollectionType { .. } => 1927,
            TrellisError::InvalidDocumentHandle { .. } => 1205,
            TrellisError::CollectionNotFound { .. } => 1203,
            TrellisError::DuplicateName { .. } => 1207,
            TrellisError::DocumentNotFound { .. } => 1202,
            TrellisError::UniqueConstraintViolated { .. } => 1210,
            TrellisError::RevisionConflict { .. } => 1200,
            TrellisError::CollectionNotLocked { .. } => 1652,
            TrellisError::TransactionAborted { .. } => 1650,
            TrellisError::Serialization { .. } => 600,
            TrellisError::InvalidConfig { .. } => 10,
        }
    }

    /// True for the "does not exist" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TrellisError::GraphNotFound { .. }
                | TrellisError::CollectionNotFound { .. }
                | TrellisError::DocumentNotFound { .. }
                | TrellisError::VertexCollectionDoesNotExist { .. }
                | TrellisError::EdgeCollectionDoesNotExist { .. }
        )
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(e: serde_json::Error) -> Self {
        TrellisError::serialization(e.to_string())
    }
}

impl From<toml::de::Error> for TrellisError {
    fn from(e: toml::de::Error) -> Self {
        TrellisError::invalid_config(e.to_string())
    }
}
