//! Shared helpers for the conformance suite.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::json;
use trellis::{CollectionProxy, DocumentMeta, GraphCatalog, GraphHandle, MemoryStore};

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
});

/// Fresh store and catalog, with test logging installed once per process.
pub fn setup() -> (Arc<MemoryStore>, GraphCatalog) {
    Lazy::force(&TRACING);
    let store = MemoryStore::shared();
    let catalog = GraphCatalog::with_defaults(store.clone()).unwrap();
    (store, catalog)
}

/// Save a vertex with an explicit key.
pub fn vertex(graph: &GraphHandle, collection: &str, key: &str) -> DocumentMeta {
    graph
        .vertex_collection(collection)
        .unwrap()
        .save(json!({ "_key": key }))
        .unwrap()
}

/// Save an edge with an empty body.
pub fn edge(graph: &GraphHandle, collection: &str, from: &str, to: &str) -> DocumentMeta {
    graph
        .edge_collection(collection)
        .unwrap()
        .save(from, to, json!({}))
        .unwrap()
}

/// Number of documents in a graph collection, edge or vertex.
pub fn count(graph: &GraphHandle, collection: &str) -> usize {
    match graph.edge_collection(collection) {
        Ok(proxy) => proxy.count().unwrap(),
        Err(_) => graph.vertex_collection(collection).unwrap().count().unwrap(),
    }
}
