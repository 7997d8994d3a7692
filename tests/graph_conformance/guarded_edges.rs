//! Edge writes checked against the edge definition.

use crate::test_utils::{setup, vertex};
use serde_json::json;
use trellis::{relation, CollectionProxy, DocumentId};

#[test]
fn reverse_direction_is_rejected_without_side_effects() {
    let (_store, catalog) = setup();
    let g = catalog
        .create_graph("g", vec![relation("flight", "airport", "city").unwrap()], vec![])
        .unwrap();
    vertex(&g, "airport", "TXL");
    vertex(&g, "city", "Berlin");

    let flights = g.edge_collection("flight").unwrap();
    let err = flights
        .save("city/Berlin", "airport/TXL", json!({}))
        .unwrap_err();
    assert_eq!(err.code(), 1906);
    assert_eq!(flights.count().unwrap(), 0);

    flights
        .save("airport/TXL", "city/Berlin", json!({}))
        .unwrap();
    assert_eq!(flights.count().unwrap(), 1);
}

#[test]
fn malformed_handles_are_rejected() {
    let (_store, catalog) = setup();
    let g = catalog
        .create_graph("g", vec![relation("e", "v", "v").unwrap()], vec![])
        .unwrap();
    let e = g.edge_collection("e").unwrap();

    assert_eq!(e.save("v", "v/b", json!({})).unwrap_err().code(), 1205);
    assert_eq!(e.save("v/a", "", json!({})).unwrap_err().code(), 1205);
    assert_eq!(e.count().unwrap(), 0);
}

#[test]
fn save_document_reads_endpoints_from_the_body() {
    let (_store, catalog) = setup();
    let g = catalog
        .create_graph("g", vec![relation("e", "a", "b").unwrap()], vec![])
        .unwrap();
    let e = g.edge_collection("e").unwrap();

    let meta = e
        .save_document(json!({"_from": "a/1", "_to": "b/2", "weight": 3}))
        .unwrap();
    let doc = e.document(meta.id.key()).unwrap();
    assert_eq!(doc.get("weight"), Some(&json!(3)));
    assert_eq!(doc.from, Some(DocumentId::parse("a/1").unwrap()));

    let err = e
        .save_document(json!({"_from": "b/2", "_to": "a/1"}))
        .unwrap_err();
    assert_eq!(err.code(), 1906);
}

#[test]
fn proxies_pass_reads_and_updates_through() {
    let (_store, catalog) = setup();
    let g = catalog
        .create_graph("g", vec![relation("e", "v", "v").unwrap()], vec![])
        .unwrap();
    let v = g.vertex_collection("v").unwrap();
    v.save(json!({"_key": "a", "color": "red", "size": 1})).unwrap();
    v.save(json!({"_key": "b", "color": "blue"})).unwrap();

    assert!(v.exists("a").unwrap());
    assert!(v.exists("v/a").unwrap());
    assert!(!v.exists("zz").unwrap());
    assert_eq!(v.by_example(json!({"color": "red"})).unwrap().len(), 1);

    v.update("a", json!({"color": "green"}), &Default::default())
        .unwrap();
    let a = v.document("a").unwrap();
    assert_eq!(a.get("color"), Some(&json!("green")));
    assert_eq!(a.get("size"), Some(&json!(1)));

    v.replace("a", json!({"color": "black"}), &Default::default())
        .unwrap();
    assert_eq!(v.document("a").unwrap().get("size"), None);
    assert_eq!(v.document("missing").unwrap_err().code(), 1202);
}

#[test]
fn edge_queries_per_collection() {
    let (_store, catalog) = setup();
    let g = catalog
        .create_graph("g", vec![relation("e", "v", "v").unwrap()], vec![])
        .unwrap();
    for key in ["a", "b", "c"] {
        vertex(&g, "v", key);
    }
    let e = g.edge_collection("e").unwrap();
    e.save("v/a", "v/b", json!({})).unwrap();
    e.save("v/c", "v/a", json!({})).unwrap();

    assert_eq!(e.edges("v/a").unwrap().len(), 2);
    assert_eq!(e.out_edges("v/a").unwrap().len(), 1);
    assert_eq!(e.in_edges("v/a").unwrap().len(), 1);
    assert!(e.in_edges("v/c").unwrap().is_empty());
}
