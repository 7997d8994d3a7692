//! Several catalogs opened over one store.

use std::sync::{Arc, Barrier};
use std::thread;

use crate::test_utils::{count, edge, setup, vertex};
use trellis::{relation, CollectionProxy, CollectionStore, GraphCatalog};

#[test]
fn removal_reaches_graph_created_by_another_catalog() {
    let (store, first) = setup();
    let second = GraphCatalog::with_defaults(store.clone()).unwrap();
    let gb = second
        .create_graph("gb", vec![], vec!["person".into()])
        .unwrap();

    let ga = first
        .create_graph("ga", vec![relation("knows", "person", "person").unwrap()], vec![])
        .unwrap();
    vertex(&ga, "person", "x");
    vertex(&ga, "person", "y");
    edge(&ga, "knows", "person/x", "person/y");

    let plan = gb
        .vertex_collection("person")
        .unwrap()
        .remove("x", &gb.remove_options())
        .unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(store.count("knows").unwrap(), 0);
    assert_eq!(count(&ga, "person"), 1);
}

#[test]
fn conflicting_definition_rejected_across_catalogs() {
    let (store, first) = setup();
    let second = GraphCatalog::with_defaults(store.clone()).unwrap();

    first
        .create("g1", vec![relation("e", "x", "y").unwrap()], vec![])
        .unwrap();
    let err = second
        .create("g2", vec![relation("e", "x", "z").unwrap()], vec![])
        .unwrap_err();
    assert_eq!(err.code(), 1921);

    // the identical definition may be shared
    second
        .create("g3", vec![relation("e", "x", "y").unwrap()], vec![])
        .unwrap();
    assert_eq!(first.list().unwrap(), vec!["g1", "g3"]);
}

#[test]
fn edit_through_one_catalog_constrains_the_other() {
    let (store, first) = setup();
    let second = GraphCatalog::with_defaults(store.clone()).unwrap();
    first
        .create("g1", vec![relation("e", "x", "y").unwrap()], vec![])
        .unwrap();
    second
        .create("g2", vec![relation("e", "x", "y").unwrap()], vec![])
        .unwrap();

    first
        .edit_edge_definitions("g1", relation("e", "x", "z").unwrap())
        .unwrap();
    assert_eq!(second.load("g2").unwrap().edge_definitions[0].to, vec!["z"]);
    let err = second
        .create("g3", vec![relation("e", "x", "y").unwrap()], vec![])
        .unwrap_err();
    assert_eq!(err.code(), 1921);
}

#[test]
fn concurrent_creates_through_two_catalogs_yield_one_graph() {
    let (store, first) = setup();
    let second = GraphCatalog::with_defaults(store.clone()).unwrap();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let catalog = if i % 2 == 0 { first.clone() } else { second.clone() };
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let def = relation("shared", "a", format!("b{i}")).unwrap();
                catalog
                    .create(&format!("g{i}"), vec![def], vec![])
                    .map_err(|e| e.code())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    // 1200 when a check ran before the other catalog's write landed
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|code| *code == 1921 || *code == 1200));
    assert_eq!(first.list().unwrap().len(), 1);
    assert_eq!(second.graphs_using("shared").unwrap().len(), 1);
}
