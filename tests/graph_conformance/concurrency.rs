//! Competing catalog mutations from several threads.

use std::sync::{Arc, Barrier};
use std::thread;

use crate::test_utils::{edge, setup, vertex};
use trellis::{relation, CollectionProxy, TrellisError};

#[test]
fn conflicting_creates_yield_exactly_one_graph() {
    let (_store, catalog) = setup();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let catalog = catalog.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let def = relation("shared", "a", format!("b{i}")).unwrap();
                catalog.create(&format!("g{i}"), vec![def], vec![])
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(result, TrellisError::CollectionUseInMultiGraphs { .. }));
    }
    assert_eq!(catalog.list().unwrap().len(), 1);
    assert_eq!(catalog.graphs_using("shared").unwrap().len(), 1);
}

#[test]
fn same_name_created_once() {
    let (_store, catalog) = setup();
    let threads = 6;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let catalog = catalog.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                catalog
                    .create("only", vec![relation("e", "v", "v").unwrap()], vec![])
                    .map_err(|e| e.code())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|code| *code == 1925));
}

#[test]
fn concurrent_vertex_removals_leave_no_dangling_edges() {
    let (_store, catalog) = setup();
    let graph = catalog
        .create_graph("ring", vec![relation("next", "node", "node").unwrap()], vec![])
        .unwrap();
    let n = 16;
    for i in 0..n {
        vertex(&graph, "node", &i.to_string());
    }
    for i in 0..n {
        edge(
            &graph,
            "next",
            &format!("node/{}", i),
            &format!("node/{}", (i + 1) % n),
        );
    }

    let handles: Vec<_> = (0..n)
        .step_by(2)
        .map(|i| {
            let catalog = catalog.clone();
            thread::spawn(move || {
                let graph = catalog.graph("ring").unwrap();
                graph
                    .vertex_collection("node")
                    .unwrap()
                    .remove(&i.to_string(), &graph.remove_options())
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let nodes = graph.vertex_collection("node").unwrap();
    let next = graph.edge_collection("next").unwrap();
    assert_eq!(nodes.count().unwrap(), n / 2);
    assert_eq!(next.count().unwrap(), 0);
}
