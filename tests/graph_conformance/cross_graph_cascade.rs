//! Cascading removal across graphs and discovery paths.

use crate::test_utils::{count, edge, setup, vertex};
use trellis::{
    relation, CascadeDeletionEngine, CollectionProxy, CollectionStore, DocumentId, RemoveOptions,
};

#[test]
fn removal_reaches_every_graph_using_the_vertex_collection() {
    let (_store, catalog) = setup();
    let g1 = catalog
        .create_graph("g1", vec![relation("e1", "person", "person").unwrap()], vec![])
        .unwrap();
    let g2 = catalog
        .create_graph("g2", vec![relation("e2", "person", "city").unwrap()], vec![])
        .unwrap();

    vertex(&g1, "person", "ann");
    vertex(&g1, "person", "ben");
    vertex(&g2, "city", "oslo");
    edge(&g1, "e1", "person/ann", "person/ben");
    edge(&g2, "e2", "person/ann", "city/oslo");
    edge(&g2, "e2", "person/ben", "city/oslo");

    g1.vertex_collection("person")
        .unwrap()
        .remove("ann", &g1.remove_options())
        .unwrap();

    assert_eq!(count(&g1, "e1"), 0);
    assert_eq!(count(&g2, "e2"), 1);
    assert_eq!(count(&g2, "city"), 1);
}

#[test]
fn isolated_vertex_locks_only_its_collection() {
    let (_store, catalog) = setup();
    let g = catalog
        .create_graph("g", vec![relation("e", "v", "v").unwrap()], vec![])
        .unwrap();
    let meta = vertex(&g, "v", "alone");

    let plan = g
        .vertex_collection("v")
        .unwrap()
        .remove("alone", &g.remove_options())
        .unwrap();
    assert_eq!(plan.root, meta.id);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.collections.len(), 1);
    assert!(plan.collections.contains("v"));
}

#[test]
fn edge_reached_on_two_paths_is_removed_once() {
    let (store, catalog) = setup();
    let g = catalog
        .create_graph(
            "g",
            vec![
                relation("link", "node", "node").unwrap(),
                relation("note", "link", "node").unwrap(),
            ],
            vec![],
        )
        .unwrap();
    vertex(&g, "node", "a");
    vertex(&g, "node", "b");
    let link = edge(&g, "link", "node/a", "node/b");
    // reachable from node/a directly and through the link
    let note = edge(&g, "note", &link.id.to_string(), "node/a");

    let engine = CascadeDeletionEngine::new(catalog.clone());
    let plan = engine
        .plan_vertex_removal(&DocumentId::parse("node/a").unwrap())
        .unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(
        plan.dependents.iter().filter(|id| **id == note.id).count(),
        1
    );

    engine.execute(&plan, &g.remove_options()).unwrap();
    assert_eq!(store.count("link").unwrap(), 0);
    assert_eq!(count(&g, "note"), 0);
    assert_eq!(count(&g, "node"), 1);
}

#[test]
fn removing_an_edge_removes_edges_pointing_at_it() {
    let (_store, catalog) = setup();
    let g = catalog
        .create_graph(
            "g",
            vec![
                relation("link", "node", "node").unwrap(),
                relation("note", "link", "node").unwrap(),
            ],
            vec![],
        )
        .unwrap();
    vertex(&g, "node", "a");
    vertex(&g, "node", "b");
    let link = edge(&g, "link", "node/a", "node/b");
    edge(&g, "note", &link.id.to_string(), "node/b");

    let plan = g
        .edge_collection("link")
        .unwrap()
        .remove(link.id.key(), &g.remove_options())
        .unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(count(&g, "note"), 0);
    assert_eq!(count(&g, "node"), 2);
}

#[test]
fn removal_through_the_store_bypasses_the_cascade() {
    let (store, catalog) = setup();
    let g = catalog
        .create_graph("g", vec![relation("e", "v", "v").unwrap()], vec![])
        .unwrap();
    vertex(&g, "v", "a");
    vertex(&g, "v", "b");
    edge(&g, "e", "v/a", "v/b");

    store
        .remove(&DocumentId::parse("v/a").unwrap(), &RemoveOptions::default())
        .unwrap();
    assert_eq!(count(&g, "e"), 1);
}
