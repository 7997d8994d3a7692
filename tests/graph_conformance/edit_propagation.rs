//! Definition changes propagated to every graph sharing an edge collection.

use crate::test_utils::setup;
use trellis::{relation, CollectionStore};

#[test]
fn edit_replaces_definition_in_place_in_all_graphs() {
    let (_store, catalog) = setup();
    let dr1 = relation("ec1", ["vc1", "vc2"], ["vc3", "vc4"]).unwrap();
    let dr2 = relation("ec2", "vc1", "vc4").unwrap();
    let dr3 = relation("ec1", "vc5", "vc5").unwrap();
    let mut g1 = catalog
        .create_graph("g1", vec![dr1.clone(), dr2.clone()], vec![])
        .unwrap();
    catalog.create("g2", vec![dr1], vec![]).unwrap();

    g1.edit_edge_definitions(dr3.clone()).unwrap();
    assert_eq!(g1.edge_definitions(), &[dr3.clone(), dr2]);
    assert_eq!(g1.orphan_collections(), vec!["vc2", "vc3"]);

    let g2 = catalog.graph("g2").unwrap();
    assert_eq!(g2.edge_definitions(), &[dr3]);
    assert_eq!(g2.orphan_collections(), vec!["vc1", "vc2", "vc3", "vc4"]);
}

#[test]
fn edit_absorbs_orphans_and_orphans_unused_collections() {
    let (_store, catalog) = setup();
    let dr1 = relation("ec1", "vc1", ["vc1", "vc2"]).unwrap();
    let dr2 = relation("ec1", "vc3", ["vc4", "vc5"]).unwrap();
    let dr3 = relation("ec2", "vc2", ["vc2", "vc3"]).unwrap();
    let mut g1 = catalog
        .create_graph("g1", vec![dr1.clone(), dr3.clone()], vec![])
        .unwrap();
    let mut g2 = catalog.create_graph("g2", vec![dr1], vec![]).unwrap();

    g1.add_vertex_collection("vc4", None).unwrap();
    g2.add_vertex_collection("vc5", None).unwrap();
    g2.add_vertex_collection("vc6", None).unwrap();
    g1.edit_edge_definitions(dr2.clone()).unwrap();

    assert_eq!(g1.edge_definitions(), &[dr2.clone(), dr3]);
    assert_eq!(g1.orphan_collections(), vec!["vc1"]);

    g2.reload().unwrap();
    assert_eq!(g2.edge_definitions(), &[dr2]);
    assert_eq!(g2.orphan_collections(), vec!["vc1", "vc2", "vc6"]);
}

#[test]
fn edit_creates_new_vertex_collections() {
    let (store, catalog) = setup();
    let mut g = catalog
        .create_graph("g", vec![relation("e", "a", "b").unwrap()], vec![])
        .unwrap();
    g.edit_edge_definitions(relation("e", "a", "z").unwrap())
        .unwrap();
    assert!(store.exists("z"));
    assert!(g.vertex_collection("z").is_ok());
    assert_eq!(g.orphan_collections(), vec!["b"]);
}

#[test]
fn edge_collection_can_serve_as_vertex_collection() {
    let (_store, catalog) = setup();
    let mut g = catalog
        .create_graph(
            "g",
            vec![relation("e", "a", "b").unwrap(), relation("f", "a", "a").unwrap()],
            vec![],
        )
        .unwrap();
    g.edit_edge_definitions(relation("e", "f", "b").unwrap())
        .unwrap();
    assert_eq!(g.edge_definitions()[0].from, vec!["f"]);
}

#[test]
fn delete_propagates_to_graphs_sharing_the_definition() {
    let (store, catalog) = setup();
    let shared = relation("shared", "a", "b").unwrap();
    let mut g1 = catalog
        .create_graph(
            "g1",
            vec![shared.clone(), relation("own", "a", "c").unwrap()],
            vec![],
        )
        .unwrap();
    catalog.create("g2", vec![shared], vec![]).unwrap();

    g1.delete_edge_definition("shared", true).unwrap();
    assert_eq!(g1.orphan_collections(), vec!["b"]);

    let g2 = catalog.graph("g2").unwrap();
    assert!(g2.edge_definitions().is_empty());
    assert_eq!(g2.orphan_collections(), vec!["a", "b"]);
    assert!(catalog.graphs_using("shared").unwrap().is_empty());
    assert!(!store.exists("shared"));
}
