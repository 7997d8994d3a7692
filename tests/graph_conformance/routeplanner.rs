//! The routeplanner example graph.

use crate::test_utils::setup;
use serde_json::json;
use trellis::{edge_definitions, relation, CollectionProxy, GraphCatalog, GraphHandle};

fn routeplanner(catalog: &GraphCatalog) -> GraphHandle {
    let graph = catalog
        .create_graph(
            "routeplanner",
            edge_definitions([
                relation("germanHighway", "germanCity", "germanCity").unwrap(),
                relation("frenchHighway", "frenchCity", "frenchCity").unwrap(),
                relation("internationalHighway", ["germanCity", "frenchCity"], ["germanCity", "frenchCity"])
                    .unwrap(),
            ]),
            vec![],
        )
        .unwrap();

    let german = graph.vertex_collection("germanCity").unwrap();
    german
        .save(json!({"_key": "Berlin", "population": 3_000_000, "isCapital": true}))
        .unwrap();
    german
        .save(json!({"_key": "Hamburg", "population": 1_000_000, "isCapital": false}))
        .unwrap();
    let french = graph.vertex_collection("frenchCity").unwrap();
    french
        .save(json!({"_key": "Paris", "population": 4_000_000, "isCapital": true}))
        .unwrap();
    french
        .save(json!({"_key": "Lyon", "population": 80_000, "isCapital": false}))
        .unwrap();

    graph
        .edge_collection("germanHighway")
        .unwrap()
        .save("germanCity/Berlin", "germanCity/Hamburg", json!({"distance": 400}))
        .unwrap();
    graph
        .edge_collection("frenchHighway")
        .unwrap()
        .save("frenchCity/Paris", "frenchCity/Lyon", json!({"distance": 550}))
        .unwrap();
    graph
        .edge_collection("internationalHighway")
        .unwrap()
        .save(
            "germanCity/Berlin",
            "frenchCity/Paris",
            json!({"_key": "24436", "distance": 1200}),
        )
        .unwrap();
    graph
}

#[test]
fn removing_berlin_removes_its_highways() {
    let (_store, catalog) = setup();
    let graph = routeplanner(&catalog);
    let international = graph.edge_collection("internationalHighway").unwrap();
    assert!(international.exists("internationalHighway/24436").unwrap());

    let plan = graph
        .vertex_collection("germanCity")
        .unwrap()
        .remove("germanCity/Berlin", &graph.remove_options())
        .unwrap();
    assert_eq!(plan.len(), 3);

    assert!(!graph
        .vertex_collection("germanCity")
        .unwrap()
        .exists("Berlin")
        .unwrap());
    assert!(!international.exists("24436").unwrap());
    assert!(graph
        .vertex_collection("frenchCity")
        .unwrap()
        .exists("Paris")
        .unwrap());
    assert!(graph.edges("germanCity/Hamburg").unwrap().is_empty());
    assert_eq!(graph.edges("frenchCity/Paris").unwrap().len(), 1);
}

#[test]
fn highway_endpoints() {
    let (_store, catalog) = setup();
    let graph = routeplanner(&catalog);
    let from = graph.from_vertex("internationalHighway/24436").unwrap();
    let to = graph.to_vertex("internationalHighway/24436").unwrap();
    assert_eq!(from.id.to_string(), "germanCity/Berlin");
    assert_eq!(to.id.to_string(), "frenchCity/Paris");
    assert_eq!(graph.out_edges("germanCity/Berlin").unwrap().len(), 2);
    assert_eq!(graph.in_edges("frenchCity/Paris").unwrap().len(), 1);
}

#[test]
fn direction_violation_on_a_directed_highway() {
    let (_store, catalog) = setup();
    let graph = catalog
        .create_graph(
            "routeplanner",
            vec![relation("internationalHighway", "germanCity", "frenchCity").unwrap()],
            vec![],
        )
        .unwrap();
    let highway = graph.edge_collection("internationalHighway").unwrap();

    let err = highway
        .save("frenchCity/Paris", "germanCity/Berlin", json!({}))
        .unwrap_err();
    assert_eq!(err.code(), 1906);
    assert_eq!(highway.count().unwrap(), 0);
}

#[test]
fn renders_the_graph() {
    let (_store, catalog) = setup();
    let mut graph = routeplanner(&catalog);
    graph.add_vertex_collection("village", None).unwrap();
    assert_eq!(
        graph.to_string(),
        "[ Graph routeplanner EdgeDefinitions: [\
germanHighway: [germanCity] -> [germanCity], \
frenchHighway: [frenchCity] -> [frenchCity], \
internationalHighway: [frenchCity, germanCity] -> [frenchCity, germanCity]\
] VertexCollections: [village] ]"
    );
}
