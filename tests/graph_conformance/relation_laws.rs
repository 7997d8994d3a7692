//! Relation construction laws.

use proptest::prelude::*;
use trellis::{edge_definitions, extend_edge_definitions_list, relation, undirected_relation};

fn collection_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

proptest! {
    #[test]
    fn order_of_vertex_collections_is_irrelevant(
        from in prop::collection::vec(collection_name(), 1..6),
        to in prop::collection::vec(collection_name(), 1..6),
    ) {
        let mut from_rev = from.clone();
        from_rev.reverse();
        let mut to_rev = to.clone();
        to_rev.reverse();

        let a = relation("e", from.clone(), to.clone()).unwrap();
        let b = relation("e", from_rev, to_rev).unwrap();
        prop_assert_eq!(&a, &b);

        let mut sorted = a.from.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(a.from, sorted);
    }

    #[test]
    fn undirected_relation_is_symmetric(
        vertices in prop::collection::vec(collection_name(), 1..6),
    ) {
        let def = undirected_relation("e", vertices).unwrap();
        prop_assert_eq!(&def.from, &def.to);
    }
}

#[test]
fn invalid_arguments_are_rejected() {
    assert_eq!(relation("", "a", "b").unwrap_err().code(), 1936);
    assert_eq!(relation("e", Vec::<String>::new(), "b").unwrap_err().code(), 1936);
    assert_eq!(relation("e", "a", Vec::<String>::new()).unwrap_err().code(), 1936);
    assert_eq!(relation("e", "a/b", "c").unwrap_err().code(), 1936);
}

#[test]
fn definition_lists_keep_order() {
    let first = relation("first", "a", "b").unwrap();
    let second = relation("second", "b", "c").unwrap();
    let third = relation("third", "c", "a").unwrap();

    let list = edge_definitions([first.clone(), second.clone()]);
    let list = extend_edge_definitions_list(list, [third.clone()]);
    assert_eq!(list, vec![first, second, third]);
}

#[test]
fn definitions_render_compactly() {
    let def = relation("highway", ["germanCity", "frenchCity"], "germanCity").unwrap();
    assert_eq!(def.to_string(), "highway: [frenchCity, germanCity] -> [germanCity]");
}
