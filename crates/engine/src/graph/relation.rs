//! Edge definition construction and validation.
//!
//! Everything here is pure: no store access, no logging. The catalog calls
//! [`validate_edge_definition`] and [`sort_edge_definition`] on every
//! definition it accepts.

use serde::{Deserialize, Serialize};
use trellis_core::{TrellisError, TrellisResult};

use super::keys::validate_collection_name;
use super::types::EdgeDefinition;

/// One collection name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Collections {
    /// A single collection
    One(String),
    /// Several collections
    Many(Vec<String>),
}

impl Collections {
    fn into_vec(self) -> Vec<String> {
        match self {
            Collections::One(name) => vec![name],
            Collections::Many(names) => names,
        }
    }
}

impl From<&str> for Collections {
    fn from(name: &str) -> Self {
        Collections::One(name.to_string())
    }
}

impl From<String> for Collections {
    fn from(name: String) -> Self {
        Collections::One(name)
    }
}

impl From<Vec<String>> for Collections {
    fn from(names: Vec<String>) -> Self {
        Collections::Many(names)
    }
}

impl From<Vec<&str>> for Collections {
    fn from(names: Vec<&str>) -> Self {
        Collections::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Collections {
    fn from(names: &[&str]) -> Self {
        Collections::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Collections {
    fn from(names: [&str; N]) -> Self {
        Collections::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

fn normalize(side: &str, collections: Collections) -> TrellisResult<Vec<String>> {
    let mut names = collections.into_vec();
    if names.is_empty() {
        return Err(TrellisError::invalid_parameter(format!(
            "<{}> must be a non-empty collection name or list",
            side
        )));
    }
    for name in &names {
        validate_collection_name(name)?;
    }
    names.sort();
    names.dedup();
    Ok(names)
}

/// Build a directed relation.
///
/// # Example
///
/// ```
/// use trellis_engine::graph::relation::relation;
///
/// let def = relation("highway", ["germanCity", "frenchCity"], "germanCity").unwrap();
/// assert_eq!(def.from, vec!["frenchCity", "germanCity"]);
/// ```
pub fn relation(
    name: &str,
    from: impl Into<Collections>,
    to: impl Into<Collections>,
) -> TrellisResult<EdgeDefinition> {
    if name.is_empty() {
        return Err(TrellisError::invalid_parameter(
            "<relationName> must be a non-empty string",
        ));
    }
    validate_collection_name(name)?;
    Ok(EdgeDefinition {
        collection: name.to_string(),
        from: normalize("fromVertexCollections", from.into())?,
        to: normalize("toVertexCollections", to.into())?,
    })
}

/// Build a relation whose `from` and `to` are the same set of vertex collections.
pub fn undirected_relation(
    name: &str,
    vertices: impl Into<Collections>,
) -> TrellisResult<EdgeDefinition> {
    let vertices = vertices.into();
    relation(name, vertices.clone(), vertices)
}

/// Canonicalize `from` and `to` (sort + dedup).
pub fn sort_edge_definition(mut def: EdgeDefinition) -> EdgeDefinition {
    def.from.sort();
    def.from.dedup();
    def.to.sort();
    def.to.dedup();
    def
}

/// Check that a definition names its edge collection and both vertex sides.
pub fn validate_edge_definition(def: &EdgeDefinition) -> TrellisResult<()> {
    if def.collection.is_empty() {
        return Err(TrellisError::malformed_edge_definition(
            "edge definition without collection",
        ));
    }
    if def.from.is_empty() {
        return Err(TrellisError::malformed_edge_definition(format!(
            "{}: from must not be empty",
            def.collection
        )));
    }
    if def.to.is_empty() {
        return Err(TrellisError::malformed_edge_definition(format!(
            "{}: to must not be empty",
            def.collection
        )));
    }
    validate_collection_name(&def.collection)?;
    for name in def.from.iter().chain(def.to.iter()) {
        validate_collection_name(name)?;
    }
    Ok(())
}

/// Collect definitions into an ordered list.
pub fn edge_definitions<I>(defs: I) -> Vec<EdgeDefinition>
where
    I: IntoIterator<Item = EdgeDefinition>,
{
    defs.into_iter().collect()
}

/// Append definitions to an existing list.
pub fn extend_edge_definitions_list<I>(
    mut list: Vec<EdgeDefinition>,
    defs: I,
) -> Vec<EdgeDefinition>
where
    I: IntoIterator<Item = EdgeDefinition>,
{
    list.extend(defs);
    list
}
