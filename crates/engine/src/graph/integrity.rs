//! Cascading deletion across every graph in the catalog.
//!
//! Removing a vertex or an edge removes every edge that would otherwise
//! dangle, in any graph, transitively: edges may point at edges. Discovery
//! walks the store without holding locks and returns a [`CascadePlan`];
//! [`CascadeDeletionEngine::execute`] then removes the whole plan in one
//! store transaction.
//!
//! Definitions come from the catalog's index, which is checked against the
//! stored descriptors before every lookup, so graphs created through another
//! catalog over the same store are reached too.
//!
//! An edge inserted between discovery and commit is not part of the plan and
//! survives the removal. Only the commit is atomic. Two concurrent removals
//! whose plans share an edge both list it; the later commit fails with
//! `DocumentNotFound` and removes nothing, so its root stays in place.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use tracing::debug;
use trellis_core::{DocumentId, EdgeDirection, RemoveOptions, TrellisError, TrellisResult};

use super::catalog::GraphCatalog;

/// Documents a cascading removal will delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePlan {
    /// The document whose removal was requested.
    pub root: DocumentId,
    /// Edges depending on `root`, directly or through other edges, each once.
    pub dependents: Vec<DocumentId>,
    /// Collections the removal transaction locks.
    pub collections: BTreeSet<String>,
}

impl CascadePlan {
    fn new(root: DocumentId) -> Self {
        let mut collections = BTreeSet::new();
        collections.insert(root.collection().to_string());
        Self {
            root,
            dependents: Vec::new(),
            collections,
        }
    }

    /// Number of documents removed, root included.
    pub fn len(&self) -> usize {
        self.dependents.len() + 1
    }

    /// Always false: a plan removes at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True if `id` is the root or one of the dependents.
    pub fn contains(&self, id: &DocumentId) -> bool {
        &self.root == id || self.dependents.contains(id)
    }

    /// Every document removed, dependents first, root last.
    pub fn removal_order(&self) -> impl Iterator<Item = &DocumentId> {
        self.dependents.iter().chain(std::iter::once(&self.root))
    }
}

/// Computes and executes cascading removals.
#[derive(Debug, Clone)]
pub struct CascadeDeletionEngine {
    catalog: GraphCatalog,
}

impl CascadeDeletionEngine {
    /// Engine reading definitions from `catalog`.
    pub fn new(catalog: GraphCatalog) -> Self {
        Self { catalog }
    }

    /// Plan the removal of an edge and of every edge pointing at it.
    pub fn plan_edge_removal(&self, edge_id: &DocumentId) -> TrellisResult<CascadePlan> {
        self.plan(edge_id)
    }

    /// Plan the removal of a vertex and of every edge incident to it.
    pub fn plan_vertex_removal(&self, vertex_id: &DocumentId) -> TrellisResult<CascadePlan> {
        self.plan(vertex_id)
    }

    /// Visited-set guarded walk: each document is expanded at most once, so
    /// cycles and self-loops terminate.
    fn plan(&self, root: &DocumentId) -> TrellisResult<CascadePlan> {
        let store = self.catalog.store();
        let mut plan = CascadePlan::new(root.clone());
        let mut visited: FxHashSet<DocumentId> = FxHashSet::default();
        visited.insert(root.clone());
        let mut pending = vec![root.clone()];

        while let Some(current) = pending.pop() {
            for def in self.catalog.definitions_touching(current.collection())? {
                let incident = match store.edges(&def.collection, &current, EdgeDirection::Any) {
                    Ok(edges) => edges,
                    Err(TrellisError::CollectionNotFound { .. }) => continue,
                    Err(e) => return Err(e),
                };
                for edge in incident {
                    if visited.insert(edge.id.clone()) {
                        debug!(
                            target: "trellis::graph",
                            edge = %edge.id,
                            via = %current,
                            "Cascade reaches edge"
                        );
                        plan.collections.insert(def.collection.clone());
                        plan.dependents.push(edge.id.clone());
                        pending.push(edge.id);
                    }
                }
            }
        }
        Ok(plan)
    }

    /// Remove every document of `plan` in one transaction.
    ///
    /// On failure nothing is removed and the store's error is returned as is.
    pub fn execute(&self, plan: &CascadePlan, options: &RemoveOptions) -> TrellisResult<()> {
        let write: Vec<String> = plan.collections.iter().cloned().collect();
        self.catalog.store().transaction(&write, &mut |txn| {
            for id in plan.removal_order() {
                txn.remove(id, options)?;
            }
            Ok(())
        })?;
        debug!(
            target: "trellis::graph",
            root = %plan.root,
            removed = plan.len(),
            collections = plan.collections.len(),
            "Cascade removal committed"
        );
        Ok(())
    }

    /// Plan and execute the removal of an edge.
    pub fn remove_edge(
        &self,
        edge_id: &DocumentId,
        options: &RemoveOptions,
    ) -> TrellisResult<CascadePlan> {
        let plan = self.plan_edge_removal(edge_id)?;
        self.execute(&plan, options)?;
        Ok(plan)
    }

    /// Plan and execute the removal of a vertex.
    pub fn remove_vertex(
        &self,
        vertex_id: &DocumentId,
        options: &RemoveOptions,
    ) -> TrellisResult<CascadePlan> {
        let plan = self.plan_vertex_removal(vertex_id)?;
        self.execute(&plan, options)?;
        Ok(plan)
    }
}
