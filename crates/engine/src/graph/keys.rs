//! Name validation for graphs and collections.

use trellis_core::{TrellisError, TrellisResult, HANDLE_SEP};

/// Default name of the collection holding one descriptor document per graph.
pub const DEFAULT_GRAPHS_COLLECTION: &str = "_graphs";

// =============================================================================
// Validation
// =============================================================================

/// Validate a graph name.
///
/// An empty name is `GraphCreateMissingName`; a name that cannot be a
/// document key is `InvalidParameter`.
pub fn validate_graph_name(name: &str) -> TrellisResult<()> {
    if name.is_empty() {
        return Err(TrellisError::GraphCreateMissingName);
    }
    if name.contains(HANDLE_SEP) {
        return Err(TrellisError::invalid_parameter(format!(
            "graph name must not contain '{}': {}",
            HANDLE_SEP, name
        )));
    }
    Ok(())
}

/// Validate a collection name used in a relation or as an orphan.
pub fn validate_collection_name(name: &str) -> TrellisResult<()> {
    if name.is_empty() {
        return Err(TrellisError::invalid_parameter(
            "collection name must not be empty",
        ));
    }
    if name.contains(HANDLE_SEP) {
        return Err(TrellisError::invalid_parameter(format!(
            "collection name must not contain '{}': {}",
            HANDLE_SEP, name
        )));
    }
    Ok(())
}
