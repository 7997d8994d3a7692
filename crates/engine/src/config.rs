//! Graph catalog configuration.
//!
//! Built with setters or loaded from TOML:
//!
//! ```toml
//! graphs_collection = "_graphs"
//! create_collections = true
//! wait_for_sync = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use trellis_core::{RemoveOptions, TrellisError, TrellisResult, HANDLE_SEP};

use crate::graph::keys::DEFAULT_GRAPHS_COLLECTION;

/// Options for opening a [`GraphCatalog`](crate::graph::GraphCatalog).
///
/// ```
/// use trellis_engine::GraphConfig;
///
/// let config = GraphConfig::new().graphs_collection("_routes").wait_for_sync(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Collection holding one descriptor document per graph.
    pub graphs_collection: String,
    /// Whether `add_vertex_collection` creates a missing collection by default.
    pub create_collections: bool,
    /// Default `wait_for_sync` for removals made through graph handles.
    pub wait_for_sync: bool,
}

impl GraphConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the descriptor collection name.
    pub fn graphs_collection(mut self, name: impl Into<String>) -> Self {
        self.graphs_collection = name.into();
        self
    }

    /// Set the default for `add_vertex_collection`.
    pub fn create_collections(mut self, create: bool) -> Self {
        self.create_collections = create;
        self
    }

    /// Set the default `wait_for_sync`.
    pub fn wait_for_sync(mut self, wait: bool) -> Self {
        self.wait_for_sync = wait;
        self
    }

    /// Parse from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> TrellisResult<Self> {
        let config: GraphConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> TrellisResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            TrellisError::invalid_config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> TrellisResult<()> {
        if self.graphs_collection.is_empty() {
            return Err(TrellisError::invalid_config(
                "graphs_collection must not be empty",
            ));
        }
        if self.graphs_collection.contains(HANDLE_SEP) {
            return Err(TrellisError::invalid_config(format!(
                "graphs_collection must not contain '{}'",
                HANDLE_SEP
            )));
        }
        Ok(())
    }

    /// Removal options derived from these settings.
    pub fn remove_options(&self) -> RemoveOptions {
        RemoveOptions::new().wait_for_sync(self.wait_for_sync)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            graphs_collection: DEFAULT_GRAPHS_COLLECTION.to_string(),
            create_collections: true,
            wait_for_sync: false,
        }
    }
}
