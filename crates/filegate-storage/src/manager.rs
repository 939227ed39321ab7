//! Source registry: maps source names (and roots) to their index.

use std::collections::HashMap;
use std::sync::Arc;

use filegate_core::config::storage::SourceConfig;
use filegate_core::result::AppResult;
use filegate_core::traits::IndexProvider;

use crate::providers::local::LocalIndex;

/// A configured source and its index.
#[derive(Debug, Clone)]
pub struct Source {
    pub config: SourceConfig,
    pub index: Arc<dyn IndexProvider>,
}

impl Source {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Real root as a string, the key used by access rules and links.
    pub fn root(&self) -> String {
        self.index.root().to_string_lossy().into_owned()
    }

    pub fn is_private(&self) -> bool {
        self.config.private
    }
}

/// Holds every registered source.
#[derive(Debug, Clone, Default)]
pub struct SourceManager {
    sources: HashMap<String, Source>,
}

impl SourceManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager with a [`LocalIndex`] per configured source.
    pub fn from_config(sources: &[SourceConfig]) -> AppResult<Self> {
        let mut manager = Self::new();
        for config in sources {
            let index = LocalIndex::open(&config.path)?;
            manager.register(config.clone(), Arc::new(index));
            tracing::info!(source = %config.name, root = %config.path, "Registered source");
        }
        Ok(manager)
    }

    /// Register (or replace) a source.
    pub fn register(&mut self, config: SourceConfig, index: Arc<dyn IndexProvider>) {
        self.sources
            .insert(config.name.clone(), Source { config, index });
    }

    /// Look up a source by name.
    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.get(name)
    }

    /// Look up a source by its real root.
    pub fn by_root(&self, root: &str) -> Option<&Source> {
        self.sources.values().find(|s| s.root() == root)
    }

    /// Names of every registered source.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }
}
