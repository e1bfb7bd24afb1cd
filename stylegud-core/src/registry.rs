//! Explicit mapping from configuration identifiers to backend and plugin factories.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use crate::backends::{jsdoc, json, kss};
use crate::config::{BackendConfig, PluginConfig};
use crate::contract::Plugin;
use crate::error::{PipelineError, Result};
use crate::plugins::{ExcludeReferences, SetRenderer, Stage, StripSource};
use crate::wrapper::BackendWrapper;

/// Builds a wrapped backend from its configuration.
pub type BackendFactory = Arc<dyn Fn(&BackendConfig) -> Result<BackendWrapper> + Send + Sync>;

/// Builds a plugin from its configuration.
pub type PluginFactory = Arc<dyn Fn(&PluginConfig) -> Result<Box<dyn Plugin>> + Send + Sync>;

/// Holds every backend and plugin a configuration may name.
#[derive(Clone, Default)]
pub struct Registry {
    backends: HashMap<String, BackendFactory>,
    plugins: HashMap<String, PluginFactory>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in backends and plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for id in ["kss", "stylegud-parser-kss"] {
            registry.register_backend(id, kss::wrap);
        }
        for id in ["jsdoc", "stylegud-parser-jsdoc"] {
            registry.register_backend(id, jsdoc::wrap);
        }
        for id in ["json", "static"] {
            registry.register_backend(id, json::wrap);
        }
        registry.register_plugin("exclude-references", ExcludeReferences::from_config);
        registry.register_plugin("strip-source", StripSource::from_config);
        registry.register_plugin("set-renderer", SetRenderer::from_config);
        registry
    }

    /// Registers (or replaces) a backend factory.
    pub fn register_backend<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&BackendConfig) -> Result<BackendWrapper> + Send + Sync + 'static,
    {
        self.backends.insert(id.into(), Arc::new(factory));
        self
    }

    /// Registers (or replaces) a plugin factory.
    pub fn register_plugin<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&PluginConfig) -> Result<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        self.plugins.insert(id.into(), Arc::new(factory));
        self
    }

    pub fn backend(&self, config: &BackendConfig) -> Result<BackendWrapper> {
        let factory = self.backends.get(&config.parser).ok_or_else(|| {
            error!(parser = %config.parser, "Unknown parser in config");
            PipelineError::config(format!("unknown parser {:?}", config.parser))
        })?;
        debug!(parser = %config.parser, name = config.display_name(), "Building backend");
        factory(config)
    }

    pub fn plugin(&self, config: &PluginConfig) -> Result<Stage> {
        let factory = self.plugins.get(&config.plugin).ok_or_else(|| {
            error!(plugin = %config.plugin, "Unknown plugin in config");
            PipelineError::config(format!("unknown plugin {:?}", config.plugin))
        })?;
        debug!(plugin = %config.plugin, name = config.display_name(), "Building plugin");
        Ok(Stage::new(config.display_name(), factory(config)?))
    }

    /// Registered backend identifiers, sorted.
    pub fn backend_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.backends.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered plugin identifiers, sorted.
    pub fn plugin_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.plugins.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
