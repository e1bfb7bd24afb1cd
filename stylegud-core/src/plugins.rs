//! Plugin chain and the built-in plugins.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::config::PluginConfig;
use crate::contract::{Plugin, PluginError};
use crate::entry::Dataset;
use crate::error::{PipelineError, Result};

/// One configured stage of the chain.
pub struct Stage {
    name: String,
    plugin: Box<dyn Plugin>,
}

impl Stage {
    pub fn new(name: impl Into<String>, plugin: Box<dyn Plugin>) -> Self {
        Self {
            name: name.into(),
            plugin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered plugin stages; each stage's output is the next stage's only input.
#[derive(Default)]
pub struct PluginChain {
    stages: Vec<Stage>,
}

impl PluginChain {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(Stage::name)
    }

    /// Runs every stage strictly in order. The first failing stage aborts the chain.
    pub async fn apply(&self, dataset: Dataset) -> Result<Dataset> {
        self.apply_with_progress(dataset, |_, _| {}).await
    }

    /// Like [`apply`](Self::apply), calling `on_applied(n, name)` after the `n`th stage succeeds.
    #[instrument(skip_all, fields(stages = self.stages.len()))]
    pub async fn apply_with_progress<F>(
        &self,
        mut dataset: Dataset,
        mut on_applied: F,
    ) -> Result<Dataset>
    where
        F: FnMut(usize, &str) + Send,
    {
        if self.is_empty() {
            debug!("No plugins configured");
            return Ok(dataset);
        }
        for (position, stage) in self.stages.iter().enumerate() {
            let before = dataset.len();
            dataset = stage.plugin.run(dataset).await.map_err(|source| {
                error!(plugin = %stage.name, position, error = %source, "Plugin failed");
                PipelineError::Plugin {
                    plugin: stage.name.clone(),
                    source,
                }
            })?;
            info!(
                plugin = %stage.name,
                position,
                before,
                after = dataset.len(),
                "Plugin applied"
            );
            on_applied(position + 1, &stage.name);
        }
        Ok(dataset)
    }
}

/// Drops entries whose reference starts with one of the prefixes (case-insensitive).
#[derive(Debug, Clone, Deserialize)]
pub struct ExcludeReferences {
    prefixes: Vec<String>,
}

impl ExcludeReferences {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    fn excludes(&self, reference: &str) -> bool {
        let reference = reference.to_lowercase();
        self.prefixes
            .iter()
            .any(|prefix| reference.starts_with(&prefix.to_lowercase()))
    }

    pub fn from_config(config: &PluginConfig) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(config.options_as::<Self>()?))
    }
}

#[async_trait]
impl Plugin for ExcludeReferences {
    async fn run(&self, dataset: Dataset) -> std::result::Result<Dataset, PluginError> {
        Ok(dataset
            .into_iter()
            .filter(|entry| !self.excludes(&entry.reference))
            .collect())
    }
}

/// Removes source locations, e.g. before publishing a style guide.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripSource;

impl StripSource {
    pub fn from_config(_config: &PluginConfig) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(StripSource))
    }
}

#[async_trait]
impl Plugin for StripSource {
    async fn run(&self, mut dataset: Dataset) -> std::result::Result<Dataset, PluginError> {
        for entry in &mut dataset {
            entry.source = None;
        }
        Ok(dataset)
    }
}

/// Forces a renderer onto every entry under a reference prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRenderer {
    /// Empty prefix matches every entry.
    #[serde(default)]
    prefix: String,
    renderer: String,
}

impl SetRenderer {
    pub fn new(prefix: impl Into<String>, renderer: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            renderer: renderer.into(),
        }
    }

    pub fn from_config(config: &PluginConfig) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(config.options_as::<Self>()?))
    }
}

#[async_trait]
impl Plugin for SetRenderer {
    async fn run(&self, mut dataset: Dataset) -> std::result::Result<Dataset, PluginError> {
        let prefix = self.prefix.to_lowercase();
        for entry in &mut dataset {
            if entry.sort_key().starts_with(&prefix) {
                entry.renderer.clone_from(&self.renderer);
            }
        }
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockPlugin;
    use crate::entry::{SourceLocation, StyleGuideEntry};
    use serde_json::json;

    fn dataset() -> Dataset {
        vec![
            StyleGuideEntry::new("Alert", "1.3", "html"),
            StyleGuideEntry::new("Button", "2.1", "html"),
            StyleGuideEntry::new("Draft", "X.1", "html"),
        ]
    }

    #[tokio::test]
    async fn empty_chain_is_identity() {
        let chain = PluginChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(dataset()).await.unwrap(), dataset());
    }

    #[tokio::test]
    async fn progress_is_reported_after_each_stage() {
        let chain = PluginChain::new(vec![
            Stage::new("strip", Box::new(StripSource)),
            Stage::new("react", Box::new(SetRenderer::new("", "react"))),
        ]);
        assert_eq!(chain.names().collect::<Vec<_>>(), ["strip", "react"]);

        let mut applied = Vec::new();
        let out = chain
            .apply_with_progress(dataset(), |n, name| applied.push((n, name.to_string())))
            .await
            .unwrap();

        assert_eq!(applied, [(1, "strip".to_string()), (2, "react".to_string())]);
        assert!(out.iter().all(|e| e.renderer == "react"));
    }

    #[tokio::test]
    async fn failing_stage_stops_progress() {
        let mut failing = MockPlugin::new();
        failing.expect_run().returning(|_| Err("boom".into()));
        let chain = PluginChain::new(vec![
            Stage::new("strip", Box::new(StripSource)),
            Stage::new("failing", Box::new(failing)),
        ]);

        let mut applied = Vec::new();
        let result = chain
            .apply_with_progress(dataset(), |n, _| applied.push(n))
            .await;
        assert!(result.is_err());
        assert_eq!(applied, [1]);
    }

    #[tokio::test]
    async fn failing_stage_names_the_plugin_and_stops_the_chain() {
        let mut failing = MockPlugin::new();
        failing
            .expect_run()
            .times(1)
            .returning(|_| Err("boom".into()));
        let mut never = MockPlugin::new();
        never.expect_run().never();

        let chain = PluginChain::new(vec![
            Stage::new("failing", Box::new(failing)),
            Stage::new("never", Box::new(never)),
        ]);

        let err = chain.apply(dataset()).await.unwrap_err();
        assert_eq!(err.to_string(), "plugin failing failed: boom");
    }

    #[tokio::test]
    async fn exclude_references_matches_prefix_case_insensitively() {
        let plugin = ExcludeReferences::new(["x."]);
        let out = plugin.run(dataset()).await.unwrap();
        let refs: Vec<_> = out.iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(refs, ["1.3", "2.1"]);
    }

    #[tokio::test]
    async fn strip_source_clears_locations() {
        let mut data = dataset();
        data[0].source = Some(SourceLocation {
            filename: Some("alert.css".into()),
            ..SourceLocation::default()
        });
        let out = StripSource.run(data).await.unwrap();
        assert!(out.iter().all(|e| e.source.is_none()));
    }

    #[tokio::test]
    async fn set_renderer_only_touches_prefix() {
        let out = SetRenderer::new("2", "react").run(dataset()).await.unwrap();
        let renderers: Vec<_> = out.iter().map(|e| e.renderer.as_str()).collect();
        assert_eq!(renderers, ["html", "react", "html"]);
    }

    #[test]
    fn options_are_read_from_config() {
        let config = PluginConfig::new("set-renderer").with_option("renderer", json!("twig"));
        assert!(SetRenderer::from_config(&config).is_ok());

        let config = PluginConfig::new("exclude-references");
        let err = ExcludeReferences::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("prefixes"));
    }
}
