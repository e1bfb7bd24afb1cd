//! High-level pipeline: orchestrates parse → accumulate → reference → plugins → write.
//!
//! # Run states
//! `Idle → Parsing → Accumulated → Referenced → PluginsApplied(1) → … → PluginsApplied(n) → Written → Done`,
//! with `PluginsApplied(0)` standing in when no plugins are configured.
//! Any failure is terminal for the run; a new run starts again from `Idle`.
//!
//! # Concurrency
//! All backend wrappers are started together and joined with
//! [`futures::future::join_all`]. Siblings of a failing backend are not cancelled:
//! every wrapper runs to completion, then the first failure in configured order is
//! returned and the run's accumulator is dropped, so no partial dataset escapes.
//!
//! # Navigation
//! - Main entrypoint: [`Stylegud::run`]
//! - Dataset only, no output: [`Stylegud::collect`]

use std::fmt;

use futures::future::join_all;
use tracing::{debug, error, info, instrument};

use crate::accumulator::Accumulator;
use crate::config::{Destination, StylegudConfig};
use crate::contract::Sink;
use crate::entry::Dataset;
use crate::error::{PipelineError, Result};
use crate::plugins::{PluginChain, Stage};
use crate::reference::set_references;
use crate::registry::Registry;
use crate::wrapper::BackendWrapper;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Parsing,
    Accumulated,
    Referenced,
    /// Number of plugins applied so far.
    PluginsApplied(usize),
    Written,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::Parsing => f.write_str("parsing"),
            RunState::Accumulated => f.write_str("accumulated"),
            RunState::Referenced => f.write_str("referenced"),
            RunState::PluginsApplied(n) => write!(f, "plugins-applied({n})"),
            RunState::Written => f.write_str("written"),
            RunState::Done => f.write_str("done"),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub entries: usize,
    pub backends: usize,
    pub plugins: usize,
    pub destination: Destination,
}

/// The configured pipeline: backends, plugins and output destination.
pub struct Stylegud {
    wrappers: Vec<BackendWrapper>,
    chain: PluginChain,
    dest: Destination,
}

impl Stylegud {
    pub fn new(wrappers: Vec<BackendWrapper>, chain: PluginChain, dest: Destination) -> Self {
        Self {
            wrappers,
            chain,
            dest,
        }
    }

    /// Instantiates every configured backend and plugin through the registry.
    pub fn from_config(config: &StylegudConfig, registry: &Registry) -> Result<Self> {
        let wrappers = config
            .parsers
            .iter()
            .map(|parser| registry.backend(parser))
            .collect::<Result<Vec<_>>>()?;
        let stages = config
            .plugins
            .iter()
            .map(|plugin| registry.plugin(plugin))
            .collect::<Result<Vec<Stage>>>()?;
        let pipeline = Self::new(wrappers, PluginChain::new(stages), config.dest.clone());
        info!(
            backends = ?pipeline.backend_names().collect::<Vec<_>>(),
            plugins = ?pipeline.plugin_names().collect::<Vec<_>>(),
            dest = %pipeline.dest,
            "Pipeline configured"
        );
        Ok(pipeline)
    }

    pub fn destination(&self) -> &Destination {
        &self.dest
    }

    pub fn backend_names(&self) -> impl Iterator<Item = &str> {
        self.wrappers.iter().map(BackendWrapper::name)
    }

    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.chain.names()
    }

    /// Parses every backend, sorts, resolves references and applies the plugins.
    #[instrument(skip_all, fields(backends = self.wrappers.len(), plugins = self.chain.len()))]
    pub async fn collect(&self) -> Result<Dataset> {
        let mut state = RunState::Idle;
        transition(&mut state, RunState::Parsing);

        let acc = Accumulator::new();
        self.parse_all(&acc).await?;
        let dataset = acc.data();
        transition(&mut state, RunState::Accumulated);
        info!(entries = dataset.len(), "Accumulated entries from all backends");

        let dataset = set_references(dataset);
        transition(&mut state, RunState::Referenced);

        let dataset = self
            .chain
            .apply_with_progress(dataset, |applied, plugin| {
                debug!(plugin, "Plugin stage complete");
                transition(&mut state, RunState::PluginsApplied(applied));
            })
            .await?;
        if self.chain.is_empty() {
            transition(&mut state, RunState::PluginsApplied(0));
        }
        Ok(dataset)
    }

    /// Runs the whole pipeline and hands the result to `sink`.
    #[instrument(skip_all, fields(dest = %self.dest))]
    pub async fn run(&self, sink: &dyn Sink) -> Result<RunReport> {
        info!("Starting stylegud run");
        let dataset = self.collect().await?;

        let mut state = RunState::PluginsApplied(self.chain.len());
        sink.write(&dataset).await.map_err(|source| {
            error!(error = %source, "Writing output failed");
            PipelineError::Sink { source }
        })?;
        transition(&mut state, RunState::Written);
        transition(&mut state, RunState::Done);

        Ok(RunReport {
            entries: dataset.len(),
            backends: self.wrappers.len(),
            plugins: self.chain.len(),
            destination: self.dest.clone(),
        })
    }

    /// Waits for every wrapper, then surfaces the first failure in configured order.
    async fn parse_all(&self, acc: &Accumulator) -> Result<()> {
        let results = join_all(self.wrappers.iter().map(|wrapper| wrapper.parse(acc))).await;

        let mut first_error = None;
        for (wrapper, result) in self.wrappers.iter().zip(results) {
            if let Err(e) = result {
                error!(backend = wrapper.name(), error = %e, "Backend contribution failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => {
                error!(discarded = acc.len(), "Aborting run; accumulated entries discarded");
                Err(e)
            }
            None => Ok(()),
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    info!(from = %state, to = %next, "Run state changed");
    *state = next;
}
