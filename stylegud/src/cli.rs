//! Command-line glue for stylegud.
//!
//! Everything beyond argument parsing and config lookup lives in `stylegud-core`.
//! Call [`run`] with a parsed [`Cli`] from `main` or from integration tests.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use stylegud_core::sink::sink_for;
use stylegud_core::{Registry, Stylegud};

use crate::load_config::resolve_config;

/// Aggregate style-guide documentation from several parsers into one dataset.
#[derive(Parser, Debug)]
#[clap(
    name = "stylegud",
    version,
    about = "Merge style-guide documentation from several parsers into one JSON dataset"
)]
pub struct Cli {
    /// Path to a YAML or JSON config file. Falls back to $STYLEGUD_CONFIG, then
    /// the "stylegud" key of ./package.json.
    pub conf: Option<PathBuf>,
}

/// Async entrypoint shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let cwd = std::env::current_dir()?;
    let config = resolve_config(cli.conf, &cwd)?;
    config.trace_loaded();

    let pipeline = Stylegud::from_config(&config, &Registry::with_builtins())?;
    let sink = sink_for(pipeline.destination());

    match pipeline.run(sink.as_ref()).await {
        Ok(report) => {
            tracing::info!(?report, "Style guide generated");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, backend = ?e.backend(), "Style guide generation failed");
            Err(e.into())
        }
    }
}
