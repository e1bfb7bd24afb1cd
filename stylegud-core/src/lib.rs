#![doc = "stylegud-core: aggregation pipeline for style-guide documentation."]

//! Backends extract raw documentation records; this crate normalizes and validates
//! them, merges every backend's output into one sorted dataset, derives reference
//! URIs and runs the configured plugin chain before handing the result to a sink.
//!
//! # Usage
//! Build a [`Stylegud`] from a [`StylegudConfig`] and a [`Registry`], then call
//! [`Stylegud::run`] with a [`Sink`](contract::Sink).

pub mod accumulator;
pub mod backends;
pub mod config;
pub mod contract;
pub mod entry;
pub mod error;
pub mod pipeline;
pub mod plugins;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod sink;
pub mod wrapper;

pub use accumulator::Accumulator;
pub use config::{BackendConfig, Destination, PluginConfig, StylegudConfig};
pub use entry::{Dataset, RawRecord, SourceLocation, StyleGuideEntry};
pub use error::{PipelineError, Result};
pub use pipeline::{RunReport, RunState, Stylegud};
pub use reference::{set_references, uriify};
pub use registry::Registry;
pub use wrapper::BackendWrapper;
