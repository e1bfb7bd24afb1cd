//! # contract: interfaces of the pipeline's external collaborators
//!
//! The core never knows how a backend reads source files, what a plugin does to the
//! dataset, or where output ends up. It only talks to these traits:
//!
//! - [`Backend`] produces raw records for one configured source set.
//! - [`Normalizer`] reshapes one backend's records into the canonical field names.
//! - [`Plugin`] transforms the full dataset after accumulation.
//! - [`Sink`] receives the final dataset.
//!
//! All async traits are annotated for `mockall` so tests can script deterministic
//! collaborators.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::entry::{Dataset, RawRecord, StyleGuideEntry};

/// Error raised by a backend's own parse operation.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Error raised by a plugin while transforming the dataset.
pub type PluginError = Box<dyn std::error::Error + Send + Sync>;

/// Error raised by an output sink.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// A producer of raw documentation records.
///
/// Each call is independent; the pipeline calls `parse` exactly once per run.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Extract every raw record from the backend's configured sources.
    async fn parse(&self) -> Result<Vec<RawRecord>, BackendError>;
}

/// Converts one backend's output shape into canonical field names.
///
/// Returning `None` drops the record (e.g. doc comments that are not style-guide entries).
pub trait Normalizer: Send + Sync {
    fn normalize(&self, record: RawRecord) -> Option<RawRecord>;
}

/// Normalizer for backends that already emit canonical records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Normalizer for Identity {
    fn normalize(&self, record: RawRecord) -> Option<RawRecord> {
        Some(record)
    }
}

/// A dataset transformer applied after accumulation.
///
/// The output of one plugin is the sole input of the next; no post-condition is
/// imposed on what a plugin returns.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn run(&self, dataset: Dataset) -> Result<Dataset, PluginError>;
}

/// Final destination of a run's dataset.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, dataset: &[StyleGuideEntry]) -> Result<(), SinkError>;
}
