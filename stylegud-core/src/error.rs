//! Error taxonomy for a pipeline run.
//!
//! Any single failure aborts the whole run; there is no partial output.

use crate::contract::{BackendError, PluginError, SinkError};
use crate::schema::Problem;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A backend's own parse operation failed. Displayed verbatim.
    #[error("{source}")]
    Backend {
        backend: String,
        #[source]
        source: BackendError,
    },

    /// A normalized record does not satisfy the required-field schema.
    #[error("{backend} - Invalid parser output. {problem} property \"{field}\" in parsed result.")]
    Validation {
        backend: String,
        field: &'static str,
        problem: Problem,
    },

    /// A record passed the schema check but could not be read as an entry.
    #[error("{backend} - Invalid parser output. {source}")]
    Conform {
        backend: String,
        #[source]
        source: serde_json::Error,
    },

    /// No usable configuration, or it names something the registry does not know.
    #[error("config error: {message}")]
    Configuration { message: String },

    #[error("plugin {plugin} failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("failed to write output: {source}")]
    Sink {
        #[source]
        source: SinkError,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Create a configuration error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Name of the backend responsible for the failure, if any.
    pub fn backend(&self) -> Option<&str> {
        match self {
            Self::Backend { backend, .. }
            | Self::Validation { backend, .. }
            | Self::Conform { backend, .. } => Some(backend),
            _ => None,
        }
    }
}
