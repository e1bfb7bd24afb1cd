//! Output sinks for the final dataset.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::config::Destination;
use crate::contract::{Sink, SinkError};
use crate::entry::StyleGuideEntry;

/// Prints the dataset as one line of JSON on standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    async fn write(&self, dataset: &[StyleGuideEntry]) -> Result<(), SinkError> {
        let mut json = serde_json::to_vec(dataset)?;
        json.push(b'\n');
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&json).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Writes the dataset as pretty-printed JSON to a file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&self, dataset: &[StyleGuideEntry]) -> Result<(), SinkError> {
        let json = serde_json::to_vec_pretty(dataset)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!(error = ?e, path = %parent.display(), "Failed to create output directory");
                e
            })?;
        }
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            error!(error = ?e, path = %self.path.display(), "Failed to write output file");
            e
        })?;
        info!(path = %self.path.display(), entries = dataset.len(), "Wrote {}", self.path.display());
        Ok(())
    }
}

/// Sink matching a configured destination.
pub fn sink_for(dest: &Destination) -> Box<dyn Sink> {
    match dest {
        Destination::Stdout => Box::new(StdoutSink),
        Destination::File(path) => Box::new(FileSink::new(path.clone())),
    }
}
