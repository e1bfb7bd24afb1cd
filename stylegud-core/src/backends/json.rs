//! Static backend: JSON files that already hold canonical records.

use async_trait::async_trait;
use tracing::info;

use super::{expand_sources, read_json, records_from_array};
use crate::config::BackendConfig;
use crate::contract::{Backend, BackendError};
use crate::entry::RawRecord;
use crate::error::Result;
use crate::wrapper::BackendWrapper;

#[derive(Debug, Clone)]
pub struct JsonBackend {
    src: Vec<String>,
}

impl JsonBackend {
    pub fn new(src: Vec<String>) -> Self {
        Self { src }
    }
}

#[async_trait]
impl Backend for JsonBackend {
    async fn parse(&self) -> std::result::Result<Vec<RawRecord>, BackendError> {
        let mut records = Vec::new();
        for path in expand_sources(&self.src)? {
            records.extend(records_from_array(&path, read_json(&path).await?)?);
        }
        info!(records = records.len(), "Static JSON records collected");
        Ok(records)
    }
}

/// Registry factory for the `json` backend.
pub fn wrap(config: &BackendConfig) -> Result<BackendWrapper> {
    Ok(BackendWrapper::new(
        config.display_name(),
        Box::new(JsonBackend::new(config.required_src()?)),
        config.renderer.clone(),
    ))
}
