//! KSS backend: reads `kss --json` exports of CSS documentation comments.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{expand_sources, read_json, records_from_array};
use crate::config::BackendConfig;
use crate::contract::{Backend, BackendError, Normalizer};
use crate::entry::RawRecord;
use crate::error::Result;
use crate::wrapper::BackendWrapper;

/// Reads the `sections` array of every configured KSS export.
#[derive(Debug, Clone)]
pub struct KssBackend {
    src: Vec<String>,
}

impl KssBackend {
    pub fn new(src: Vec<String>) -> Self {
        Self { src }
    }
}

#[async_trait]
impl Backend for KssBackend {
    async fn parse(&self) -> std::result::Result<Vec<RawRecord>, BackendError> {
        let mut sections = Vec::new();
        for path in expand_sources(&self.src)? {
            let export = read_json(&path).await?;
            let Value::Object(mut export) = export else {
                return Err(format!("{}: expected a KSS export object", path.display()).into());
            };
            let found = export
                .remove("sections")
                .ok_or_else(|| format!("{}: KSS export has no `sections`", path.display()))?;
            let found = records_from_array(&path, found)?;
            debug!(path = %path.display(), sections = found.len(), "Read KSS export");
            sections.extend(found);
        }
        info!(sections = sections.len(), "KSS sections collected");
        Ok(sections)
    }
}

/// Trims KSS source locations to file name and directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct KssNormalizer;

impl Normalizer for KssNormalizer {
    fn normalize(&self, mut section: RawRecord) -> Option<RawRecord> {
        if let Some(Value::Object(source)) = section.remove("source") {
            section.insert("source".into(), Value::Object(conform_source(&source)));
        }
        Some(section)
    }
}

fn conform_source(source: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(filename) = source.get("filename").and_then(Value::as_str) {
        let base = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.insert("filename".into(), Value::String(base));
    }
    if let Some(path) = source.get("path").and_then(Value::as_str) {
        out.insert("path".into(), Value::String(dirname(path)));
    }
    if let Some(line) = source.get("line") {
        out.insert("line".into(), line.clone());
    }
    out
}

fn dirname(path: &str) -> String {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        Some(_) => ".".to_string(),
        None => path.to_string(),
    }
}

/// Registry factory for the `kss` backend.
pub fn wrap(config: &BackendConfig) -> Result<BackendWrapper> {
    Ok(BackendWrapper::with_normalizer(
        config.display_name(),
        Box::new(KssBackend::new(config.required_src()?)),
        Box::new(KssNormalizer),
        config.renderer.clone(),
    ))
}
