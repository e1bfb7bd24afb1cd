//! Backend wrapper: the gate between one extraction backend and the shared accumulator.

use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::accumulator::Accumulator;
use crate::contract::{Backend, Identity, Normalizer};
use crate::entry::{RawRecord, StyleGuideEntry, REFERENCE_URI};
use crate::error::{PipelineError, Result};
use crate::schema::Schema;

/// Couples one backend with its normalizer, the required-field schema and a
/// default renderer.
///
/// Only complete batches reach the accumulator: one bad record fails the whole batch.
pub struct BackendWrapper {
    name: String,
    renderer: String,
    backend: Box<dyn Backend>,
    normalizer: Box<dyn Normalizer>,
    schema: Schema,
}

impl std::fmt::Debug for BackendWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendWrapper")
            .field("name", &self.name)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl BackendWrapper {
    /// Wraps a backend whose records are already canonical.
    pub fn new(
        name: impl Into<String>,
        backend: Box<dyn Backend>,
        renderer: impl Into<String>,
    ) -> Self {
        Self::with_normalizer(name, backend, Box::new(Identity), renderer)
    }

    pub fn with_normalizer(
        name: impl Into<String>,
        backend: Box<dyn Backend>,
        normalizer: Box<dyn Normalizer>,
        renderer: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            renderer: renderer.into(),
            backend,
            normalizer,
            schema: Schema::default(),
        }
    }

    /// Name used to identify this backend in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renderer assigned to records that do not carry their own.
    pub fn default_renderer(&self) -> &str {
        &self.renderer
    }

    /// Runs the backend, then normalizes, defaults, validates and accumulates its output.
    ///
    /// Backend failures are returned unchanged; nothing is accumulated on any failure.
    #[instrument(skip_all, fields(backend = %self.name))]
    pub async fn parse(&self, acc: &Accumulator) -> Result<()> {
        info!("Starting backend parse");
        let raw = self.backend.parse().await.map_err(|source| {
            error!(error = %source, "Backend parse failed");
            PipelineError::Backend {
                backend: self.name.clone(),
                source,
            }
        })?;
        debug!(records = raw.len(), "Backend returned raw records");

        let batch = self.prepare(raw)?;
        info!(entries = batch.len(), "Backend batch validated");
        acc.accumulate(batch);
        Ok(())
    }

    /// Normalizes, applies the default renderer and validates a raw batch.
    ///
    /// Any `referenceURI` a backend supplies is dropped; only the reference
    /// resolver sets it.
    pub fn prepare(&self, raw: Vec<RawRecord>) -> Result<Vec<StyleGuideEntry>> {
        let records: Vec<RawRecord> = raw
            .into_iter()
            .filter_map(|record| self.normalizer.normalize(record))
            .map(|mut record| {
                record.remove(REFERENCE_URI);
                self.apply_default_renderer(record)
            })
            .collect();

        self.validate(&records)?;

        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(Value::Object(record)).map_err(|source| {
                    error!(error = %source, "Validated record could not be read as an entry");
                    PipelineError::Conform {
                        backend: self.name.clone(),
                        source,
                    }
                })
            })
            .collect()
    }

    /// Fails on the first record missing a required field.
    pub fn validate(&self, records: &[RawRecord]) -> Result<()> {
        self.schema.check_batch(records).map_err(|violation| {
            error!(
                index = violation.index,
                field = violation.field,
                problem = %violation.problem,
                "Backend output failed validation"
            );
            PipelineError::Validation {
                backend: self.name.clone(),
                field: violation.field,
                problem: violation.problem,
            }
        })
    }

    fn apply_default_renderer(&self, mut record: RawRecord) -> RawRecord {
        let has_renderer = match record.get("renderer") {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        if !has_renderer {
            record.insert("renderer".into(), Value::String(self.renderer.clone()));
        }
        record
    }
}
