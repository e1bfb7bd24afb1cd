//! JSDoc backend: reads `jsdoc -X` (explain) output and keeps the doclets tagged `@styleguide`.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{expand_sources, read_json, records_from_array};
use crate::config::BackendConfig;
use crate::contract::{Backend, BackendError, Normalizer};
use crate::entry::RawRecord;
use crate::error::Result;
use crate::wrapper::BackendWrapper;

const STYLEGUIDE_TAG: &str = "styleguide";
const EXPORTS_PREFIX: &str = "exports.";

/// Reads every doclet from the configured explain exports.
#[derive(Debug, Clone)]
pub struct JsDocBackend {
    src: Vec<String>,
}

impl JsDocBackend {
    pub fn new(src: Vec<String>) -> Self {
        Self { src }
    }
}

#[async_trait]
impl Backend for JsDocBackend {
    async fn parse(&self) -> std::result::Result<Vec<RawRecord>, BackendError> {
        let mut doclets = Vec::new();
        for path in expand_sources(&self.src)? {
            let found = records_from_array(&path, read_json(&path).await?)?;
            debug!(path = %path.display(), doclets = found.len(), "Read JSDoc explain output");
            doclets.extend(found);
        }
        info!(doclets = doclets.len(), "JSDoc doclets collected");
        Ok(doclets)
    }
}

/// Converts doclets into entries; doclets without a `@styleguide` tag are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsDocNormalizer;

impl Normalizer for JsDocNormalizer {
    fn normalize(&self, doclet: RawRecord) -> Option<RawRecord> {
        let tags = Tags::from_doclet(&doclet);
        let styleguide = tags.last(STYLEGUIDE_TAG)?;

        let mut entry = Map::new();
        if let Some(name) = doclet.get("name") {
            entry.insert("header".into(), name.clone());
        }
        let description = doclet
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        entry.insert("description".into(), Value::String(description.into()));
        if let Some(reference) = tag_value(styleguide) {
            entry.insert("reference".into(), reference.clone());
        }
        let markup = tags
            .last("markup")
            .and_then(tag_value)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        entry.insert("markup".into(), markup);
        entry.insert("modifiers".into(), Value::Array(modifiers(&tags)));
        if let Some(source) = conform_meta(&doclet, &tags) {
            entry.insert("source".into(), Value::Object(source));
        }
        Some(entry)
    }
}

/// Tags of one doclet, in declaration order.
struct Tags<'a>(Vec<&'a Map<String, Value>>);

impl<'a> Tags<'a> {
    fn from_doclet(doclet: &'a RawRecord) -> Self {
        let tags = doclet
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default();
        Tags(tags)
    }

    fn all(&self, title: &'a str) -> impl Iterator<Item = &'a Map<String, Value>> + '_ {
        self.0
            .iter()
            .copied()
            .filter(move |tag| tag.get("title").and_then(Value::as_str) == Some(title))
    }

    /// Later tags with the same title override earlier ones.
    fn last(&self, title: &'a str) -> Option<&'a Map<String, Value>> {
        self.all(title).last()
    }
}

/// `value` is what jsdoc parsed for known tags; unknown tags only carry `text`.
fn tag_value(tag: &Map<String, Value>) -> Option<&Value> {
    tag.get("value").or_else(|| tag.get("text"))
}

fn modifiers(tags: &Tags<'_>) -> Vec<Value> {
    tags.all("modifiers")
        .filter_map(tag_value)
        .flat_map(|value| match value {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        })
        .collect()
}

fn conform_meta(doclet: &RawRecord, tags: &Tags<'_>) -> Option<Map<String, Value>> {
    let meta = doclet.get("meta")?.as_object()?;
    let mut source = Map::new();
    if let Some(line) = meta.get("lineno") {
        source.insert("line".into(), line.clone());
    }
    for key in ["filename", "path"] {
        if let Some(value) = meta.get(key) {
            source.insert(key.into(), value.clone());
        }
    }
    source.insert("export".into(), Value::String(export_name(doclet, meta, tags)));
    Some(source)
}

fn export_name(doclet: &RawRecord, meta: &Map<String, Value>, tags: &Tags<'_>) -> String {
    let code_name = meta
        .get("code")
        .and_then(|code| code.get("name"))
        .and_then(Value::as_str);
    if let Some(stripped) = code_name.and_then(|name| name.strip_prefix(EXPORTS_PREFIX)) {
        return stripped.to_string();
    }
    let export_tag = tags.last("export").or_else(|| tags.last("exports"));
    match export_tag {
        Some(tag) => match tag.get("text").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => doclet
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        None => String::new(),
    }
}

/// Registry factory for the `jsdoc` backend.
pub fn wrap(config: &BackendConfig) -> Result<BackendWrapper> {
    Ok(BackendWrapper::with_normalizer(
        config.display_name(),
        Box::new(JsDocBackend::new(config.required_src()?)),
        Box::new(JsDocNormalizer),
        config.renderer.clone(),
    ))
}
