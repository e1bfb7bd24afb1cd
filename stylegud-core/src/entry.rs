//! Canonical style-guide entry model shared by every stage of the pipeline.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// One heterogeneous record as handed over by a backend's normalizer.
///
/// Field presence is checked by key, see [`crate::schema`].
pub type RawRecord = Map<String, Value>;

/// The ordered dataset that flows from the accumulator through the plugin chain.
pub type Dataset = Vec<StyleGuideEntry>;

/// Serialized name of [`StyleGuideEntry::reference_uri`].
pub const REFERENCE_URI: &str = "referenceURI";

/// Keys owned by the named fields of [`StyleGuideEntry`].
pub const NAMED_FIELDS: &[&str] = &[
    "header",
    "description",
    "reference",
    "markup",
    "modifiers",
    "renderer",
    "source",
    REFERENCE_URI,
];

/// Where an entry was documented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    /// Module export the entry documents (doc-comment backends only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,
}

/// One documented component or pattern.
///
/// Serializes as one flat JSON object. Keys in `extra` that collide with a named
/// field are not written; the named field wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleGuideEntry {
    /// Display title.
    pub header: String,
    pub description: String,
    /// Hierarchical identifier, e.g. `2.1.3`.
    pub reference: String,
    pub markup: String,
    /// Variant descriptors; shape is backend specific.
    pub modifiers: Vec<Value>,
    /// Template/renderer to use for this entry.
    pub renderer: String,
    #[serde(default)]
    pub source: Option<SourceLocation>,
    /// URL-safe slug of `reference`, only set by [`crate::reference::set_references`].
    #[serde(default, rename = "referenceURI")]
    pub reference_uri: Option<String>,
    /// Any other properties contributed by a backend or added by a plugin.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Serialize for StyleGuideEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("header", &self.header)?;
        map.serialize_entry("description", &self.description)?;
        map.serialize_entry("reference", &self.reference)?;
        map.serialize_entry("markup", &self.markup)?;
        map.serialize_entry("modifiers", &self.modifiers)?;
        map.serialize_entry("renderer", &self.renderer)?;
        if let Some(source) = &self.source {
            map.serialize_entry("source", source)?;
        }
        if let Some(uri) = &self.reference_uri {
            map.serialize_entry(REFERENCE_URI, uri)?;
        }
        for (key, value) in &self.extra {
            if !NAMED_FIELDS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl StyleGuideEntry {
    /// Builds an entry with the required fields and everything else empty.
    pub fn new(
        header: impl Into<String>,
        reference: impl Into<String>,
        renderer: impl Into<String>,
    ) -> Self {
        Self {
            header: header.into(),
            description: String::new(),
            reference: reference.into(),
            markup: String::new(),
            modifiers: Vec::new(),
            renderer: renderer.into(),
            source: None,
            reference_uri: None,
            extra: Map::new(),
        }
    }

    /// Lower-cased reference, the key the accumulator orders by.
    pub fn sort_key(&self) -> String {
        self.reference.to_lowercase()
    }
}
