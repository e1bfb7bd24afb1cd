//! Run configuration: which backends to run, which plugins to apply, where output goes.
//!
//! Loading the file is the caller's job; this module only defines the model.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// The top-level configuration of one pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StylegudConfig {
    #[serde(default)]
    pub parsers: Vec<BackendConfig>,
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
    #[serde(default)]
    pub dest: Destination,
}

impl StylegudConfig {
    pub fn trace_loaded(&self) {
        info!(
            parsers = self.parsers.len(),
            plugins = self.plugins.len(),
            dest = %self.dest,
            "Loaded stylegud config"
        );
        for parser in &self.parsers {
            parser.trace_loaded();
        }
        debug!(?self, "Config loaded (full debug)");
    }
}

/// One backend to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Registry identifier, e.g. `kss`.
    pub parser: String,
    /// Name used in logs and error messages; defaults to `parser`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Renderer assigned to entries that do not name one.
    pub renderer: String,
    /// Source file paths or glob patterns.
    #[serde(default)]
    pub src: SourcePatterns,
    /// Backend-specific options.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl BackendConfig {
    pub fn new(parser: impl Into<String>, renderer: impl Into<String>) -> Self {
        Self {
            parser: parser.into(),
            name: None,
            renderer: renderer.into(),
            src: SourcePatterns::default(),
            options: Map::new(),
        }
    }

    pub fn with_src(mut self, src: impl Into<SourcePatterns>) -> Self {
        self.src = src.into();
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.parser)
    }

    /// Source patterns, failing when none are configured.
    pub fn required_src(&self) -> Result<Vec<String>> {
        let patterns = self.src.to_vec();
        if patterns.is_empty() {
            return Err(PipelineError::config(format!(
                "parser {:?} needs at least one `src` entry",
                self.display_name()
            )));
        }
        Ok(patterns)
    }

    pub fn trace_loaded(&self) {
        info!(
            parser = %self.parser,
            name = self.display_name(),
            renderer = %self.renderer,
            sources = self.src.len(),
            "Loaded parser config"
        );
    }
}

/// `src` accepts either one pattern or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourcePatterns {
    One(String),
    Many(Vec<String>),
}

impl Default for SourcePatterns {
    fn default() -> Self {
        SourcePatterns::Many(Vec::new())
    }
}

impl SourcePatterns {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            SourcePatterns::One(p) => vec![p.clone()],
            SourcePatterns::Many(ps) => ps.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourcePatterns::One(_) => 1,
            SourcePatterns::Many(ps) => ps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for SourcePatterns {
    fn from(pattern: &str) -> Self {
        SourcePatterns::One(pattern.to_string())
    }
}

impl From<String> for SourcePatterns {
    fn from(pattern: String) -> Self {
        SourcePatterns::One(pattern)
    }
}

impl From<Vec<String>> for SourcePatterns {
    fn from(patterns: Vec<String>) -> Self {
        SourcePatterns::Many(patterns)
    }
}

/// One plugin to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Registry identifier, e.g. `strip-source`.
    pub plugin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Plugin-specific options.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl PluginConfig {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            name: None,
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.plugin)
    }

    /// Reads the plugin options into a typed struct.
    pub fn options_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.options.clone())).map_err(|e| {
            PipelineError::config(format!(
                "invalid options for plugin {:?}: {e}",
                self.display_name()
            ))
        })
    }
}

/// Sentinel destination meaning "print the dataset".
pub const STDOUT: &str = "stdout";

/// Where the final dataset goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Destination {
    #[default]
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn parse(dest: &str) -> Self {
        if dest == STDOUT {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(dest))
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str(STDOUT),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let dest = String::deserialize(deserializer)?;
        Ok(Destination::parse(&dest))
    }
}
