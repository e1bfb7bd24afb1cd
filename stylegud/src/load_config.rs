//! Finds and parses the run configuration for the CLI.
//!
//! Lookup order:
//! 1. the path given on the command line
//! 2. the path in the `STYLEGUD_CONFIG` environment variable
//! 3. the `stylegud` key of `package.json` in the working directory, either a path
//!    to a config file or the configuration itself
//!
//! Files ending in `.json` are parsed as JSON, anything else as YAML.
//!
//! # Errors
//! All errors are `anyhow::Error` and surface at the CLI boundary. A missing
//! configuration is reported as a [`PipelineError::Configuration`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;
use stylegud_core::{PipelineError, StylegudConfig};
use tracing::{debug, error, info};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "STYLEGUD_CONFIG";

/// Key of `package.json` that may hold the configuration.
pub const PACKAGE_KEY: &str = "stylegud";

/// Loads a YAML or JSON config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StylegudConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            debug!(config_path = ?path_ref, bytes = content.len(), "Config file read");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let is_json = path_ref
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&config_content).map_err(anyhow::Error::from)
    } else {
        serde_yaml::from_str(&config_content).map_err(anyhow::Error::from)
    };

    match parsed {
        Ok(config) => {
            info!(config_path = ?path_ref, json = is_json, "Parsed config successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = %e, config_path = ?path_ref, "Failed to parse config");
            Err(anyhow::anyhow!(
                "Failed to parse config {:?}: {e}",
                path_ref
            ))
        }
    }
}

/// Resolves the configuration for a run started in `cwd`.
pub fn resolve_config(explicit: Option<PathBuf>, cwd: &Path) -> Result<StylegudConfig> {
    if let Some(path) = explicit {
        debug!(config_path = ?path, "Using config from command line");
        return load_config(cwd.join(path));
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        debug!(config_path = ?path, env = CONFIG_ENV, "Using config from environment");
        return load_config(cwd.join(path));
    }

    if let Some(config) = from_package_json(cwd)? {
        return Ok(config);
    }

    error!("No configuration found on command line, environment or package.json");
    Err(PipelineError::config("No configuration specified").into())
}

fn from_package_json(cwd: &Path) -> Result<Option<StylegudConfig>> {
    let manifest = cwd.join("package.json");
    let content = match fs::read_to_string(&manifest) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            error!(error = ?e, manifest = ?manifest, "Failed to read package.json");
            return Err(anyhow::anyhow!("Failed to read {:?}: {e}", manifest));
        }
    };

    let mut package: Value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {:?}: {e}", manifest))?;
    match package.get_mut(PACKAGE_KEY).map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(path)) => {
            debug!(config_path = %path, "Using config path from package.json");
            load_config(cwd.join(path)).map(Some)
        }
        Some(inline) => {
            debug!("Using inline config from package.json");
            serde_json::from_value(inline)
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Invalid \"{PACKAGE_KEY}\" entry in {:?}: {e}", manifest))
        }
    }
}
