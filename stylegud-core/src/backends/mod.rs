//! Built-in backends.
//!
//! None of these parse source syntax themselves: they read the JSON exports that
//! the real extraction tools (KSS, JSDoc) produce and adapt them with their own
//! [`Normalizer`](crate::contract::Normalizer).

pub mod jsdoc;
pub mod json;
pub mod kss;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error};

use crate::contract::BackendError;
use crate::entry::RawRecord;

/// Expands every pattern with `glob`, in sorted order per pattern.
///
/// A pattern matching no file is an error: a silently empty backend would drop entries.
pub fn expand_sources(patterns: &[String]) -> Result<Vec<PathBuf>, BackendError> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = glob::glob(pattern)
            .map_err(|e| format!("invalid source pattern {pattern:?}: {e}"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("failed to read source {pattern:?}: {e}"))?;
        if matched.is_empty() {
            error!(pattern = %pattern, "Source pattern matched no files");
            return Err(format!("no files match source pattern {pattern:?}").into());
        }
        matched.sort();
        debug!(pattern = %pattern, files = matched.len(), "Expanded source pattern");
        files.extend(matched);
    }
    Ok(files)
}

/// Reads and parses one JSON document.
pub async fn read_json(path: &Path) -> Result<Value, BackendError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read source file");
        format!("failed to read {}: {e}", path.display())
    })?;
    serde_json::from_str(&content).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Source file is not valid JSON");
        format!("failed to parse {} as JSON: {e}", path.display()).into()
    })
}

/// Interprets a JSON array as a list of records; anything else is an error.
pub fn records_from_array(path: &Path, value: Value) -> Result<Vec<RawRecord>, BackendError> {
    let Value::Array(items) = value else {
        return Err(format!("{}: expected a JSON array of records", path.display()).into());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(format!(
                "{}: record {i} is not an object (found {})",
                path.display(),
                json_kind(&other)
            )
            .into()),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.json").display().to_string();
        let err = expand_sources(&[pattern]).unwrap_err();
        assert!(err.to_string().contains("no files match"));
    }

    #[test]
    fn patterns_expand_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "c.txt"] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }
        let pattern = dir.path().join("*.json").display().to_string();
        let files = expand_sources(&[pattern]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.json", "b.json"]);
    }

    #[test]
    fn non_object_records_are_rejected() {
        let err = records_from_array(Path::new("x.json"), json!([{}, 3])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "x.json: record 1 is not an object (found number)"
        );
    }
}
