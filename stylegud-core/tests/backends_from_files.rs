use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use stylegud_core::sink::sink_for;
use stylegud_core::{Destination, PipelineError, Registry, Stylegud, StylegudConfig};

fn write_json(path: &Path, value: serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn kss_export() -> serde_json::Value {
    json!({
        "sections": [
            {
                "header": "Buttons",
                "description": "Clickable things.",
                "reference": "Components - Buttons",
                "referenceURI": "components-buttons",
                "weight": 0,
                "markup": "<button class=\"{{modifier_class}}\">Go</button>",
                "modifiers": [
                    { "name": ".primary", "description": "Main action", "className": "primary" }
                ],
                "source": {
                    "filename": "styles/buttons.css",
                    "path": "/repo/styles/buttons.css",
                    "line": 3
                }
            }
        ]
    })
}

fn jsdoc_explain() -> serde_json::Value {
    json!([
        {
            "name": "Alert",
            "description": "Inline feedback.",
            "tags": [
                { "title": "styleguide", "text": "Components - Alert", "value": "Components - Alert" },
                { "title": "markup", "text": "<Alert />" }
            ],
            "meta": {
                "lineno": 10,
                "filename": "alert.js",
                "path": "/repo/src",
                "code": { "name": "exports.Alert" }
            }
        },
        {
            "name": "internalHelper",
            "description": "Not documented in the style guide."
        }
    ])
}

fn config_for(dir: &Path, dest: &str) -> StylegudConfig {
    serde_json::from_value(json!({
        "parsers": [
            {
                "parser": "kss",
                "name": "KSSParser",
                "src": dir.join("kss/*.json").display().to_string(),
                "renderer": "html"
            },
            {
                "parser": "jsdoc",
                "name": "JSDocParser",
                "src": [dir.join("jsdoc.json").display().to_string()],
                "renderer": "react"
            }
        ],
        "plugins": [ { "plugin": "strip-source" } ],
        "dest": dest
    }))
    .unwrap()
}

#[tokio::test]
async fn kss_and_jsdoc_exports_are_merged() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("kss")).unwrap();
    write_json(&dir.path().join("kss/buttons.json"), kss_export());
    write_json(&dir.path().join("jsdoc.json"), jsdoc_explain());

    let mut config = config_for(dir.path(), "stdout");
    config.plugins.clear();
    let pipeline = Stylegud::from_config(&config, &Registry::with_builtins()).unwrap();
    let dataset = pipeline.collect().await.expect("collect should succeed");

    assert_eq!(dataset.len(), 2, "undocumented doclet must be dropped");

    let alert = &dataset[0];
    assert_eq!(alert.header, "Alert");
    assert_eq!(alert.renderer, "react");
    assert_eq!(alert.markup, "<Alert />");
    assert_eq!(alert.reference_uri.as_deref(), Some("components-alert"));
    let source = alert.source.as_ref().unwrap();
    assert_eq!(source.export.as_deref(), Some("Alert"));
    assert_eq!(source.line, Some(10));

    let buttons = &dataset[1];
    assert_eq!(buttons.header, "Buttons");
    assert_eq!(buttons.renderer, "html");
    assert_eq!(buttons.reference_uri.as_deref(), Some("components-buttons"));
    assert_eq!(buttons.extra.get("weight"), Some(&json!(0)));
    assert_eq!(buttons.modifiers.len(), 1);
    let source = buttons.source.as_ref().unwrap();
    assert_eq!(source.filename.as_deref(), Some("buttons.css"));
    assert_eq!(source.path.as_deref(), Some("/repo/styles"));
}

#[tokio::test]
async fn run_writes_file_destination() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("kss")).unwrap();
    write_json(&dir.path().join("kss/buttons.json"), kss_export());
    write_json(&dir.path().join("jsdoc.json"), jsdoc_explain());
    let out = dir.path().join("dist/styleguide.json");

    let config = config_for(dir.path(), &out.display().to_string());
    assert_eq!(config.dest, Destination::File(out.clone()));

    let pipeline = Stylegud::from_config(&config, &Registry::with_builtins()).unwrap();
    let sink = sink_for(pipeline.destination());
    let report = pipeline.run(sink.as_ref()).await.expect("run should succeed");
    assert_eq!(report.entries, 2);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let written = written.as_array().unwrap();
    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|e| e.get("source").is_none()));
    assert_eq!(written[0]["referenceURI"], json!("components-alert"));
}

#[tokio::test]
async fn kss_section_missing_a_field_names_the_backend() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("kss")).unwrap();
    let mut export = kss_export();
    export["sections"][0]
        .as_object_mut()
        .unwrap()
        .remove("markup");
    write_json(&dir.path().join("kss/buttons.json"), export);
    write_json(&dir.path().join("jsdoc.json"), jsdoc_explain());
    let out = dir.path().join("never.json");

    let config = config_for(dir.path(), &out.display().to_string());
    let pipeline = Stylegud::from_config(&config, &Registry::with_builtins()).unwrap();
    let sink = sink_for(pipeline.destination());
    let err = pipeline.run(sink.as_ref()).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "KSSParser - Invalid parser output. Missing property \"markup\" in parsed result."
    );
    assert!(!out.exists(), "no partial output may be written");
}

#[tokio::test]
async fn missing_source_files_fail_the_backend() {
    let dir = tempdir().unwrap();
    let config: StylegudConfig = serde_json::from_value(json!({
        "parsers": [{
            "parser": "json",
            "src": dir.path().join("nothing-here/*.json").display().to_string(),
            "renderer": "html"
        }]
    }))
    .unwrap();

    let pipeline = Stylegud::from_config(&config, &Registry::with_builtins()).unwrap();
    let err = pipeline.collect().await.unwrap_err();
    assert!(matches!(err, PipelineError::Backend { .. }));
    assert_eq!(err.backend(), Some("json"));
    assert!(err.to_string().contains("no files match"));
}

#[tokio::test]
async fn static_records_get_fresh_reference_uris() {
    let dir = tempdir().unwrap();
    write_json(
        &dir.path().join("static.json"),
        json!([
            { "header": "Grid", "description": "", "reference": "Layout - Grid",
              "markup": "", "modifiers": [], "referenceURI": 7 },
            { "header": "Stack", "description": "", "reference": "Layout - Stack",
              "markup": "", "modifiers": [], "referenceURI": "stale" }
        ]),
    );
    let config: StylegudConfig = serde_json::from_value(json!({
        "parsers": [{
            "parser": "static",
            "name": "Static",
            "src": dir.path().join("static.json").display().to_string(),
            "renderer": "html"
        }]
    }))
    .unwrap();

    let pipeline = Stylegud::from_config(&config, &Registry::with_builtins()).unwrap();
    let dataset = pipeline.collect().await.expect("collect should succeed");
    let uris: Vec<_> = dataset
        .iter()
        .map(|e| e.reference_uri.as_deref())
        .collect();
    assert_eq!(uris, [Some("layout-grid"), Some("layout-stack")]);
}
