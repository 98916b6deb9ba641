//! Integration tests for shape-rs-cli.
//!
//! These tests drive the command functions end to end over fixture files:
//! reading documents, converting them, checking data and writing output.

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

use shape_rs_cli::{
    commands,
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::{CliError, ConfigError},
    writer::{FileWriter, WriteResult},
};

/// Get the path to a test fixture.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Create a temporary directory with test files.
fn create_temp_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

// =============================================================================
// Export Tests
// =============================================================================

#[test]
fn test_export_fixture() {
    let ast = commands::read_ast(&fixture("order.ast.json")).unwrap();
    let schema = commands::export(&ast, &Config::default());

    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!(["id", "customer", "items"]));
    assert_eq!(schema["properties"]["id"]["exclusiveMinimum"], 0);
    assert_eq!(
        schema["properties"]["items"]["items"]["prefixItems"][1],
        json!({"type": "integer", "minimum": 1})
    );
    assert_eq!(
        schema["properties"]["status"],
        json!({"enum": ["pending", "shipped"], "default": "pending"})
    );
}

#[test]
fn test_export_with_metadata_from_args() {
    let ast = commands::read_ast(&fixture("order.ast.json")).unwrap();
    let config = ConfigManager::merge_cli_args(
        Config::default(),
        &CliArgs {
            id: Some("https://example.com/order.json".to_string()),
            title: Some("Order".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let schema = commands::export(&ast, &config);
    assert_eq!(
        schema["$schema"],
        "https://json-schema.org/draft/2020-12/schema"
    );
    assert_eq!(schema["$id"], "https://example.com/order.json");
    assert_eq!(schema["title"], "Order");
}

#[test]
fn test_export_then_import_keeps_struct() {
    let ast = commands::read_ast(&fixture("order.ast.json")).unwrap();
    let schema = commands::export(&ast, &Config::default());
    let imported = commands::import(&schema).unwrap();
    assert_eq!(imported, ast.to_json().unwrap());
}

// =============================================================================
// Import Tests
// =============================================================================

#[test]
fn test_import_fixture() {
    let schema = commands::read_json(&fixture("tree.schema.json")).unwrap();
    let ast = commands::import(&schema).unwrap();

    assert_eq!(ast["_type"], "struct");
    assert_eq!(ast["required"], json!(["label"]));
    assert_eq!(
        ast["fields"]["weight"]["inner_type"],
        json!({
            "_type": "union",
            "members": [{"_type": "number", "constraints": {}}, {"_type": "null"}]
        })
    );
    assert_eq!(
        ast["fields"]["tags"]["inner_type"]["constraints"],
        json!({"unique": true})
    );
}

#[test]
fn test_import_rejects_ref() {
    let err = commands::import(&json!({"$ref": "#/$defs/a"})).unwrap_err();
    assert!(matches!(err, CliError::Schema(_)));
}

// =============================================================================
// Check Tests
// =============================================================================

#[test]
fn test_check_valid_data_fills_defaults() {
    let ast = commands::read_ast(&fixture("order.ast.json")).unwrap();
    let data = commands::read_json(&fixture("order.json")).unwrap();

    let decoded = commands::check(&ast, &data, &Config::default()).unwrap();
    assert_eq!(decoded["status"], "pending");
    assert_eq!(decoded["items"], data["items"]);
}

#[test]
fn test_check_invalid_data_is_validation_error() {
    let ast = commands::read_ast(&fixture("order.ast.json")).unwrap();
    let data = commands::read_json(&fixture("bad_order.json")).unwrap();

    let err = commands::check(&ast, &data, &Config::default()).unwrap_err();
    let CliError::Validation(message) = err else {
        panic!("expected validation error, got {:?}", err);
    };
    assert_eq!(
        message,
        "Field 'items': item at index 1: element at position 1: Number must be at least 1"
    );
}

#[test]
fn test_check_respects_max_depth() {
    let ast = commands::read_ast(&fixture("order.ast.json")).unwrap();
    let data = commands::read_json(&fixture("order.json")).unwrap();
    let config = ConfigManager::merge_cli_args(
        Config::default(),
        &CliArgs {
            max_depth: Some(2),
            ..Default::default()
        },
    )
    .unwrap();

    let err = commands::check(&ast, &data, &config).unwrap_err();
    let CliError::Validation(message) = err else {
        panic!("expected validation error, got {:?}", err);
    };
    assert!(message.contains("Maximum nesting depth of 2 exceeded"));
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_load_config_file() {
    let dir = create_temp_project(&[(
        CONFIG_FILENAME,
        "[output]\npretty = false\n\n[json_schema]\ntitle = \"Order\"\n",
    )]);

    let config = ConfigManager::load(Some(&dir.path().join(CONFIG_FILENAME))).unwrap();
    assert!(!config.output.pretty);
    assert_eq!(config.json_schema.title.as_deref(), Some("Order"));
}

#[test]
fn test_load_missing_explicit_config() {
    let dir = TempDir::new().unwrap();
    let err = ConfigManager::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::NotFound { .. })));
}

#[test]
fn test_load_invalid_toml() {
    let dir = create_temp_project(&[(CONFIG_FILENAME, "[output\npretty = ")]);
    let err = ConfigManager::load(Some(&dir.path().join(CONFIG_FILENAME))).unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::InvalidToml { .. })));
}

// =============================================================================
// Output Tests
// =============================================================================

#[test]
fn test_export_written_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out/order.schema.json");

    let ast = commands::read_ast(&fixture("order.ast.json")).unwrap();
    let schema = commands::export(&ast, &Config::default());
    let content = commands::render(&schema, true).unwrap();

    let result = FileWriter::new(false).write(Some(&path), &content).unwrap();
    assert!(matches!(result, WriteResult::Written { .. }));

    let written = commands::read_json(&path).unwrap();
    assert_eq!(written, schema);
}

#[test]
fn test_dry_run_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("order.ast.json");

    let schema = commands::read_json(&fixture("tree.schema.json")).unwrap();
    let ast = commands::import(&schema).unwrap();
    let content = commands::render(&ast, false).unwrap();

    let result = FileWriter::new(true).write(Some(&path), &content).unwrap();
    assert!(!result.was_written());
    assert!(!path.exists());
}
