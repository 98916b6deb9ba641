//! Property-based tests for shape-rs-cli.
//!
//! Properties tested:
//! - Flags take precedence over configuration file values
//! - Dry-run mode never touches the file system
//! - Rendered output parses back to the same document

use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use shape_rs_cli::{
    commands,
    config::{CliArgs, Config, ConfigManager},
    writer::FileWriter,
};

// =============================================================================
// Config Override Precedence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_config_override_precedence(
        file_title in "[A-Za-z ]{1,12}",
        cli_title in "[A-Za-z ]{1,12}",
        file_depth in 1usize..512,
        cli_depth in 1usize..512,
        file_pretty in any::<bool>(),
    ) {
        let mut file_config = Config::default();
        file_config.json_schema.title = Some(file_title);
        file_config.engine.max_depth = file_depth;
        file_config.output.pretty = file_pretty;

        let cli_args = CliArgs {
            title: Some(cli_title.clone()),
            max_depth: Some(cli_depth),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(file_config, &cli_args).unwrap();

        prop_assert_eq!(merged.json_schema.title, Some(cli_title));
        prop_assert_eq!(merged.engine.max_depth, cli_depth);
        prop_assert_eq!(merged.output.pretty, file_pretty, "unset flags keep file values");
    }
}

// =============================================================================
// Dry Run Safety
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_dry_run_safety(
        title in "[a-z]{0,40}",
        filename in "[a-z]{3,10}",
        nested_depth in 0usize..3,
    ) {
        let dir = TempDir::new().unwrap();

        let mut path = dir.path().to_path_buf();
        for i in 0..nested_depth {
            path = path.join(format!("dir{}", i));
        }
        path = path.join(format!("{}.json", filename));

        let content = commands::render(&json!({"title": title}), true).unwrap();
        let result = FileWriter::new(true).write(Some(&path), &content).unwrap();

        prop_assert!(!result.was_written());
        prop_assert!(!path.exists());
        prop_assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

// =============================================================================
// Render Round Trip
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_render_parses_back(
        keys in proptest::collection::vec("[a-z]{1,6}", 0..5),
        number in any::<i64>(),
        pretty in any::<bool>(),
    ) {
        let document = json!({
            "keys": keys,
            "number": number,
            "nested": {"flag": pretty},
        });
        let text = commands::render(&document, pretty).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(parsed, document);
    }
}
