//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `shape-rs.toml` files
//! and merging with command-line arguments.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use shape_rs::{DecodeOptions, JsonSchemaOptions, DEFAULT_MAX_DEPTH};
use tracing::debug;

use crate::error::{CliResult, ConfigError};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "shape-rs.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration.
    pub output: OutputConfig,

    /// Metadata for generated JSON Schema documents.
    pub json_schema: JsonSchemaConfig,

    /// Decode settings.
    pub engine: EngineConfig,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
}

/// Top-level metadata for generated JSON Schema documents.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsonSchemaConfig {
    /// `$id` of the document. Setting it also adds `$schema`.
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Decode settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting depth accepted by `check`.
    pub max_depth: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl JsonSchemaConfig {
    pub fn to_options(&self) -> JsonSchemaOptions {
        JsonSchemaOptions {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

impl EngineConfig {
    pub fn to_options(&self) -> DecodeOptions {
        DecodeOptions::new().with_max_depth(self.max_depth)
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without an explicit path, `shape-rs.toml` in the working directory is
    /// used if it exists, and defaults otherwise. An explicit path that does
    /// not exist is an error.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into());
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            debug!("no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path.clone(), e.to_string()))?;

        debug!(path = %config_path.display(), "loaded configuration");
        Self::validate(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> CliResult<Config> {
        if let Some(pretty) = args.pretty {
            config.output.pretty = pretty;
        }

        if let Some(ref id) = args.id {
            config.json_schema.id = Some(id.clone());
        }

        if let Some(ref title) = args.title {
            config.json_schema.title = Some(title.clone());
        }

        if let Some(ref description) = args.description {
            config.json_schema.description = Some(description.clone());
        }

        if let Some(max_depth) = args.max_depth {
            config.engine.max_depth = max_depth;
        }

        Self::validate(config)
    }

    fn validate(config: Config) -> CliResult<Config> {
        if config.engine.max_depth == 0 {
            return Err(
                ConfigError::invalid_value("engine.max_depth", "must be greater than zero").into(),
            );
        }
        Ok(config)
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# shape-rs configuration file

[output]
# Pretty-print JSON written by `export`, `import` and `check`
pretty = true

[json_schema]
# Document metadata added by `export`. Setting `id` also adds `$schema`.
# id = "https://example.com/schemas/config.json"
# title = "Config"
# description = "Service configuration"

[engine]
# Maximum nesting depth accepted when decoding data with `check`
max_depth = 256
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Pretty-print override.
    pub pretty: Option<bool>,

    /// `$id` override.
    pub id: Option<String>,

    /// Title override.
    pub title: Option<String>,

    /// Description override.
    pub description: Option<String>,

    /// Max depth override.
    pub max_depth: Option<usize>,
}
