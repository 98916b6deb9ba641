//! # shape-rs-cli
//!
//! CLI library for working with shape-rs schemas from the command line.
//!
//! This crate provides the core functionality for the `shape-rs` CLI tool:
//! converting AST documents to and from JSON Schema, checking data files
//! against a schema, and writing the results.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`commands`] - Export, import and check operations
//! - [`writer`] - File output and dry-run support
//! - [`error`] - Error types and handling

pub mod commands;
pub mod config;
pub mod error;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use writer::FileWriter;
