//! The operations behind each subcommand.
//!
//! Each command takes parsed documents and the merged [`Config`] and returns
//! a JSON document; reading input files and rendering output live here too so
//! the binary only wires arguments to the sink.

use std::path::Path;

use shape_rs::{from_json_schema, to_json_schema, Ast, Type, Value};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CliError, CliResult, InputError};

/// Read and parse a JSON document from disk.
pub fn read_json(path: &Path) -> CliResult<serde_json::Value> {
    if !path.exists() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content)
        .map_err(|e| InputError::invalid_json(path.to_path_buf(), e.to_string()).into())
}

/// Read an AST document from disk.
pub fn read_ast(path: &Path) -> CliResult<Ast> {
    let json = read_json(path)?;
    Ok(Ast::from_json(&json)?)
}

/// AST -> JSON Schema document, with metadata from the config.
pub fn export(ast: &Ast, config: &Config) -> serde_json::Value {
    debug!(kind = ast.kind().as_str(), "exporting JSON Schema");
    to_json_schema(ast, &config.json_schema.to_options())
}

/// JSON Schema document -> AST document.
pub fn import(schema: &serde_json::Value) -> CliResult<serde_json::Value> {
    let ast = from_json_schema(schema)?;
    debug!(kind = ast.kind().as_str(), "imported JSON Schema");
    Ok(ast.to_json()?)
}

/// Rebuild the type tree for `ast` and decode `data` against it.
///
/// A decode failure is reported as [`CliError::Validation`] carrying the
/// path-qualified message.
pub fn check(ast: &Ast, data: &serde_json::Value, config: &Config) -> CliResult<serde_json::Value> {
    let ty = Type::from_ast(ast)?;
    let decoded = ty
        .decode_with(&Value::from(data.clone()), &config.engine.to_options())
        .map_err(|e| CliError::Validation(e.to_string()))?;
    info!(kind = ty.kind().as_str(), "data is valid");
    Ok(decoded.to_json())
}

/// Serialize a JSON document for output.
pub fn render(document: &serde_json::Value, pretty: bool) -> CliResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(text)
}
