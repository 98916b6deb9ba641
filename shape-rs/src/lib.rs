//! # shape-rs
//!
//! Runtime schema types for Rust: declare a schema once, then decode untrusted
//! data against it, encode values back, describe it as a serializable AST and
//! convert that AST to and from JSON Schema (draft 2020-12).
//!
//! ## Overview
//!
//! A schema is a tree of [`Type`] handles built with the constructors in
//! [`builder`]. The tree is immutable and cheap to clone, so it can be shared
//! across threads and reused as a subtree of other schemas.
//!
//! ```text
//! builder calls ──> Type tree ──to_ast──> Ast ──to_json_schema──> JSON Schema
//!                      ▲  │                 │  ◀──from_json_schema──
//!                      │  └─ decode/encode   │
//!                      └──────from_ast───────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use shape_rs::builder::*;
//! use shape_rs::{Type, Value};
//!
//! let server: Type = object([
//!     ("name", string().min(1).into()),
//!     ("port", optional_with_default(integer().min(1.0), 3000)?),
//! ])
//! .into();
//!
//! let decoded = server.decode(&Value::from(json!({"name": "api"})))?;
//! assert_eq!(decoded, Value::from(json!({"name": "api", "port": 3000})));
//!
//! let error = server
//!     .decode(&Value::from(json!({"name": "api", "port": 0})))
//!     .unwrap_err();
//! assert_eq!(error.to_string(), "Field 'port': Number must be at least 1");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Type Kinds
//!
//! | Kind | Builder | Accepts |
//! |------|---------|---------|
//! | `string` | [`string()`](builder::string) | strings, with `min`/`max` length and a `format` regex |
//! | `number` | [`number()`](builder::number) | numbers, with inclusive and exclusive bounds |
//! | `integer` | [`integer()`](builder::integer) | numbers with an integral value |
//! | `boolean` | [`boolean()`](builder::boolean) | `true` / `false` |
//! | `null` | [`null()`](builder::null) | `null` only |
//! | `symbol` | [`symbol()`](builder::symbol) | strings, decoded to [`Value::Symbol`] |
//! | `literal` | [`literal()`](builder::literal) | one of a fixed set of scalars |
//! | `array` | [`array()`](builder::array) | sequences of one item type |
//! | `tuple` | [`tuple()`](builder::tuple) | fixed-length sequences |
//! | `struct` | [`object()`](builder::object) | objects with declared fields |
//! | `record` | [`record()`](builder::record) | objects with arbitrary keys |
//! | `union` | [`union()`](builder::union) | the first member that decodes |
//! | `discriminated_union` | [`discriminated_union()`](builder::discriminated_union) | the variant named by a tag field |
//! | `optional` | [`optional()`](builder::optional) | marks a struct field optional |
//! | `transform` | [`transform()`](builder::transform) | the inner type, then a conversion |
//! | `lazy` | [`lazy()`](builder::lazy) | a deferred, possibly recursive, reference |
//!
//! ## Errors
//!
//! Decode failures are [`ValidationError`]s whose message is prefixed with
//! the path to the failing value:
//!
//! ```text
//! Field 'parcel': Field 'weight': Number must be greater than 0
//! item at index 2: Expected string, got integer
//! ```
//!
//! Schema construction and conversion failures are [`SchemaError`]s.
//!
//! ## Recursive Schemas
//!
//! ```rust
//! use std::sync::LazyLock;
//! use shape_rs::builder::*;
//! use shape_rs::Type;
//!
//! static TREE: LazyLock<Type> = LazyLock::new(|| {
//!     object([
//!         ("value", number().into()),
//!         ("children", array(lazy("tree", || TREE.clone())).into()),
//!     ])
//!     .into()
//! });
//!
//! let ast = TREE.to_ast();
//! let schema = shape_rs::to_json_schema(&ast, &Default::default());
//! assert_eq!(
//!     schema["properties"]["children"]["items"]["description"],
//!     "Recursive reference to tree"
//! );
//! ```

pub mod ast;
pub mod builder;
pub mod constraints;
pub mod error;
pub mod json_schema;
pub mod types;
pub mod value;

mod introspect;
mod rebuild;

pub use ast::Ast;
pub use constraints::{ArrayConstraints, NumericConstraints, StringConstraints};
pub use error::{
    DecodeResult, PathSegment, SchemaError, SchemaResult, ValidationError, ValidationErrorKind,
};
pub use json_schema::{from_json_schema, to_json_schema, JsonSchemaOptions};
pub use types::{DecodeOptions, ExtraKeys, Kind, Type, TypeNode, DEFAULT_MAX_DEPTH};
pub use value::{Map, Value};
