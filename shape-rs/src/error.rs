//! Error types for decoding and for schema construction.
//!
//! Decode failures are [`ValidationError`]s: a [`ValidationErrorKind`] plus the
//! path of fields, indices and keys leading to the failing node. The path is
//! rendered outermost-first in front of the message, e.g.
//! `Field 'parcel': Field 'weight': Number must be greater than 0`.
//!
//! Failures while declaring a schema, rebuilding one from an AST, or
//! converting JSON Schema are [`SchemaError`]s.

use std::fmt;

use thiserror::Error;

use crate::value::Value;

/// Result type for decode operations.
pub type DecodeResult<T = Value> = Result<T, ValidationError>;

/// Result type for schema construction and conversion.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// One step of the path from the root value to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A struct field.
    Field(String),
    /// An array element.
    Index(usize),
    /// A tuple element.
    Position(usize),
    /// A record entry.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "Field '{}': ", name),
            PathSegment::Index(i) => write!(f, "item at index {}: ", i),
            PathSegment::Position(i) => write!(f, "element at position {}: ", i),
            PathSegment::Key(key) => write!(f, "Key '{}': ", key),
        }
    }
}

/// The reason a value failed to decode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    /// The value has the wrong shape or kind.
    #[error("Expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The value has the right shape but breaks a constraint.
    #[error("{0}")]
    ConstraintViolation(String),

    /// A required field is missing or a value is null where null is not allowed.
    #[error("Value is required")]
    RequiredValue,

    /// The discriminator value does not name any variant.
    #[error(
        "Unknown discriminator value '{value}' for field '{field}'. Valid values: {}",
        .valid.join(", ")
    )]
    UnknownDiscriminator {
        field: String,
        value: String,
        valid: Vec<String>,
    },

    /// The discriminator field is absent.
    #[error("Missing discriminator field '{field}'")]
    MissingDiscriminator { field: String },

    /// A struct with the `reject` policy received undeclared keys.
    #[error("Unexpected keys: {}", .0.join(", "))]
    UnexpectedKeys(Vec<String>),

    /// Every union member rejected the value; one failure per member, in order.
    #[error("Value did not match any union member: {}", render_all(.0))]
    AggregateUnion(Vec<ValidationError>),

    /// The input nests deeper than the configured limit.
    #[error("Maximum nesting depth of {limit} exceeded")]
    DepthExceeded { limit: usize },
}

/// A decode failure with its location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}{}", render_path(.path), .kind)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    path: Vec<PathSegment>,
}

impl ValidationError {
    /// Create an error at the current node.
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            kind,
            path: Vec::new(),
        }
    }

    /// Wrong kind of value.
    pub fn type_mismatch(expected: impl Into<String>, actual: &Value) -> Self {
        Self::new(ValidationErrorKind::TypeMismatch {
            expected: expected.into(),
            actual: actual.type_name().to_string(),
        })
    }

    /// Constraint failure with a human readable message.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::ConstraintViolation(message.into()))
    }

    /// Missing or null value where one is required.
    pub fn required() -> Self {
        Self::new(ValidationErrorKind::RequiredValue)
    }

    /// Prefix this error with one more path segment (the enclosing location).
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }

    /// Path from the root value, outermost first.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// The message without the path prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

fn render_path(path: &[PathSegment]) -> String {
    path.iter().map(ToString::to_string).collect()
}

fn render_all(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error raised while declaring, rebuilding or converting a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A declared default value fails its own type.
    #[error("Invalid default value: {0}")]
    InvalidDefault(#[source] ValidationError),

    /// A string format is not a valid regular expression.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A discriminated union variant does not fit its tag.
    #[error("Invalid discriminated union variant '{tag}': {reason}")]
    InvalidVariant { tag: String, reason: String },

    /// A schema shape that cannot be represented.
    #[error("Unsupported schema: {0}")]
    UnsupportedSchema(String),

    /// A document could not be parsed.
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedSchema(message.into())
    }

    pub fn invalid_variant(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVariant {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}
