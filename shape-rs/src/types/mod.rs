//! Type nodes: the live schema tree.
//!
//! A schema is a tree of [`Type`] handles. Each handle shares an immutable
//! [`TypeNode`]; cloning a `Type` is a reference-count bump, so subtrees can
//! be reused freely. The only way to introduce a cycle is a [`LazyType`],
//! which resolves its target on first use and memoizes it.
//!
//! ## Decode and encode
//!
//! | Operation | Direction | Failure |
//! |-----------|-----------|---------|
//! | [`Type::decode`] | external data -> validated value | [`ValidationError`] |
//! | [`Type::encode`] | validated value -> external data | never |
//! | [`Type::validate`] | decode, discarding the value | [`ValidationError`] |
//!
//! `null` is rejected with a required-value error by every node except
//! [`TypeNode::Null`], [`TypeNode::Optional`] and the delegating nodes
//! (union, transform, lazy) whose targets decide for themselves.

mod collection;
mod object;
mod primitive;
mod union;
mod wrapper;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use collection::{ArrayType, RecordType, TupleType};
pub use object::{ExtraKeys, StructType};
pub use primitive::{LiteralType, NumericType, StringType};
pub use union::{DiscriminatedUnionType, UnionType};
pub use wrapper::{LazyType, OptionalType, TransformFn, TransformType};

use crate::error::{DecodeResult, SchemaResult, ValidationError, ValidationErrorKind};
use crate::value::Value;

/// Default limit on input nesting depth during decode.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The kind tag of a type node, also used as the AST discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Symbol,
    Literal,
    Array,
    Tuple,
    Struct,
    Record,
    Union,
    DiscriminatedUnion,
    Optional,
    Transform,
    Lazy,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Integer => "integer",
            Kind::Boolean => "boolean",
            Kind::Null => "null",
            Kind::Symbol => "symbol",
            Kind::Literal => "literal",
            Kind::Array => "array",
            Kind::Tuple => "tuple",
            Kind::Struct => "struct",
            Kind::Record => "record",
            Kind::Union => "union",
            Kind::DiscriminatedUnion => "discriminated_union",
            Kind::Optional => "optional",
            Kind::Transform => "transform",
            Kind::Lazy => "lazy",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a schema tree.
#[derive(Debug)]
pub enum TypeNode {
    String(StringType),
    Number(NumericType),
    Integer(NumericType),
    Boolean,
    Null,
    Symbol,
    Literal(LiteralType),
    Array(ArrayType),
    Tuple(TupleType),
    Struct(StructType),
    Record(RecordType),
    Union(UnionType),
    DiscriminatedUnion(DiscriminatedUnionType),
    Optional(OptionalType),
    Transform(TransformType),
    Lazy(LazyType),
}

impl TypeNode {
    pub fn kind(&self) -> Kind {
        match self {
            TypeNode::String(_) => Kind::String,
            TypeNode::Number(_) => Kind::Number,
            TypeNode::Integer(_) => Kind::Integer,
            TypeNode::Boolean => Kind::Boolean,
            TypeNode::Null => Kind::Null,
            TypeNode::Symbol => Kind::Symbol,
            TypeNode::Literal(_) => Kind::Literal,
            TypeNode::Array(_) => Kind::Array,
            TypeNode::Tuple(_) => Kind::Tuple,
            TypeNode::Struct(_) => Kind::Struct,
            TypeNode::Record(_) => Kind::Record,
            TypeNode::Union(_) => Kind::Union,
            TypeNode::DiscriminatedUnion(_) => Kind::DiscriminatedUnion,
            TypeNode::Optional(_) => Kind::Optional,
            TypeNode::Transform(_) => Kind::Transform,
            TypeNode::Lazy(_) => Kind::Lazy,
        }
    }

    /// Whether this node handles `null` itself instead of the global rule.
    fn accepts_null(&self) -> bool {
        matches!(
            self,
            TypeNode::Null
                | TypeNode::Optional(_)
                | TypeNode::Union(_)
                | TypeNode::Transform(_)
                | TypeNode::Lazy(_)
        )
    }
}

/// Options controlling a decode call.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum nesting depth of arrays, tuples, structs and records.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Per-call decode state.
pub(crate) struct Context<'a> {
    options: &'a DecodeOptions,
    depth: usize,
}

impl<'a> Context<'a> {
    pub(crate) fn new(options: &'a DecodeOptions) -> Self {
        Self { options, depth: 0 }
    }

    /// Run `f` one nesting level deeper, failing once the limit is reached.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> DecodeResult<T>,
    ) -> DecodeResult<T> {
        if self.depth >= self.options.max_depth {
            return Err(ValidationError::new(ValidationErrorKind::DepthExceeded {
                limit: self.options.max_depth,
            }));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

/// A shared handle to a schema node.
#[derive(Clone)]
pub struct Type(Arc<TypeNode>);

impl Type {
    pub fn new(node: TypeNode) -> Self {
        Self(Arc::new(node))
    }

    pub fn node(&self) -> &TypeNode {
        &self.0
    }

    pub fn kind(&self) -> Kind {
        self.0.kind()
    }

    /// Whether this type is an optional wrapper.
    pub fn is_optional(&self) -> bool {
        matches!(self.node(), TypeNode::Optional(_))
    }

    /// Wrap this type as optional without a default.
    pub fn optional(self) -> Type {
        OptionalType::new(self).into()
    }

    /// Wrap this type as optional with a default, validated now.
    pub fn optional_with_default(self, default: impl Into<Value>) -> SchemaResult<Type> {
        OptionalType::with_default(self, default).map(Into::into)
    }

    /// Decode untrusted input with default options.
    pub fn decode(&self, value: &Value) -> DecodeResult {
        self.decode_with(value, &DecodeOptions::default())
    }

    /// Decode untrusted input.
    pub fn decode_with(&self, value: &Value, options: &DecodeOptions) -> DecodeResult {
        let mut cx = Context::new(options);
        self.decode_in(value, &mut cx).inspect_err(|error| {
            debug!(kind = %self.kind(), error = %error, "decode failed");
        })
    }

    /// Check input without keeping the decoded value.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.decode(value).map(|_| ())
    }

    /// Encode an in-memory value to its external form. `null` stays `null`.
    pub fn encode(&self, value: &Value) -> Value {
        self.encode_in(value, 0)
    }

    /// `depth` counts lazy hops; past [`DEFAULT_MAX_DEPTH`] the value is
    /// returned unchanged so a left-recursive schema still terminates.
    pub(crate) fn encode_in(&self, value: &Value, depth: usize) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        match self.node() {
            TypeNode::String(_)
            | TypeNode::Number(_)
            | TypeNode::Integer(_)
            | TypeNode::Boolean
            | TypeNode::Null
            | TypeNode::Literal(_) => value.clone(),
            TypeNode::Symbol => match value {
                Value::Symbol(name) => Value::String(name.clone()),
                other => other.clone(),
            },
            TypeNode::Array(t) => t.encode_value(value, depth),
            TypeNode::Tuple(t) => t.encode_value(value, depth),
            TypeNode::Struct(t) => t.encode_value(value, depth),
            TypeNode::Record(t) => t.encode_value(value, depth),
            TypeNode::Union(t) => t.encode_value(value, depth),
            TypeNode::DiscriminatedUnion(t) => t.encode_value(value, depth),
            TypeNode::Optional(t) => t.inner().encode_in(value, depth),
            TypeNode::Transform(t) => t.encode_value(value, depth),
            TypeNode::Lazy(_) if depth >= DEFAULT_MAX_DEPTH => value.clone(),
            TypeNode::Lazy(t) => t.resolve().encode_in(value, depth + 1),
        }
    }

    pub(crate) fn decode_in(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let node = self.node();
        if value.is_null() && !node.accepts_null() {
            return Err(ValidationError::required());
        }
        match node {
            TypeNode::String(t) => t.decode_value(value),
            TypeNode::Number(t) | TypeNode::Integer(t) => t.decode_value(value),
            TypeNode::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                other => Err(ValidationError::type_mismatch("boolean", other)),
            },
            TypeNode::Null => match value {
                Value::Null => Ok(Value::Null),
                other => Err(ValidationError::type_mismatch("null", other)),
            },
            TypeNode::Symbol => match value {
                Value::String(name) | Value::Symbol(name) => Ok(Value::Symbol(name.clone())),
                other => Err(ValidationError::type_mismatch("symbol", other)),
            },
            TypeNode::Literal(t) => t.decode_value(value),
            TypeNode::Array(t) => t.decode_value(value, cx),
            TypeNode::Tuple(t) => t.decode_value(value, cx),
            TypeNode::Struct(t) => t.decode_value(value, cx),
            TypeNode::Record(t) => t.decode_value(value, cx),
            TypeNode::Union(t) => t.decode_value(value, cx),
            TypeNode::DiscriminatedUnion(t) => t.decode_value(value, cx),
            TypeNode::Optional(t) => t.decode_value(value, cx),
            TypeNode::Transform(t) => t.decode_value(value, cx),
            // Counted so a schema that recurses without consuming input
            // (e.g. a union whose first member refers back to it) stops.
            TypeNode::Lazy(t) => cx.nested(|cx| t.resolve().decode_in(value, cx)),
        }
    }

    /// Whether both handles share the same node.
    pub(crate) fn ptr_eq(&self, other: &Type) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<TypeNode> for Type {
    fn from(node: TypeNode) -> Self {
        Type::new(node)
    }
}

macro_rules! impl_into_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Type {
                fn from(node: $ty) -> Self {
                    Type::new(TypeNode::$variant(node))
                }
            }
        )*
    };
}

impl_into_type!(
    StringType => String,
    LiteralType => Literal,
    ArrayType => Array,
    TupleType => Tuple,
    StructType => Struct,
    RecordType => Record,
    UnionType => Union,
    DiscriminatedUnionType => DiscriminatedUnion,
    OptionalType => Optional,
    TransformType => Transform,
    LazyType => Lazy,
);

impl From<NumericType> for Type {
    fn from(node: NumericType) -> Self {
        if node.is_integer() {
            Type::new(TypeNode::Integer(node))
        } else {
            Type::new(TypeNode::Number(node))
        }
    }
}
