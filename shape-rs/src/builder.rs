//! Constructor functions for declaring schemas.
//!
//! ```
//! use shape_rs::builder::*;
//! use shape_rs::Type;
//!
//! let user: Type = object([
//!     ("name", string().min(1).into()),
//!     ("age", integer().min(0.0).into()),
//!     ("email", optional(string())),
//! ])
//! .into();
//! # let _ = user;
//! ```
//!
//! Primitive and array constructors return their node struct so constraint
//! setters can be chained; convert with `.into()` where a [`Type`] is needed.

use crate::error::SchemaResult;
use crate::types::{
    ArrayType, DiscriminatedUnionType, LazyType, LiteralType, NumericType, OptionalType,
    RecordType, StringType, StructType, TransformType, TupleType, Type, TypeNode, UnionType,
};
use crate::value::Value;

pub fn string() -> StringType {
    StringType::new()
}

pub fn number() -> NumericType {
    NumericType::number()
}

pub fn integer() -> NumericType {
    NumericType::integer()
}

pub fn boolean() -> Type {
    TypeNode::Boolean.into()
}

pub fn null() -> Type {
    TypeNode::Null.into()
}

pub fn symbol() -> Type {
    TypeNode::Symbol.into()
}

/// One or more permitted scalar values.
pub fn literal<I, V>(values: I) -> SchemaResult<Type>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    LiteralType::new(values).map(Into::into)
}

pub fn array(item: impl Into<Type>) -> ArrayType {
    ArrayType::new(item)
}

pub fn tuple(elements: impl IntoIterator<Item = Type>) -> Type {
    TupleType::new(elements).into()
}

/// A struct with the `reject` extra-key policy; change it with
/// [`StructType::extra_keys`].
pub fn object<I, K>(fields: I) -> StructType
where
    I: IntoIterator<Item = (K, Type)>,
    K: Into<String>,
{
    StructType::new(fields)
}

pub fn record(key: impl Into<Type>, value: impl Into<Type>) -> Type {
    RecordType::new(key, value).into()
}

pub fn union(members: impl IntoIterator<Item = Type>) -> Type {
    UnionType::new(members).into()
}

pub fn discriminated_union<I, K>(
    discriminator: impl Into<String>,
    variants: I,
) -> SchemaResult<Type>
where
    I: IntoIterator<Item = (K, Type)>,
    K: Into<String>,
{
    DiscriminatedUnionType::new(discriminator, variants).map(Into::into)
}

pub fn optional(inner: impl Into<Type>) -> Type {
    OptionalType::new(inner).into()
}

/// Optional with a default, checked against `inner` immediately.
pub fn optional_with_default(
    inner: impl Into<Type>,
    default: impl Into<Value>,
) -> SchemaResult<Type> {
    OptionalType::with_default(inner, default).map(Into::into)
}

pub fn transform<D, E>(
    inner: impl Into<Type>,
    target: impl Into<String>,
    decode: D,
    encode: E,
) -> Type
where
    D: Fn(Value) -> Value + Send + Sync + 'static,
    E: Fn(Value) -> Value + Send + Sync + 'static,
{
    TransformType::new(inner, target, decode, encode).into()
}

/// A deferred reference for recursive schemas. `resolver` runs once, on
/// first use.
pub fn lazy<F>(name: impl Into<String>, resolver: F) -> Type
where
    F: Fn() -> Type + Send + Sync + 'static,
{
    LazyType::new(name, resolver).into()
}
