//! Wrapper types: optional, transform and lazy.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::{Context, Type};
use crate::error::{DecodeResult, SchemaError, SchemaResult};
use crate::value::Value;

// =============================================================================
// Optional
// =============================================================================

/// Marks a struct field as optional, with an optional default.
#[derive(Debug, Clone)]
pub struct OptionalType {
    inner: Type,
    default: Option<Value>,
}

impl OptionalType {
    pub fn new(inner: impl Into<Type>) -> Self {
        Self {
            inner: inner.into(),
            default: None,
        }
    }

    /// Attach a default. The default is decoded through the inner type now,
    /// and the decoded form is what missing fields receive.
    pub fn with_default(inner: impl Into<Type>, default: impl Into<Value>) -> SchemaResult<Self> {
        let inner = inner.into();
        let default = inner
            .decode(&default.into())
            .map_err(SchemaError::InvalidDefault)?;
        Ok(Self {
            inner,
            default: Some(default),
        })
    }

    /// Attach a default without checking it. The caller validates it once the
    /// tree is complete.
    pub(crate) fn with_unchecked_default(inner: Type, default: Option<Value>) -> Self {
        Self { inner, default }
    }

    pub fn inner(&self) -> &Type {
        &self.inner
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        if value.is_null() {
            return Ok(self.default.clone().unwrap_or_default());
        }
        self.inner.decode_in(value, cx)
    }
}

// =============================================================================
// Transform
// =============================================================================

/// A pure conversion function used by [`TransformType`].
pub type TransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Converts between an inner representation and a target representation.
#[derive(Clone)]
pub struct TransformType {
    inner: Type,
    target: String,
    decode_fn: TransformFn,
    encode_fn: TransformFn,
}

impl TransformType {
    /// `decode_fn` runs after the inner type decodes; `encode_fn` runs before
    /// the inner type encodes. Both must be total over their inputs.
    pub fn new<D, E>(
        inner: impl Into<Type>,
        target: impl Into<String>,
        decode_fn: D,
        encode_fn: E,
    ) -> Self
    where
        D: Fn(Value) -> Value + Send + Sync + 'static,
        E: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            inner: inner.into(),
            target: target.into(),
            decode_fn: Arc::new(decode_fn),
            encode_fn: Arc::new(encode_fn),
        }
    }

    pub fn inner(&self) -> &Type {
        &self.inner
    }

    /// Name of the target representation.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let decoded = self.inner.decode_in(value, cx)?;
        Ok((self.decode_fn)(decoded))
    }

    pub(crate) fn encode_value(&self, value: &Value, depth: usize) -> Value {
        self.inner.encode_in(&(self.encode_fn)(value.clone()), depth)
    }
}

impl fmt::Debug for TransformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformType")
            .field("inner", &self.inner)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Lazy
// =============================================================================

type Resolver = Box<dyn Fn() -> Type + Send + Sync>;

/// A deferred reference, resolved on first use and memoized.
///
/// This is how recursive schemas are declared: the resolver may return a
/// type that (transitively) contains this lazy node.
pub struct LazyType {
    name: String,
    resolver: Resolver,
    resolved: OnceLock<Type>,
}

impl LazyType {
    pub fn new<F>(name: impl Into<String>, resolver: F) -> Self
    where
        F: Fn() -> Type + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            resolver: Box::new(resolver),
            resolved: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target type. The resolver runs at most once per node.
    pub fn resolve(&self) -> &Type {
        self.resolved.get_or_init(|| {
            let ty = (self.resolver)();
            debug!(name = %self.name, kind = %ty.kind(), "resolved lazy type");
            ty
        })
    }
}

impl fmt::Debug for LazyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyType")
            .field("name", &self.name)
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}
