//! Sequence and mapping types: array, tuple and record.

use tracing::trace;

use super::{Context, Type};
use crate::constraints::ArrayConstraints;
use crate::error::{DecodeResult, PathSegment, ValidationError};
use crate::value::{Map, Value};

// =============================================================================
// Array
// =============================================================================

/// Homogeneous sequence of one item type.
#[derive(Debug, Clone)]
pub struct ArrayType {
    item: Type,
    constraints: ArrayConstraints,
}

impl ArrayType {
    pub fn new(item: impl Into<Type>) -> Self {
        Self {
            item: item.into(),
            constraints: ArrayConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: ArrayConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn min(mut self, min: usize) -> Self {
        self.constraints.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.constraints.max = Some(max);
        self
    }

    /// Require exactly `length` items.
    pub fn length(mut self, length: usize) -> Self {
        self.constraints.length = Some(length);
        self
    }

    /// Require pairwise distinct items.
    pub fn unique(mut self) -> Self {
        self.constraints.unique = true;
        self
    }

    pub fn item(&self) -> &Type {
        &self.item
    }

    pub fn constraints(&self) -> &ArrayConstraints {
        &self.constraints
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let Value::Array(items) = value else {
            return Err(ValidationError::type_mismatch("array", value));
        };
        trace!(len = items.len(), "decoding array");
        self.check_sequence(items)?;

        cx.nested(|cx| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.item
                        .decode_in(item, cx)
                        .map_err(|e| e.within(PathSegment::Index(i)))
                })
                .collect::<DecodeResult<Vec<_>>>()
                .map(Value::Array)
        })
    }

    fn check_sequence(&self, items: &[Value]) -> Result<(), ValidationError> {
        let c = &self.constraints;
        let len = items.len();
        if let Some(min) = c.min {
            if len < min {
                return Err(ValidationError::constraint(format!(
                    "Array must contain at least {} items",
                    min
                )));
            }
        }
        if let Some(max) = c.max {
            if len > max {
                return Err(ValidationError::constraint(format!(
                    "Array must contain at most {} items",
                    max
                )));
            }
        }
        if let Some(length) = c.length {
            if len != length {
                return Err(ValidationError::constraint(format!(
                    "Array must contain exactly {} items",
                    length
                )));
            }
        }
        if c.unique {
            let duplicated = items
                .iter()
                .enumerate()
                .any(|(i, a)| items[..i].iter().any(|b| a.loosely_equals(b)));
            if duplicated {
                return Err(ValidationError::constraint("Array items must be unique"));
            }
        }
        Ok(())
    }

    pub(crate) fn encode_value(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.item.encode_in(item, depth)).collect())
            }
            other => other.clone(),
        }
    }
}

// =============================================================================
// Tuple
// =============================================================================

/// Fixed-length sequence with one type per position.
#[derive(Debug, Clone)]
pub struct TupleType {
    elements: Vec<Type>,
}

impl TupleType {
    pub fn new(elements: impl IntoIterator<Item = Type>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    pub fn elements(&self) -> &[Type] {
        &self.elements
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let Value::Array(items) = value else {
            return Err(ValidationError::type_mismatch("array", value));
        };
        if items.len() != self.elements.len() {
            return Err(ValidationError::constraint(format!(
                "Tuple length mismatch: expected exactly {}, got {}",
                self.elements.len(),
                items.len()
            )));
        }

        cx.nested(|cx| {
            self.elements
                .iter()
                .zip(items)
                .enumerate()
                .map(|(i, (ty, item))| {
                    ty.decode_in(item, cx)
                        .map_err(|e| e.within(PathSegment::Position(i)))
                })
                .collect::<DecodeResult<Vec<_>>>()
                .map(Value::Array)
        })
    }

    pub(crate) fn encode_value(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Array(items) if items.len() == self.elements.len() => Value::Array(
                self.elements
                    .iter()
                    .zip(items)
                    .map(|(ty, item)| ty.encode_in(item, depth))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// Open-ended mapping with one key type and one value type.
#[derive(Debug, Clone)]
pub struct RecordType {
    key: Type,
    value: Type,
}

impl RecordType {
    pub fn new(key: impl Into<Type>, value: impl Into<Type>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &Type {
        &self.key
    }

    pub fn value(&self) -> &Type {
        &self.value
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let Value::Object(entries) = value else {
            return Err(ValidationError::type_mismatch("object", value));
        };

        cx.nested(|cx| {
            let mut out = Map::with_capacity(entries.len());
            for (k, v) in entries {
                let at_key = |e: ValidationError| e.within(PathSegment::Key(k.clone()));
                let key = self
                    .key
                    .decode_in(&Value::String(k.clone()), cx)
                    .map_err(at_key)?;
                let decoded = self.value.decode_in(v, cx).map_err(at_key)?;
                out.insert(key.to_key(), decoded);
            }
            Ok(Value::Object(out))
        })
    }

    pub(crate) fn encode_value(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.value.encode_in(v, depth)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
