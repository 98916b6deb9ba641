//! Leaf types: string, number/integer and literal.
//!
//! Checks run in a fixed order and the first failing one wins.

use regex::Regex;
use serde_json::Number;

use crate::constraints::{self, NumericConstraints, StringConstraints};
use crate::error::{DecodeResult, SchemaError, SchemaResult, ValidationError};
use crate::value::Value;

// =============================================================================
// String
// =============================================================================

/// String type with optional length bounds and a format pattern.
#[derive(Debug, Clone, Default)]
pub struct StringType {
    constraints: StringConstraints,
    pattern: Option<Regex>,
}

impl StringType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a constraint set, compiling `format` if present.
    pub fn with_constraints(constraints: StringConstraints) -> SchemaResult<Self> {
        let pattern = constraints.format.as_deref().map(compile).transpose()?;
        Ok(Self {
            constraints,
            pattern,
        })
    }

    /// Minimum length in characters.
    pub fn min(mut self, min: usize) -> Self {
        self.constraints.min = Some(min);
        self
    }

    /// Maximum length in characters.
    pub fn max(mut self, max: usize) -> Self {
        self.constraints.max = Some(max);
        self
    }

    /// Require the value to match a regular expression.
    pub fn format(mut self, pattern: &str) -> SchemaResult<Self> {
        self.pattern = Some(compile(pattern)?);
        self.constraints.format = Some(pattern.to_string());
        Ok(self)
    }

    pub fn constraints(&self) -> &StringConstraints {
        &self.constraints
    }

    pub(crate) fn decode_value(&self, value: &Value) -> DecodeResult {
        let Value::String(s) = value else {
            return Err(ValidationError::type_mismatch("string", value));
        };

        let length = s.chars().count();
        if let Some(min) = self.constraints.min {
            if length < min {
                return Err(ValidationError::constraint(format!(
                    "String must be at least {} characters",
                    min
                )));
            }
        }
        if let Some(max) = self.constraints.max {
            if length > max {
                return Err(ValidationError::constraint(format!(
                    "String must be at most {} characters",
                    max
                )));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(s) {
                return Err(ValidationError::constraint(format!(
                    "String must match format /{}/",
                    pattern.as_str()
                )));
            }
        }

        Ok(value.clone())
    }
}

fn compile(pattern: &str) -> SchemaResult<Regex> {
    Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// =============================================================================
// Number / Integer
// =============================================================================

/// Number or integer type with bound constraints.
#[derive(Debug, Clone, Default)]
pub struct NumericType {
    constraints: NumericConstraints,
    integer: bool,
}

impl NumericType {
    /// Any finite number.
    pub fn number() -> Self {
        Self::default()
    }

    /// Numbers with an integral value.
    pub fn integer() -> Self {
        Self {
            constraints: NumericConstraints::default(),
            integer: true,
        }
    }

    pub fn with_constraints(mut self, constraints: NumericConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.constraints.min = constraints::number(min);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.constraints.max = constraints::number(max);
        self
    }

    /// Exclusive lower bound.
    pub fn greater_than(mut self, bound: f64) -> Self {
        self.constraints.greater_than = constraints::number(bound);
        self
    }

    /// Exclusive upper bound.
    pub fn less_than(mut self, bound: f64) -> Self {
        self.constraints.less_than = constraints::number(bound);
        self
    }

    pub fn multiple_of(mut self, factor: f64) -> Self {
        self.constraints.multiple_of = constraints::number(factor);
        self
    }

    pub fn constraints(&self) -> &NumericConstraints {
        &self.constraints
    }

    pub fn is_integer(&self) -> bool {
        self.integer
    }

    pub(crate) fn decode_value(&self, value: &Value) -> DecodeResult {
        let expected = if self.integer { "integer" } else { "number" };
        let Value::Number(n) = value else {
            return Err(ValidationError::type_mismatch(expected, value));
        };
        if self.integer && !is_integral(n) {
            return Err(ValidationError::type_mismatch(expected, value));
        }
        let x = n.as_f64().unwrap_or(f64::NAN);

        let c = &self.constraints;
        if let Some(bound) = bound(&c.greater_than) {
            if x <= bound {
                return Err(violation("greater than", &c.greater_than));
            }
        }
        if let Some(bound) = bound(&c.less_than) {
            if x >= bound {
                return Err(violation("less than", &c.less_than));
            }
        }
        if let Some(bound) = bound(&c.min) {
            if x < bound {
                return Err(violation("at least", &c.min));
            }
        }
        if let Some(bound) = bound(&c.max) {
            if x > bound {
                return Err(violation("at most", &c.max));
            }
        }
        if let Some(factor) = bound(&c.multiple_of) {
            if factor != 0.0 && !is_multiple(x, factor) {
                return Err(violation("a multiple of", &c.multiple_of));
            }
        }

        Ok(value.clone())
    }
}

/// Relative tolerance, since `0.3 / 0.1` is `2.9999999999999996`.
fn is_multiple(x: f64, factor: f64) -> bool {
    let q = x / factor;
    (q - q.round()).abs() <= 1e-9 * q.abs().max(1.0)
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn bound(n: &Option<Number>) -> Option<f64> {
    n.as_ref().and_then(Number::as_f64)
}

fn violation(relation: &str, n: &Option<Number>) -> ValidationError {
    let shown = n.as_ref().map(ToString::to_string).unwrap_or_default();
    ValidationError::constraint(format!("Number must be {} {}", relation, shown))
}

// =============================================================================
// Literal
// =============================================================================

/// A fixed set of permitted scalar values, matched by value equality.
#[derive(Debug, Clone)]
pub struct LiteralType {
    values: Vec<Value>,
}

impl LiteralType {
    /// Build from one or more scalar values (string, number or boolean).
    pub fn new<I, V>(values: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SchemaError::unsupported("literal needs at least one value"));
        }
        if let Some(bad) = values
            .iter()
            .find(|v| !matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_)))
        {
            return Err(SchemaError::unsupported(format!(
                "literal values must be strings, numbers or booleans, got {}",
                bad.type_name()
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Whether this literal permits exactly one value equal to `value`.
    pub fn is_exactly(&self, value: &Value) -> bool {
        self.values.len() == 1 && self.values[0].loosely_equals(value)
    }

    pub(crate) fn decode_value(&self, value: &Value) -> DecodeResult {
        if self.values.iter().any(|allowed| allowed.loosely_equals(value)) {
            return Ok(value.clone());
        }
        let listed: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        Err(ValidationError::constraint(format!(
            "Value must be one of: {}",
            listed.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    // =========================================================================
    // String Tests
    // =========================================================================

    #[test]
    fn test_string_accepts_strings() {
        let ty = StringType::new();
        assert_eq!(ty.decode_value(&v(json!("hi"))).unwrap(), v(json!("hi")));
    }

    #[test]
    fn test_string_rejects_other_kinds() {
        let err = StringType::new().decode_value(&v(json!(3))).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::TypeMismatch { .. }));
        assert_eq!(err.to_string(), "Expected string, got integer");
    }

    #[test]
    fn test_string_length_counts_characters() {
        let ty = StringType::new().min(2).max(3);
        assert!(ty.decode_value(&v(json!("héé"))).is_ok());
        assert_eq!(
            ty.decode_value(&v(json!("a"))).unwrap_err().to_string(),
            "String must be at least 2 characters"
        );
        assert_eq!(
            ty.decode_value(&v(json!("abcd"))).unwrap_err().to_string(),
            "String must be at most 3 characters"
        );
    }

    #[test]
    fn test_string_min_checked_before_format() {
        let ty = StringType::new().min(5).format("^[0-9]+$").unwrap();
        let err = ty.decode_value(&v(json!("ab"))).unwrap_err();
        assert_eq!(err.to_string(), "String must be at least 5 characters");
    }

    #[test]
    fn test_string_format() {
        let ty = StringType::new().format(r"^\d{3}$").unwrap();
        assert!(ty.decode_value(&v(json!("123"))).is_ok());
        let err = ty.decode_value(&v(json!("12a"))).unwrap_err();
        assert_eq!(err.to_string(), r"String must match format /^\d{3}$/");
    }

    #[test]
    fn test_invalid_format_fails_at_construction() {
        let err = StringType::new().format("(unclosed").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    // =========================================================================
    // Numeric Tests
    // =========================================================================

    #[test]
    fn test_number_bounds() {
        let ty = NumericType::number().min(0.0).max(10.0);
        assert!(ty.decode_value(&v(json!(0))).is_ok());
        assert!(ty.decode_value(&v(json!(10.0))).is_ok());
        assert_eq!(
            ty.decode_value(&v(json!(-1))).unwrap_err().to_string(),
            "Number must be at least 0"
        );
        assert_eq!(
            ty.decode_value(&v(json!(10.5))).unwrap_err().to_string(),
            "Number must be at most 10"
        );
    }

    #[test]
    fn test_number_exclusive_bounds() {
        let ty = NumericType::number().greater_than(0.0).less_than(1.0);
        assert!(ty.decode_value(&v(json!(0.5))).is_ok());
        assert_eq!(
            ty.decode_value(&v(json!(0))).unwrap_err().to_string(),
            "Number must be greater than 0"
        );
        assert_eq!(
            ty.decode_value(&v(json!(1))).unwrap_err().to_string(),
            "Number must be less than 1"
        );
    }

    #[test]
    fn test_integer_requires_integral_value() {
        let ty = NumericType::integer();
        assert!(ty.decode_value(&v(json!(4))).is_ok());
        assert!(ty.decode_value(&v(json!(4.0))).is_ok());
        assert_eq!(
            ty.decode_value(&v(json!(4.5))).unwrap_err().to_string(),
            "Expected integer, got number"
        );
        assert_eq!(
            ty.decode_value(&v(json!("4"))).unwrap_err().to_string(),
            "Expected integer, got string"
        );
    }

    #[test]
    fn test_multiple_of() {
        let ty = NumericType::integer().multiple_of(5.0);
        assert!(ty.decode_value(&v(json!(15))).is_ok());
        assert_eq!(
            ty.decode_value(&v(json!(7))).unwrap_err().to_string(),
            "Number must be a multiple of 5"
        );
    }

    #[test]
    fn test_multiple_of_decimal_factor() {
        let ty = NumericType::number().multiple_of(0.1);
        for ok in [json!(0.3), json!(0.7), json!(12.5), json!(-0.2), json!(3)] {
            assert!(ty.decode_value(&v(ok.clone())).is_ok(), "{} rejected", ok);
        }
        assert_eq!(
            ty.decode_value(&v(json!(0.35))).unwrap_err().to_string(),
            "Number must be a multiple of 0.1"
        );
    }

    // =========================================================================
    // Literal Tests
    // =========================================================================

    #[test]
    fn test_literal_membership_by_value() {
        let ty = LiteralType::new([1.0]).unwrap();
        assert!(ty.decode_value(&v(json!(1))).is_ok());
        assert!(ty.is_exactly(&v(json!(1))));
    }

    #[test]
    fn test_literal_failure_lists_values_in_order() {
        let ty = LiteralType::new(["draft", "published"]).unwrap();
        let err = ty.decode_value(&v(json!("deleted"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Value must be one of: "draft", "published""#
        );
    }

    #[test]
    fn test_literal_rejects_non_scalars() {
        assert!(LiteralType::new(Vec::<Value>::new()).is_err());
        assert!(LiteralType::new([Value::Array(vec![])]).is_err());
    }
}
