//! Constraint sets attached to primitive and array types.
//!
//! The same structs are carried by live type nodes and by their AST mirror,
//! so introspection copies them verbatim. Keys are snake_case. Unknown keys
//! are ignored when deserializing.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Constraints for the string type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringConstraints {
    /// Minimum length in characters (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,

    /// Maximum length in characters (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    /// Regular expression the whole value must match somewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl StringConstraints {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.format.is_none()
    }
}

/// Constraints for the number and integer types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericConstraints {
    /// Inclusive lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,

    /// Inclusive upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,

    /// Exclusive lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greater_than: Option<Number>,

    /// Exclusive upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_than: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
}

impl NumericConstraints {
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.greater_than.is_none()
            && self.less_than.is_none()
            && self.multiple_of.is_none()
    }
}

/// Constraints for the array type, checked against the whole sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    /// Exact item count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,

    /// Items must be pairwise distinct
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}

impl ArrayConstraints {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.length.is_none() && !self.unique
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Convert a float bound into a JSON number. Non-finite bounds are dropped.
pub(crate) fn number(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_constraints_serialize_to_empty_object() {
        assert_eq!(
            serde_json::to_value(StringConstraints::default()).unwrap(),
            json!({})
        );
        assert_eq!(
            serde_json::to_value(ArrayConstraints::default()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_unknown_constraint_keys_are_ignored() {
        let constraints: StringConstraints =
            serde_json::from_value(json!({"min": 1, "trim": true})).unwrap();
        assert_eq!(constraints.min, Some(1));
        assert!(!constraints.is_empty());
    }

    #[test]
    fn test_numeric_constraints_keep_integer_representation() {
        let constraints = NumericConstraints {
            min: number(0.0),
            greater_than: number(0.5),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&constraints).unwrap(),
            json!({"min": 0, "greater_than": 0.5})
        );
    }
}
