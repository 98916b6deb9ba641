//! The struct type: named fields with an extra-key policy.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Context, Type, TypeNode};
use crate::error::{DecodeResult, PathSegment, ValidationError, ValidationErrorKind};
use crate::value::{Map, Value};

/// What a struct does with input keys it does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKeys {
    /// Fail with an unexpected-keys error.
    #[default]
    Reject,
    /// Drop them from the result.
    Allow,
    /// Copy them into the result verbatim.
    Include,
}

impl ExtraKeys {
    pub fn is_reject(&self) -> bool {
        matches!(self, ExtraKeys::Reject)
    }
}

/// A mapping with declared fields. A field is optional when its type is an
/// [`OptionalType`](super::OptionalType) wrapper.
#[derive(Debug, Clone)]
pub struct StructType {
    fields: IndexMap<String, Type>,
    extra_keys: ExtraKeys,
}

impl StructType {
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
            extra_keys: ExtraKeys::default(),
        }
    }

    /// Set the extra-key policy.
    pub fn extra_keys(mut self, policy: ExtraKeys) -> Self {
        self.extra_keys = policy;
        self
    }

    pub fn fields(&self) -> &IndexMap<String, Type> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.get(name)
    }

    pub fn policy(&self) -> ExtraKeys {
        self.extra_keys
    }

    /// Names of fields that must be present, in declaration order.
    pub fn required(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, ty)| !ty.is_optional())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let Value::Object(input) = value else {
            return Err(ValidationError::type_mismatch("object", value));
        };
        trace!(fields = self.fields.len(), "decoding struct");

        if self.extra_keys.is_reject() {
            let unexpected: Vec<String> = input
                .keys()
                .filter(|k| !self.fields.contains_key(*k))
                .cloned()
                .collect();
            if !unexpected.is_empty() {
                return Err(ValidationError::new(ValidationErrorKind::UnexpectedKeys(
                    unexpected,
                )));
            }
        }

        cx.nested(|cx| {
            let mut out = Map::with_capacity(self.fields.len());
            for (name, ty) in &self.fields {
                let at_field = |e: ValidationError| e.within(PathSegment::Field(name.clone()));
                match input.get(name) {
                    Some(raw) => {
                        out.insert(name.clone(), ty.decode_in(raw, cx).map_err(at_field)?);
                    }
                    None => match ty.node() {
                        TypeNode::Optional(opt) => {
                            if let Some(default) = opt.default() {
                                out.insert(name.clone(), default.clone());
                            }
                        }
                        _ => return Err(at_field(ValidationError::required())),
                    },
                }
            }

            if matches!(self.extra_keys, ExtraKeys::Include) {
                for (k, v) in input {
                    if !self.fields.contains_key(k) {
                        out.insert(k.clone(), v.clone());
                    }
                }
            }
            Ok(Value::Object(out))
        })
    }

    pub(crate) fn encode_value(&self, value: &Value, depth: usize) -> Value {
        let Value::Object(input) = value else {
            return value.clone();
        };
        let mut out = Map::with_capacity(input.len());
        for (name, ty) in &self.fields {
            if let Some(v) = input.get(name) {
                out.insert(name.clone(), ty.encode_in(v, depth));
            }
        }
        if matches!(self.extra_keys, ExtraKeys::Include) {
            for (k, v) in input {
                if !self.fields.contains_key(k) {
                    out.insert(k.clone(), v.clone());
                }
            }
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn server() -> Type {
        object([
            ("name", string().into()),
            (
                "port",
                optional_with_default(integer(), 3000).unwrap(),
            ),
        ])
        .into()
    }

    #[test]
    fn test_missing_optional_field_gets_default() {
        assert_eq!(
            server().decode(&v(json!({"name": "a"}))).unwrap(),
            v(json!({"name": "a", "port": 3000}))
        );
        assert_eq!(
            server().decode(&v(json!({"name": "a", "port": 8080}))).unwrap(),
            v(json!({"name": "a", "port": 8080}))
        );
    }

    #[test]
    fn test_missing_required_field_names_field() {
        let err = server().decode(&v(json!({}))).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::RequiredValue);
        assert_eq!(err.to_string(), "Field 'name': Value is required");
    }

    #[test]
    fn test_optional_without_default_is_omitted() {
        let ty: Type = object([("nick", optional(string()))]).into();
        assert_eq!(ty.decode(&v(json!({}))).unwrap(), v(json!({})));
    }

    #[test]
    fn test_explicit_null_for_optional_field_uses_default() {
        assert_eq!(
            server().decode(&v(json!({"name": "a", "port": null}))).unwrap(),
            v(json!({"name": "a", "port": 3000}))
        );
    }

    #[test]
    fn test_extra_keys_policies() {
        let input = v(json!({"name": "a", "age": 1}));
        let base = || object([("name", string().into())]);

        let err = Type::from(base()).decode(&input).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected keys: age");

        let allowed = Type::from(base().extra_keys(ExtraKeys::Allow));
        assert_eq!(allowed.decode(&input).unwrap(), v(json!({"name": "a"})));

        let included = Type::from(base().extra_keys(ExtraKeys::Include));
        assert_eq!(included.decode(&input).unwrap(), input);
    }

    #[test]
    fn test_nested_field_path() {
        let ty: Type = object([(
            "parcel",
            object([("weight", number().greater_than(0.0).into())]).into(),
        )])
        .into();
        let err = ty
            .decode(&v(json!({"parcel": {"weight": 0}})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'parcel': Field 'weight': Number must be greater than 0"
        );
    }

    #[test]
    fn test_required_is_complement_of_optional() {
        let ty = object([
            ("a", string().into()),
            ("b", optional(string())),
            ("c", integer().into()),
        ]);
        assert_eq!(ty.required(), vec!["a", "c"]);
    }

    #[test]
    fn test_encode_keeps_declared_fields() {
        let ty: Type = object([("tag", symbol())]).into();
        let decoded = ty.decode(&v(json!({"tag": "x"}))).unwrap();
        assert_eq!(ty.encode(&decoded), v(json!({"tag": "x"})));
    }
}
