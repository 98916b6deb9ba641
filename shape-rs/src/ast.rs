//! The serializable mirror of a type tree.
//!
//! An [`Ast`] is plain data: every node serializes to a JSON object with a
//! `_type` tag naming its kind. It is produced by [`Type::to_ast`], consumed
//! by the JSON Schema codec and turned back into a live tree by
//! [`Type::from_ast`].
//!
//! ```json
//! {
//!   "_type": "struct",
//!   "fields": {
//!     "name": { "_type": "string", "constraints": { "min": 1 } },
//!     "port": { "_type": "optional", "inner_type": { "_type": "integer", "constraints": {} }, "default_value": 3000 }
//!   },
//!   "required": ["name"]
//! }
//! ```
//!
//! [`Type::to_ast`]: crate::Type::to_ast
//! [`Type::from_ast`]: crate::Type::from_ast

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constraints::{ArrayConstraints, NumericConstraints, StringConstraints};
use crate::error::SchemaResult;
use crate::types::{ExtraKeys, Kind};
use crate::value::Value;

/// One node of a schema AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "snake_case")]
pub enum Ast {
    String {
        #[serde(default)]
        constraints: StringConstraints,
    },
    Number {
        #[serde(default)]
        constraints: NumericConstraints,
    },
    Integer {
        #[serde(default)]
        constraints: NumericConstraints,
    },
    Boolean,
    Null,
    Symbol,
    Literal {
        values: Vec<Value>,
    },
    Array {
        item_type: Box<Ast>,
        #[serde(default)]
        constraints: ArrayConstraints,
    },
    Tuple {
        elements: Vec<Ast>,
    },
    Struct {
        fields: IndexMap<String, Ast>,
        #[serde(default)]
        required: Vec<String>,
        #[serde(default, skip_serializing_if = "ExtraKeys::is_reject")]
        extra_keys: ExtraKeys,
    },
    Record {
        key_type: Box<Ast>,
        value_type: Box<Ast>,
    },
    Union {
        members: Vec<Ast>,
    },
    DiscriminatedUnion {
        discriminator: String,
        variants: IndexMap<String, Ast>,
    },
    Optional {
        inner_type: Box<Ast>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<Value>,
    },
    Transform {
        inner_type: Box<Ast>,
        target: String,
    },
    /// A back-reference to an enclosing node of kind `ref_type`.
    Lazy {
        name: String,
        ref_type: Kind,
        /// How many enclosing nodes up the target sits; `1` is the parent.
        /// Without it the nearest enclosing node of `ref_type` is used.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ref_depth: Option<usize>,
    },
}

impl Ast {
    pub fn kind(&self) -> Kind {
        match self {
            Ast::String { .. } => Kind::String,
            Ast::Number { .. } => Kind::Number,
            Ast::Integer { .. } => Kind::Integer,
            Ast::Boolean => Kind::Boolean,
            Ast::Null => Kind::Null,
            Ast::Symbol => Kind::Symbol,
            Ast::Literal { .. } => Kind::Literal,
            Ast::Array { .. } => Kind::Array,
            Ast::Tuple { .. } => Kind::Tuple,
            Ast::Struct { .. } => Kind::Struct,
            Ast::Record { .. } => Kind::Record,
            Ast::Union { .. } => Kind::Union,
            Ast::DiscriminatedUnion { .. } => Kind::DiscriminatedUnion,
            Ast::Optional { .. } => Kind::Optional,
            Ast::Transform { .. } => Kind::Transform,
            Ast::Lazy { .. } => Kind::Lazy,
        }
    }

    /// A string node without constraints.
    pub fn string() -> Self {
        Ast::String {
            constraints: StringConstraints::default(),
        }
    }

    pub fn to_json(&self) -> SchemaResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: &serde_json::Value) -> SchemaResult<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Parse an AST from JSON text.
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_struct_wire_shape() {
        let ast = Ast::Struct {
            fields: IndexMap::from([
                ("name".to_string(), Ast::string()),
                (
                    "port".to_string(),
                    Ast::Optional {
                        inner_type: Box::new(Ast::Integer {
                            constraints: NumericConstraints::default(),
                        }),
                        default_value: Some(Value::from(3000)),
                    },
                ),
            ]),
            required: vec!["name".to_string()],
            extra_keys: ExtraKeys::Reject,
        };

        assert_eq!(
            ast.to_json().unwrap(),
            json!({
                "_type": "struct",
                "fields": {
                    "name": {"_type": "string", "constraints": {}},
                    "port": {
                        "_type": "optional",
                        "inner_type": {"_type": "integer", "constraints": {}},
                        "default_value": 3000
                    }
                },
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_unit_kinds_carry_only_the_tag() {
        assert_eq!(Ast::Symbol.to_json().unwrap(), json!({"_type": "symbol"}));
    }

    #[test]
    fn test_missing_constraints_default_to_empty() {
        let ast = Ast::from_json(&json!({"_type": "string"})).unwrap();
        assert_eq!(ast, Ast::string());
    }

    #[test]
    fn test_lazy_stub_and_extra_keys_parse() {
        let ast = Ast::from_json(&json!({
            "_type": "struct",
            "fields": {"next": {"_type": "lazy", "name": "node", "ref_type": "struct"}},
            "required": ["next"],
            "extra_keys": "include"
        }))
        .unwrap();
        let Ast::Struct { fields, extra_keys, .. } = ast else {
            panic!("expected struct");
        };
        assert_eq!(extra_keys, ExtraKeys::Include);
        assert_eq!(fields["next"].kind(), Kind::Lazy);
    }

    #[test]
    fn test_lazy_ref_depth_is_optional_on_the_wire() {
        let stub = Ast::Lazy {
            name: "node".into(),
            ref_type: Kind::Struct,
            ref_depth: Some(2),
        };
        let json = stub.to_json().unwrap();
        assert_eq!(
            json,
            json!({"_type": "lazy", "name": "node", "ref_type": "struct", "ref_depth": 2})
        );
        assert_eq!(Ast::from_json(&json).unwrap(), stub);

        let bare = Ast::from_json(&json!({"_type": "lazy", "name": "node", "ref_type": "struct"}))
            .unwrap();
        assert!(matches!(bare, Ast::Lazy { ref_depth: None, .. }));
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        assert!(Ast::from_json(&json!({"_type": "date"})).is_err());
    }
}
