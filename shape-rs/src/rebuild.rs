//! AST -> type tree.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::ast::Ast;
use crate::error::{SchemaError, SchemaResult};
use crate::types::{
    ArrayType, DiscriminatedUnionType, Kind, LazyType, LiteralType, NumericType, OptionalType,
    RecordType, StringType, StructType, TupleType, Type, TypeNode, UnionType,
};
use crate::value::Value;

impl Type {
    /// Build a live type tree from an [`Ast`].
    ///
    /// Constraints are checked again (patterns compiled, defaults decoded,
    /// discriminated union variants verified). A `transform` node becomes its
    /// inner type, since functions are not data. A `lazy` stub becomes a lazy
    /// node pointing at the enclosing node `ref_depth` levels up, or at the
    /// nearest enclosing node of the referenced kind when no depth is given.
    pub fn from_ast(ast: &Ast) -> SchemaResult<Type> {
        let mut builder = Rebuilder::default();
        let ty = builder.build(ast)?;
        for (inner, default) in builder.deferred_defaults {
            inner.decode(&default).map_err(SchemaError::InvalidDefault)?;
        }
        debug!(kind = %ty.kind(), lazy_stubs = builder.lazy_stubs, "rebuilt type from ast");
        Ok(ty)
    }
}

type Slot = Arc<OnceLock<Type>>;

#[derive(Default)]
struct Rebuilder {
    /// Nodes under construction, outermost first, each with the cell it will
    /// be published to.
    enclosing: Vec<(Kind, Slot)>,
    /// Defaults whose types reach a lazy stub; checked once the tree exists.
    deferred_defaults: Vec<(Type, Value)>,
    lazy_stubs: usize,
}

impl Rebuilder {
    fn build(&mut self, ast: &Ast) -> SchemaResult<Type> {
        let slot = Slot::default();
        self.enclosing.push((ast.kind(), Arc::clone(&slot)));
        let result = self.convert(ast);
        self.enclosing.pop();

        let ty = result?;
        // Fresh slot, so this is the only write.
        let _ = slot.set(ty.clone());
        Ok(ty)
    }

    fn convert(&mut self, ast: &Ast) -> SchemaResult<Type> {
        let ty = match ast {
            Ast::String { constraints } => {
                StringType::with_constraints(constraints.clone())?.into()
            }
            Ast::Number { constraints } => NumericType::number()
                .with_constraints(constraints.clone())
                .into(),
            Ast::Integer { constraints } => NumericType::integer()
                .with_constraints(constraints.clone())
                .into(),
            Ast::Boolean => TypeNode::Boolean.into(),
            Ast::Null => TypeNode::Null.into(),
            Ast::Symbol => TypeNode::Symbol.into(),
            Ast::Literal { values } => LiteralType::new(values.iter().cloned())?.into(),
            Ast::Array {
                item_type,
                constraints,
            } => ArrayType::new(self.build(item_type)?)
                .with_constraints(constraints.clone())
                .into(),
            Ast::Tuple { elements } => TupleType::new(self.build_all(elements)?).into(),
            Ast::Struct {
                fields,
                required,
                extra_keys,
            } => {
                let mut built = Vec::with_capacity(fields.len());
                for (name, field) in fields {
                    let mut ty = self.build(field)?;
                    // A field left out of `required` is optional even when
                    // its AST does not say so.
                    if !ty.is_optional() && !required.contains(name) {
                        ty = ty.optional();
                    }
                    built.push((name.clone(), ty));
                }
                StructType::new(built).extra_keys(*extra_keys).into()
            }
            Ast::Record {
                key_type,
                value_type,
            } => RecordType::new(self.build(key_type)?, self.build(value_type)?).into(),
            Ast::Union { members } => UnionType::new(self.build_all(members)?).into(),
            Ast::DiscriminatedUnion {
                discriminator,
                variants,
            } => {
                let mut built = Vec::with_capacity(variants.len());
                for (tag, variant) in variants {
                    built.push((tag.clone(), self.build(variant)?));
                }
                DiscriminatedUnionType::new(discriminator.clone(), built)?.into()
            }
            Ast::Optional {
                inner_type,
                default_value,
            } => {
                let stubs_before = self.lazy_stubs;
                let inner = self.build(inner_type)?;
                match default_value {
                    Some(default) if self.lazy_stubs == stubs_before => {
                        OptionalType::with_default(inner, default.clone())?.into()
                    }
                    Some(default) => {
                        self.deferred_defaults
                            .push((inner.clone(), default.clone()));
                        OptionalType::with_unchecked_default(inner, Some(default.clone())).into()
                    }
                    None => OptionalType::new(inner).into(),
                }
            }
            Ast::Transform { inner_type, .. } => self.build(inner_type)?,
            Ast::Lazy {
                name,
                ref_type,
                ref_depth,
            } => self.stub(name, *ref_type, *ref_depth)?,
        };
        Ok(ty)
    }

    fn build_all(&mut self, asts: &[Ast]) -> SchemaResult<Vec<Type>> {
        asts.iter().map(|ast| self.build(ast)).collect()
    }

    fn stub(
        &mut self,
        name: &str,
        ref_type: Kind,
        ref_depth: Option<usize>,
    ) -> SchemaResult<Type> {
        // Skip the stub's own entry at the top of the stack.
        let ancestors = &self.enclosing[..self.enclosing.len().saturating_sub(1)];
        let target = match ref_depth {
            Some(up) => ancestors
                .len()
                .checked_sub(up)
                .and_then(|i| ancestors.get(i))
                .filter(|(kind, _)| *kind == ref_type),
            None => ancestors.iter().rev().find(|(kind, _)| *kind == ref_type),
        };
        let slot = target.map(|(_, slot)| Arc::clone(slot)).ok_or_else(|| {
            SchemaError::unsupported(format!(
                "recursive reference '{}' has no enclosing {} node",
                name, ref_type
            ))
        })?;
        self.lazy_stubs += 1;

        Ok(LazyType::new(name, move || {
            // The slot is published before `from_ast` returns, and the tree
            // cannot be used before then.
            slot.get().cloned().unwrap_or_else(|| TypeNode::Null.into())
        })
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;
    use crate::error::ValidationErrorKind;
    use serde_json::json;
    use std::sync::LazyLock;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    static TREE: LazyLock<Type> = LazyLock::new(|| {
        object([
            ("value", number().into()),
            ("children", array(lazy("tree", || TREE.clone())).into()),
        ])
        .into()
    });

    #[test]
    fn test_rebuilt_type_decodes_like_original() {
        let original: Type = object([
            ("name", string().min(1).into()),
            ("port", optional_with_default(integer(), 3000).unwrap()),
        ])
        .into();
        let rebuilt = Type::from_ast(&original.to_ast()).unwrap();

        let input = v(json!({"name": "a"}));
        assert_eq!(rebuilt.decode(&input).unwrap(), original.decode(&input).unwrap());
        assert_eq!(
            rebuilt.decode(&v(json!({"name": ""}))).unwrap_err().to_string(),
            "Field 'name': String must be at least 1 characters"
        );
    }

    #[test]
    fn test_recursive_schema_round_trips() {
        let rebuilt = Type::from_ast(&TREE.to_ast()).unwrap();
        let input = v(json!({
            "value": 1,
            "children": [{"value": 2, "children": [{"value": 3, "children": []}]}]
        }));
        assert_eq!(rebuilt.decode(&input).unwrap(), input);

        let err = rebuilt
            .decode(&v(json!({"value": 1, "children": [{"value": "x", "children": []}]})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'children': item at index 0: Field 'value': Expected number, got string"
        );
        assert_eq!(rebuilt.to_ast(), TREE.to_ast());
    }

    static ACCOUNT: LazyLock<Type> = LazyLock::new(|| {
        object([
            ("name", string().into()),
            (
                "owner",
                optional(object([
                    ("id", integer().into()),
                    ("account", optional(lazy("account", || ACCOUNT.clone()))),
                ])),
            ),
        ])
        .into()
    });

    #[test]
    fn test_mutual_recursion_binds_outer_struct() {
        let ast = ACCOUNT.to_ast();
        let rebuilt = Type::from_ast(&ast).unwrap();

        let input = v(json!({"name": "x", "owner": {"id": 1, "account": {"name": "y"}}}));
        assert_eq!(rebuilt.decode(&input).unwrap(), ACCOUNT.decode(&input).unwrap());

        let err = rebuilt
            .decode(&v(json!({"name": "x", "owner": {"id": 1, "account": {"id": 2}}})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'owner': Field 'account': Unexpected keys: id"
        );
        assert_eq!(rebuilt.to_ast(), ast);
    }

    #[test]
    fn test_stub_depth_must_name_matching_kind() {
        let ast = Ast::from_json(&json!({
            "_type": "struct",
            "fields": {
                "items": {
                    "_type": "array",
                    "item_type": {"_type": "lazy", "name": "x", "ref_type": "struct", "ref_depth": 1}
                }
            },
            "required": ["items"]
        }))
        .unwrap();
        assert!(matches!(
            Type::from_ast(&ast),
            Err(SchemaError::UnsupportedSchema(_))
        ));
    }

    #[test]
    fn test_dangling_stub_is_rejected() {
        let ast = Ast::from_json(&json!({"_type": "lazy", "name": "x", "ref_type": "struct"}))
            .unwrap();
        assert!(matches!(
            Type::from_ast(&ast),
            Err(SchemaError::UnsupportedSchema(_))
        ));
    }

    #[test]
    fn test_bad_default_is_rejected() {
        let ast = Ast::from_json(&json!({
            "_type": "optional",
            "inner_type": {"_type": "integer", "constraints": {"min": 10}},
            "default_value": 1
        }))
        .unwrap();
        assert!(matches!(
            Type::from_ast(&ast),
            Err(SchemaError::InvalidDefault(_))
        ));
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let ast =
            Ast::from_json(&json!({"_type": "string", "constraints": {"format": "("}})).unwrap();
        assert!(matches!(
            Type::from_ast(&ast),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_transform_rebuilds_as_inner_type() {
        let ty = transform(integer(), "cents", |v| v, |v| v);
        let rebuilt = Type::from_ast(&ty.to_ast()).unwrap();
        assert_eq!(rebuilt.kind(), Kind::Integer);
    }

    #[test]
    fn test_field_missing_from_required_is_optional() {
        let ast = Ast::from_json(&json!({
            "_type": "struct",
            "fields": {"a": {"_type": "string"}},
            "required": []
        }))
        .unwrap();
        let ty = Type::from_ast(&ast).unwrap();
        assert_eq!(ty.decode(&v(json!({}))).unwrap(), v(json!({})));
        let err = ty.decode(&v(json!({"a": 1}))).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::TypeMismatch { .. }));
    }
}
