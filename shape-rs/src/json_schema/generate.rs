//! AST -> JSON Schema.
//!
//! # Mappings
//!
//! | AST | JSON Schema |
//! |-----|-------------|
//! | `string` | `{"type": "string", "minLength", "maxLength", "pattern"}` |
//! | `number` / `integer` | `{"type": ..., "minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum", "multipleOf"}` |
//! | `symbol` | `{"type": "string"}` |
//! | `literal` | `{"const": v}` or `{"enum": [...]}` |
//! | `array` | `{"type": "array", "items", "minItems", "maxItems", "uniqueItems"}` |
//! | `tuple` | `{"type": "array", "prefixItems", "minItems": n, "maxItems": n}` |
//! | `struct` | `{"type": "object", "properties", "required", "additionalProperties"}` |
//! | `record` | `{"type": "object", "additionalProperties": <value>}` |
//! | `union` of T and null | T with `"type": [T, "null"]` |
//! | `union` | `{"anyOf": [...]}` |
//! | `discriminated_union` | `{"oneOf": [...]}` |
//! | `optional` | inner schema plus `default` |

use serde_json::{json, Map, Number, Value as Json};
use tracing::debug;

use super::{JsonSchemaOptions, DRAFT_2020_12};
use crate::ast::Ast;
use crate::constraints::{ArrayConstraints, NumericConstraints, StringConstraints};
use crate::types::{ExtraKeys, Kind};
use crate::value::Value;

/// Generate a complete JSON Schema document for `ast`.
pub fn to_json_schema(ast: &Ast, options: &JsonSchemaOptions) -> Json {
    let mut doc = Map::new();
    if let Some(id) = &options.id {
        doc.insert("$schema".into(), json!(DRAFT_2020_12));
        doc.insert("$id".into(), json!(id));
    }
    if let Some(title) = &options.title {
        doc.insert("title".into(), json!(title));
    }
    if let Some(description) = &options.description {
        doc.insert("description".into(), json!(description));
    }

    match JsonSchemaMapper::new().map_ast(ast) {
        Json::Object(body) => doc.extend(body),
        other => return other,
    }
    debug!(kind = %ast.kind(), keys = doc.len(), "generated json schema");
    Json::Object(doc)
}

/// Maps AST nodes to JSON Schema fragments.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaMapper;

impl JsonSchemaMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map one AST node (and its children) to a schema fragment.
    pub fn map_ast(&self, ast: &Ast) -> Json {
        match ast {
            // Primitives
            Ast::String { constraints } => self.map_string(constraints),
            Ast::Number { constraints } => self.map_numeric("number", constraints),
            Ast::Integer { constraints } => self.map_numeric("integer", constraints),
            Ast::Boolean => json!({"type": "boolean"}),
            Ast::Null => json!({"type": "null"}),
            Ast::Symbol => json!({"type": "string"}),
            Ast::Literal { values } => self.map_literal(values),

            // Collections
            Ast::Array {
                item_type,
                constraints,
            } => self.map_array(item_type, constraints),
            Ast::Tuple { elements } => self.map_tuple(elements),
            Ast::Struct {
                fields,
                required,
                extra_keys,
            } => self.map_struct(fields, required, *extra_keys),
            Ast::Record { value_type, .. } => json!({
                "type": "object",
                "additionalProperties": self.map_ast(value_type),
            }),

            // Composites
            Ast::Union { members } => self.map_union(members),
            Ast::DiscriminatedUnion { variants, .. } => json!({
                "oneOf": variants.values().map(|v| self.map_ast(v)).collect::<Vec<_>>(),
            }),
            Ast::Optional {
                inner_type,
                default_value,
            } => self.map_optional(inner_type, default_value.as_ref()),
            Ast::Transform { inner_type, .. } => self.map_ast(inner_type),
            Ast::Lazy { name, ref_type, .. } => self.map_lazy(name, *ref_type),
        }
    }

    fn map_string(&self, c: &StringConstraints) -> Json {
        let mut schema = object("string");
        insert_opt(&mut schema, "minLength", c.min.map(Number::from));
        insert_opt(&mut schema, "maxLength", c.max.map(Number::from));
        if let Some(pattern) = &c.format {
            schema.insert("pattern".into(), json!(pattern));
        }
        Json::Object(schema)
    }

    fn map_numeric(&self, ty: &str, c: &NumericConstraints) -> Json {
        let mut schema = object(ty);
        insert_opt(&mut schema, "minimum", c.min.clone());
        insert_opt(&mut schema, "maximum", c.max.clone());
        insert_opt(&mut schema, "exclusiveMinimum", c.greater_than.clone());
        insert_opt(&mut schema, "exclusiveMaximum", c.less_than.clone());
        insert_opt(&mut schema, "multipleOf", c.multiple_of.clone());
        Json::Object(schema)
    }

    fn map_literal(&self, values: &[Value]) -> Json {
        match values {
            [single] => json!({"const": single.to_json()}),
            many => json!({"enum": many.iter().map(Value::to_json).collect::<Vec<_>>()}),
        }
    }

    fn map_array(&self, item: &Ast, c: &ArrayConstraints) -> Json {
        let mut schema = object("array");
        schema.insert("items".into(), self.map_ast(item));
        let (min, max) = match c.length {
            Some(length) => (Some(length), Some(length)),
            None => (c.min, c.max),
        };
        insert_opt(&mut schema, "minItems", min.map(Number::from));
        insert_opt(&mut schema, "maxItems", max.map(Number::from));
        if c.unique {
            schema.insert("uniqueItems".into(), json!(true));
        }
        Json::Object(schema)
    }

    fn map_tuple(&self, elements: &[Ast]) -> Json {
        json!({
            "type": "array",
            "prefixItems": elements.iter().map(|e| self.map_ast(e)).collect::<Vec<_>>(),
            "minItems": elements.len(),
            "maxItems": elements.len(),
        })
    }

    fn map_struct(
        &self,
        fields: &indexmap::IndexMap<String, Ast>,
        required: &[String],
        extra_keys: ExtraKeys,
    ) -> Json {
        let properties: Map<String, Json> = fields
            .iter()
            .map(|(name, field)| (name.clone(), self.map_ast(field)))
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": !extra_keys.is_reject(),
        })
    }

    /// `T | null` collapses to T with a widened `type`.
    fn map_union(&self, members: &[Ast]) -> Json {
        let schemas: Vec<Json> = members.iter().map(|m| self.map_ast(m)).collect();
        if let [a, b] = schemas.as_slice() {
            let null = json!({"type": "null"});
            let other = match (*a == null, *b == null) {
                (true, false) => Some(b),
                (false, true) => Some(a),
                _ => None,
            };
            if let Some(Json::Object(other)) = other {
                if let Some(Json::String(ty)) = other.get("type") {
                    let mut collapsed = other.clone();
                    collapsed.insert("type".into(), json!([ty, "null"]));
                    return Json::Object(collapsed);
                }
            }
        }
        json!({"anyOf": schemas})
    }

    fn map_optional(&self, inner: &Ast, default: Option<&Value>) -> Json {
        let mut schema = self.map_ast(inner);
        if let (Json::Object(map), Some(default)) = (&mut schema, default) {
            map.insert("default".into(), default.to_json());
        }
        schema
    }

    fn map_lazy(&self, name: &str, ref_type: Kind) -> Json {
        let mut schema = Map::new();
        if let Some(ty) = json_type(ref_type) {
            schema.insert("type".into(), json!(ty));
        }
        schema.insert(
            "description".into(),
            json!(format!("Recursive reference to {}", name)),
        );
        Json::Object(schema)
    }
}

/// The JSON Schema `type` for nodes of `kind`, where there is a single one.
fn json_type(kind: Kind) -> Option<&'static str> {
    match kind {
        Kind::String | Kind::Symbol => Some("string"),
        Kind::Number => Some("number"),
        Kind::Integer => Some("integer"),
        Kind::Boolean => Some("boolean"),
        Kind::Null => Some("null"),
        Kind::Array | Kind::Tuple => Some("array"),
        Kind::Struct | Kind::Record | Kind::DiscriminatedUnion => Some("object"),
        Kind::Literal | Kind::Union | Kind::Optional | Kind::Transform | Kind::Lazy => None,
    }
}

fn object(ty: &str) -> Map<String, Json> {
    let mut map = Map::new();
    map.insert("type".into(), json!(ty));
    map
}

fn insert_opt(map: &mut Map<String, Json>, key: &str, value: Option<Number>) {
    if let Some(n) = value {
        map.insert(key.into(), Json::Number(n));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn map(ast: &Ast) -> Json {
        JsonSchemaMapper::new().map_ast(ast)
    }

    #[test]
    fn test_string_constraints() {
        let ast = Ast::String {
            constraints: StringConstraints {
                min: Some(1),
                max: Some(10),
                format: Some("^[a-z]+$".into()),
            },
        };
        assert_eq!(
            map(&ast),
            json!({"type": "string", "minLength": 1, "maxLength": 10, "pattern": "^[a-z]+$"})
        );
    }

    #[test]
    fn test_numeric_constraints() {
        let ast = Ast::Integer {
            constraints: NumericConstraints {
                greater_than: Some(0.into()),
                multiple_of: Some(5.into()),
                ..Default::default()
            },
        };
        assert_eq!(
            map(&ast),
            json!({"type": "integer", "exclusiveMinimum": 0, "multipleOf": 5})
        );
    }

    #[test]
    fn test_literals() {
        let one = Ast::Literal {
            values: vec![Value::from("a")],
        };
        let many = Ast::Literal {
            values: vec![Value::from("a"), Value::from(1)],
        };
        assert_eq!(map(&one), json!({"const": "a"}));
        assert_eq!(map(&many), json!({"enum": ["a", 1]}));
    }

    #[test]
    fn test_array_length_sets_both_bounds() {
        let ast = Ast::Array {
            item_type: Box::new(Ast::Boolean),
            constraints: ArrayConstraints {
                length: Some(2),
                unique: true,
                ..Default::default()
            },
        };
        assert_eq!(
            map(&ast),
            json!({
                "type": "array",
                "items": {"type": "boolean"},
                "minItems": 2,
                "maxItems": 2,
                "uniqueItems": true
            })
        );
    }

    #[test]
    fn test_tuple() {
        let ast = Ast::Tuple {
            elements: vec![Ast::string(), Ast::Null],
        };
        assert_eq!(
            map(&ast),
            json!({
                "type": "array",
                "prefixItems": [{"type": "string"}, {"type": "null"}],
                "minItems": 2,
                "maxItems": 2
            })
        );
    }

    #[test]
    fn test_struct_with_optional_default() {
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
            map(&ast),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "port": {"type": "integer", "default": 3000}
                },
                "required": ["name"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_nullable_collapse() {
        let ast = Ast::Union {
            members: vec![Ast::string(), Ast::Null],
        };
        assert_eq!(map(&ast), json!({"type": ["string", "null"]}));
    }

    #[test]
    fn test_union_of_two_nulls_stays_any_of() {
        let ast = Ast::Union {
            members: vec![Ast::Null, Ast::Null],
        };
        let schema = map(&ast);
        assert_eq!(
            schema,
            json!({"anyOf": [{"type": "null"}, {"type": "null"}]})
        );
        assert_eq!(crate::json_schema::from_json_schema(&schema).unwrap(), ast);
    }

    #[test]
    fn test_union_without_null_uses_any_of() {
        let ast = Ast::Union {
            members: vec![Ast::string(), Ast::Boolean],
        };
        assert_eq!(
            map(&ast),
            json!({"anyOf": [{"type": "string"}, {"type": "boolean"}]})
        );
    }

    #[test]
    fn test_lazy_stub() {
        let ast = Ast::Lazy {
            name: "node".into(),
            ref_type: Kind::Struct,
            ref_depth: Some(2),
        };
        assert_eq!(
            map(&ast),
            json!({"type": "object", "description": "Recursive reference to node"})
        );
    }

    #[test]
    fn test_document_header() {
        let options = JsonSchemaOptions::new().id("urn:user").title("User");
        let doc = to_json_schema(&Ast::Boolean, &options);
        assert_eq!(
            doc,
            json!({
                "$schema": DRAFT_2020_12,
                "$id": "urn:user",
                "title": "User",
                "type": "boolean"
            })
        );
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["$schema", "$id", "title", "type"]);
    }

    #[test]
    fn test_no_schema_uri_without_id() {
        let doc = to_json_schema(&Ast::Null, &JsonSchemaOptions::new().title("Nothing"));
        assert!(doc.get("$schema").is_none());
    }
}
