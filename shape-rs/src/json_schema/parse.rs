//! JSON Schema -> AST.
//!
//! Keywords are tried in a fixed order and the first one present decides the
//! node: `oneOf`, `anyOf`, `const`, `enum`, `$ref` (rejected), then `type`.

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::ast::Ast;
use crate::constraints::{ArrayConstraints, NumericConstraints, StringConstraints};
use crate::error::{SchemaError, SchemaResult};
use crate::types::ExtraKeys;
use crate::value::Value;

/// Convert a JSON Schema document into an [`Ast`].
///
/// Unsupported shapes (`$ref`, boolean schemas, unknown `type` values,
/// discriminated unions without a single discriminator field) fail with
/// [`SchemaError::UnsupportedSchema`].
pub fn from_json_schema(schema: &Json) -> SchemaResult<Ast> {
    let ast = parse(schema)?;
    debug!(kind = %ast.kind(), "parsed json schema");
    Ok(ast)
}

fn parse(schema: &Json) -> SchemaResult<Ast> {
    let Json::Object(obj) = schema else {
        return Err(SchemaError::unsupported(format!(
            "expected a schema object, got {}",
            schema
        )));
    };

    if let Some(alternatives) = obj.get("oneOf") {
        return parse_one_of(alternatives);
    }
    if let Some(members) = obj.get("anyOf") {
        return Ok(Ast::Union {
            members: parse_list(members, "anyOf")?,
        });
    }
    if let Some(value) = obj.get("const") {
        return Ok(Ast::Literal {
            values: vec![Value::from(value.clone())],
        });
    }
    if let Some(values) = obj.get("enum") {
        return parse_enum(values);
    }
    if obj.contains_key("$ref") {
        return Err(SchemaError::unsupported("$ref is not supported"));
    }

    match obj.get("type") {
        Some(Json::String(ty)) => parse_typed(ty, obj),
        Some(Json::Array(types)) => parse_nullable(types, obj),
        Some(other) => Err(SchemaError::unsupported(format!(
            "unsupported type {}",
            other
        ))),
        None => Err(SchemaError::unsupported("schema has no type")),
    }
}

fn parse_list(value: &Json, keyword: &str) -> SchemaResult<Vec<Ast>> {
    match value {
        Json::Array(items) => items.iter().map(parse).collect(),
        _ => Err(SchemaError::unsupported(format!(
            "'{}' must be an array",
            keyword
        ))),
    }
}

fn parse_enum(values: &Json) -> SchemaResult<Ast> {
    match values {
        Json::Array(values) if !values.is_empty() => Ok(Ast::Literal {
            values: values.iter().cloned().map(Value::from).collect(),
        }),
        _ => Err(SchemaError::unsupported("'enum' must be a non-empty array")),
    }
}

/// `type: [T, "null"]` expands to a union of T and null.
fn parse_nullable(types: &[Json], obj: &Map<String, Json>) -> SchemaResult<Ast> {
    let names: Vec<&str> = types.iter().filter_map(Json::as_str).collect();
    let non_null: Vec<&str> = names.iter().copied().filter(|t| *t != "null").collect();
    match (names.len() == types.len(), names.len(), non_null.as_slice()) {
        (true, 2, [ty]) => Ok(Ast::Union {
            members: vec![parse_typed(ty, obj)?, Ast::Null],
        }),
        _ => Err(SchemaError::unsupported(format!(
            "unsupported type {}",
            Json::Array(types.to_vec())
        ))),
    }
}

fn parse_typed(ty: &str, obj: &Map<String, Json>) -> SchemaResult<Ast> {
    match ty {
        "string" => Ok(Ast::String {
            constraints: StringConstraints {
                min: usize_of(obj, "minLength"),
                max: usize_of(obj, "maxLength"),
                format: obj
                    .get("pattern")
                    .and_then(Json::as_str)
                    .map(str::to_string),
            },
        }),
        "number" => Ok(Ast::Number {
            constraints: numeric(obj),
        }),
        "integer" => Ok(Ast::Integer {
            constraints: numeric(obj),
        }),
        "boolean" => Ok(Ast::Boolean),
        "null" => Ok(Ast::Null),
        "array" => parse_array(obj),
        "object" => parse_object(obj),
        other => Err(SchemaError::unsupported(format!(
            "unsupported type \"{}\"",
            other
        ))),
    }
}

fn parse_array(obj: &Map<String, Json>) -> SchemaResult<Ast> {
    if let Some(prefix) = obj.get("prefixItems") {
        return Ok(Ast::Tuple {
            elements: parse_list(prefix, "prefixItems")?,
        });
    }

    let item_type = match obj.get("items") {
        Some(items) => parse(items)?,
        None => {
            warn!("array schema without 'items', assuming string items");
            Ast::string()
        }
    };
    Ok(Ast::Array {
        item_type: Box::new(item_type),
        constraints: ArrayConstraints {
            min: usize_of(obj, "minItems"),
            max: usize_of(obj, "maxItems"),
            length: None,
            unique: obj.get("uniqueItems").and_then(Json::as_bool).unwrap_or(false),
        },
    })
}

fn parse_object(obj: &Map<String, Json>) -> SchemaResult<Ast> {
    let additional = obj.get("additionalProperties");
    let properties = obj.get("properties").and_then(Json::as_object);

    match (properties, additional) {
        (None, Some(Json::Bool(true))) => {
            warn!("'additionalProperties: true' without a schema, assuming string values");
            Ok(record(Ast::string()))
        }
        (None, Some(value @ Json::Object(_))) => Ok(record(parse(value)?)),
        (properties, additional) => {
            let required: Vec<&str> = obj
                .get("required")
                .and_then(Json::as_array)
                .map(|names| names.iter().filter_map(Json::as_str).collect())
                .unwrap_or_default();
            let extra_keys = match additional {
                None | Some(Json::Bool(false)) => ExtraKeys::Reject,
                Some(_) => ExtraKeys::Allow,
            };
            parse_struct(properties, &required, extra_keys)
        }
    }
}

fn record(value_type: Ast) -> Ast {
    Ast::Record {
        key_type: Box::new(Ast::string()),
        value_type: Box::new(value_type),
    }
}

/// A property outside `required` becomes an optional node, carrying
/// `default` when the property schema has one.
fn parse_struct(
    properties: Option<&Map<String, Json>>,
    required: &[&str],
    extra_keys: ExtraKeys,
) -> SchemaResult<Ast> {
    let mut fields = IndexMap::new();
    let mut required_fields = Vec::new();

    for (name, schema) in properties.into_iter().flatten() {
        let field = parse(schema)?;
        if required.contains(&name.as_str()) {
            required_fields.push(name.clone());
            fields.insert(name.clone(), field);
        } else {
            let default_value = schema.get("default").cloned().map(Value::from);
            fields.insert(
                name.clone(),
                Ast::Optional {
                    inner_type: Box::new(field),
                    default_value,
                },
            );
        }
    }

    Ok(Ast::Struct {
        fields,
        required: required_fields,
        extra_keys,
    })
}

/// `oneOf` becomes a discriminated union. Each alternative must be a struct;
/// its tag is the value of the first property carrying a `const`, and every
/// such property must have the same name.
fn parse_one_of(alternatives: &Json) -> SchemaResult<Ast> {
    let variants = parse_list(alternatives, "oneOf")?;

    let mut discriminator: Option<String> = None;
    let mut tags = Vec::with_capacity(variants.len());
    for (i, variant) in variants.iter().enumerate() {
        let Ast::Struct { fields, .. } = variant else {
            return Err(SchemaError::unsupported(format!(
                "oneOf alternative {} is not an object schema",
                i
            )));
        };
        let tagged = fields.iter().find_map(|(name, field)| match field {
            Ast::Literal { values } if values.len() == 1 => Some((name, values[0].to_key())),
            _ => None,
        });
        if let Some((name, _)) = &tagged {
            if let Some(expected) = &discriminator {
                if expected != *name {
                    return Err(SchemaError::unsupported(format!(
                        "oneOf alternatives disagree on the discriminator field: '{}' and '{}'",
                        expected, name
                    )));
                }
            } else {
                discriminator = Some((*name).clone());
            }
        }
        tags.push(tagged.map(|(_, tag)| tag));
    }

    let Some(discriminator) = discriminator else {
        return Err(SchemaError::unsupported(
            "oneOf alternatives have no const-valued discriminator property",
        ));
    };

    let mut map = IndexMap::with_capacity(variants.len());
    for (i, (variant, tag)) in variants.into_iter().zip(tags).enumerate() {
        let (tag, variant) = match tag {
            Some(tag) => (tag, variant),
            None => {
                let tag = format!("variant_{}", i);
                warn!(tag = %tag, "oneOf alternative without a discriminator, using positional tag");
                (tag.clone(), with_tag(variant, &discriminator, tag))
            }
        };
        if map.insert(tag.clone(), variant).is_some() {
            return Err(SchemaError::invalid_variant(tag, "duplicate tag"));
        }
    }

    Ok(Ast::DiscriminatedUnion {
        discriminator,
        variants: map,
    })
}

/// Add the discriminator field to an alternative that lacks it.
fn with_tag(variant: Ast, discriminator: &str, tag: String) -> Ast {
    match variant {
        Ast::Struct {
            mut fields,
            mut required,
            extra_keys,
        } => {
            fields.insert(
                discriminator.to_string(),
                Ast::Literal {
                    values: vec![Value::String(tag)],
                },
            );
            if !required.iter().any(|r| r == discriminator) {
                required.push(discriminator.to_string());
            }
            Ast::Struct {
                fields,
                required,
                extra_keys,
            }
        }
        other => other,
    }
}

fn usize_of(obj: &Map<String, Json>, key: &str) -> Option<usize> {
    obj.get(key)
        .and_then(Json::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

fn numeric(obj: &Map<String, Json>) -> NumericConstraints {
    let number = |key: &str| obj.get(key).and_then(Json::as_number).cloned();
    NumericConstraints {
        min: number("minimum"),
        max: number("maximum"),
        greater_than: number("exclusiveMinimum"),
        less_than: number("exclusiveMaximum"),
        multiple_of: number("multipleOf"),
    }
}
