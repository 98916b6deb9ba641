//! Unions: ordered trial and discriminator dispatch.

use indexmap::IndexMap;
use tracing::trace;

use super::{Context, Type, TypeNode};
use crate::error::{
    DecodeResult, SchemaError, SchemaResult, ValidationError, ValidationErrorKind,
};
use crate::value::Value;

// =============================================================================
// Union
// =============================================================================

/// Alternatives tried in declaration order; the first success wins.
#[derive(Debug, Clone)]
pub struct UnionType {
    members: Vec<Type>,
}

impl UnionType {
    pub fn new(members: impl IntoIterator<Item = Type>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    pub fn members(&self) -> &[Type] {
        &self.members
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let mut failures = Vec::with_capacity(self.members.len());
        for (i, member) in self.members.iter().enumerate() {
            match member.decode_in(value, cx) {
                Ok(decoded) => {
                    trace!(member = i, kind = %member.kind(), "union member matched");
                    return Ok(decoded);
                }
                Err(e) => failures.push(e),
            }
        }
        Err(ValidationError::new(ValidationErrorKind::AggregateUnion(
            failures,
        )))
    }

    /// Encode with the first member that accepts the encoded form.
    pub(crate) fn encode_value(&self, value: &Value, depth: usize) -> Value {
        self.members
            .iter()
            .find_map(|member| {
                let encoded = member.encode_in(value, depth);
                member.validate(&encoded).is_ok().then_some(encoded)
            })
            .unwrap_or_else(|| value.clone())
    }
}

// =============================================================================
// Discriminated union
// =============================================================================

/// Struct variants selected by the literal value of one field.
#[derive(Debug, Clone)]
pub struct DiscriminatedUnionType {
    discriminator: String,
    variants: IndexMap<String, Type>,
}

impl DiscriminatedUnionType {
    /// Every variant must be a struct whose discriminator field is a literal
    /// holding exactly its tag.
    pub fn new<I, K>(discriminator: impl Into<String>, variants: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        let discriminator = discriminator.into();
        let mut map = IndexMap::new();
        for (tag, variant) in variants {
            let tag = tag.into();
            check_variant(&discriminator, &tag, &variant)?;
            if map.insert(tag.clone(), variant).is_some() {
                return Err(SchemaError::invalid_variant(tag, "duplicate tag"));
            }
        }
        if map.is_empty() {
            return Err(SchemaError::unsupported(
                "discriminated union needs at least one variant",
            ));
        }
        Ok(Self {
            discriminator,
            variants: map,
        })
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn variants(&self) -> &IndexMap<String, Type> {
        &self.variants
    }

    pub(crate) fn decode_value(&self, value: &Value, cx: &mut Context<'_>) -> DecodeResult {
        let Value::Object(input) = value else {
            return Err(ValidationError::type_mismatch("object", value));
        };
        let Some(tag) = input.get(&self.discriminator) else {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingDiscriminator {
                    field: self.discriminator.clone(),
                },
            ));
        };

        let tag = tag.to_key();
        match self.variants.get(&tag) {
            Some(variant) => {
                trace!(tag = %tag, "discriminated union dispatch");
                variant.decode_in(value, cx)
            }
            None => Err(ValidationError::new(
                ValidationErrorKind::UnknownDiscriminator {
                    field: self.discriminator.clone(),
                    value: tag,
                    valid: self.variants.keys().cloned().collect(),
                },
            )),
        }
    }

    pub(crate) fn encode_value(&self, value: &Value, depth: usize) -> Value {
        value
            .get(&self.discriminator)
            .and_then(|tag| self.variants.get(&tag.to_key()))
            .map_or_else(|| value.clone(), |variant| variant.encode_in(value, depth))
    }
}

fn check_variant(discriminator: &str, tag: &str, variant: &Type) -> SchemaResult<()> {
    let TypeNode::Struct(fields) = variant.node() else {
        return Err(SchemaError::invalid_variant(
            tag,
            format!("expected a struct, got {}", variant.kind()),
        ));
    };
    let Some(field) = fields.field(discriminator) else {
        return Err(SchemaError::invalid_variant(
            tag,
            format!("missing discriminator field '{}'", discriminator),
        ));
    };
    // Compared by key, as dispatch is: a `1` literal is variant "1".
    match field.node() {
        TypeNode::Literal(lit) if matches!(lit.values(), [only] if only.to_key() == tag) => Ok(()),
        TypeNode::Literal(_) => Err(SchemaError::invalid_variant(
            tag,
            format!("field '{}' must be the single literal '{}'", discriminator, tag),
        )),
        other => Err(SchemaError::invalid_variant(
            tag,
            format!(
                "field '{}' must be a literal, got {}",
                discriminator,
                other.kind()
            ),
        )),
    }
}
