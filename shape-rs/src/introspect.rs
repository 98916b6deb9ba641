//! Type tree -> AST.

use tracing::trace;

use crate::ast::Ast;
use crate::types::{LazyType, Type, TypeNode};

impl Type {
    /// Describe this type as a serializable [`Ast`].
    ///
    /// Lazy nodes are resolved and inlined. When a lazy node points back to a
    /// node that is still being converted, an [`Ast::Lazy`] stub naming the
    /// target's kind and its distance up the tree is emitted instead, so
    /// recursive schemas terminate.
    pub fn to_ast(&self) -> Ast {
        Introspector::default().visit(self)
    }
}

#[derive(Default)]
struct Introspector {
    /// Nodes currently being converted, outermost first. Each one is an
    /// AST node in the output, so positions here are AST ancestor depths.
    in_progress: Vec<Type>,
}

impl Introspector {
    fn visit(&mut self, ty: &Type) -> Ast {
        if let TypeNode::Lazy(t) = ty.node() {
            return self.visit_lazy(t);
        }
        self.in_progress.push(ty.clone());
        let ast = self.convert(ty);
        self.in_progress.pop();
        ast
    }

    /// Lazy nodes have no AST node of their own: the target is inlined, or
    /// referenced by distance when it is already on the stack.
    fn visit_lazy(&mut self, lazy: &LazyType) -> Ast {
        let target = lazy.resolve();
        match self.in_progress.iter().rposition(|t| t.ptr_eq(target)) {
            Some(position) => {
                let ref_depth = self.in_progress.len() - position;
                trace!(
                    name = lazy.name(),
                    kind = %target.kind(),
                    ref_depth,
                    "recursive reference"
                );
                Ast::Lazy {
                    name: lazy.name().to_string(),
                    ref_type: target.kind(),
                    ref_depth: Some(ref_depth),
                }
            }
            None => self.visit(target),
        }
    }

    fn convert(&mut self, ty: &Type) -> Ast {
        match ty.node() {
            TypeNode::String(t) => Ast::String {
                constraints: t.constraints().clone(),
            },
            TypeNode::Number(t) => Ast::Number {
                constraints: t.constraints().clone(),
            },
            TypeNode::Integer(t) => Ast::Integer {
                constraints: t.constraints().clone(),
            },
            TypeNode::Boolean => Ast::Boolean,
            TypeNode::Null => Ast::Null,
            TypeNode::Symbol => Ast::Symbol,
            TypeNode::Literal(t) => Ast::Literal {
                values: t.values().to_vec(),
            },
            TypeNode::Array(t) => Ast::Array {
                item_type: Box::new(self.visit(t.item())),
                constraints: t.constraints().clone(),
            },
            TypeNode::Tuple(t) => Ast::Tuple {
                elements: t.elements().iter().map(|e| self.visit(e)).collect(),
            },
            TypeNode::Struct(t) => Ast::Struct {
                fields: t
                    .fields()
                    .iter()
                    .map(|(name, field)| (name.clone(), self.visit(field)))
                    .collect(),
                required: t.required(),
                extra_keys: t.policy(),
            },
            TypeNode::Record(t) => Ast::Record {
                key_type: Box::new(self.visit(t.key())),
                value_type: Box::new(self.visit(t.value())),
            },
            TypeNode::Union(t) => Ast::Union {
                members: t.members().iter().map(|m| self.visit(m)).collect(),
            },
            TypeNode::DiscriminatedUnion(t) => Ast::DiscriminatedUnion {
                discriminator: t.discriminator().to_string(),
                variants: t
                    .variants()
                    .iter()
                    .map(|(tag, variant)| (tag.clone(), self.visit(variant)))
                    .collect(),
            },
            TypeNode::Optional(t) => Ast::Optional {
                inner_type: Box::new(self.visit(t.inner())),
                default_value: t.default().map(|d| t.inner().encode(d)),
            },
            TypeNode::Transform(t) => Ast::Transform {
                inner_type: Box::new(self.visit(t.inner())),
                target: t.target().to_string(),
            },
            TypeNode::Lazy(t) => self.visit_lazy(t),
        }
    }
}
