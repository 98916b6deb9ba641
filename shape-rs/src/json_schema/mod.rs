//! JSON Schema (draft 2020-12) codec for [`Ast`](crate::Ast) values.
//!
//! Generation is total: every AST has exactly one JSON Schema form. Parsing is
//! partial, because JSON Schema cannot say everything an AST can. The known
//! losses:
//!
//! | AST feature | After a round trip |
//! |-------------|--------------------|
//! | discriminated union | discriminator inferred from the first `const` property |
//! | record key type | always `string` |
//! | transform | its inner type |
//! | lazy stub | a primitive schema with a description |
//! | symbol | `string` |
//! | array `length` | `min` and `max` |
//! | struct `include` policy | `allow` |

mod generate;
mod parse;

pub use generate::{to_json_schema, JsonSchemaMapper};
pub use parse::from_json_schema;

/// The `$schema` URI attached when an `$id` is given.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Top-level metadata for a generated document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonSchemaOptions {
    /// `$id`; when set the document also carries `$schema`
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl JsonSchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
