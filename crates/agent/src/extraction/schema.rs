//! JSON Schemas for the blueprint
//!
//! Two schemas come out of the same field table: the descriptive one embedded
//! in the extraction prompt, and a stricter-where-it-matters validation schema
//! applied to whatever the model returns.

use serde_json::{json, Map, Value};

use upop_core::{FieldKind, BLUEPRINT_FIELDS};

/// Builder for flat object schemas
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property with an arbitrary sub-schema
    pub fn property(mut self, name: impl Into<String>, schema: Value, required: bool) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), schema);
        if required {
            self.required.push(name);
        }
        self
    }

    /// Add a `string` property with a description
    pub fn string(self, name: impl Into<String>, description: &str, required: bool) -> Self {
        self.property(
            name,
            json!({ "type": "string", "description": description }),
            required,
        )
    }

    /// Add an array-of-strings property with a description
    pub fn string_list(self, name: impl Into<String>, description: &str, required: bool) -> Self {
        self.property(
            name,
            json!({
                "type": "array",
                "items": { "type": "string" },
                "description": description,
            }),
            required,
        )
    }

    pub fn build(self) -> Value {
        json!({
            "type": "object",
            "properties": Value::Object(self.properties),
            "required": self.required,
        })
    }
}

/// Schema shown to the model: names, types, descriptions with examples
pub fn prompt_schema() -> Value {
    BLUEPRINT_FIELDS
        .iter()
        .fold(SchemaBuilder::new(), |builder, field| match field.kind {
            FieldKind::Text => builder.string(field.name, field.description, field.required),
            FieldKind::TextList => {
                builder.string_list(field.name, field.description, field.required)
            },
        })
        .build()
}

/// Schema the model output is checked against before normalization
///
/// Required fields must be strings with at least one non-whitespace
/// character. Optional fields accept any JSON value; the normalization pass
/// coerces them.
pub fn validation_schema() -> Value {
    BLUEPRINT_FIELDS
        .iter()
        .fold(SchemaBuilder::new(), |builder, field| {
            let schema = if field.required {
                json!({ "type": "string", "pattern": "\\S" })
            } else {
                json!({})
            };
            builder.property(field.name, schema, field.required)
        })
        .build()
}
