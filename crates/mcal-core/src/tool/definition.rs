//! Tool definition helpers
//!
//! `ToolDefinition` is the advertised shape of a tool; `SchemaBuilder`
//! builds the JSON Schema fragments the calendar tools share.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

/// Tool definition as advertised to the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON schema for input parameters
    pub input_schema: JsonValue,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: JsonValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Helper functions for creating tool schemas
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Create an object schema from fully specified property schemas
    ///
    /// # Arguments
    /// * `properties` - A list of tuples (name, property schema, required)
    ///
    /// # Example
    /// ```ignore
    /// let schema = SchemaBuilder::object(vec![
    ///     ("query", SchemaBuilder::string("Text to search for"), true),
    ///     ("days_ahead", SchemaBuilder::integer("Days to look ahead", Some(7)), false),
    /// ]);
    /// ```
    pub fn object(properties: Vec<(&str, JsonValue, bool)>) -> JsonValue {
        let required: Vec<&str> = properties
            .iter()
            .filter(|(_, _, required)| *required)
            .map(|(name, _, _)| *name)
            .collect();

        let props: Map<String, JsonValue> = properties
            .into_iter()
            .map(|(name, schema, _)| (name.to_string(), schema))
            .collect();

        json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }

    /// Object schema for tools that take no parameters
    pub fn empty_object() -> JsonValue {
        Self::object(Vec::new())
    }

    /// String property
    pub fn string(description: &str) -> JsonValue {
        json!({"type": "string", "description": description})
    }

    /// String property with a default value
    pub fn string_with_default(description: &str, default: &str) -> JsonValue {
        json!({"type": "string", "description": description, "default": default})
    }

    /// Integer property, optionally with a default
    pub fn integer(description: &str, default: Option<i64>) -> JsonValue {
        let mut schema = json!({"type": "integer", "description": description});
        if let Some(default) = default {
            schema["default"] = json!(default);
        }
        schema
    }

    /// Boolean property with a default
    pub fn boolean(description: &str, default: bool) -> JsonValue {
        json!({"type": "boolean", "description": description, "default": default})
    }

    /// Array-of-strings property
    pub fn string_array(description: &str) -> JsonValue {
        json!({
            "type": "array",
            "items": {"type": "string"},
            "description": description
        })
    }

    /// Create a string enum schema
    ///
    /// # Arguments
    /// * `enum_values` - List of allowed string values
    pub fn string_enum(enum_values: Vec<&str>) -> JsonValue {
        json!({
            "type": "string",
            "enum": enum_values
        })
    }

    /// Array whose items are restricted to `enum_values`
    pub fn enum_array(description: &str, enum_values: Vec<&str>) -> JsonValue {
        json!({
            "type": "array",
            "items": Self::string_enum(enum_values),
            "description": description
        })
    }
}
