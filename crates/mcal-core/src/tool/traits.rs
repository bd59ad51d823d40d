//! Tool trait definition
//!
//! Defines the trait every operation exposed to the assistant implements.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::Result;

/// Tool execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Output string from tool execution (pretty-printed JSON for calendar tools)
    pub output: String,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }

    /// Create a successful result holding `value` as pretty-printed JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::success(serde_json::to_string_pretty(value)?))
    }
}

/// Tool trait
///
/// Implement this trait to expose an operation to the calling assistant.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name (as advertised in `tools/list`)
    fn name(&self) -> &str;

    /// Get the tool description (shown to the assistant when selecting tools)
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's input parameters
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given input
    ///
    /// # Arguments
    /// * `input` - JSON value containing the tool input parameters
    ///
    /// # Returns
    /// A `ToolResult` containing the output or error message. An `Err` is
    /// reserved for failures outside the tool's own domain (e.g. a worker
    /// thread that panicked).
    async fn execute(&self, input: JsonValue) -> Result<ToolResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::success("done");
        assert!(!ok.is_error);
        assert_eq!(ok.output, "done");

        let err = ToolResult::error("boom");
        assert!(err.is_error);
        assert_eq!(err.output, "boom");
    }

    #[test]
    fn test_tool_result_json_is_pretty() {
        let result = ToolResult::json(&json!({"a": 1})).unwrap();
        assert!(!result.is_error);
        assert_eq!(result.output, "{\n  \"a\": 1\n}");
    }
}
