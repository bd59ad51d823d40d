//! MCP server handler
//!
//! rmcpのServerHandlerとしてToolManagerをラップし、
//! tools/list と tools/call をツール定義・実行に変換します。

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    model::*,
    service::{RequestContext, RoleServer},
    transport::stdio,
};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use mcal_core::{Error, Result, ToolDefinition, ToolManager};

const INSTRUCTIONS: &str = "Read-only access to the local calendars and reminders. \
Use 'get_calendar_events' (alias 'get_events') for events in a date range with attendee, RSVP, \
all-day and busy filters, 'get_reminders' for reminders due in a range, 'search' for text across both, \
'get_today_summary' for today at a glance and 'list_calendars' for calendar names. \
'get_current_time', 'convert_time' and 'list_timezones' answer timezone questions. \
Dates are YYYY-MM-DD; responses use ISO 8601 datetimes with offsets.";

/// MCP server exposing the registered tools
#[derive(Clone)]
pub struct CalendarMcpServer {
    tools: Arc<ToolManager>,
    name: String,
}

impl CalendarMcpServer {
    pub fn new(tools: ToolManager, name: impl Into<String>) -> Self {
        Self {
            tools: Arc::new(tools),
            name: name.into(),
        }
    }

    /// Server name advertised during initialization
    pub fn name(&self) -> &str {
        &self.name
    }

    fn to_mcp_tool(definition: ToolDefinition) -> Tool {
        let schema = match definition.input_schema {
            JsonValue::Object(map) => map,
            _ => JsonObject::new(),
        };
        Tool::new(definition.name, definition.description, Arc::new(schema))
    }
}

impl ServerHandler for CalendarMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = self.name.clone();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        let tools: Vec<Tool> = self
            .tools
            .definitions()
            .into_iter()
            .map(Self::to_mcp_tool)
            .collect();
        debug!(count = tools.len(), "Listing tools");
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let name = request.name.to_string();
        if !self.tools.contains(&name) {
            return Err(McpError::invalid_params(format!("Unknown tool: {}", name), None));
        }

        let input = request
            .arguments
            .map(JsonValue::Object)
            .unwrap_or(JsonValue::Null);

        info!(tool = %name, "Calling tool");
        let result = self
            .tools
            .execute(&name, input)
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let content = vec![Content::text(result.output)];
        Ok(if result.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        })
    }
}

/// Serve over stdin/stdout until the peer disconnects
pub async fn serve_stdio(server: CalendarMcpServer) -> Result<()> {
    info!(name = %server.name(), "Starting MCP server on stdio");

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| Error::Mcp(format!("Failed to start MCP server: {}", e)))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| Error::Mcp(format!("MCP server task failed: {}", e)))?;

    info!(?reason, "MCP session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mcal_calendar::{AccessGuard, CalendarService, CalendarZone, MemoryStore};
    use rmcp::model::RawContent;
    use serde_json::json;

    fn server() -> CalendarMcpServer {
        let guard = AccessGuard::new(Arc::new(MemoryStore::new()), Duration::from_secs(1));
        let service = Arc::new(CalendarService::new(guard, CalendarZone::parse("UTC").unwrap()));

        let mut tools = ToolManager::new();
        mcal_tools::register_default_tools(&mut tools, service);
        CalendarMcpServer::new(tools, "mac-calendar-mcp-test")
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn arguments(value: JsonValue) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[test]
    fn test_server_info() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "mac-calendar-mcp-test");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("get_calendar_events"));
    }

    #[test]
    fn test_non_object_schema_becomes_empty() {
        let tool = CalendarMcpServer::to_mcp_tool(ToolDefinition::new("x", "y", JsonValue::Null));
        assert!(tool.input_schema.is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_over_duplex() {
        let (server_end, client_end) = tokio::io::duplex(4096);
        let server = server();
        tokio::spawn(async move {
            if let Ok(service) = server.serve(server_end).await {
                let _ = service.waiting().await;
            }
        });

        let client = ().serve(client_end).await.unwrap();

        let listed = client.list_tools(Default::default()).await.unwrap();
        let names: Vec<String> = listed.tools.iter().map(|t| t.name.to_string()).collect();
        assert!(names.contains(&"get_calendar_events".to_string()));
        assert!(names.contains(&"get_events".to_string()));
        let search = listed.tools.iter().find(|t| t.name == "search").unwrap();
        assert_eq!(search.input_schema["required"], json!(["query"]));

        let result = client
            .call_tool(CallToolRequestParams {
                meta: None,
                name: "convert_time".into(),
                arguments: arguments(json!({
                    "datetime_str": "2026-01-15T12:00:00",
                    "from_timezone": "UTC",
                    "to_timezone": "Asia/Tokyo"
                })),
                task: None,
            })
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        let value: JsonValue = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(value["converted_datetime"], "2026-01-15T21:00:00+09:00");

        let result = client
            .call_tool(CallToolRequestParams {
                meta: None,
                name: "get_current_time".into(),
                arguments: arguments(json!({"timezone": "Mars/Olympus"})),
                task: None,
            })
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        let value: JsonValue = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(value["error"]["kind"], "UnknownTimezone");

        let unknown = client
            .call_tool(CallToolRequestParams {
                meta: None,
                name: "create_event".into(),
                arguments: None,
                task: None,
            })
            .await;
        assert!(unknown.is_err());

        let _ = client.cancel().await;
    }
}
