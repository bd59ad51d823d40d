//! Tool system
//!
//! Each calendar/time operation is a `Tool`; the `ToolManager` is the
//! registry the MCP handler dispatches through.

pub mod definition;
pub mod manager;
pub mod traits;

pub use definition::{SchemaBuilder, ToolDefinition};
pub use manager::ToolManager;
pub use traits::{Tool, ToolResult};
