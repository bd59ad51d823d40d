//! mcal-mcp: MCP (Model Context Protocol) server
//!
//! ToolManager に登録されたツールを rmcp の stdio トランスポートで公開します。

pub mod server;

pub use server::{CalendarMcpServer, serve_stdio};
