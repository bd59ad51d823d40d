//! mcal-core: mac-calendar-mcp core library
//!
//! 設定の読み込み、エラー型、ツールシステム (Tool trait / ToolManager) を提供します。

pub mod config;
pub mod error;
pub mod tool;

pub use config::{Config, DefaultsConfig, ServerConfig, StoreBackend, StoreConfig};
pub use error::{Error, Result};
pub use tool::{SchemaBuilder, Tool, ToolDefinition, ToolManager, ToolResult};
