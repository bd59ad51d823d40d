//! Error types for mcal-core

use thiserror::Error;

/// Main error type for mcal-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("MCP error: {0}")]
    Mcp(String),
}

/// Result type alias for mcal-core
pub type Result<T> = std::result::Result<T, Error>;
