//! Error types for the n8n workflow MCP server
//!
//! This module defines the error hierarchy for all operations in the server.

use serde_json::Value;
use thiserror::Error;

/// Main error type for the n8n workflow MCP server
#[derive(Error, Debug)]
pub enum WorkflowMcpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// Remote workflow store errors
    #[error("n8n API error: {0}")]
    Store(#[from] StoreError),

    /// Patch application errors
    #[error("Patch application failed: {0}")]
    Patch(#[from] PatchError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Unsupported method: {method}")]
    UnsupportedMethod { method: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },
}

/// Failures talking to the remote workflow store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: Value },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid store configuration: {message}")]
    InvalidClient { message: String },
}

/// Patch errors, tagged with the index of the operation that failed
#[derive(Error, Debug, Clone, PartialEq)]
#[error("operation {index}: {kind}")]
pub struct PatchError {
    pub index: usize,
    pub kind: PatchErrorKind,
}

/// The precondition a patch operation violated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchErrorKind {
    #[error("invalid pointer '{pointer}'")]
    InvalidPointer { pointer: String },

    #[error("path not found: {pointer}")]
    PathNotFound { pointer: String },

    #[error("array index out of bounds at {pointer}")]
    IndexOutOfBounds { pointer: String },

    #[error("invalid array index '{token}' at {pointer}")]
    InvalidIndex { pointer: String, token: String },

    #[error("test failed at {pointer}")]
    TestFailed { pointer: String },

    #[error("cannot move {from} into its own child {pointer}")]
    MoveIntoChild { from: String, pointer: String },

    #[error("cannot remove the document root")]
    RemoveRoot,
}

impl PatchErrorKind {
    /// Attach the index of the failing operation
    pub fn at(self, index: usize) -> PatchError {
        PatchError { index, kind: self }
    }
}

impl WorkflowMcpError {
    /// Structured detail for the JSON-RPC `error.data` field, where available
    pub fn data(&self) -> Option<Value> {
        match self {
            WorkflowMcpError::Store(StoreError::Status { status, body }) => Some(
                serde_json::json!({ "status": status, "body": body }),
            ),
            WorkflowMcpError::Patch(err) => Some(serde_json::json!({ "operation": err.index })),
            _ => None,
        }
    }
}

/// Result type alias for workflow MCP operations
pub type Result<T> = std::result::Result<T, WorkflowMcpError>;
