//! n8n Workflow MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing a single `edit_workflow`
//! tool that applies JSON Patches to allowlisted n8n workflows.

pub mod config;
pub mod error;
pub mod mcp;
pub mod n8n;
pub mod workflow;

pub use config::Config;
pub use error::{Result, WorkflowMcpError};
