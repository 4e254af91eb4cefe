//! n8n API module
//!
//! Client for the n8n public REST API workflow resource.

pub mod client;
