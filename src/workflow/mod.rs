//! Workflow editing
//!
//! Allowlist enforcement, patch application and the read-patch-write cycle
//! against a [`store::WorkflowStore`].

pub mod editor;
pub mod patch;
pub mod store;
pub mod types;
