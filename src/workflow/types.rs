//! Workflow editing types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::workflow::patch::PatchOperation;

/// Domain error code returned when a workflow is not in the allowlist
pub const NOT_ALLOWED: &str = "NOT_ALLOWED";

/// How an edit is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Fetch and return the current document, never write
    DryRun,
    /// Apply the patch and write the result back
    Apply,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::DryRun => "dry_run",
            EditMode::Apply => "apply",
        }
    }
}

/// Arguments of the `edit_workflow` tool
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditWorkflowArgs {
    #[validate(length(min = 1, message = "workflowId must not be empty"))]
    pub workflow_id: String,

    pub mode: EditMode,

    pub patch: Vec<PatchOperation>,
}

/// Outcome of an edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    pub ok: bool,

    pub workflow_id: String,

    pub applied: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl EditResult {
    /// The workflow is not in the allowlist
    pub fn not_allowed(workflow_id: impl Into<String>) -> Self {
        let workflow_id = workflow_id.into();
        Self {
            ok: false,
            details: Some(json!({ "workflowId": workflow_id })),
            workflow_id,
            applied: false,
            workflow: None,
            error: Some(NOT_ALLOWED.to_string()),
        }
    }

    /// The document as fetched, untouched
    pub fn dry_run(workflow_id: impl Into<String>, workflow: Value) -> Self {
        Self {
            ok: true,
            workflow_id: workflow_id.into(),
            applied: false,
            workflow: Some(workflow),
            error: None,
            details: None,
        }
    }

    /// The patched document after it was written back
    pub fn applied(workflow_id: impl Into<String>, workflow: Value) -> Self {
        Self {
            ok: true,
            workflow_id: workflow_id.into(),
            applied: true,
            workflow: Some(workflow),
            error: None,
            details: None,
        }
    }
}
