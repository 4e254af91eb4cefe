//! MCP Tool definitions and handlers
//!
//! Tools are registered by name; the dispatcher only ever talks to the
//! [`ToolRegistry`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use validator::Validate;

use crate::error::{McpError, Result};
use crate::mcp::types::{CallToolResult, Tool};
use crate::workflow::editor::WorkflowEditor;
use crate::workflow::types::EditWorkflowArgs;

/// Name of the workflow editing tool
pub const EDIT_WORKFLOW: &str = "edit_workflow";

/// A callable tool
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Definition advertised by `tools/list`
    fn definition(&self) -> Tool;

    /// Run the tool with raw JSON arguments
    async fn invoke(&self, arguments: Value) -> Result<CallToolResult>;
}

/// Name → handler table
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the name in its definition
    pub fn register(&mut self, tool: Arc<dyn ToolHandler>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    /// Registry holding only `edit_workflow`
    pub fn with_editor(editor: Arc<WorkflowEditor>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EditWorkflowTool::new(editor)));
        registry
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let tool = self.tools.get(name).ok_or_else(|| McpError::UnknownTool {
            name: name.to_string(),
        })?;
        tool.invoke(arguments).await
    }
}

/// Edits an allowlisted n8n workflow with a JSON Patch
pub struct EditWorkflowTool {
    editor: Arc<WorkflowEditor>,
}

impl EditWorkflowTool {
    pub fn new(editor: Arc<WorkflowEditor>) -> Self {
        Self { editor }
    }
}

#[async_trait]
impl ToolHandler for EditWorkflowTool {
    fn definition(&self) -> Tool {
        Tool {
            name: EDIT_WORKFLOW.to_string(),
            description: "Edit an allowlisted n8n workflow by applying an RFC 6902 JSON Patch. \
                Use mode \"dry_run\" to fetch the current workflow without changing it, \
                and \"apply\" to patch it and save the result."
                .to_string(),
            input_schema: edit_workflow_schema(),
        }
    }

    async fn invoke(&self, arguments: Value) -> Result<CallToolResult> {
        let args: EditWorkflowArgs =
            serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
                message: e.to_string(),
            })?;
        args.validate().map_err(|e| McpError::InvalidArguments {
            message: e.to_string(),
        })?;

        let result = self
            .editor
            .edit(&args.workflow_id, args.mode, &args.patch)
            .await?;

        Ok(CallToolResult::json(&result)?)
    }
}

// ==================== Tool Schemas ====================

fn edit_workflow_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "workflowId": {
                "type": "string",
                "description": "ID of the n8n workflow to edit (must be allowlisted)"
            },
            "mode": {
                "type": "string",
                "enum": ["dry_run", "apply"],
                "description": "dry_run returns the current workflow unchanged; apply patches and saves it"
            },
            "patch": {
                "type": "array",
                "description": "RFC 6902 JSON Patch operations, applied in order",
                "items": {
                    "type": "object",
                    "properties": {
                        "op": {
                            "type": "string",
                            "enum": ["add", "remove", "replace", "move", "copy", "test"]
                        },
                        "path": {
                            "type": "string",
                            "description": "JSON Pointer into the workflow"
                        },
                        "from": {
                            "type": "string",
                            "description": "Source pointer for move and copy"
                        },
                        "value": {
                            "description": "Value for add, replace and test"
                        }
                    },
                    "required": ["op", "path"]
                }
            }
        },
        "required": ["workflowId", "mode", "patch"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Allowlist;
    use crate::error::WorkflowMcpError;
    use crate::mcp::types::ToolResultContent;
    use crate::workflow::editor::tests::{RecordingStore, StoreCall};

    fn registry(store: Arc<RecordingStore>) -> ToolRegistry {
        let editor = WorkflowEditor::new(store, Allowlist::parse("wf1").unwrap());
        ToolRegistry::with_editor(Arc::new(editor))
    }

    fn text(result: &CallToolResult) -> Value {
        let ToolResultContent::Text { text } = &result.content[0];
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_single_tool_listed() {
        let registry = registry(Arc::new(RecordingStore::default()));
        let tools = registry.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, EDIT_WORKFLOW);
        assert_eq!(
            tools[0].input_schema["required"],
            json!(["workflowId", "mode", "patch"])
        );
        assert_eq!(
            tools[0].input_schema["properties"]["mode"]["enum"],
            json!(["dry_run", "apply"])
        );
        assert_eq!(
            tools[0].input_schema["properties"]["patch"]["items"]["required"],
            json!(["op", "path"])
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = registry(Arc::new(RecordingStore::default()));
        let err = registry
            .call_tool("not_a_real_tool", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowMcpError::Mcp(McpError::UnknownTool { .. })
        ));
        assert!(err.to_string().contains("not_a_real_tool"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_before_editor() {
        let store = Arc::new(RecordingStore::with("wf1", json!({})));
        let registry = registry(store.clone());

        for args in [
            json!({"workflowId": "wf1", "mode": "apply"}),
            json!({"workflowId": "wf1", "mode": "later", "patch": []}),
            json!({"workflowId": "", "mode": "apply", "patch": []}),
            json!({"workflowId": "wf1", "mode": "apply", "patch": [{"op": "move", "path": "/a"}]}),
        ] {
            let err = registry.call_tool(EDIT_WORKFLOW, args).await.unwrap_err();
            assert!(matches!(
                err,
                WorkflowMcpError::Mcp(McpError::InvalidArguments { .. })
            ));
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_result_wrapped_as_text() {
        let store = Arc::new(RecordingStore::with("wf1", json!({"active": false})));
        let registry = registry(store.clone());

        let result = registry
            .call_tool(
                EDIT_WORKFLOW,
                json!({"workflowId": "wf1", "mode": "dry_run", "patch": []}),
            )
            .await
            .unwrap();
        let decoded = text(&result);
        assert_eq!(decoded["ok"], true);
        assert_eq!(decoded["applied"], false);
        assert_eq!(decoded["workflow"], json!({"active": false}));
        assert_eq!(store.calls(), vec![StoreCall::Fetch("wf1".to_string())]);
    }
}
