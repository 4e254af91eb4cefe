//! Workflow editor
//!
//! Enforces the allowlist, fetches the current document and, in `apply`
//! mode, patches a private copy and writes it back. The write is only
//! issued once the fetch succeeded and every patch operation applied.

use std::sync::Arc;

use crate::config::Allowlist;
use crate::error::Result;
use crate::workflow::patch::{apply_patch, PatchOperation};
use crate::workflow::store::WorkflowStore;
use crate::workflow::types::{EditMode, EditResult};

/// Edits allowlisted workflows in a remote store
pub struct WorkflowEditor {
    store: Arc<dyn WorkflowStore>,
    allowlist: Allowlist,
}

impl WorkflowEditor {
    pub fn new(store: Arc<dyn WorkflowStore>, allowlist: Allowlist) -> Self {
        Self { store, allowlist }
    }

    /// Run one edit. Allowlist rejections are an `Ok` result with `ok: false`;
    /// store and patch failures are errors.
    pub async fn edit(
        &self,
        workflow_id: &str,
        mode: EditMode,
        patch: &[PatchOperation],
    ) -> Result<EditResult> {
        if !self.allowlist.contains(workflow_id) {
            tracing::warn!(
                workflow_id,
                mode = mode.as_str(),
                "Rejected edit of workflow outside the allowlist"
            );
            return Ok(EditResult::not_allowed(workflow_id));
        }

        let current = self.store.fetch(workflow_id).await?;

        match mode {
            EditMode::DryRun => {
                tracing::debug!(workflow_id, ops = patch.len(), "Dry run, patch not applied");
                Ok(EditResult::dry_run(workflow_id, current))
            }
            EditMode::Apply => {
                let paths: Vec<&str> = patch.iter().map(PatchOperation::path).collect();
                let patched = apply_patch(&current, patch)?;
                self.store.update(workflow_id, &patched).await?;
                tracing::info!(workflow_id, ?paths, "Applied patch to workflow");
                Ok(EditResult::applied(workflow_id, patched))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio_test::{assert_err, assert_ok};

    use crate::error::{StoreError, WorkflowMcpError};
    use crate::workflow::types::NOT_ALLOWED;

    /// A call the editor made against the store
    #[derive(Debug, Clone, PartialEq)]
    pub enum StoreCall {
        Fetch(String),
        Update(String, Value),
    }

    /// In-memory store that records every call
    #[derive(Default)]
    pub struct RecordingStore {
        pub documents: Mutex<HashMap<String, Value>>,
        pub calls: Mutex<Vec<StoreCall>>,
    }

    impl RecordingStore {
        pub fn with(workflow_id: &str, document: Value) -> Self {
            let store = Self::default();
            store
                .documents
                .lock()
                .unwrap()
                .insert(workflow_id.to_string(), document);
            store
        }

        pub fn calls(&self) -> Vec<StoreCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkflowStore for RecordingStore {
        async fn fetch(&self, workflow_id: &str) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push(StoreCall::Fetch(workflow_id.to_string()));
            self.documents
                .lock()
                .unwrap()
                .get(workflow_id)
                .cloned()
                .ok_or_else(|| {
                    StoreError::Status {
                        status: 404,
                        body: json!({"message": "Not Found"}),
                    }
                    .into()
                })
        }

        async fn update(&self, workflow_id: &str, workflow: &Value) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push(StoreCall::Update(workflow_id.to_string(), workflow.clone()));
            self.documents
                .lock()
                .unwrap()
                .insert(workflow_id.to_string(), workflow.clone());
            Ok(workflow.clone())
        }
    }

    fn editor(store: Arc<RecordingStore>) -> WorkflowEditor {
        WorkflowEditor::new(store, Allowlist::parse("wf1").unwrap())
    }

    fn ops(value: Value) -> Vec<PatchOperation> {
        serde_json::from_value(value).unwrap()
    }

    fn original() -> Value {
        json!({"nodes": [], "active": false})
    }

    #[tokio::test]
    async fn test_not_allowed_makes_no_remote_calls() {
        let store = Arc::new(RecordingStore::with("wf2", original()));
        let editor = editor(store.clone());

        for mode in [EditMode::DryRun, EditMode::Apply] {
            let result = assert_ok!(editor.edit("wf2", mode, &[]).await);
            assert!(!result.ok);
            assert!(!result.applied);
            assert_eq!(result.error.as_deref(), Some(NOT_ALLOWED));
            assert_eq!(result.details, Some(json!({"workflowId": "wf2"})));
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_allowlist_match_is_exact() {
        let store = Arc::new(RecordingStore::with("WF1", original()));
        let editor = editor(store.clone());
        let result = assert_ok!(editor.edit("WF1", EditMode::DryRun, &[]).await);
        assert!(!result.ok);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_ignores_patch() {
        let store = Arc::new(RecordingStore::with("wf1", original()));
        let editor = editor(store.clone());
        let patch = ops(json!([
            {"op": "replace", "path": "/active", "value": true},
            {"op": "remove", "path": "/does/not/exist"}
        ]));

        let result = assert_ok!(editor.edit("wf1", EditMode::DryRun, &patch).await);
        assert!(result.ok);
        assert!(!result.applied);
        assert_eq!(result.workflow, Some(original()));
        assert_eq!(store.calls(), vec![StoreCall::Fetch("wf1".to_string())]);
    }

    #[tokio::test]
    async fn test_apply_writes_patched_document() {
        let store = Arc::new(RecordingStore::with("wf1", original()));
        let editor = editor(store.clone());
        let patch = ops(json!([{"op": "replace", "path": "/active", "value": true}]));

        let result = assert_ok!(editor.edit("wf1", EditMode::Apply, &patch).await);
        let expected = json!({"nodes": [], "active": true});
        assert!(result.ok);
        assert!(result.applied);
        assert_eq!(result.workflow, Some(expected.clone()));
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Fetch("wf1".to_string()),
                StoreCall::Update("wf1".to_string(), expected),
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_empty_patch_writes_fetched_document() {
        let store = Arc::new(RecordingStore::with("wf1", original()));
        let editor = editor(store.clone());

        assert_ok!(editor.edit("wf1", EditMode::Apply, &[]).await);
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Fetch("wf1".to_string()),
                StoreCall::Update("wf1".to_string(), original()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_patch_skips_write() {
        let store = Arc::new(RecordingStore::with("wf1", original()));
        let editor = editor(store.clone());
        let patch = ops(json!([
            {"op": "replace", "path": "/active", "value": true},
            {"op": "test", "path": "/active", "value": false}
        ]));

        let err = assert_err!(editor.edit("wf1", EditMode::Apply, &patch).await);
        assert!(matches!(err, WorkflowMcpError::Patch(_)));
        assert_eq!(store.calls(), vec![StoreCall::Fetch("wf1".to_string())]);
        assert_eq!(store.documents.lock().unwrap()["wf1"], original());
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_write() {
        let store = Arc::new(RecordingStore::default());
        let editor = editor(store.clone());

        let err = assert_err!(editor.edit("wf1", EditMode::Apply, &[]).await);
        assert!(matches!(
            err,
            WorkflowMcpError::Store(StoreError::Status { status: 404, .. })
        ));
        assert_eq!(store.calls(), vec![StoreCall::Fetch("wf1".to_string())]);
    }
}
