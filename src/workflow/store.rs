//! Remote workflow store abstraction

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Where workflow documents live
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetch the full document for `workflow_id`
    async fn fetch(&self, workflow_id: &str) -> Result<Value>;

    /// Replace the document for `workflow_id`, returning the store's response
    async fn update(&self, workflow_id: &str, workflow: &Value) -> Result<Value>;
}
