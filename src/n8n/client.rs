//! n8n API client
//!
//! Reads and replaces workflow documents through the n8n public API.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::config::n8n::{API_KEY_HEADER, WORKFLOWS_PATH};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::workflow::store::WorkflowStore;

/// n8n API client
pub struct N8nClient {
    /// HTTP client with the API key and timeout baked in
    http_client: reqwest::Client,

    /// Base URL of the n8n instance
    base_url: String,
}

impl N8nClient {
    /// Create a new n8n client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| StoreError::InvalidClient {
                message: "API key is not a valid header value".to_string(),
            })?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(StoreError::Transport)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of a single workflow
    fn workflow_url(&self, workflow_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            WORKFLOWS_PATH,
            urlencoding::encode(workflow_id)
        )
    }

    /// Turn a response into its body, or a status error carrying the body.
    /// Bodies that are not JSON are kept as raw text.
    async fn read_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await.map_err(StoreError::Transport)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            return Ok(body);
        }

        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

#[async_trait]
impl WorkflowStore for N8nClient {
    async fn fetch(&self, workflow_id: &str) -> Result<Value> {
        let url = self.workflow_url(workflow_id);
        tracing::debug!(workflow_id, "GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(StoreError::Transport)?;

        Self::read_response(response).await
    }

    async fn update(&self, workflow_id: &str, workflow: &Value) -> Result<Value> {
        let url = self.workflow_url(workflow_id);
        tracing::debug!(workflow_id, "PUT {}", url);

        let response = self
            .http_client
            .put(&url)
            .json(workflow)
            .send()
            .await
            .map_err(StoreError::Transport)?;

        Self::read_response(response).await
    }
}
