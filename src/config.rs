//! Configuration management for the n8n workflow MCP server
//!
//! Handles environment variables and the workflow allowlist.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Environment variable names
pub mod env {
    pub const BASE_URL: &str = "N8N_BASE_URL";
    pub const API_KEY: &str = "N8N_API_KEY";
    pub const ALLOWLIST: &str = "WORKFLOW_ALLOWLIST";
    pub const BEARER_TOKEN: &str = "MCP_BEARER_TOKEN";
    pub const PORT: &str = "PORT";
    pub const TIMEOUT_SECS: &str = "N8N_TIMEOUT_SECS";
}

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default timeout for calls to the n8n API
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the n8n workflow MCP server
#[derive(Clone)]
pub struct Config {
    /// Base URL of the n8n instance, without a trailing slash
    pub base_url: String,

    /// n8n API key
    pub api_key: String,

    /// Workflows that may be edited
    pub allowlist: Allowlist,

    /// Bearer token required on inbound requests, if any
    pub bearer_token: Option<String>,

    /// Listen port
    pub port: u16,

    /// Timeout for each call to the n8n API
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, env::BASE_URL)?
            .trim_end_matches('/')
            .to_string();
        let api_key = required(&lookup, env::API_KEY)?;
        let allowlist = Allowlist::parse(&required(&lookup, env::ALLOWLIST)?)?;

        let bearer_token = lookup(env::BEARER_TOKEN).filter(|t| !t.is_empty());

        let port = match lookup(env::PORT).filter(|p| !p.trim().is_empty()) {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::InvalidConfig {
                message: format!("{} is not a valid port: {}", env::PORT, p),
            })?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match lookup(env::TIMEOUT_SECS).filter(|t| !t.trim().is_empty()) {
            Some(t) => t
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidConfig {
                    message: format!("{} is not a number of seconds: {}", env::TIMEOUT_SECS, t),
                })?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url,
            api_key,
            allowlist,
            bearer_token,
            port,
            request_timeout,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("allowlist", &self.allowlist)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn required<F>(lookup: &F, var: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ConfigError::MissingEnvVar {
                var: var.to_string(),
            }
            .into()
        })
}

/// Fixed set of workflow IDs that may be edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist(BTreeSet<String>);

impl Allowlist {
    /// Parse a comma-separated list of workflow IDs
    pub fn parse(raw: &str) -> Result<Self> {
        Self::new(raw.split(',').map(str::trim))
    }

    /// Build an allowlist from IDs, dropping empty entries
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| !id.is_empty())
            .collect();

        if ids.is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: format!("{} must name at least one workflow", env::ALLOWLIST),
            }
            .into());
        }

        Ok(Self(ids))
    }

    /// Exact, case-sensitive membership check
    pub fn contains(&self, workflow_id: &str) -> bool {
        self.0.contains(workflow_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// n8n API constants
pub mod n8n {
    /// Path prefix of the workflows resource
    pub const WORKFLOWS_PATH: &str = "/api/v1/workflows";

    /// Header carrying the API key
    pub const API_KEY_HEADER: &str = "x-n8n-api-key";
}
