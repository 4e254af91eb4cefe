//! HTTP transport for the MCP server
//!
//! A single `POST /mcp` route. Every routed, authorized request answers
//! 200 with a JSON-RPC envelope; unknown paths answer 404, other methods
//! on `/mcp` answer 405, and a bearer token mismatch answers a bare 401.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::mcp::server::McpServer;

/// Route serving the JSON-RPC endpoint
pub const MCP_PATH: &str = "/mcp";

/// Shared state of the HTTP layer
pub struct AppState {
    server: McpServer,
    bearer_token: Option<String>,
}

impl AppState {
    pub fn new(server: McpServer, bearer_token: Option<String>) -> Self {
        Self {
            server,
            bearer_token: bearer_token.filter(|t| !t.is_empty()),
        }
    }

    /// Whether the request carries the configured bearer token
    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(token) = &self.bearer_token else {
            return true;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == format!("Bearer {}", token))
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(MCP_PATH, post(handle_mcp))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn handle_mcp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.is_authorized(&headers) {
        tracing::warn!("Rejected request with missing or invalid bearer token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let response = state.server.handle_raw(&body).await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        response,
    )
        .into_response()
}

/// Serve the router until Ctrl-C or SIGTERM
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP server listening on http://{}{}", addr, MCP_PATH);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
