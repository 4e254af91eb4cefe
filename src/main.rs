//! n8n Workflow MCP Server
//!
//! Serves the `edit_workflow` MCP tool over HTTP.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use n8n_workflow_mcp::config::Config;
use n8n_workflow_mcp::mcp::http::{self, AppState};
use n8n_workflow_mcp::mcp::server::McpServer;
use n8n_workflow_mcp::mcp::tools::ToolRegistry;
use n8n_workflow_mcp::n8n::client::N8nClient;
use n8n_workflow_mcp::workflow::editor::WorkflowEditor;

/// n8n Workflow MCP Server
#[derive(Parser)]
#[command(name = "n8n-workflow-mcp")]
#[command(author, version, about = "MCP server for editing allowlisted n8n workflows")]
struct Cli {
    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration with secrets redacted
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    match cli.command {
        Some(Commands::ShowConfig) => {
            println!("{:#?}", config);
        }
        None => {
            run_server(cli.host, config).await?;
        }
    }

    Ok(())
}

async fn run_server(host: IpAddr, config: Config) -> anyhow::Result<()> {
    let client = N8nClient::new(&config).context("failed to create n8n client")?;
    tracing::info!(
        base_url = %config.base_url,
        workflows = ?config.allowlist.iter().collect::<Vec<_>>(),
        "Editing allowlisted workflows"
    );

    let editor = Arc::new(WorkflowEditor::new(
        Arc::new(client),
        config.allowlist.clone(),
    ));
    let server = McpServer::new(ToolRegistry::with_editor(editor));
    let state = Arc::new(AppState::new(server, config.bearer_token.clone()));

    if config.bearer_token.is_none() {
        tracing::warn!("MCP_BEARER_TOKEN is not set; the endpoint accepts unauthenticated requests");
    }

    http::serve(SocketAddr::new(host, config.port), state).await?;

    Ok(())
}
