/// MCP Test Host Entry Point
///
/// Serves the `echo` and `add` tools for client transport test suites. Reads
/// configuration from environment variables (see `core::utils::ServerConfig`),
/// then starts the selected transport. By default it listens on
/// `http://127.0.0.1:8000/mcp` with the streamable HTTP transport.
///
/// Any startup failure (bad configuration, address already in use) is logged
/// and the process exits with a failure status before serving a request.

mod core;
mod tools;

use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::error::ServerError;
use crate::core::protocol::Dispatcher;
use crate::core::registry::ToolRegistry;
use crate::core::utils::{ServerConfig, TransportMode};
use crate::core::{server, stdio};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout belongs to the STDIO transport
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "MCP server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    let registry = Arc::new(ToolRegistry::with_default_tools());
    info!(
        tools = ?registry.tools().iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "tool registry ready"
    );
    let dispatcher = Dispatcher::new(config.name.clone(), config.version.clone(), registry);

    match config.transport {
        TransportMode::Http => server::run_server_http(&config, dispatcher).await,
        TransportMode::Stdio => stdio::run_server_stdio(dispatcher).await,
        TransportMode::Both => {
            // STDIO in a background task, HTTP in the foreground
            let stdio_dispatcher = dispatcher.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = stdio::run_server_stdio(stdio_dispatcher).await {
                    error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(&config, dispatcher).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();
            http_result
        }
    }
}
