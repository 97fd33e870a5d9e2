//! MCP server implementation for the Ketomed drug catalog.
//!
//! This module provides the MCP protocol server that exposes catalog lookup,
//! bookmarks and search history to AI assistants through the Model Context
//! Protocol.

pub mod handlers;

pub use handlers::KetomedMcpServer;

use anyhow::Result;
use rmcp::transport::io::stdio;
use rmcp::ServiceExt;

/// Run the Ketomed MCP server with stdio transport.
///
/// This function starts the MCP server and runs it until completion.
/// It communicates via stdin/stdout using the MCP protocol.
///
/// # Arguments
/// * `server` - The configured KetomedMcpServer instance
///
/// # Returns
/// An error if the server fails to start or encounters a fatal error
pub async fn run_server(server: KetomedMcpServer) -> Result<()> {
    // Serve the server with stdio transport
    let service = server.serve(stdio()).await?;

    // Wait for completion
    service.waiting().await?;

    Ok(())
}
