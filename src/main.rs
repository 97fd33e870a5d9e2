//! Ketomed MCP Server - Main entry point
//!
//! This is the main executable for the Ketomed MCP Server, which provides a Model Context
//! Protocol (MCP) interface to the Ketomed drug catalog.

use anyhow::Result;
use ketomed_mcp_server::catalog::{Catalog, CsvCatalogSource};
use ketomed_mcp_server::repositories::{SqliteUserDataStore, UserDataStore};
use ketomed_mcp_server::search::{QueryGuard, SearchEngine};
use ketomed_mcp_server::services::{
    BookmarkService, BookmarkServiceImpl, HistoryService, HistoryServiceImpl, LookupService,
    LookupServiceImpl, SessionGate,
};
use ketomed_mcp_server::session::SessionRegistry;
use ketomed_mcp_server::{Config, KetomedMcpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Read .env early so LOG_LEVEL applies to the subscriber
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr only to avoid polluting stdout/MCP communication)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string()))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Starting Ketomed MCP Server with catalog: {}",
        config.catalog_path.display()
    );

    // Load the catalog; the server cannot run without it
    let source = CsvCatalogSource::new(&config.catalog_path)
        .with_delimiter(config.catalog_delimiter)
        .with_encoding(config.catalog_encoding);
    let catalog = match Catalog::load(&source) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            error!("Failed to load catalog: {}", e);
            return Err(e.into());
        }
    };

    // Optional persistence
    let store = match &config.db_path {
        Some(path) => {
            let store = SqliteUserDataStore::open(path).map_err(|e| {
                error!("Failed to open store {}: {}", path.display(), e);
                e
            })?;
            info!("Persisting bookmarks and history to {}", path.display());
            Some(Arc::new(store) as Arc<dyn UserDataStore>)
        }
        None => {
            info!("No KETOMED_DB_PATH set; bookmarks and history are kept in memory only");
            None
        }
    };

    let engine =
        Arc::new(SearchEngine::new(config.search_policy).with_scorer(config.scorer.build()));
    let gate = SessionGate::new(SessionRegistry::new(config.inactivity_minutes), store)
        .with_history_limit(config.recent_search_limit);

    // Initialize services
    let lookup_service = Arc::new(LookupServiceImpl::new(
        catalog.clone(),
        engine,
        QueryGuard::new(config.min_query_length),
        gate.clone(),
    )) as Arc<dyn LookupService>;
    let bookmark_service =
        Arc::new(BookmarkServiceImpl::new(catalog, gate.clone())) as Arc<dyn BookmarkService>;
    let history_service = Arc::new(
        HistoryServiceImpl::new(gate).with_recent_limit(config.recent_search_limit),
    ) as Arc<dyn HistoryService>;

    let server = KetomedMcpServer::new(lookup_service, bookmark_service, history_service);

    info!("Ketomed MCP Server initialized");
    info!(
        "Search policy: {:?}, inactivity threshold: {} minutes",
        config.search_policy, config.inactivity_minutes
    );

    // Run the server (this will block until the server exits)
    info!("Starting MCP server with stdio transport");
    ketomed_mcp_server::server::run_server(server).await?;

    info!("Ketomed MCP Server shutdown complete");
    Ok(())
}
