//! Ketomed MCP Server - lookup of drug products and their compatibility with a
//! ketogenic diet, served over the Model Context Protocol.
//!
//! The catalog is loaded once from a delimited file and shared read-only. Each
//! session keeps its own bookmarks and search history, which are cleared after
//! a period of inactivity and can optionally be persisted to SQLite.
//!
//! # Architecture
//!
//! - **domain**: Drug identifiers and the ketogenic status classification
//! - **models**: Catalog rows, search history entries and analytics actions
//! - **catalog**: Catalog loading and the immutable catalog handle
//! - **matching**: Similarity scorers for approximate search
//! - **search**: Query guard and the search engine with its matching policies
//! - **refine**: Status ordering and route/status filters
//! - **session**: Per-session state and the inactivity rule
//! - **repositories**: Persistence of bookmarks, history and analytics
//! - **services**: Business logic orchestrating the layers above
//! - **server**: MCP protocol server
//! - **config**: Configuration management from environment variables
//! - **error**: Custom error types for precise error handling

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod matching;
pub mod models;
pub mod refine;
pub mod repositories;
pub mod search;
pub mod server;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogSource, CsvCatalogSource};
pub use config::Config;
pub use domain::{DrugId, KetoStatus, StatusIndicator};
pub use error::{CatalogError, ConfigError, ServiceError, StoreError};
pub use models::{AnalyticsAction, Drug, SearchHistoryEntry};
pub use refine::{refine, RefineFilters};
pub use search::{QueryGuard, SearchEngine, SearchOutcome, SearchPolicy};
pub use server::KetomedMcpServer;
pub use session::{SessionRegistry, SessionState};
