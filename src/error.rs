//! Error types for the Ketomed MCP Server.
//!
//! This module defines custom error types using `thiserror` for precise error handling.
//! Search outcomes such as "query too short" or "no results" are not errors; see
//! [`crate::search::SearchOutcome`].

use crate::domain::ValidationError;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Errors that can occur while loading the drug catalog.
///
/// Any of these is fatal at startup: the server cannot run without a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be opened or read
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited data
    #[error("Malformed catalog data: {0}")]
    Csv(#[from] csv::Error),

    /// A row has no usable identifier
    #[error("Catalog row {row} has no identifier")]
    MissingId { row: usize },

    /// The same identifier appears twice
    #[error("Duplicate drug identifier in catalog: {0}")]
    DuplicateId(String),

    /// The catalog contains no rows
    #[error("Catalog is empty")]
    Empty,
}

/// Errors raised by the bookmark/history persistence store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite reported an error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The blocking task running the statement did not complete
    #[error("Store task failed: {0}")]
    Task(String),

    /// The stored data could not be interpreted
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    /// Generic store error
    #[error("Store error: {0}")]
    Other(String),
}

/// Errors surfaced by the service layer to the MCP handlers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The identifier does not name a catalog entry
    #[error("Unknown drug identifier: {0}")]
    UnknownDrug(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A persistence write failed; in-memory state was left unchanged
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::InvalidRequest(err.to_string())
    }
}

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convenience type alias for Results with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience type alias for Results with ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;
