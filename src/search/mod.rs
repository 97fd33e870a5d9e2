//! Catalog search.
//!
//! This module provides the query guard (minimum length) and the search
//! engine with its three interchangeable matching policies.

pub mod engine;
pub mod query;

pub use engine::{SearchEngine, SearchPolicy, DEFAULT_FUZZY_LIMIT};
pub use query::{
    InsufficientQuery, QueryGuard, SearchOutcome, ValidQuery, DEFAULT_MIN_QUERY_LENGTH,
};
