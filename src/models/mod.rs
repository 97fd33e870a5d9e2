//! Data models for the Ketomed drug catalog.
//!
//! This module contains the catalog row type and the per-session records
//! (search history, analytics actions) kept alongside it.

pub mod drug;
pub mod history;

pub use drug::Drug;
pub use history::{AnalyticsAction, SearchHistoryEntry};
