//! Search history and analytics event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One recorded search: the query text and when it ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// Query text as typed
    pub term: String,

    /// When the search produced results
    pub timestamp: DateTime<Utc>,
}

impl SearchHistoryEntry {
    pub fn new(term: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            term: term.into(),
            timestamp,
        }
    }

    /// Timestamp in the `YYYY-MM-DD HH:MM:SS` form used in listings.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// User action recorded in the analytics log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsAction {
    Search,
    BookmarkAdded,
    BookmarkRemoved,
    SessionReset,
}

impl AnalyticsAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsAction::Search => "search",
            AnalyticsAction::BookmarkAdded => "bookmark_added",
            AnalyticsAction::BookmarkRemoved => "bookmark_removed",
            AnalyticsAction::SessionReset => "session_reset",
        }
    }
}

impl fmt::Display for AnalyticsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
