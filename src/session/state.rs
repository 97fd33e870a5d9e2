//! Session state and the inactivity rule.

use crate::domain::DrugId;
use crate::models::SearchHistoryEntry;
use chrono::{DateTime, Duration, Utc};

/// Idle time after which a session is cleared.
pub const DEFAULT_INACTIVITY_MINUTES: u64 = 30;

/// Largest inactivity threshold a `chrono::Duration` can hold.
pub const MAX_INACTIVITY_MINUTES: u64 = (i64::MAX / 60_000) as u64;

/// How many recent searches are shown.
pub const DEFAULT_RECENT_SEARCH_LIMIT: usize = 10;

/// True when strictly more than `threshold` has passed since `last_active`.
///
/// An interaction exactly at the threshold does not count as inactive.
pub fn is_inactive(now: DateTime<Utc>, last_active: DateTime<Utc>, threshold: Duration) -> bool {
    now.signed_duration_since(last_active) > threshold
}

/// Outcome of a bookmark mutation. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkChange {
    Added,
    AlreadyBookmarked,
    Removed,
    NotBookmarked,
}

impl BookmarkChange {
    /// Whether the bookmark set actually changed.
    pub fn changed(&self) -> bool {
        matches!(self, BookmarkChange::Added | BookmarkChange::Removed)
    }
}

/// Result of recording an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Session was within the threshold; last-active was updated.
    Active,
    /// Session had been idle too long and was cleared.
    Expired,
}

/// Mutable state of one user session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    bookmarks: Vec<DrugId>,
    history: Vec<SearchHistoryEntry>,
    last_active: DateTime<Utc>,
}

impl SessionState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            bookmarks: Vec::new(),
            history: Vec::new(),
            last_active: now,
        }
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Record an interaction at `now`.
    ///
    /// The inactivity check runs first: if the session has been idle for
    /// longer than `threshold`, bookmarks and history are cleared. Either way
    /// last-active becomes `now`.
    pub fn touch(&mut self, now: DateTime<Utc>, threshold: Duration) -> Activity {
        if is_inactive(now, self.last_active, threshold) {
            self.reset(now);
            Activity::Expired
        } else {
            self.last_active = now;
            Activity::Active
        }
    }

    /// Clear bookmarks and history and restart the inactivity clock.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.bookmarks.clear();
        self.history.clear();
        self.last_active = now;
    }

    /// Bookmarked ids in the order they were added.
    pub fn bookmarks(&self) -> &[DrugId] {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, id: &DrugId) -> bool {
        self.bookmarks.contains(id)
    }

    pub fn add_bookmark(&mut self, id: DrugId) -> BookmarkChange {
        if self.is_bookmarked(&id) {
            return BookmarkChange::AlreadyBookmarked;
        }
        self.bookmarks.push(id);
        BookmarkChange::Added
    }

    pub fn remove_bookmark(&mut self, id: &DrugId) -> BookmarkChange {
        match self.bookmark_position(id) {
            Some(pos) => {
                self.bookmarks.remove(pos);
                BookmarkChange::Removed
            }
            None => BookmarkChange::NotBookmarked,
        }
    }

    /// Position of a bookmark in insertion order.
    pub fn bookmark_position(&self, id: &DrugId) -> Option<usize> {
        self.bookmarks.iter().position(|b| b == id)
    }

    /// Put a removed bookmark back at its former position.
    pub fn restore_bookmark(&mut self, position: usize, id: DrugId) {
        if self.is_bookmarked(&id) {
            return;
        }
        let position = position.min(self.bookmarks.len());
        self.bookmarks.insert(position, id);
    }

    /// Merge bookmarks loaded from the store ahead of the current ones.
    ///
    /// Bookmarks added while the load was in flight are kept after the loaded
    /// ones. Duplicates are dropped.
    pub fn merge_loaded_bookmarks(&mut self, loaded: impl IntoIterator<Item = DrugId>) {
        let current = std::mem::take(&mut self.bookmarks);
        for id in loaded.into_iter().chain(current) {
            self.add_bookmark(id);
        }
    }

    /// Append a history entry.
    pub fn record_search(&mut self, term: impl Into<String>, now: DateTime<Utc>) {
        self.history.push(SearchHistoryEntry::new(term, now));
    }

    /// Put history loaded from the store ahead of the current entries.
    /// Entries are given oldest first.
    pub fn merge_loaded_history(&mut self, loaded: impl IntoIterator<Item = SearchHistoryEntry>) {
        let current = std::mem::take(&mut self.history);
        self.history = loaded.into_iter().chain(current).collect();
    }

    /// Full history in arrival order.
    pub fn history(&self) -> &[SearchHistoryEntry] {
        &self.history
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent_searches(&self, limit: usize) -> Vec<&SearchHistoryEntry> {
        self.history.iter().rev().take(limit).collect()
    }
}
