use crate::domain::DrugId;
use crate::error::StoreResult;
use crate::models::{AnalyticsAction, SearchHistoryEntry};
use async_trait::async_trait;

/// Persistence for per-user bookmarks, search history and analytics.
///
/// Every write is independent and committed immediately; no transaction spans
/// two calls, and a failed call never undoes an earlier one. Implementations
/// may be backed by SQLite, a mock, or anything else.
#[async_trait]
pub trait UserDataStore: Send + Sync {
    /// All bookmarks of a user, oldest first.
    async fn get_bookmarks(&self, user: &str) -> StoreResult<Vec<DrugId>>;

    /// Add a bookmark. Adding an existing bookmark succeeds without change.
    async fn add_bookmark(&self, user: &str, id: &DrugId) -> StoreResult<()>;

    /// Remove a bookmark. Removing an absent bookmark succeeds without change.
    async fn remove_bookmark(&self, user: &str, id: &DrugId) -> StoreResult<()>;

    /// Append a search to the user's history.
    async fn append_history(&self, user: &str, query: &str) -> StoreResult<()>;

    /// The user's most recent searches, newest first.
    async fn recent_history(&self, user: &str, limit: usize) -> StoreResult<Vec<SearchHistoryEntry>>;

    /// Append an analytics event.
    async fn append_analytics_event(
        &self,
        user: &str,
        action: AnalyticsAction,
        id: Option<&DrugId>,
    ) -> StoreResult<()>;

    /// Delete the user's bookmarks and history. Analytics are kept.
    async fn clear_session_data(&self, user: &str) -> StoreResult<()>;
}
