use async_trait::async_trait;
use chrono::Utc;
use ketomed_mcp_server::domain::DrugId;
use ketomed_mcp_server::error::{StoreError, StoreResult};
use ketomed_mcp_server::models::{AnalyticsAction, SearchHistoryEntry};
use ketomed_mcp_server::repositories::UserDataStore;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Mock user data store for testing.
///
/// Provides an in-memory implementation of UserDataStore that tracks method
/// calls for verification and can be told to fail specific methods.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockUserDataStore {
    bookmarks: Arc<Mutex<HashMap<String, Vec<DrugId>>>>,
    history: Arc<Mutex<HashMap<String, Vec<SearchHistoryEntry>>>>,
    events: Arc<Mutex<Vec<(String, AnalyticsAction, Option<DrugId>)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
}

#[allow(dead_code)]
impl MockUserDataStore {
    /// Create a new empty MockUserDataStore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `method` fail.
    pub fn fail_on(&self, method: &str) {
        self.failing.lock().unwrap().insert(method.to_string());
    }

    /// Let `method` succeed again.
    pub fn recover(&self, method: &str) {
        self.failing.lock().unwrap().remove(method);
    }

    /// Seed stored bookmarks for a user.
    pub fn seed_bookmarks(&self, user: &str, ids: &[&str]) {
        let ids = ids.iter().map(|s| DrugId::new(s).unwrap()).collect();
        self.bookmarks.lock().unwrap().insert(user.to_string(), ids);
    }

    /// Stored bookmarks for a user, bypassing call tracking.
    pub fn stored_bookmarks(&self, user: &str) -> Vec<String> {
        self.bookmarks
            .lock()
            .unwrap()
            .get(user)
            .map(|ids| ids.iter().map(|id| id.to_string()).collect())
            .unwrap_or_default()
    }

    /// Stored search terms for a user, oldest first.
    pub fn stored_history(&self, user: &str) -> Vec<String> {
        self.history
            .lock()
            .unwrap()
            .get(user)
            .map(|entries| entries.iter().map(|e| e.term.clone()).collect())
            .unwrap_or_default()
    }

    /// Recorded analytics actions for a user.
    pub fn events_for(&self, user: &str) -> Vec<AnalyticsAction> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _, _)| u == user)
            .map(|(_, action, _)| *action)
            .collect()
    }

    /// Get the number of times a method was called.
    pub fn get_call_count(&self, method: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(method).unwrap_or(&0)
    }

    /// Reset all call counts.
    pub fn reset_call_counts(&self) {
        self.call_counts.lock().unwrap().clear();
    }

    fn track_call(&self, method: &str) -> StoreResult<()> {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;

        if self.failing.lock().unwrap().contains(method) {
            return Err(StoreError::Other(format!("{} unavailable", method)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDataStore for MockUserDataStore {
    async fn get_bookmarks(&self, user: &str) -> StoreResult<Vec<DrugId>> {
        self.track_call("get_bookmarks")?;
        Ok(self
            .bookmarks
            .lock()
            .unwrap()
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_bookmark(&self, user: &str, id: &DrugId) -> StoreResult<()> {
        self.track_call("add_bookmark")?;
        let mut bookmarks = self.bookmarks.lock().unwrap();
        let ids = bookmarks.entry(user.to_string()).or_default();
        if !ids.contains(id) {
            ids.push(id.clone());
        }
        Ok(())
    }

    async fn remove_bookmark(&self, user: &str, id: &DrugId) -> StoreResult<()> {
        self.track_call("remove_bookmark")?;
        if let Some(ids) = self.bookmarks.lock().unwrap().get_mut(user) {
            ids.retain(|b| b != id);
        }
        Ok(())
    }

    async fn append_history(&self, user: &str, query: &str) -> StoreResult<()> {
        self.track_call("append_history")?;
        self.history
            .lock()
            .unwrap()
            .entry(user.to_string())
            .or_default()
            .push(SearchHistoryEntry::new(query, Utc::now()));
        Ok(())
    }

    async fn recent_history(&self, user: &str, limit: usize) -> StoreResult<Vec<SearchHistoryEntry>> {
        self.track_call("recent_history")?;
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(user)
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn append_analytics_event(
        &self,
        user: &str,
        action: AnalyticsAction,
        id: Option<&DrugId>,
    ) -> StoreResult<()> {
        self.track_call("append_analytics_event")?;
        self.events
            .lock()
            .unwrap()
            .push((user.to_string(), action, id.cloned()));
        Ok(())
    }

    async fn clear_session_data(&self, user: &str) -> StoreResult<()> {
        self.track_call("clear_session_data")?;
        self.bookmarks.lock().unwrap().remove(user);
        self.history.lock().unwrap().remove(user);
        Ok(())
    }
}
