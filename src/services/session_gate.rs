//! Session entry shared by every service.
//!
//! Each request enters its session through the gate before doing anything
//! else. The gate applies the inactivity rule, loads persisted bookmarks and
//! history the first time a session is seen, and mirrors resets into the
//! store when one is configured.

use crate::error::{ServiceResult, StoreError};
use crate::models::AnalyticsAction;
use crate::repositories::UserDataStore;
use crate::session::{SessionRegistry, DEFAULT_RECENT_SEARCH_LIMIT};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A service result together with what happened to the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResponse<T> {
    pub value: T,

    /// The session had been idle too long and was cleared by this request.
    pub session_reset: bool,

    /// Store writes that failed without failing the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_warning: Option<String>,
}

/// State collected while a request runs against its session.
#[derive(Debug, Default)]
pub struct SessionEntry {
    reset: bool,
    warnings: Vec<String>,
}

impl SessionEntry {
    pub fn was_reset(&self) -> bool {
        self.reset
    }

    /// Log a tolerated store failure and keep it for the response.
    pub fn warn(&mut self, session_id: &str, action: &str, err: &StoreError) {
        tracing::warn!("Failed to {} for session {}: {}", action, session_id, err);
        self.warnings.push(format!("failed to {}: {}", action, err));
    }

    pub fn store_warning(&self) -> Option<String> {
        if self.warnings.is_empty() {
            None
        } else {
            Some(self.warnings.join("; "))
        }
    }

    pub fn respond<T>(self, value: T) -> SessionResponse<T> {
        let store_warning = self.store_warning();
        SessionResponse {
            value,
            session_reset: self.reset,
            store_warning,
        }
    }
}

/// Entry point to per-session state.
#[derive(Clone)]
pub struct SessionGate {
    registry: SessionRegistry,
    store: Option<Arc<dyn UserDataStore>>,
    history_limit: usize,
    clock: Clock,
}

impl SessionGate {
    pub fn new(registry: SessionRegistry, store: Option<Arc<dyn UserDataStore>>) -> Self {
        Self {
            registry,
            store,
            history_limit: DEFAULT_RECENT_SEARCH_LIMIT,
            clock: Arc::new(Utc::now),
        }
    }

    /// Number of history entries loaded from the store for a new session.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn store(&self) -> Option<&Arc<dyn UserDataStore>> {
        self.store.as_ref()
    }

    /// Record an interaction at `now`.
    ///
    /// Store failures here are reported on the entry and never fail the
    /// request.
    pub async fn enter(&self, session_id: &str, now: DateTime<Utc>) -> SessionEntry {
        let touch = self.registry.touch(session_id, now);
        let mut entry = SessionEntry {
            reset: touch.reset,
            warnings: Vec::new(),
        };

        let Some(store) = &self.store else {
            return entry;
        };

        if touch.created {
            match store.get_bookmarks(session_id).await {
                Ok(ids) => {
                    tracing::debug!("Loaded {} bookmarks for session {}", ids.len(), session_id);
                    self.registry
                        .update(session_id, now, |s| s.merge_loaded_bookmarks(ids));
                }
                Err(e) => entry.warn(session_id, "load bookmarks", &e),
            }
            match store.recent_history(session_id, self.history_limit).await {
                Ok(entries) => {
                    self.registry.update(session_id, now, |s| {
                        s.merge_loaded_history(entries.into_iter().rev())
                    });
                }
                Err(e) => entry.warn(session_id, "load search history", &e),
            }
        }

        if touch.reset {
            if let Err(e) = store.clear_session_data(session_id).await {
                entry.warn(session_id, "clear stored session data", &e);
            }
            if let Err(e) = store
                .append_analytics_event(session_id, AnalyticsAction::SessionReset, None)
                .await
            {
                entry.warn(session_id, "record session reset", &e);
            }
        }

        entry
    }

    /// Clear the session's bookmarks and history on request.
    ///
    /// If the store cannot be cleared the in-memory state is restored and the
    /// failure is returned.
    pub async fn reset(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
        entry: &mut SessionEntry,
    ) -> ServiceResult<()> {
        let previous = self.registry.update(session_id, now, |s| {
            let previous = s.clone();
            s.reset(now);
            previous
        });

        if let Some(store) = &self.store {
            if let Err(e) = store.clear_session_data(session_id).await {
                tracing::error!("Failed to clear session {}: {}", session_id, e);
                self.registry.update(session_id, now, |s| *s = previous);
                return Err(e.into());
            }
            if let Err(e) = store
                .append_analytics_event(session_id, AnalyticsAction::SessionReset, None)
                .await
            {
                entry.warn(session_id, "record session reset", &e);
            }
        }

        tracing::info!("Session {} reset on request", session_id);
        Ok(())
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("registry", &self.registry)
            .field("store", &self.store.is_some())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
