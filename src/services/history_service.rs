//! History service layer.
//!
//! Business logic for recent searches and manual session reset.

use super::session_gate::{SessionGate, SessionResponse};
use crate::error::ServiceResult;
use crate::models::SearchHistoryEntry;
use crate::session::DEFAULT_RECENT_SEARCH_LIMIT;
use async_trait::async_trait;

/// History service trait for business operations.
#[async_trait]
pub trait HistoryService: Send + Sync {
    /// The session's most recent searches, newest first.
    async fn recent(&self, session_id: &str)
        -> ServiceResult<SessionResponse<Vec<SearchHistoryEntry>>>;

    /// Clear the session's bookmarks and history.
    async fn reset(&self, session_id: &str) -> ServiceResult<SessionResponse<()>>;
}

/// Default implementation of HistoryService.
pub struct HistoryServiceImpl {
    gate: SessionGate,
    recent_limit: usize,
}

impl HistoryServiceImpl {
    /// Create a new history service.
    pub fn new(gate: SessionGate) -> Self {
        Self {
            gate,
            recent_limit: DEFAULT_RECENT_SEARCH_LIMIT,
        }
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }
}

#[async_trait]
impl HistoryService for HistoryServiceImpl {
    async fn recent(
        &self,
        session_id: &str,
    ) -> ServiceResult<SessionResponse<Vec<SearchHistoryEntry>>> {
        let now = self.gate.now();
        let entry = self.gate.enter(session_id, now).await;

        let recent = self
            .gate
            .registry()
            .snapshot(session_id)
            .map(|s| {
                s.recent_searches(self.recent_limit)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(entry.respond(recent))
    }

    async fn reset(&self, session_id: &str) -> ServiceResult<SessionResponse<()>> {
        let now = self.gate.now();
        let mut entry = self.gate.enter(session_id, now).await;
        self.gate.reset(session_id, now, &mut entry).await?;
        Ok(entry.respond(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRegistry;

    #[tokio::test]
    async fn test_recent_is_capped_newest_first() {
        let gate = SessionGate::new(SessionRegistry::new(30), None);
        let service = HistoryServiceImpl::new(gate.clone()).with_recent_limit(2);

        let now = gate.now();
        gate.registry().update("s1", now, |s| {
            s.record_search("keppra", now);
            s.record_search("depakine", now);
            s.record_search("tegretol", now);
        });

        let terms: Vec<String> = service
            .recent("s1")
            .await
            .unwrap()
            .value
            .into_iter()
            .map(|e| e.term)
            .collect();
        assert_eq!(terms, vec!["tegretol", "depakine"]);
    }

    #[tokio::test]
    async fn test_reset_clears_session() {
        let gate = SessionGate::new(SessionRegistry::new(30), None);
        let service = HistoryServiceImpl::new(gate.clone());

        let now = gate.now();
        gate.registry().update("s1", now, |s| s.record_search("keppra", now));

        let response = service.reset("s1").await.unwrap();
        assert!(!response.session_reset);
        assert!(service.recent("s1").await.unwrap().value.is_empty());
    }
}
