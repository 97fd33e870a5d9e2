//! Bookmark service layer.
//!
//! Business logic for the per-session bookmark set. With a store configured,
//! every change is written through; if the write fails the in-memory change
//! is undone and the failure is returned.

use super::session_gate::{SessionGate, SessionResponse};
use crate::catalog::Catalog;
use crate::domain::DrugId;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{AnalyticsAction, Drug};
use crate::refine::{refine, RefineFilters};
use crate::session::BookmarkChange;
use async_trait::async_trait;
use std::sync::Arc;

/// Bookmark service trait for business operations.
#[async_trait]
pub trait BookmarkService: Send + Sync {
    /// Bookmark a catalog product. Bookmarking it again is a no-op.
    async fn add(
        &self,
        session_id: &str,
        drug_id: &str,
    ) -> ServiceResult<SessionResponse<BookmarkChange>>;

    /// Remove a bookmark. Removing an absent bookmark is a no-op.
    async fn remove(
        &self,
        session_id: &str,
        drug_id: &str,
    ) -> ServiceResult<SessionResponse<BookmarkChange>>;

    /// Bookmarked products, ordered by status like search results.
    async fn list(&self, session_id: &str) -> ServiceResult<SessionResponse<Vec<Drug>>>;
}

/// Default implementation of BookmarkService.
pub struct BookmarkServiceImpl {
    catalog: Arc<Catalog>,
    gate: SessionGate,
}

impl BookmarkServiceImpl {
    /// Create a new bookmark service.
    pub fn new(catalog: Arc<Catalog>, gate: SessionGate) -> Self {
        Self { catalog, gate }
    }
}

#[async_trait]
impl BookmarkService for BookmarkServiceImpl {
    async fn add(
        &self,
        session_id: &str,
        drug_id: &str,
    ) -> ServiceResult<SessionResponse<BookmarkChange>> {
        let now = self.gate.now();
        let mut entry = self.gate.enter(session_id, now).await;

        let id = DrugId::new(drug_id)?;
        if self.catalog.get(&id).is_none() {
            return Err(ServiceError::UnknownDrug(id.to_string()));
        }

        let change = self
            .gate
            .registry()
            .update(session_id, now, |s| s.add_bookmark(id.clone()));

        if change.changed() {
            if let Some(store) = self.gate.store() {
                if let Err(e) = store.add_bookmark(session_id, &id).await {
                    tracing::error!("Failed to store bookmark {} for {}: {}", id, session_id, e);
                    self.gate
                        .registry()
                        .update(session_id, now, |s| s.remove_bookmark(&id));
                    return Err(e.into());
                }
                if let Err(e) = store
                    .append_analytics_event(session_id, AnalyticsAction::BookmarkAdded, Some(&id))
                    .await
                {
                    entry.warn(session_id, "record bookmark event", &e);
                }
            }
        }

        tracing::debug!("Bookmark {} for {}: {:?}", id, session_id, change);
        Ok(entry.respond(change))
    }

    async fn remove(
        &self,
        session_id: &str,
        drug_id: &str,
    ) -> ServiceResult<SessionResponse<BookmarkChange>> {
        let now = self.gate.now();
        let mut entry = self.gate.enter(session_id, now).await;

        let id = DrugId::new(drug_id)?;
        let (change, position) = self.gate.registry().update(session_id, now, |s| {
            let position = s.bookmark_position(&id);
            (s.remove_bookmark(&id), position)
        });

        if change.changed() {
            if let Some(store) = self.gate.store() {
                if let Err(e) = store.remove_bookmark(session_id, &id).await {
                    tracing::error!("Failed to remove stored bookmark {} for {}: {}", id, session_id, e);
                    if let Some(position) = position {
                        self.gate.registry().update(session_id, now, |s| {
                            s.restore_bookmark(position, id.clone())
                        });
                    }
                    return Err(e.into());
                }
                if let Err(e) = store
                    .append_analytics_event(session_id, AnalyticsAction::BookmarkRemoved, Some(&id))
                    .await
                {
                    entry.warn(session_id, "record bookmark event", &e);
                }
            }
        }

        tracing::debug!("Unbookmark {} for {}: {:?}", id, session_id, change);
        Ok(entry.respond(change))
    }

    async fn list(&self, session_id: &str) -> ServiceResult<SessionResponse<Vec<Drug>>> {
        let now = self.gate.now();
        let entry = self.gate.enter(session_id, now).await;

        let ids = self
            .gate
            .registry()
            .snapshot(session_id)
            .map(|s| s.bookmarks().to_vec())
            .unwrap_or_default();

        let rows: Vec<&Drug> = ids
            .iter()
            .filter_map(|id| {
                let row = self.catalog.get(id);
                if row.is_none() {
                    tracing::debug!("Bookmark {} is not in the catalog", id);
                }
                row
            })
            .collect();

        let drugs = refine(rows, &RefineFilters::none())
            .into_iter()
            .cloned()
            .collect();
        Ok(entry.respond(drugs))
    }
}
