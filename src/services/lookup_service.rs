//! Lookup service layer.
//!
//! Business logic for catalog search, refinement and single-product lookup.

use super::session_gate::{SessionGate, SessionResponse};
use crate::catalog::Catalog;
use crate::domain::{DrugId, KetoStatus};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{AnalyticsAction, Drug};
use crate::refine::{refine, RefineFilters};
use crate::search::{QueryGuard, SearchEngine, SearchOutcome};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Result of a search request.
pub type LookupResponse = SessionResponse<SearchOutcome<Drug>>;

/// Values offered by the route and status filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub routes: Vec<String>,
    pub statuses: Vec<KetoStatus>,
}

/// One product and whether the session has it bookmarked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugDetail {
    pub drug: Drug,
    pub bookmarked: bool,
}

/// Lookup service trait for business operations.
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Search the catalog and refine the matches.
    ///
    /// A query below the minimum length never reaches the engine. Only a
    /// non-empty refined result is recorded in history.
    async fn search(
        &self,
        session_id: &str,
        query: &str,
        filters: &RefineFilters,
    ) -> ServiceResult<LookupResponse>;

    /// Fetch one product by identifier.
    async fn get_drug(
        &self,
        session_id: &str,
        drug_id: &str,
    ) -> ServiceResult<SessionResponse<DrugDetail>>;

    /// Distinct routes and statuses present in the catalog.
    async fn filter_options(&self, session_id: &str)
        -> ServiceResult<SessionResponse<FilterOptions>>;
}

/// Default implementation of LookupService.
pub struct LookupServiceImpl {
    catalog: Arc<Catalog>,
    engine: Arc<SearchEngine>,
    guard: QueryGuard,
    gate: SessionGate,
}

impl LookupServiceImpl {
    /// Create a new lookup service.
    pub fn new(
        catalog: Arc<Catalog>,
        engine: Arc<SearchEngine>,
        guard: QueryGuard,
        gate: SessionGate,
    ) -> Self {
        Self {
            catalog,
            engine,
            guard,
            gate,
        }
    }
}

#[async_trait]
impl LookupService for LookupServiceImpl {
    async fn search(
        &self,
        session_id: &str,
        query: &str,
        filters: &RefineFilters,
    ) -> ServiceResult<LookupResponse> {
        let now = self.gate.now();
        let mut entry = self.gate.enter(session_id, now).await;

        let query = match self.guard.check(query) {
            Ok(query) => query,
            Err(short) => {
                tracing::debug!(
                    "Query of {} characters below minimum {}",
                    short.actual_length,
                    short.min_length
                );
                return Ok(entry.respond(short.into()));
            }
        };

        let matches = self.engine.search(query.as_str(), &self.catalog);
        let match_count = matches.len();
        let refined = refine(matches, filters);
        tracing::debug!(
            "Search {:?}: {} matches, {} after refinement",
            query.as_str(),
            match_count,
            refined.len()
        );

        let outcome = SearchOutcome::from_rows(refined.into_iter().cloned().collect());

        if outcome.is_found() {
            self.gate
                .registry()
                .update(session_id, now, |s| s.record_search(query.as_str(), now));

            if let Some(store) = self.gate.store() {
                if let Err(e) = store.append_history(session_id, query.as_str()).await {
                    entry.warn(session_id, "record search history", &e);
                }
                if let Err(e) = store
                    .append_analytics_event(session_id, AnalyticsAction::Search, None)
                    .await
                {
                    entry.warn(session_id, "record search event", &e);
                }
            }
        }

        Ok(entry.respond(outcome))
    }

    async fn get_drug(
        &self,
        session_id: &str,
        drug_id: &str,
    ) -> ServiceResult<SessionResponse<DrugDetail>> {
        let now = self.gate.now();
        let entry = self.gate.enter(session_id, now).await;

        let id = DrugId::new(drug_id)?;
        let drug = self
            .catalog
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownDrug(id.to_string()))?;
        let bookmarked = self
            .gate
            .registry()
            .snapshot(session_id)
            .is_some_and(|s| s.is_bookmarked(&id));

        Ok(entry.respond(DrugDetail { drug, bookmarked }))
    }

    async fn filter_options(
        &self,
        session_id: &str,
    ) -> ServiceResult<SessionResponse<FilterOptions>> {
        let now = self.gate.now();
        let entry = self.gate.enter(session_id, now).await;

        let options = FilterOptions {
            routes: self.catalog.routes().into_iter().map(String::from).collect(),
            statuses: self.catalog.statuses(),
        };
        Ok(entry.respond(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchPolicy;
    use crate::session::SessionRegistry;

    fn drug(id: &str, brand: &str, status: KetoStatus, route: &str) -> Drug {
        Drug::new(DrugId::new(id).unwrap(), status)
            .with_brand_name(brand)
            .with_route(route)
    }

    fn service() -> LookupServiceImpl {
        let catalog = Catalog::from_rows(vec![
            drug("1", "Paracetamol Actavis 500mg", KetoStatus::No, "Oraal"),
            drug("2", "Paracetamol Teva 1g", KetoStatus::Yes, "Rectaal"),
            drug("3", "Ibuprofen Sandoz", KetoStatus::Unknown, "Oraal"),
        ])
        .unwrap();
        LookupServiceImpl::new(
            Arc::new(catalog),
            Arc::new(SearchEngine::new(SearchPolicy::AllKeywords)),
            QueryGuard::default(),
            SessionGate::new(SessionRegistry::new(30), None),
        )
    }

    #[tokio::test]
    async fn test_short_query_is_a_prompt() {
        let service = service();
        let response = service.search("s1", "pa", &RefineFilters::none()).await.unwrap();
        assert_eq!(
            response.value,
            SearchOutcome::InsufficientQuery { min_length: 3 }
        );
    }

    #[tokio::test]
    async fn test_search_orders_by_status_and_records_history() {
        let service = service();
        let response = service
            .search("s1", "paracetamol", &RefineFilters::none())
            .await
            .unwrap();

        let ids: Vec<&str> = response.value.rows().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let state = service.gate.registry().snapshot("s1").unwrap();
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0].term, "paracetamol");
    }

    #[tokio::test]
    async fn test_empty_result_is_not_recorded() {
        let service = service();
        let filters = RefineFilters::none().with_routes(["Intraveneus"]);
        let response = service.search("s1", "paracetamol", &filters).await.unwrap();

        assert_eq!(response.value, SearchOutcome::EmptyResult);
        assert!(service
            .gate
            .registry()
            .snapshot("s1")
            .unwrap()
            .history()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_drug() {
        let service = service();
        let detail = service.get_drug("s1", " 3 ").await.unwrap();
        assert_eq!(detail.value.drug.display_name(), "Ibuprofen Sandoz");
        assert!(!detail.value.bookmarked);

        let err = service.get_drug("s1", "999").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownDrug(_)));

        let err = service.get_drug("s1", "  ").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_filter_options() {
        let service = service();
        let options = service.filter_options("s1").await.unwrap().value;
        assert_eq!(options.routes, vec!["Oraal", "Rectaal"]);
        assert_eq!(options.statuses, KetoStatus::ALL.to_vec());
    }
}
