//! Shared catalog fixtures and service wiring for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use ketomed_mcp_server::catalog::Catalog;
use ketomed_mcp_server::domain::{DrugId, KetoStatus};
use ketomed_mcp_server::models::Drug;
use ketomed_mcp_server::repositories::UserDataStore;
use ketomed_mcp_server::search::{QueryGuard, SearchEngine, SearchPolicy};
use ketomed_mcp_server::services::{
    BookmarkServiceImpl, HistoryServiceImpl, LookupServiceImpl, SessionGate,
};
use ketomed_mcp_server::session::SessionRegistry;
use std::sync::{Arc, Mutex};

pub fn drug(id: &str, brand: &str, status: KetoStatus) -> Drug {
    Drug::new(DrugId::new(id).unwrap(), status).with_brand_name(brand)
}

/// A small catalog covering every status and several routes.
pub fn sample_catalog() -> Arc<Catalog> {
    let rows = vec![
        drug("1001", "Depakine 500mg", KetoStatus::No)
            .with_active_substance("valproinezuur")
            .with_atc_code("N03AG01")
            .with_route("Oraal"),
        drug("1002", "Keppra 250mg", KetoStatus::Yes)
            .with_active_substance("levetiracetam")
            .with_atc_code("N03AX14")
            .with_route("Oraal"),
        drug("1003", "Paracetamol Actavis 500mg", KetoStatus::Unknown)
            .with_active_substance("paracetamol")
            .with_atc_code("N02BE01")
            .with_route("Oraal"),
        drug("1004", "Paracetamol Teva zetpil", KetoStatus::Yes)
            .with_active_substance("paracetamol")
            .with_atc_code("N02BE01")
            .with_route("Rectaal"),
        drug("1005", "Keppra infusie", KetoStatus::Yes)
            .with_active_substance("levetiracetam")
            .with_atc_code("N03AX14")
            .with_route("Intraveneus"),
        Drug::new(DrugId::new("1006").unwrap(), KetoStatus::Unknown),
    ];
    Arc::new(Catalog::from_rows(rows).unwrap())
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
}

/// Manually advanced clock.
#[derive(Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(start())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    pub fn clock(&self) -> ketomed_mcp_server::services::Clock {
        let now = self.now.clone();
        Arc::new(move || *now.lock().unwrap())
    }
}

/// All three services wired to one session gate.
pub struct Harness {
    pub lookup: LookupServiceImpl,
    pub bookmarks: BookmarkServiceImpl,
    pub history: HistoryServiceImpl,
    pub gate: SessionGate,
    pub clock: TestClock,
}

pub fn harness(store: Option<Arc<dyn UserDataStore>>) -> Harness {
    harness_with(sample_catalog(), SearchPolicy::AllKeywords, store)
}

pub fn harness_with(
    catalog: Arc<Catalog>,
    policy: SearchPolicy,
    store: Option<Arc<dyn UserDataStore>>,
) -> Harness {
    let clock = TestClock::new();
    let gate = SessionGate::new(SessionRegistry::new(30), store).with_clock(clock.clock());
    Harness {
        lookup: LookupServiceImpl::new(
            catalog.clone(),
            Arc::new(SearchEngine::new(policy)),
            QueryGuard::default(),
            gate.clone(),
        ),
        bookmarks: BookmarkServiceImpl::new(catalog, gate.clone()),
        history: HistoryServiceImpl::new(gate.clone()),
        gate,
        clock,
    }
}
