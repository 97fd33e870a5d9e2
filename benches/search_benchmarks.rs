//! Performance benchmarks for search functionality.
//!
//! These benchmarks measure search performance under various conditions:
//! - Each matching policy over catalogs of increasing size
//! - Each similarity scorer for approximate search
//! - The full service path (session touch, search, refine)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ketomed_mcp_server::catalog::Catalog;
use ketomed_mcp_server::domain::{DrugId, KetoStatus};
use ketomed_mcp_server::matching::ScorerKind;
use ketomed_mcp_server::models::Drug;
use ketomed_mcp_server::refine::RefineFilters;
use ketomed_mcp_server::search::{QueryGuard, SearchEngine, SearchPolicy};
use ketomed_mcp_server::services::{LookupService, LookupServiceImpl, SessionGate};
use ketomed_mcp_server::session::SessionRegistry;
use std::sync::Arc;
use tokio::runtime::Runtime;

const BRANDS: [&str; 8] = [
    "Keppra", "Depakine", "Tegretol", "Lamictal", "Paracetamol", "Ibuprofen", "Frisium", "Rivotril",
];
const ROUTES: [&str; 3] = ["Oraal", "Rectaal", "Intraveneus"];

/// Build a synthetic catalog with `size` rows.
fn synthetic_catalog(size: usize) -> Catalog {
    let rows = (0..size)
        .map(|i| {
            let brand = BRANDS[i % BRANDS.len()];
            let status = KetoStatus::ALL[i % KetoStatus::ALL.len()];
            Drug::new(DrugId::new(format!("{:07}", i)).unwrap(), status)
                .with_brand_name(format!("{} {}mg", brand, 50 * (i % 20 + 1)))
                .with_active_substance(format!("{}ine", brand.to_lowercase()))
                .with_atc_code(format!("N03A{:03}", i % 500))
                .with_route(ROUTES[i % ROUTES.len()])
        })
        .collect();
    Catalog::from_rows(rows).unwrap()
}

/// Benchmark each policy against growing catalogs.
fn bench_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_policy");

    for size in [1_000, 10_000] {
        let catalog = synthetic_catalog(size);
        for (name, policy) in [
            ("substring", SearchPolicy::Substring),
            ("keywords", SearchPolicy::AllKeywords),
            ("fuzzy", SearchPolicy::Approximate { limit: 5 }),
        ] {
            let engine = SearchEngine::new(policy);
            group.bench_with_input(BenchmarkId::new(name, size), &catalog, |b, catalog| {
                b.iter(|| engine.search(black_box("kepra 250"), catalog));
            });
        }
    }

    group.finish();
}

/// Benchmark the interchangeable scorers under the approximate policy.
fn bench_scorers(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuzzy_scorer");
    let catalog = synthetic_catalog(5_000);

    for kind in [ScorerKind::Levenshtein, ScorerKind::TokenSort, ScorerKind::Nucleo] {
        let engine =
            SearchEngine::new(SearchPolicy::Approximate { limit: 5 }).with_scorer(kind.build());
        group.bench_function(format!("{:?}", kind), |b| {
            b.iter(|| engine.search(black_box("depakin"), &catalog));
        });
    }

    group.finish();
}

/// Benchmark a search request through the lookup service.
fn bench_lookup_service(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = LookupServiceImpl::new(
        Arc::new(synthetic_catalog(10_000)),
        Arc::new(SearchEngine::new(SearchPolicy::AllKeywords)),
        QueryGuard::default(),
        SessionGate::new(SessionRegistry::default(), None),
    );
    let filters = RefineFilters::none().with_statuses([KetoStatus::Yes, KetoStatus::Unknown]);

    c.bench_function("lookup_service_search", |b| {
        b.iter(|| {
            rt.block_on(service.search("bench", black_box("paracetamol 500"), &filters))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_policies, bench_scorers, bench_lookup_service);
criterion_main!(benches);
