//! Result refinement: status ordering and categorical filters.
//!
//! Rows are first stable-sorted by ketogenic status (Yes, Unknown, No) and
//! then narrowed by the optional route and status filters. An empty filter
//! set means "no restriction".

use crate::domain::KetoStatus;
use crate::models::Drug;
use std::borrow::Borrow;
use std::collections::BTreeSet;

/// Optional categorical filters. Both empty means everything passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefineFilters {
    /// Allowed administration routes (exact match)
    pub routes: BTreeSet<String>,

    /// Allowed ketogenic statuses
    pub statuses: BTreeSet<KetoStatus>,
}

impl RefineFilters {
    /// No restriction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build filters from raw user selections. Status values are normalized,
    /// blank routes are ignored.
    pub fn from_raw<R, S>(routes: R, statuses: S) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            routes: routes
                .into_iter()
                .map(|r| r.as_ref().trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            statuses: statuses
                .into_iter()
                .map(|s| KetoStatus::normalize(s.as_ref()))
                .collect(),
        }
    }

    pub fn with_routes<I: IntoIterator<Item = S>, S: Into<String>>(mut self, routes: I) -> Self {
        self.routes = routes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_statuses<I: IntoIterator<Item = KetoStatus>>(mut self, statuses: I) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.statuses.is_empty()
    }

    /// Whether a single row passes both filters.
    pub fn accepts(&self, drug: &Drug) -> bool {
        let route_ok = self.routes.is_empty()
            || drug
                .administration_route
                .as_ref()
                .is_some_and(|route| self.routes.contains(route));
        let status_ok = self.statuses.is_empty() || self.statuses.contains(&drug.status);
        route_ok && status_ok
    }
}

/// Order rows by status and apply the filters.
///
/// The sort is stable, so rows with equal status keep their incoming order.
/// Applying `refine` twice with the same filters gives the same result.
pub fn refine<T: Borrow<Drug>>(mut rows: Vec<T>, filters: &RefineFilters) -> Vec<T> {
    rows.sort_by_key(|row| row.borrow().status);
    if !filters.is_empty() {
        rows.retain(|row| filters.accepts(row.borrow()));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DrugId;

    fn drug(id: &str, status: KetoStatus, route: Option<&str>) -> Drug {
        let d = Drug::new(DrugId::new(id).unwrap(), status);
        match route {
            Some(r) => d.with_route(r),
            None => d,
        }
    }

    fn ids<T: Borrow<Drug>>(rows: &[T]) -> Vec<&str> {
        rows.iter().map(|d| d.borrow().id.as_str()).collect()
    }

    fn sample() -> Vec<Drug> {
        vec![
            drug("a", KetoStatus::No, Some("oraal")),
            drug("b", KetoStatus::Yes, Some("rectaal")),
            drug("c", KetoStatus::Unknown, None),
            drug("d", KetoStatus::Yes, Some("oraal")),
        ]
    }

    #[test]
    fn test_status_order_is_stable() {
        let rows = refine(sample(), &RefineFilters::none());
        assert_eq!(ids(&rows), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_refine_is_idempotent() {
        let once = refine(sample(), &RefineFilters::none());
        let twice = refine(once.clone(), &RefineFilters::none());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_refine_works_on_references() {
        let sample = sample();
        let refs: Vec<&Drug> = sample.iter().collect();
        let rows = refine(refs, &RefineFilters::none());
        assert_eq!(ids(&rows), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_route_filter() {
        let filters = RefineFilters::none().with_routes(["oraal"]);
        let rows = refine(sample(), &filters);
        assert_eq!(ids(&rows), vec!["d", "a"]);
    }

    #[test]
    fn test_route_filter_drops_rows_without_route() {
        let filters = RefineFilters::none().with_routes(["oraal", "rectaal"]);
        let rows = refine(sample(), &filters);
        assert!(!ids(&rows).contains(&"c"));
    }

    #[test]
    fn test_status_filter() {
        let filters = RefineFilters::none().with_statuses([KetoStatus::Unknown, KetoStatus::No]);
        let rows = refine(sample(), &filters);
        assert_eq!(ids(&rows), vec!["c", "a"]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let filters = RefineFilters::none()
            .with_routes(["oraal"])
            .with_statuses([KetoStatus::Yes]);
        let rows = refine(sample(), &filters);
        assert_eq!(ids(&rows), vec!["d"]);
    }

    #[test]
    fn test_filter_matching_nothing_is_not_the_same_as_no_filter() {
        let filters = RefineFilters::none().with_routes(["intraveneus"]);
        assert!(refine(sample(), &filters).is_empty());
        assert_eq!(refine(sample(), &RefineFilters::none()).len(), 4);
    }

    #[test]
    fn test_from_raw_normalizes() {
        let filters = RefineFilters::from_raw(["  oraal ", ""], [" yes", "NO", "whatever"]);
        assert_eq!(filters.routes.len(), 1);
        assert!(filters.routes.contains("oraal"));
        assert_eq!(
            filters.statuses.iter().copied().collect::<Vec<_>>(),
            vec![KetoStatus::Yes, KetoStatus::Unknown, KetoStatus::No]
        );
    }
}
