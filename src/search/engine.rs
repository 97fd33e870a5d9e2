//! Search engine with interchangeable matching policies.
//!
//! A row matches when any of its searched fields (brand name, active
//! substance, identifier, ATC code) matches the query under the active
//! policy. Missing fields are skipped. Searching is a pure function of the
//! query and the catalog.

use crate::catalog::Catalog;
use crate::matching::{ScorerKind, SimilarityScorer};
use crate::models::Drug;
use std::collections::HashSet;
use std::fmt;

/// Number of distinct values the approximate policy keeps.
pub const DEFAULT_FUZZY_LIMIT: usize = 5;

/// How a query is matched against field values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPolicy {
    /// The whole lowercased query must be a substring of the field.
    Substring,

    /// Every whitespace-separated keyword must be a substring of the field.
    #[default]
    AllKeywords,

    /// Score every field value, keep the `limit` best distinct values, and
    /// return the rows holding any of them.
    Approximate { limit: usize },
}

impl SearchPolicy {
    /// Parse the configuration form: `substring`, `keywords` or `fuzzy`.
    pub fn parse(name: &str, fuzzy_limit: usize) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "substring" => Some(SearchPolicy::Substring),
            "keywords" | "all_keywords" => Some(SearchPolicy::AllKeywords),
            "fuzzy" | "approximate" => Some(SearchPolicy::Approximate {
                limit: fuzzy_limit.max(1),
            }),
            _ => None,
        }
    }
}

/// Matches queries against the catalog.
pub struct SearchEngine {
    policy: SearchPolicy,
    scorer: Box<dyn SimilarityScorer>,
}

impl SearchEngine {
    /// Create an engine with the default scorer for the approximate policy.
    pub fn new(policy: SearchPolicy) -> Self {
        Self {
            policy,
            scorer: ScorerKind::default().build(),
        }
    }

    /// Replace the similarity scorer used by the approximate policy.
    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn policy(&self) -> SearchPolicy {
        self.policy
    }

    /// Return the matching rows in catalog order.
    ///
    /// A query that is blank after trimming matches nothing. Callers are
    /// expected to apply the minimum-length guard before calling this.
    pub fn search<'a>(&self, query: &str, catalog: &'a Catalog) -> Vec<&'a Drug> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let results = match self.policy {
            SearchPolicy::Substring => catalog
                .rows()
                .iter()
                .filter(|row| row.searchable_fields().any(|f| substring_match(&needle, f)))
                .collect(),
            SearchPolicy::AllKeywords => {
                let keywords: Vec<&str> = needle.split_whitespace().collect();
                catalog
                    .rows()
                    .iter()
                    .filter(|row| row.searchable_fields().any(|f| keywords_match(&keywords, f)))
                    .collect()
            }
            SearchPolicy::Approximate { limit } => self.approximate(&needle, catalog, limit),
        };

        tracing::debug!(
            "Search {:?} with {:?} matched {} rows",
            query,
            self.policy,
            results.len()
        );
        results
    }

    fn approximate<'a>(&self, needle: &str, catalog: &'a Catalog, limit: usize) -> Vec<&'a Drug> {
        // Distinct values in first-seen order with their scores.
        let mut seen: HashSet<&str> = HashSet::new();
        let mut scored: Vec<(&str, u8)> = Vec::new();
        for row in catalog.rows() {
            for value in row.searchable_fields() {
                if seen.insert(value) {
                    scored.push((value, self.scorer.score(needle, value)));
                }
            }
        }

        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        let top: HashSet<&str> = scored
            .into_iter()
            .filter(|(_, score)| *score > 0)
            .take(limit)
            .map(|(value, _)| value)
            .collect();

        catalog
            .rows()
            .iter()
            .filter(|row| row.searchable_fields().any(|f| top.contains(f)))
            .collect()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchPolicy::default())
    }
}

impl fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("policy", &self.policy)
            .field("scorer", &self.scorer.name())
            .finish()
    }
}

/// `needle` must already be lowercased.
fn substring_match(needle: &str, field: &str) -> bool {
    field.to_lowercase().contains(needle)
}

/// Every keyword must occur in the field. Keywords must already be lowercased.
fn keywords_match(keywords: &[&str], field: &str) -> bool {
    let haystack = field.to_lowercase();
    !keywords.is_empty() && keywords.iter().all(|k| haystack.contains(k))
}
