//! Query validation and search outcomes.

/// Queries shorter than this many characters are not searched.
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

/// A trimmed query that passed the minimum-length guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuery(String);

impl ValidQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The query was too short to search. This is a prompt for more input, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientQuery {
    pub min_length: usize,
    pub actual_length: usize,
}

/// Rejects queries shorter than the configured minimum.
#[derive(Debug, Clone, Copy)]
pub struct QueryGuard {
    min_length: usize,
}

impl QueryGuard {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length: min_length.max(1),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Trim the query and check its length in characters.
    pub fn check(&self, raw: &str) -> Result<ValidQuery, InsufficientQuery> {
        let trimmed = raw.trim();
        let actual_length = trimmed.chars().count();
        if actual_length < self.min_length {
            return Err(InsufficientQuery {
                min_length: self.min_length,
                actual_length,
            });
        }
        Ok(ValidQuery(trimmed.to_string()))
    }
}

impl Default for QueryGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_LENGTH)
    }
}

/// Result of a guarded search followed by refinement.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    /// The query was too short; the engine was not run.
    InsufficientQuery { min_length: usize },

    /// The search ran but nothing survived matching and filtering.
    EmptyResult,

    /// Matching rows, in display order.
    Found(Vec<T>),
}

impl<T> SearchOutcome<T> {
    /// Wrap refined rows, mapping an empty list to `EmptyResult`.
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            SearchOutcome::EmptyResult
        } else {
            SearchOutcome::Found(rows)
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            SearchOutcome::Found(rows) => rows,
            _ => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

impl<T> From<InsufficientQuery> for SearchOutcome<T> {
    fn from(err: InsufficientQuery) -> Self {
        SearchOutcome::InsufficientQuery {
            min_length: err.min_length,
        }
    }
}
