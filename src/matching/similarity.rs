//! Similarity scorers on a 0-100 scale.
//!
//! - [`LevenshteinScorer`]: normalized edit-distance ratio
//! - [`TokenSortScorer`]: edit-distance ratio after sorting words, so word
//!   order does not matter
//! - [`NucleoScorer`]: Smith-Waterman fuzzy score from `nucleo-matcher`,
//!   relative to the query's self-match score

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};
use std::str::FromStr;
use std::sync::Mutex;

/// Scores how similar a candidate string is to a query.
pub trait SimilarityScorer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Similarity from 0 (nothing in common) to 100 (identical after
    /// normalization).
    fn score(&self, query: &str, candidate: &str) -> u8;
}

/// Lowercase, trim and collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Calculate Levenshtein distance between two strings.
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix: Vec<Vec<usize>> = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    for (i, c1) in s1_chars.iter().enumerate() {
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            matrix[i + 1][j + 1] = (matrix[i][j + 1] + 1)
                .min(matrix[i + 1][j] + 1)
                .min(matrix[i][j] + cost);
        }
    }

    matrix[len1][len2]
}

/// `100 * (1 - distance / max_len)`, rounded.
fn ratio(a: &str, b: &str) -> u8 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let distance = levenshtein_distance(a, b);
    let similarity = 1.0 - (distance as f64 / max_len as f64);
    (similarity * 100.0).round() as u8
}

/// Normalized edit-distance ratio.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevenshteinScorer;

impl SimilarityScorer for LevenshteinScorer {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn score(&self, query: &str, candidate: &str) -> u8 {
        let query = normalize_text(query);
        let candidate = normalize_text(candidate);
        if query.is_empty() || candidate.is_empty() {
            return 0;
        }
        ratio(&query, &candidate)
    }
}

/// Edit-distance ratio over alphabetically sorted words.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenSortScorer;

impl TokenSortScorer {
    fn sorted_tokens(text: &str) -> String {
        let normalized = normalize_text(text);
        let mut tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }
}

impl SimilarityScorer for TokenSortScorer {
    fn name(&self) -> &'static str {
        "token_sort"
    }

    fn score(&self, query: &str, candidate: &str) -> u8 {
        let query = Self::sorted_tokens(query);
        let candidate = Self::sorted_tokens(candidate);
        if query.is_empty() || candidate.is_empty() {
            return 0;
        }
        ratio(&query, &candidate)
    }
}

/// Smith-Waterman fuzzy scoring via `nucleo-matcher`.
///
/// The raw nucleo score is unbounded, so it is expressed as a percentage of
/// the score the query would get against itself.
pub struct NucleoScorer {
    matcher: Mutex<Matcher>,
}

impl NucleoScorer {
    pub fn new() -> Self {
        Self {
            matcher: Mutex::new(Matcher::new(nucleo_matcher::Config::DEFAULT)),
        }
    }
}

impl Default for NucleoScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer for NucleoScorer {
    fn name(&self) -> &'static str {
        "nucleo"
    }

    fn score(&self, query: &str, candidate: &str) -> u8 {
        let query = normalize_text(query);
        if query.is_empty() || candidate.trim().is_empty() {
            return 0;
        }

        let pattern = Pattern::parse(&query, CaseMatching::Ignore, Normalization::Smart);
        let mut matcher = self
            .matcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut buf = Vec::new();

        let best = pattern
            .score(Utf32Str::new(&query, &mut buf), &mut matcher)
            .unwrap_or(0);
        if best == 0 {
            return 0;
        }

        buf.clear();
        let score = pattern
            .score(Utf32Str::new(candidate, &mut buf), &mut matcher)
            .unwrap_or(0);

        ((score as f64 / best as f64) * 100.0).round().min(100.0) as u8
    }
}

/// Which scorer the approximate policy should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerKind {
    Levenshtein,
    #[default]
    TokenSort,
    Nucleo,
}

impl ScorerKind {
    /// Construct the scorer.
    pub fn build(&self) -> Box<dyn SimilarityScorer> {
        match self {
            ScorerKind::Levenshtein => Box::new(LevenshteinScorer),
            ScorerKind::TokenSort => Box::new(TokenSortScorer),
            ScorerKind::Nucleo => Box::new(NucleoScorer::new()),
        }
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "levenshtein" => Ok(ScorerKind::Levenshtein),
            "token_sort" | "token-sort" => Ok(ScorerKind::TokenSort),
            "nucleo" => Ok(ScorerKind::Nucleo),
            other => Err(format!("unknown scorer: {}", other)),
        }
    }
}
