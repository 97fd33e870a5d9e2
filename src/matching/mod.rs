//! String-similarity scoring for approximate search.
//!
//! The approximate search policy only depends on the [`SimilarityScorer`]
//! trait, so the scoring algorithm can be swapped without touching the
//! search or refine logic.

pub mod similarity;

pub use similarity::{
    normalize_text, LevenshteinScorer, NucleoScorer, ScorerKind, SimilarityScorer,
    TokenSortScorer,
};
