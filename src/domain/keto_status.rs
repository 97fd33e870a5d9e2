//! Ketogenic status classification and its display indicator.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Whether a product's formulation is compatible with a ketogenic diet.
///
/// The declaration order is the reading order used everywhere results are
/// listed: confirmed ketogenic first, confirmed non-ketogenic last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum KetoStatus {
    Yes,
    #[default]
    Unknown,
    No,
}

impl KetoStatus {
    /// All statuses in canonical order.
    pub const ALL: [KetoStatus; 3] = [KetoStatus::Yes, KetoStatus::Unknown, KetoStatus::No];

    /// Normalize a raw catalog or user value.
    ///
    /// Case and surrounding whitespace are ignored. Anything that is not
    /// `yes` or `no` (including an empty value) is `Unknown`.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("yes") {
            KetoStatus::Yes
        } else if trimmed.eq_ignore_ascii_case("no") {
            KetoStatus::No
        } else {
            KetoStatus::Unknown
        }
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            KetoStatus::Yes => "Yes",
            KetoStatus::Unknown => "Unknown",
            KetoStatus::No => "No",
        }
    }

    /// Display indicator for this status.
    pub fn indicator(&self) -> StatusIndicator {
        match self {
            KetoStatus::Yes => StatusIndicator::Positive,
            KetoStatus::No => StatusIndicator::Negative,
            KetoStatus::Unknown => StatusIndicator::Neutral,
        }
    }
}

impl fmt::Display for KetoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KetoStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| KetoStatus::normalize(&s)).unwrap_or_default())
    }
}

/// Marker shown next to a product in result listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    Positive,
    Negative,
    Neutral,
}

impl StatusIndicator {
    /// Map a raw status value to an indicator.
    ///
    /// Only an exact `Yes` or `No` (after trimming) gets a definite marker;
    /// every other value, including other casings, is neutral. Callers are
    /// expected to normalize first.
    pub fn for_raw(raw: &str) -> Self {
        match raw.trim() {
            "Yes" => StatusIndicator::Positive,
            "No" => StatusIndicator::Negative,
            _ => StatusIndicator::Neutral,
        }
    }

    /// Colored marker glyph.
    pub fn marker(&self) -> &'static str {
        match self {
            StatusIndicator::Positive => "\u{1F7E2}",
            StatusIndicator::Negative => "\u{1F534}",
            StatusIndicator::Neutral => "\u{1F7E0}",
        }
    }

    /// Short label shown beside the marker.
    pub fn label(&self) -> &'static str {
        match self {
            StatusIndicator::Positive => "Ketoproof",
            StatusIndicator::Negative => "Niet Ketoproof",
            StatusIndicator::Neutral => "Onbekend",
        }
    }
}
