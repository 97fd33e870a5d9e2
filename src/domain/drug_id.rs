//! DrugId value object.

use super::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Longest identifier accepted from callers.
const MAX_ID_LENGTH: usize = 100;

/// A type-safe wrapper for catalog product identifiers.
///
/// Identifiers are trimmed and must not be empty. In the Dutch catalog layout
/// this is the HPK code.
///
/// # Example
///
/// ```
/// use ketomed_mcp_server::domain::DrugId;
///
/// let id = DrugId::new(" 1234567 ").unwrap();
/// assert_eq!(id.as_str(), "1234567");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrugId(String);

impl DrugId {
    /// Create a new DrugId, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyId` if nothing is left after trimming, and
    /// `ValidationError::IdTooLong` for absurdly long input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if id.len() > MAX_ID_LENGTH {
            return Err(ValidationError::IdTooLong(id.len()));
        }
        Ok(Self(id.to_string()))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

// Serde support - serialize as string
impl Serialize for DrugId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

// Serde support - deserialize from string with validation
impl<'de> Deserialize<'de> for DrugId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DrugId::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for DrugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
