//! Drug model representing one row of the catalog.

use crate::domain::{DrugId, KetoStatus};
use serde::Serialize;

/// A drug product entry from the catalog.
///
/// Text fields that are missing or blank in the source are `None`; they are
/// never searched and never cause an error.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Drug {
    /// Unique product identifier (HPK code)
    pub id: DrugId,

    /// Brand name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,

    /// Active substance name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_substance: Option<String>,

    /// ATC classification code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atc_code: Option<String>,

    /// Administration route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administration_route: Option<String>,

    /// Ketogenic status, always normalized
    pub status: KetoStatus,

    /// All excipients (display only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excipients: Option<String>,

    /// Excipients known not to be ketogenic (display only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_ketogenic_excipients: Option<String>,

    /// Excipients with unknown status (display only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_excipients: Option<String>,
}

impl Drug {
    /// Create a drug with only an identifier and a status.
    pub fn new(id: DrugId, status: KetoStatus) -> Self {
        Self {
            id,
            brand_name: None,
            active_substance: None,
            atc_code: None,
            administration_route: None,
            status,
            excipients: None,
            non_ketogenic_excipients: None,
            unknown_excipients: None,
        }
    }

    /// Builder-style setter for the brand name.
    pub fn with_brand_name(mut self, brand_name: impl Into<String>) -> Self {
        self.brand_name = Some(brand_name.into());
        self
    }

    /// Builder-style setter for the active substance.
    pub fn with_active_substance(mut self, substance: impl Into<String>) -> Self {
        self.active_substance = Some(substance.into());
        self
    }

    /// Builder-style setter for the ATC code.
    pub fn with_atc_code(mut self, atc_code: impl Into<String>) -> Self {
        self.atc_code = Some(atc_code.into());
        self
    }

    /// Builder-style setter for the administration route.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.administration_route = Some(route.into());
        self
    }

    /// Field values the search engine looks at, in a fixed order:
    /// brand name, active substance, identifier, ATC code.
    ///
    /// Absent fields are skipped.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.brand_name.as_deref(),
            self.active_substance.as_deref(),
            Some(self.id.as_str()),
            self.atc_code.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Title used in listings: brand name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.brand_name.as_deref().unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drug(id: &str) -> Drug {
        Drug::new(DrugId::new(id).unwrap(), KetoStatus::Yes)
    }

    #[test]
    fn test_searchable_fields_order() {
        let d = drug("123")
            .with_brand_name("Keppra")
            .with_active_substance("levetiracetam")
            .with_atc_code("N03AX14");

        let fields: Vec<&str> = d.searchable_fields().collect();
        assert_eq!(fields, vec!["Keppra", "levetiracetam", "123", "N03AX14"]);
    }

    #[test]
    fn test_searchable_fields_skip_missing() {
        let d = drug("123").with_atc_code("N03AX14");
        let fields: Vec<&str> = d.searchable_fields().collect();
        assert_eq!(fields, vec!["123", "N03AX14"]);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(drug("123").display_name(), "123");
        assert_eq!(drug("123").with_brand_name("Keppra").display_name(), "Keppra");
    }

    #[test]
    fn test_serialization_omits_missing_fields() {
        let json = serde_json::to_value(drug("123").with_brand_name("Keppra")).unwrap();
        assert_eq!(json["id"], "123");
        assert_eq!(json["brand_name"], "Keppra");
        assert_eq!(json["status"], "Yes");
        assert!(json.get("atc_code").is_none());
    }
}
