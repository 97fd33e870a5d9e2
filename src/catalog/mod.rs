//! The drug catalog: an immutable, explicitly owned reference table.
//!
//! The catalog is loaded once at startup through a [`CatalogSource`] and then
//! shared read-only (behind an `Arc`) by every request. Nothing mutates it
//! after construction, so no locking is needed.

pub mod csv_source;

pub use csv_source::{CatalogEncoding, CsvCatalogSource};

use crate::domain::{DrugId, KetoStatus};
use crate::error::{CatalogError, CatalogResult};
use crate::models::Drug;
use std::collections::HashMap;

/// Something that can supply the full set of catalog rows.
pub trait CatalogSource {
    /// Load every row. Called once; the result is wrapped in a [`Catalog`].
    fn load(&self) -> CatalogResult<Vec<Drug>>;
}

/// Immutable catalog with an identifier index.
#[derive(Debug, Clone)]
pub struct Catalog {
    rows: Vec<Drug>,
    by_id: HashMap<DrugId, usize>,
}

impl Catalog {
    /// Build a catalog from rows, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two rows share an identifier.
    pub fn from_rows(rows: Vec<Drug>) -> CatalogResult<Self> {
        let mut by_id = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if by_id.insert(row.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateId(row.id.to_string()));
            }
        }
        Ok(Self { rows, by_id })
    }

    /// Load from a source and build the catalog.
    pub fn load(source: &dyn CatalogSource) -> CatalogResult<Self> {
        let rows = source.load()?;
        let catalog = Self::from_rows(rows)?;
        tracing::info!("Catalog loaded with {} products", catalog.len());
        Ok(catalog)
    }

    /// All rows in catalog order.
    pub fn rows(&self) -> &[Drug] {
        &self.rows
    }

    /// Look up a row by identifier.
    pub fn get(&self, id: &DrugId) -> Option<&Drug> {
        self.by_id.get(id).map(|&idx| &self.rows[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct administration routes, in first-seen order.
    pub fn routes(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for route in self
            .rows
            .iter()
            .filter_map(|row| row.administration_route.as_deref())
        {
            if !seen.contains(&route) {
                seen.push(route);
            }
        }
        seen
    }

    /// Distinct statuses present in the catalog, in canonical order.
    pub fn statuses(&self) -> Vec<KetoStatus> {
        KetoStatus::ALL
            .into_iter()
            .filter(|status| self.rows.iter().any(|row| row.status == *status))
            .collect()
    }
}
