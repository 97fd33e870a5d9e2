//! Delimited-text catalog source.
//!
//! Accepts both column layouts seen in the wild: the short English headers
//! (`drug_id`, `brand_name`, ...) and the Dutch G-Standaard export headers
//! (`HPKODE`, `NMNAAM`, `ATOMS`, ...). Extra columns are ignored.

use super::CatalogSource;
use crate::domain::{DrugId, KetoStatus};
use crate::error::{CatalogError, CatalogResult};
use crate::models::Drug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Text encoding of the catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
}

impl FromStr for CatalogEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(CatalogEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(CatalogEncoding::Latin1),
            other => Err(format!("unsupported encoding: {}", other)),
        }
    }
}

/// One row as it appears in the file.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "drug_id", alias = "HPKODE")]
    id: Option<String>,

    #[serde(rename = "brand_name", alias = "NMNAAM")]
    brand_name: Option<String>,

    #[serde(rename = "active_component", alias = "ATOMS")]
    active_substance: Option<String>,

    #[serde(rename = "atc_code", alias = "ATCODE")]
    atc_code: Option<String>,

    #[serde(rename = "administration_route", alias = "THNM50")]
    administration_route: Option<String>,

    #[serde(rename = "ketogenic_status", alias = "Handelsproduct Status")]
    status: Option<String>,

    #[serde(rename = "excipients", alias = "Generieke naam")]
    excipients: Option<String>,

    #[serde(rename = "non_ketogenic_excipients", alias = "Non-Ketoproof Excipients")]
    non_ketogenic_excipients: Option<String>,

    #[serde(rename = "unknown_excipients", alias = "Unknown Excipients")]
    unknown_excipients: Option<String>,
}

impl RawRow {
    fn into_drug(self, row: usize) -> CatalogResult<Drug> {
        let id = self
            .id
            .as_deref()
            .and_then(|raw| DrugId::new(raw).ok())
            .ok_or(CatalogError::MissingId { row })?;

        Ok(Drug {
            id,
            brand_name: clean(self.brand_name),
            active_substance: clean(self.active_substance),
            atc_code: clean(self.atc_code),
            administration_route: clean(self.administration_route),
            status: self
                .status
                .as_deref()
                .map(KetoStatus::normalize)
                .unwrap_or_default(),
            excipients: clean(self.excipients),
            non_ketogenic_excipients: clean(self.non_ketogenic_excipients),
            unknown_excipients: clean(self.unknown_excipients),
        })
    }
}

/// Trim, collapse internal whitespace, and turn blanks into `None`.
fn clean(value: Option<String>) -> Option<String> {
    let value = value?;
    let collapsed = WHITESPACE_RUN.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Reads the catalog from a delimited file with a header row.
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    path: PathBuf,
    delimiter: u8,
    encoding: CatalogEncoding,
}

impl CsvCatalogSource {
    /// Comma-delimited UTF-8 source at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
            encoding: CatalogEncoding::Utf8,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: CatalogEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Parse rows from in-memory bytes.
    pub fn parse(&self, bytes: &[u8]) -> CatalogResult<Vec<Drug>> {
        let transcoded;
        let input: &[u8] = match self.encoding {
            CatalogEncoding::Utf8 => bytes,
            CatalogEncoding::Latin1 => {
                transcoded = bytes.iter().map(|&b| b as char).collect::<String>();
                transcoded.as_bytes()
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let mut rows = Vec::new();
        for (idx, record) in reader.deserialize::<RawRow>().enumerate() {
            let raw = record?;
            rows.push(raw.into_drug(idx + 1)?);
        }

        if rows.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(rows)
    }
}

impl CatalogSource for CsvCatalogSource {
    fn load(&self) -> CatalogResult<Vec<Drug>> {
        tracing::debug!(
            "Reading catalog from {} (delimiter {:?}, {:?})",
            self.path.display(),
            self.delimiter as char,
            self.encoding
        );

        let bytes = std::fs::read(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        self.parse(&bytes)
    }
}
