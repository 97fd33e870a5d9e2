//! Configuration management for the Ketomed MCP Server.
//!
//! This module handles loading and validating configuration from environment variables.
//! A `.env` file is read if present; nothing is printed to stdout, which MCP
//! uses for communication.

use crate::catalog::CatalogEncoding;
use crate::error::{ConfigError, ConfigResult};
use crate::matching::ScorerKind;
use crate::search::{SearchPolicy, DEFAULT_FUZZY_LIMIT, DEFAULT_MIN_QUERY_LENGTH};
use crate::session::{
    DEFAULT_INACTIVITY_MINUTES, DEFAULT_RECENT_SEARCH_LIMIT, MAX_INACTIVITY_MINUTES,
};
use std::env;
use std::path::PathBuf;

/// Configuration for the Ketomed MCP Server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the catalog file
    pub catalog_path: PathBuf,

    /// Catalog field delimiter (default: `,`)
    pub catalog_delimiter: u8,

    /// Catalog text encoding (default: UTF-8)
    pub catalog_encoding: CatalogEncoding,

    /// SQLite file for bookmarks and history; in-memory only when unset
    pub db_path: Option<PathBuf>,

    /// Idle minutes before a session is cleared (default: 30)
    pub inactivity_minutes: u64,

    /// Minimum query length in characters (default: 3)
    pub min_query_length: usize,

    /// Number of recent searches listed (default: 10)
    pub recent_search_limit: usize,

    /// Matching policy (default: all keywords)
    pub search_policy: SearchPolicy,

    /// Similarity scorer for approximate search (default: token sort)
    pub scorer: ScorerKind,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `KETOMED_CATALOG_PATH`: Path to the catalog file
    ///
    /// Optional environment variables:
    /// - `KETOMED_CATALOG_DELIMITER`: Single-character field delimiter (default: `,`)
    /// - `KETOMED_CATALOG_ENCODING`: `utf-8` or `latin-1` (default: `utf-8`)
    /// - `KETOMED_DB_PATH`: SQLite file for bookmarks and history
    /// - `SESSION_INACTIVITY_MINUTES`: Idle minutes before reset (default: 30)
    /// - `MIN_QUERY_LENGTH`: Minimum query length, at least 1 (default: 3)
    /// - `RECENT_SEARCH_LIMIT`: Recent searches listed (default: 10)
    /// - `SEARCH_POLICY`: `substring`, `keywords` or `fuzzy` (default: `keywords`)
    /// - `FUZZY_MAX_RESULTS`: Best values kept by fuzzy search, at least 1 (default: 5)
    /// - `FUZZY_SCORER`: `levenshtein`, `token_sort` or `nucleo` (default: `token_sort`)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        // We use dotenvy::dotenv() which doesn't print to stdout
        let _ = dotenvy::dotenv();

        let catalog_path = env::var("KETOMED_CATALOG_PATH")
            .map_err(|_| ConfigError::MissingVar("KETOMED_CATALOG_PATH".to_string()))?;

        if catalog_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "KETOMED_CATALOG_PATH".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        let catalog_delimiter = Self::parse_delimiter("KETOMED_CATALOG_DELIMITER", b',')?;

        let catalog_encoding = match env::var("KETOMED_CATALOG_ENCODING") {
            Ok(val) => val
                .parse::<CatalogEncoding>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: "KETOMED_CATALOG_ENCODING".to_string(),
                    reason,
                })?,
            Err(_) => CatalogEncoding::default(),
        };

        let db_path = env::var("KETOMED_DB_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let inactivity_minutes =
            Self::parse_env_u64("SESSION_INACTIVITY_MINUTES", DEFAULT_INACTIVITY_MINUTES)?;
        let min_query_length = Self::parse_env_usize("MIN_QUERY_LENGTH", DEFAULT_MIN_QUERY_LENGTH)?;
        let recent_search_limit =
            Self::parse_env_usize("RECENT_SEARCH_LIMIT", DEFAULT_RECENT_SEARCH_LIMIT)?;
        let fuzzy_max_results = Self::parse_env_usize("FUZZY_MAX_RESULTS", DEFAULT_FUZZY_LIMIT)?;

        if inactivity_minutes > MAX_INACTIVITY_MINUTES {
            return Err(ConfigError::InvalidValue {
                var: "SESSION_INACTIVITY_MINUTES".to_string(),
                reason: format!("Must be at most {}", MAX_INACTIVITY_MINUTES),
            });
        }

        if min_query_length == 0 {
            return Err(ConfigError::InvalidValue {
                var: "MIN_QUERY_LENGTH".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if fuzzy_max_results == 0 {
            return Err(ConfigError::InvalidValue {
                var: "FUZZY_MAX_RESULTS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        let search_policy = match env::var("SEARCH_POLICY") {
            Ok(val) => SearchPolicy::parse(&val, fuzzy_max_results).ok_or_else(|| {
                ConfigError::InvalidValue {
                    var: "SEARCH_POLICY".to_string(),
                    reason: format!("Must be substring, keywords or fuzzy, got: {}", val),
                }
            })?,
            Err(_) => SearchPolicy::default(),
        };

        let scorer = match env::var("FUZZY_SCORER") {
            Ok(val) => val
                .parse::<ScorerKind>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: "FUZZY_SCORER".to_string(),
                    reason,
                })?,
            Err(_) => ScorerKind::default(),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        Ok(Config {
            catalog_path: PathBuf::from(catalog_path),
            catalog_delimiter,
            catalog_encoding,
            db_path,
            inactivity_minutes,
            min_query_length,
            recent_search_limit,
            search_policy,
            scorer,
            log_level,
        })
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse a single-byte delimiter. `\t` and `tab` mean a tab.
    fn parse_delimiter(var_name: &str, default: u8) -> ConfigResult<u8> {
        let val = match env::var(var_name) {
            Ok(val) => val,
            Err(_) => return Ok(default),
        };
        if val == "\\t" || val.eq_ignore_ascii_case("tab") {
            return Ok(b'\t');
        }
        match val.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a single ASCII character, got: {:?}", val),
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog_path: PathBuf::new(),
            catalog_delimiter: b',',
            catalog_encoding: CatalogEncoding::default(),
            db_path: None,
            inactivity_minutes: DEFAULT_INACTIVITY_MINUTES,
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            recent_search_limit: DEFAULT_RECENT_SEARCH_LIMIT,
            search_policy: SearchPolicy::default(),
            scorer: ScorerKind::default(),
            log_level: "error".to_string(),
        }
    }
}
