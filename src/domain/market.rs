// src/domain/market.rs

use crate::errors::ServerError;
use serde::Deserialize;
use std::fs;

/// Shipped range table, compiled in as the fallback when the config file
/// is not present next to the binary.
const DEFAULT_RANGES_JSON: &str = include_str!("../../config/markets.json");

/// One row of the market range table: an inclusive numeric prefix range
/// mapped to the owning market and its responsible site manager.
///
/// The table is configuration data, not logic — it is loaded from
/// `config/markets.json` so ranges can be reassigned without touching
/// the resolver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketRange {
    pub from: u32,
    pub to: u32,
    pub market: String,
    pub rsm: String,
    pub rsm_email: String,
}

/// Maps free-text site identifiers to organizational metadata.
pub struct MarketResolver {
    ranges: Vec<MarketRange>,
}

impl MarketResolver {
    pub fn new(ranges: Vec<MarketRange>) -> Self {
        Self { ranges }
    }

    /// Loads the range table from a JSON file, falling back to the
    /// compiled-in table when the file does not exist.
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let json = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DEFAULT_RANGES_JSON.to_string(),
            Err(e) => {
                return Err(ServerError::BadRequest(format!(
                    "Failed to read market table {path}: {e}"
                )))
            }
        };
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ServerError> {
        let ranges: Vec<MarketRange> = serde_json::from_str(json)
            .map_err(|e| ServerError::BadRequest(format!("Invalid market table: {e}")))?;
        Ok(Self::new(ranges))
    }

    /// Resolves a site identifier to its market range.
    ///
    /// The prefix is the first three digits of the first run of at least
    /// three consecutive digits in the identifier. A missing prefix, or a
    /// prefix falling in a gap of the table, yields `None` — that is a
    /// normal "no autofill" outcome, not a failure. Ranges are checked in
    /// table order; the first match wins.
    pub fn resolve(&self, site_id: &str) -> Option<&MarketRange> {
        let prefix = extract_prefix(site_id)?;
        self.ranges
            .iter()
            .find(|r| r.from <= prefix && prefix <= r.to)
    }
}

/// First run of >=3 consecutive decimal digits, truncated to its first
/// three digits and parsed as an integer (0-999).
fn extract_prefix(value: &str) -> Option<u32> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start >= 3 {
                return value[start..start + 3].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}
