// src/domain/filter.rs

use crate::domain::site::SiteRecord;
use std::collections::HashMap;

/// Read-only filter over a record sequence.
///
/// Text search matches when any column's string form contains the term,
/// case-insensitively. Market and RSM are exact matches. Active criteria
/// are ANDed; an empty filter passes everything.
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    pub search: Option<String>,
    pub market: Option<String>,
    pub rsm: Option<String>,
}

impl RecordFilter {
    /// Builds a filter from request query parameters, treating blank
    /// values as absent.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let take = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        RecordFilter {
            search: take("search"),
            market: take("market"),
            rsm: take("rsm"),
        }
    }

    pub fn matches(&self, record: &SiteRecord) -> bool {
        if let Some(market) = &self.market {
            if &record.market != market {
                return false;
            }
        }
        if let Some(rsm) = &self.rsm {
            if &record.rsm != rsm {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            if !record
                .column_values()
                .iter()
                .any(|v| v.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }

    /// A lazy, restartable view over the sequence. Nothing is evaluated
    /// until iteration, and `iter` can be called again for a fresh pass.
    pub fn view<'a>(&'a self, records: &'a [SiteRecord]) -> FilteredView<'a> {
        FilteredView {
            records,
            filter: self,
        }
    }
}

pub struct FilteredView<'a> {
    records: &'a [SiteRecord],
    filter: &'a RecordFilter,
}

impl<'a> FilteredView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a SiteRecord> + '_ {
        self.records.iter().filter(|r| self.filter.matches(r))
    }
}
