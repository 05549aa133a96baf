//! Release-year ordering for catalog datasets.
//!
//! Sorting happens before any metadata resolution, on the raw dataset
//! entries; the resolved catalog preserves this order regardless of which
//! upstream lookups finish first.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use super::entry::CatalogEntry;

/// Requested sort direction for a catalog.
///
/// `New` is newest-first, `Old` is oldest-first. The wire values come from
/// the catalog URL's `genre` extra (`"new"` / `"old"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirective {
    New,
    Old,
}

impl SortDirective {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirective::New => "new",
            SortDirective::Old => "old",
        }
    }
}

impl std::str::FromStr for SortDirective {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(SortDirective::New),
            "old" => Ok(SortDirective::Old),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for SortDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract a release year from a raw dataset or provider date string.
///
/// Accepts exactly `YYYY` or `YYYY-MM-DD`. Anything else, including `"TBA"`
/// and the empty string, is an unknown year.
pub fn release_year(raw: &str) -> Option<u16> {
    let raw = raw.trim();
    let bytes = raw.as_bytes();

    let well_formed = match bytes.len() {
        4 => bytes.iter().all(|b| b.is_ascii_digit()),
        10 => {
            bytes[4] == b'-'
                && bytes[7] == b'-'
                && bytes
                    .iter()
                    .enumerate()
                    .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
        }
        _ => false,
    };

    if !well_formed {
        return None;
    }
    raw[..4].parse().ok()
}

fn entry_year(entry: &CatalogEntry) -> Option<u16> {
    entry.release_year.as_deref().and_then(release_year)
}

/// Stable sort by release year.
///
/// Entries whose year cannot be parsed are parked at the tail in both
/// directions, preserving their relative input order; an unresolvable date is
/// never treated as the earliest or newest release.
pub fn sort_by_release_year(entries: &mut [CatalogEntry], directive: SortDirective) {
    match directive {
        SortDirective::Old => {
            entries.sort_by_key(|e| match entry_year(e) {
                Some(year) => (false, year),
                None => (true, 0),
            });
        }
        SortDirective::New => {
            entries.sort_by_key(|e| match entry_year(e) {
                Some(year) => (false, Reverse(year)),
                None => (true, Reverse(0)),
            });
        }
    }
}
