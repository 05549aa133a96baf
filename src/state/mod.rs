//! Shared mutable application state.
//!
//! Exactly two structures are mutated concurrently at runtime: the set of
//! enrichment keys known to be rejected, and the assembled-catalog cache.
//! Both live here as explicit owned components handed around behind an
//! [`Arc`](std::sync::Arc), with one administrative reset covering both.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tracing::{info, warn};

use crate::catalog::SortDirective;
use crate::metadata::types::CatalogMeta;

// ---------------------------------------------------------------------------
// Invalid enrichment keys
// ---------------------------------------------------------------------------

/// Process-wide memory of enrichment keys the provider has rejected.
///
/// A key lands here only on an authorization-denied response, and once marked
/// it is never re-validated in-process: the enrichment provider bills per
/// request, and re-probing a dead key on every catalog item would burn quota
/// for nothing. Cleared only by [`AppState::clear`].
#[derive(Default)]
pub struct InvalidKeys {
    keys: DashSet<String>,
}

impl InvalidKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known_invalid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn mark_invalid(&self, key: &str) {
        if self.keys.insert(key.to_string()) {
            warn!(key_prefix = %redact(key), "Enrichment key marked invalid");
        }
    }

    pub fn clear(&self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// First four characters of a key, for logging.
fn redact(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}...")
}

// ---------------------------------------------------------------------------
// Catalog cache
// ---------------------------------------------------------------------------

/// Memoized assembled catalogs.
///
/// Unbounded and manually invalidated: the dataset universe is small and
/// static, so entries are only ever dropped by the administrative clear.
#[derive(Default)]
pub struct CatalogCache {
    entries: DashMap<String, Arc<Vec<CatalogMeta>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic composite key: `dataset|directive|enrichment-key`, with
    /// absent parts left empty so no value can collide with a directive name.
    pub fn compose_key(
        dataset_id: &str,
        directive: Option<SortDirective>,
        enrichment_key: Option<&str>,
    ) -> String {
        format!(
            "{dataset_id}|{}|{}",
            directive.map(|d| d.as_str()).unwrap_or(""),
            enrichment_key.unwrap_or("")
        )
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<CatalogMeta>>> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    pub fn insert(&self, key: String, catalog: Arc<Vec<CatalogMeta>>) {
        self.entries.insert(key, catalog);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// The application's shared mutable state.
pub struct AppState {
    pub cache: CatalogCache,
    pub invalid_keys: Arc<InvalidKeys>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            cache: CatalogCache::new(),
            invalid_keys: Arc::new(InvalidKeys::new()),
        }
    }

    /// Administrative reset: drops every cached catalog and forgets every
    /// rejected enrichment key.
    pub fn clear(&self) {
        let cached = self.cache.len();
        let keys = self.invalid_keys.len();
        self.cache.clear();
        self.invalid_keys.clear();
        info!(
            cached_catalogs = cached,
            invalid_keys = keys,
            "Cache and invalid enrichment keys cleared"
        );
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
