//! Catalog assembly and the public resolution surface.
//!
//! [`CatalogService`] is what the serving layer talks to: it resolves a named
//! dataset into an ordered list of merged records, memoizes the result per
//! (dataset, sort directive, enrichment key), and owns the administrative
//! clear and key-validation operations.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::catalog::{sort_by_release_year, DatasetStore, SortDirective};
use crate::state::{AppState, CatalogCache};

use super::resolver::ItemResolver;
use super::sources::EnrichmentProvider;
use super::types::CatalogMeta;

/// Resolves, merges, and caches catalogs.
pub struct CatalogService {
    datasets: DatasetStore,
    resolver: ItemResolver,
    enrichment: Arc<dyn EnrichmentProvider>,
    state: Arc<AppState>,
}

impl CatalogService {
    pub fn new(
        datasets: DatasetStore,
        resolver: ItemResolver,
        enrichment: Arc<dyn EnrichmentProvider>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            datasets,
            resolver,
            enrichment,
            state,
        }
    }

    /// Resolve a catalog: cached list on a hit, otherwise sort the dataset,
    /// resolve every entry concurrently, and cache the result.
    ///
    /// The returned order is always the pre-resolution sorted order — items
    /// are reassembled by input position, never by completion order. Unknown
    /// dataset ids and malformed datasets yield an empty list, not an error.
    pub async fn resolve_catalog(
        &self,
        dataset_id: &str,
        directive: Option<SortDirective>,
        enrichment_key: Option<&str>,
    ) -> Arc<Vec<CatalogMeta>> {
        let enrichment_key = enrichment_key.map(str::trim).filter(|k| !k.is_empty());

        let cache_key = CatalogCache::compose_key(dataset_id, directive, enrichment_key);
        if let Some(cached) = self.state.cache.get(&cache_key) {
            debug!(dataset = dataset_id, "Serving cached catalog");
            return cached;
        }

        let Some(entries) = self.datasets.get(dataset_id) else {
            warn!(dataset = dataset_id, "Unknown catalog id");
            return Arc::new(Vec::new());
        };

        let mut entries = (*entries).clone();

        // A request with no directive may still carry a per-dataset default.
        let effective = directive.or_else(|| self.datasets.default_directive(dataset_id));
        if let Some(directive) = effective {
            debug!(dataset = dataset_id, sort = %directive, "Sorting catalog");
            sort_by_release_year(&mut entries, directive);
        }

        if !self.resolver.primary_available() {
            warn!(
                dataset = dataset_id,
                "Primary metadata provider not configured; serving entry-local metadata only"
            );
        }

        info!(dataset = dataset_id, items = entries.len(), "Assembling catalog");

        let resolutions = join_all(
            entries
                .iter()
                .map(|entry| self.resolver.resolve(entry, enrichment_key)),
        )
        .await;

        let metas: Vec<CatalogMeta> = resolutions.into_iter().flatten().collect();

        info!(
            dataset = dataset_id,
            resolved = metas.len(),
            "Catalog assembled"
        );

        let catalog = Arc::new(metas);
        self.state.cache.insert(cache_key, catalog.clone());
        catalog
    }

    /// Drop every cached catalog and forget every rejected enrichment key.
    pub fn clear_cache(&self) {
        self.state.clear();
    }

    /// Explicit on-demand key validation, with the same semantics (including
    /// invalid-key recording) as the check performed during resolution.
    pub async fn validate_enrichment_key(&self, key: &str) -> bool {
        self.enrichment.validate_key(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, MediaKind};
    use crate::metadata::sources::{
        DetailsProvider, EnrichmentProvider, ImageProbe, RatingsProvider,
    };
    use crate::metadata::types::{EnrichmentData, RatingsRecord, TitleDetails, TitleImages};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubDetails {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DetailsProvider for StubDetails {
        fn is_available(&self) -> bool {
            true
        }

        async fn title_details(
            &self,
            _kind: MediaKind,
            _tmdb_id: Option<u64>,
            _title: &str,
            _year: Option<&str>,
        ) -> Option<TitleDetails> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            None
        }

        async fn title_images(&self, _kind: MediaKind, _tmdb_id: u64) -> Option<TitleImages> {
            None
        }
    }

    struct StubRatings;

    #[async_trait]
    impl RatingsProvider for StubRatings {
        fn is_available(&self) -> bool {
            true
        }

        async fn by_imdb_id(&self, _imdb_id: &str) -> Option<RatingsRecord> {
            None
        }
    }

    struct StubEnrichment;

    #[async_trait]
    impl EnrichmentProvider for StubEnrichment {
        async fn validate_key(&self, _key: &str) -> bool {
            false
        }

        async fn fetch(
            &self,
            _key: &str,
            _kind: MediaKind,
            _imdb_id: Option<&str>,
            _tmdb_id: Option<u64>,
        ) -> Option<EnrichmentData> {
            None
        }
    }

    struct NoProbe;

    #[async_trait]
    impl ImageProbe for NoProbe {
        async fn is_usable(&self, _url: &str) -> bool {
            false
        }
    }

    fn entry(title: &str, year: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            id: Some(format!("marvel_{}", title.to_lowercase())),
            kind: Some(MediaKind::Movie),
            title: Some(title.to_string()),
            release_year: year.map(str::to_string),
            ..Default::default()
        }
    }

    fn service_with(datasets: DatasetStore) -> (Arc<CatalogService>, Arc<StubDetails>) {
        let details = Arc::new(StubDetails::default());
        let resolver = ItemResolver::new(
            details.clone(),
            Arc::new(StubRatings),
            Arc::new(StubEnrichment),
            Arc::new(NoProbe),
        );
        let service = CatalogService::new(
            datasets,
            resolver,
            Arc::new(StubEnrichment),
            Arc::new(AppState::new()),
        );
        (Arc::new(service), details)
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let datasets = DatasetStore::from_entries([(
            "mcu".to_string(),
            vec![entry("Iron Man", Some("2008")), entry("Thor", Some("2011"))],
        )]);
        let (service, details) = service_with(datasets);

        let first = service.resolve_catalog("mcu", None, None).await;
        assert_eq!(first.len(), 2);
        assert_eq!(details.calls.load(Ordering::SeqCst), 2);

        let second = service.resolve_catalog("mcu", None, None).await;
        assert_eq!(*first, *second);
        // No new upstream lookups.
        assert_eq!(details.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn directive_and_key_produce_distinct_cache_entries() {
        let datasets = DatasetStore::from_entries([(
            "mcu".to_string(),
            vec![entry("Iron Man", Some("2008")), entry("Thor", Some("2011"))],
        )]);
        let (service, details) = service_with(datasets);

        service.resolve_catalog("mcu", None, None).await;
        service
            .resolve_catalog("mcu", Some(SortDirective::New), None)
            .await;

        assert_eq!(details.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn unknown_dataset_is_empty_and_uncached() {
        let datasets = DatasetStore::from_entries([]);
        let (service, _) = service_with(datasets);

        let metas = service.resolve_catalog("nope", None, None).await;
        assert!(metas.is_empty());
    }

    #[tokio::test]
    async fn unresolvable_entries_are_dropped_from_output() {
        let broken = CatalogEntry {
            id: Some("x".into()),
            // no type, no title
            ..Default::default()
        };
        let datasets = DatasetStore::from_entries([(
            "mcu".to_string(),
            vec![entry("Iron Man", Some("2008")), broken],
        )]);
        let (service, _) = service_with(datasets);

        let metas = service.resolve_catalog("mcu", None, None).await;
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].name, "Iron Man");
    }

    #[tokio::test]
    async fn output_order_follows_sort_with_unknown_years_last() {
        let datasets = DatasetStore::from_entries([(
            "movies".to_string(),
            vec![entry("Future", Some("TBA")), entry("Classic", Some("2008"))],
        )]);
        let (service, _) = service_with(datasets);

        let old = service
            .resolve_catalog("movies", Some(SortDirective::Old), None)
            .await;
        let names: Vec<_> = old.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Classic", "Future"]);

        let new = service
            .resolve_catalog("movies", Some(SortDirective::New), None)
            .await;
        let names: Vec<_> = new.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Classic", "Future"]);
    }

    #[tokio::test]
    async fn dataset_default_directive_applies_without_explicit_sort() {
        // The built-in animations dataset defaults to oldest-first.
        let (service, _) = service_with(DatasetStore::load(None));

        let metas = service.resolve_catalog("animations", None, None).await;
        let years: Vec<_> = metas
            .iter()
            .map(|m| m.release_info.parse::<u16>().unwrap())
            .collect();
        let mut sorted = years.clone();
        sorted.sort_unstable();
        assert_eq!(years, sorted);
    }

    #[tokio::test]
    async fn clear_cache_forces_reassembly() {
        let datasets = DatasetStore::from_entries([(
            "mcu".to_string(),
            vec![entry("Iron Man", Some("2008"))],
        )]);
        let (service, details) = service_with(datasets);

        service.resolve_catalog("mcu", None, None).await;
        service.clear_cache();
        service.resolve_catalog("mcu", None, None).await;

        assert_eq!(details.calls.load(Ordering::SeqCst), 2);
    }
}
