//! Trait seams between the resolver and the upstream source clients.
//!
//! Every method is infallible by contract: a client that cannot produce data
//! — timeout, transport error, bad payload, provider outage — resolves to
//! `None` (or `false`) so the merge can proceed with its fallbacks. Nothing
//! an upstream does may abort an item, let alone a batch.

use async_trait::async_trait;

use crate::catalog::MediaKind;

use super::types::{EnrichmentData, RatingsRecord, TitleDetails, TitleImages};

/// Primary metadata lookups (details and artwork).
#[async_trait]
pub trait DetailsProvider: Send + Sync {
    /// Whether the provider is configured with credentials.
    fn is_available(&self) -> bool;

    /// Resolve details by known provider id, or by title search when no id is
    /// known. Phase one of the two-phase resolution: the returned record's
    /// `tmdb_id` keys the dependent [`title_images`](Self::title_images) call.
    async fn title_details(
        &self,
        kind: MediaKind,
        tmdb_id: Option<u64>,
        title: &str,
        year: Option<&str>,
    ) -> Option<TitleDetails>;

    /// Fetch artwork for an id resolved by [`title_details`](Self::title_details).
    async fn title_images(&self, kind: MediaKind, tmdb_id: u64) -> Option<TitleImages>;
}

/// Secondary plot/rating lookups, keyed by the IMDb id family only.
#[async_trait]
pub trait RatingsProvider: Send + Sync {
    fn is_available(&self) -> bool;

    async fn by_imdb_id(&self, imdb_id: &str) -> Option<RatingsRecord>;
}

/// Caller-keyed enrichment lookups (ratings and poster overrides).
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Validate a key with the provider. Implementations must record an
    /// authorization-denied response so the key is never probed again, and
    /// must treat a key already known rejected as invalid without a call.
    async fn validate_key(&self, key: &str) -> bool;

    /// Fetch enrichment data. Returns `None` unless the key validates.
    async fn fetch(
        &self,
        key: &str,
        kind: MediaKind,
        imdb_id: Option<&str>,
        tmdb_id: Option<u64>,
    ) -> Option<EnrichmentData>;
}

/// Lightweight reachability probe for candidate image URLs.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Whether the URL serves an image. Probe failures of any kind mean
    /// "not usable", never an error.
    async fn is_usable(&self, url: &str) -> bool;
}
