//! Per-item metadata resolution and merge.
//!
//! [`ItemResolver`] turns one [`CatalogEntry`] into one [`CatalogMeta`] by
//! fanning out to the source clients concurrently and merging whatever came
//! back under a fixed precedence policy. The merge has a terminal fallback
//! for every field, so a fully-degraded item still produces a well-formed
//! record; only an entry missing its identifier, type, or title resolves to
//! nothing at all.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{release_year, CatalogEntry, IdKind, MediaKind, TitleId};

use super::sources::{DetailsProvider, EnrichmentProvider, ImageProbe, RatingsProvider};
use super::types::{CatalogMeta, EnrichmentData, RatingsRecord, TitleDetails, TitleImages};

// ---------------------------------------------------------------------------
// Merge-policy constants
// ---------------------------------------------------------------------------

/// Served when no poster candidate survives the existence probe.
pub const FALLBACK_POSTER_URL: &str =
    "https://m.media-amazon.com/images/M/MV5BMTc5MDE2ODcwNV5BMl5BanBnXkFtZTgwMzI2NzQ2NzM@._V1_SX300.jpg";

/// Terminal description fallback.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Description used when the record was built without any provider lookups
/// because required API keys are not configured.
pub const MISSING_KEYS_DESCRIPTION: &str = "Metadata lookup unavailable (API key missing).";

/// Terminal genre fallback; the genre list is never empty.
pub const DEFAULT_GENRES: [&str; 2] = ["Action", "Adventure"];

const NOT_AVAILABLE: &str = "N/A";

/// The secondary provider's literal stand-in for a missing poster.
const OMDB_POSTER_PLACEHOLDER: &str = "N/A";

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves one catalog entry into a normalized metadata record.
pub struct ItemResolver {
    details: Arc<dyn DetailsProvider>,
    ratings: Arc<dyn RatingsProvider>,
    enrichment: Arc<dyn EnrichmentProvider>,
    probe: Arc<dyn ImageProbe>,
}

impl ItemResolver {
    pub fn new(
        details: Arc<dyn DetailsProvider>,
        ratings: Arc<dyn RatingsProvider>,
        enrichment: Arc<dyn EnrichmentProvider>,
        probe: Arc<dyn ImageProbe>,
    ) -> Self {
        Self {
            details,
            ratings,
            enrichment,
            probe,
        }
    }

    /// Whether the primary provider is configured at all. The assembler uses
    /// this to log the degraded mode once per catalog instead of per item.
    pub fn primary_available(&self) -> bool {
        self.details.is_available()
    }

    /// Resolve one entry. `None` only when the entry lacks an identifier, a
    /// recognised type, or a title; every other outcome is a full record.
    pub async fn resolve(
        &self,
        entry: &CatalogEntry,
        enrichment_key: Option<&str>,
    ) -> Option<CatalogMeta> {
        let Some(id) = entry.lookup_id() else {
            debug!(title = ?entry.title, "Skipping entry without identifier");
            return None;
        };
        let kind = match entry.kind {
            Some(kind) if kind != MediaKind::Unknown => kind,
            _ => {
                debug!(id = %id.as_str(), "Skipping entry without recognised type");
                return None;
            }
        };
        let Some(name) = entry.display_name() else {
            debug!(id = %id.as_str(), "Skipping entry without title");
            return None;
        };
        // display_name is only present when the raw title is.
        let title = entry.title.as_deref().unwrap_or_default();

        // Without the required keys there is nothing to ask upstream; serve
        // what the dataset itself knows.
        let needs_ratings_key = id.kind == IdKind::Imdb && !self.ratings.is_available();
        if !self.details.is_available() || needs_ratings_key {
            debug!(id = %id.as_str(), "Provider keys missing, serving entry-local metadata");
            return Some(self.local_record(entry, &id, kind, name, MISSING_KEYS_DESCRIPTION));
        }

        let known_tmdb_id = entry.effective_tmdb_id();

        let ratings_fut = async {
            match id.kind {
                IdKind::Imdb => self.ratings.by_imdb_id(id.as_str()).await,
                // Outside the provider's id family: skipped, not failed.
                _ => None,
            }
        };

        // Two-phase: details resolve the canonical id, the artwork lookup
        // fans out on it.
        let details_fut = async {
            let details = self
                .details
                .title_details(kind, known_tmdb_id, title, entry.release_year.as_deref())
                .await;
            let images = match details.as_ref().and_then(|d| d.tmdb_id) {
                Some(tmdb_id) => self.details.title_images(kind, tmdb_id).await,
                None => None,
            };
            (details, images)
        };

        let enrichment_fut = async {
            match enrichment_key {
                Some(key) => {
                    let imdb_id = (id.kind == IdKind::Imdb).then(|| id.as_str());
                    self.enrichment.fetch(key, kind, imdb_id, known_tmdb_id).await
                }
                None => None,
            }
        };

        let (ratings, (details, images), enrichment) =
            tokio::join!(ratings_fut, details_fut, enrichment_fut);

        if details.is_none() {
            warn!(id = %id.as_str(), title, "Primary metadata lookup produced nothing");
        }

        Some(
            self.merge(entry, &id, kind, name, details, images, ratings, enrichment)
                .await,
        )
    }

    #[allow(clippy::too_many_arguments)]
    async fn merge(
        &self,
        entry: &CatalogEntry,
        id: &TitleId,
        kind: MediaKind,
        name: String,
        details: Option<TitleDetails>,
        images: Option<TitleImages>,
        ratings: Option<RatingsRecord>,
        enrichment: Option<EnrichmentData>,
    ) -> CatalogMeta {
        let poster = self
            .choose_poster(entry, details.as_ref(), ratings.as_ref(), enrichment.as_ref())
            .await;

        let description = non_empty(entry.overview.as_deref())
            .or_else(|| non_empty(details.as_ref().and_then(|d| d.overview.as_deref())))
            .or_else(|| non_empty(ratings.as_ref().and_then(|r| r.plot.as_deref())))
            .unwrap_or(NO_DESCRIPTION)
            .to_string();

        let release_info = non_empty(entry.release_year.as_deref())
            .map(str::to_string)
            .or_else(|| {
                details
                    .as_ref()
                    .and_then(|d| d.release_date.as_deref())
                    .and_then(release_year)
                    .map(|y| y.to_string())
            })
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let imdb_rating = enrichment
            .as_ref()
            .and_then(|e| e.imdb_rating.clone())
            .or_else(|| ratings.as_ref().and_then(|r| r.rating.clone()))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let rotten_tomatoes_rating = enrichment
            .as_ref()
            .and_then(|e| e.rotten_tomatoes_rating.clone());

        let genres = match details {
            Some(ref d) if !d.genres.is_empty() => d.genres.clone(),
            _ => local_genres(entry),
        };

        CatalogMeta {
            id: id.as_str().to_string(),
            kind,
            name,
            logo: images
                .as_ref()
                .and_then(TitleImages::best_logo)
                .map(str::to_string),
            poster,
            description,
            release_info,
            imdb_rating,
            rotten_tomatoes_rating,
            genres,
        }
    }

    /// Poster precedence: enrichment override, the dataset's own URL, the
    /// primary provider, the secondary provider (placeholder excluded), then
    /// the fixed fallback. Every candidate must pass the existence probe; a
    /// failed probe falls through to the next source.
    async fn choose_poster(
        &self,
        entry: &CatalogEntry,
        details: Option<&TitleDetails>,
        ratings: Option<&RatingsRecord>,
        enrichment: Option<&EnrichmentData>,
    ) -> String {
        let candidates = [
            enrichment.and_then(|e| e.poster.as_deref()),
            non_empty(entry.poster.as_deref()),
            details.and_then(|d| d.poster.as_deref()),
            ratings
                .and_then(|r| r.poster.as_deref())
                .filter(|p| *p != OMDB_POSTER_PLACEHOLDER),
        ];

        for url in candidates.into_iter().flatten() {
            if self.probe.is_usable(url).await {
                return url.to_string();
            }
            debug!(url, "Poster candidate failed existence probe");
        }

        debug!(id = ?entry.lookup_id().map(|i| i.raw), "No usable poster, serving fallback");
        FALLBACK_POSTER_URL.to_string()
    }

    /// Record built purely from what the dataset knows, used both for the
    /// missing-credentials short circuit and as the degraded shape when a
    /// resolution cannot complete.
    fn local_record(
        &self,
        entry: &CatalogEntry,
        id: &TitleId,
        kind: MediaKind,
        name: String,
        default_description: &str,
    ) -> CatalogMeta {
        CatalogMeta {
            id: id.as_str().to_string(),
            kind,
            name,
            logo: None,
            poster: non_empty(entry.poster.as_deref())
                .unwrap_or(FALLBACK_POSTER_URL)
                .to_string(),
            description: non_empty(entry.overview.as_deref())
                .unwrap_or(default_description)
                .to_string(),
            release_info: non_empty(entry.release_year.as_deref())
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            imdb_rating: NOT_AVAILABLE.to_string(),
            rotten_tomatoes_rating: None,
            genres: local_genres(entry),
        }
    }
}

fn local_genres(entry: &CatalogEntry) -> Vec<String> {
    let genres = entry.genre_names();
    if genres.is_empty() {
        DEFAULT_GENRES.iter().map(|g| g.to_string()).collect()
    } else {
        genres
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
