//! RPDB (RatingPosterDB) client — the caller-keyed enrichment source.
//!
//! RPDB is a paid API billed per request, so the client is strict about when
//! it talks to it at all:
//!
//! 1. The shared [`InvalidKeys`] set is consulted before any call; a key that
//!    ever produced an authorization-denied response is dead for the life of
//!    the process.
//! 2. A key must pass an explicit validation probe (a ratings request for a
//!    fixed well-known title) before any ratings/poster call is made.
//! 3. Only a 403 marks a key invalid. Timeouts, 5xx, and 404 leave the key
//!    eligible for future attempts.
//!
//! Posters are a higher subscription tier; a 403 on the poster call is
//! tolerated and only the ratings are used.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::MediaKind;
use crate::metadata::sources::EnrichmentProvider;
use crate::metadata::types::EnrichmentData;
use crate::state::InvalidKeys;

const RPDB_BASE_URL: &str = "https://api.ratingposterdb.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Well-known title used for key validation probes (The Avengers).
const VALIDATION_PROBE_ID: &str = "tt0848228";

// ---------------------------------------------------------------------------
// RPDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpdbRatings {
    imdb: Option<RpdbScore>,
    rotten_tomatoes: Option<RpdbScore>,
}

#[derive(Debug, Deserialize)]
struct RpdbScore {
    rating: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RpdbPoster {
    poster: Option<String>,
}

/// RPDB reports ratings as numbers or strings depending on the endpoint.
fn score_string(score: &Option<RpdbScore>) -> Option<String> {
    match score.as_ref()?.rating.as_ref()? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pick the identifier RPDB is queried with: IMDb ids directly, TMDB ids in
/// the provider's `tmdb:<id>` form, otherwise nothing to ask for.
fn query_id(imdb_id: Option<&str>, tmdb_id: Option<u64>) -> Option<String> {
    if let Some(id) = imdb_id.filter(|id| id.starts_with("tt")) {
        return Some(id.to_string());
    }
    tmdb_id.map(|id| format!("tmdb:{id}"))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// RPDB client sharing the process-wide invalid-key set.
pub struct RpdbClient {
    client: reqwest::Client,
    base_url: String,
    invalid_keys: Arc<InvalidKeys>,
}

impl RpdbClient {
    pub fn new(invalid_keys: Arc<InvalidKeys>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: RPDB_BASE_URL.to_string(),
            invalid_keys,
        }
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get(&self, path: &str, key: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(format!("{}{path}", self.base_url))
            .query(&[("api_key", key)])
            .send()
            .await
    }

    async fn fetch_ratings(&self, kind: MediaKind, id: &str, key: &str) -> Option<RpdbRatings> {
        let path = format!("/ratings/{}/{id}", kind.as_str());
        match self.get(&path, key).await {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(id, error = %e, "Failed to parse RPDB ratings response");
                    None
                }
            },
            Ok(resp) => {
                if resp.status() != StatusCode::FORBIDDEN {
                    warn!(id, status = %resp.status(), "RPDB ratings request rejected");
                }
                None
            }
            Err(e) => {
                warn!(id, error = %e, "RPDB ratings request failed");
                None
            }
        }
    }

    async fn fetch_poster(&self, kind: MediaKind, id: &str, key: &str) -> Option<String> {
        let path = format!("/posters/{}/{id}", kind.as_str());
        match self.get(&path, key).await {
            Ok(resp) if resp.status().is_success() => resp
                .json::<RpdbPoster>()
                .await
                .ok()
                .and_then(|body| body.poster),
            Ok(resp) => {
                match resp.status() {
                    // Posters need a Tier 1 subscription; not an error.
                    StatusCode::FORBIDDEN => {
                        debug!(id, "RPDB poster access denied (key tier too low)")
                    }
                    StatusCode::NOT_FOUND => debug!(id, "RPDB has no poster for id"),
                    status => warn!(id, %status, "RPDB poster request rejected"),
                }
                None
            }
            Err(e) => {
                warn!(id, error = %e, "RPDB poster request failed");
                None
            }
        }
    }
}

#[async_trait]
impl EnrichmentProvider for RpdbClient {
    async fn validate_key(&self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        if self.invalid_keys.is_known_invalid(key) {
            debug!("Enrichment key already known invalid, skipping validation");
            return false;
        }

        let path = format!("/ratings/movie/{VALIDATION_PROBE_ID}");
        match self.get(&path, key).await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) if resp.status() == StatusCode::FORBIDDEN => {
                self.invalid_keys.mark_invalid(key);
                false
            }
            Ok(resp) => {
                // Transient rejection; the key may still be good.
                warn!(status = %resp.status(), "RPDB key validation failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "RPDB key validation request failed");
                false
            }
        }
    }

    async fn fetch(
        &self,
        key: &str,
        kind: MediaKind,
        imdb_id: Option<&str>,
        tmdb_id: Option<u64>,
    ) -> Option<EnrichmentData> {
        let key = key.trim();
        if !self.validate_key(key).await {
            return None;
        }

        let Some(id) = query_id(imdb_id, tmdb_id) else {
            debug!("No RPDB-queryable id for entry, skipping enrichment");
            return None;
        };

        let (ratings, poster) = tokio::join!(
            self.fetch_ratings(kind, &id, key),
            self.fetch_poster(kind, &id, key),
        );

        let ratings = ratings.unwrap_or(RpdbRatings {
            imdb: None,
            rotten_tomatoes: None,
        });

        Some(EnrichmentData {
            poster,
            imdb_rating: score_string(&ratings.imdb),
            rotten_tomatoes_rating: score_string(&ratings.rotten_tomatoes),
        })
    }
}
