//! OMDb client — the secondary plot/rating source.
//!
//! OMDb is keyed by IMDb id; the resolver only calls it for entries in the
//! `tt…` id family. OMDb signals "not found" with an HTTP 200 carrying
//! `"Response": "False"` — that and every transport-level failure produce the
//! same empty record, so downstream merging never distinguishes the two.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::metadata::sources::RatingsProvider;
use crate::metadata::types::RatingsRecord;

const OMDB_BASE_URL: &str = "http://www.omdbapi.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OMDb's stand-in for a missing field.
const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Poster")]
    poster: Option<String>,

    #[serde(rename = "Plot")]
    plot: Option<String>,

    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,

    #[serde(rename = "Response")]
    response: Option<String>,

    #[serde(rename = "Error")]
    error: Option<String>,
}

/// OMDb client.
pub struct OmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_key,
            base_url: OMDB_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RatingsProvider for OmdbClient {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn by_imdb_id(&self, imdb_id: &str) -> Option<RatingsRecord> {
        let url = format!("{}/?i={imdb_id}&apikey={}", self.base_url, self.api_key);
        debug!(imdb_id, "OMDb lookup");

        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(imdb_id, error = %e, "OMDb request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(imdb_id, status = %resp.status(), "OMDb returned error status");
            return None;
        }

        let body: OmdbResponse = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(imdb_id, error = %e, "Failed to parse OMDb response");
                return None;
            }
        };

        if body.response.as_deref() == Some("False") {
            debug!(imdb_id, error = ?body.error, "OMDb has no record for id");
            return Some(RatingsRecord::default());
        }

        Some(RatingsRecord {
            // Kept verbatim: the "N/A" placeholder is filtered by the poster
            // merge rule, not here.
            poster: body.poster,
            plot: body.plot.filter(|p| p != PLACEHOLDER && !p.is_empty()),
            rating: body
                .imdb_rating
                .filter(|r| r != PLACEHOLDER && !r.is_empty()),
        })
    }
}
