//! TMDB (The Movie Database) client — the primary metadata source.
//!
//! Implements [`DetailsProvider`] against the TMDB v3 REST API:
//! - Details by known numeric id, else search-by-title with a with-year
//!   retry, then details on the first hit.
//! - Separate images (logo) lookup keyed on the resolved id.
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` support (max 3 retries).
//!
//! Every failure is logged and resolved to `None`; nothing propagates.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::MediaKind;
use crate::metadata::sources::DetailsProvider;
use crate::metadata::types::{LogoImage, TitleDetails, TitleImages};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const TMDB_LOGO_BASE: &str = "https://image.tmdb.org/t/p/original";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbSearchHit>,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchHit {
    id: u64,
}

/// Movie and TV detail payloads merged into one shape: movies carry
/// `title`/`release_date`, TV shows `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
struct TmdbDetail {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbImagesResponse {
    #[serde(default)]
    logos: Vec<TmdbImage>,
}

#[derive(Debug, Deserialize)]
struct TmdbImage {
    file_path: String,
    iso_639_1: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// TMDB client with built-in rate limiting and 429 retry.
pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbClient {
    /// Create a client for the given API key and ISO-639-1 language tag
    /// (e.g. `"en-US"`).
    pub fn new(api_key: String, language: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        let quota = Quota::per_second(NonZeroU32::new(4).unwrap());

        Self {
            client,
            api_key,
            language,
            base_url: TMDB_BASE_URL.to_string(),
            rate_limiter: RateLimiter::direct(quota),
        }
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Execute a GET with rate limiting and 429-retry, returning the parsed
    /// JSON body or `None` on any failure.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = match self.client.get(url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(url, error = %e, "TMDB request failed");
                    return None;
                }
            };

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(retry = retries, wait_secs = wait, "TMDB returned 429, backing off");
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !resp.status().is_success() {
                // Images 404 for titles without artwork; not worth a warning.
                if resp.status() == StatusCode::NOT_FOUND {
                    debug!(url, "TMDB returned 404");
                } else {
                    warn!(url, status = %resp.status(), "TMDB returned error status");
                }
                return None;
            }

            match resp.json::<T>().await {
                Ok(body) => return Some(body),
                Err(e) => {
                    warn!(url, error = %e, "Failed to parse TMDB response");
                    return None;
                }
            }
        }
    }

    /// Build a full API URL with the API key and language parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{path}?api_key={}&language={}",
            self.base_url, self.api_key, self.language
        );
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }

    async fn fetch_detail(&self, kind: MediaKind, tmdb_id: u64) -> Option<TmdbDetail> {
        let url = self.url(&format!("/{}/{tmdb_id}", kind.tmdb_path()), &[]);
        debug!(url = %url, "TMDB details lookup");

        let detail: TmdbDetail = self.get_json(&url).await?;

        // TMDB occasionally resolves a search hit to the other medium; the
        // record is still served, but flag it for diagnosis.
        if let Some(ref media_type) = detail.media_type {
            if media_type != kind.tmdb_path() {
                warn!(
                    tmdb_id,
                    expected = kind.tmdb_path(),
                    got = %media_type,
                    "TMDB returned mismatched media type"
                );
            }
        }

        Some(detail)
    }

    /// Search for a title and return the first hit's id. Tries without the
    /// year first; an empty result set is retried with the year constraint
    /// when one is known.
    async fn search_first_id(
        &self,
        kind: MediaKind,
        title: &str,
        year: Option<&str>,
    ) -> Option<u64> {
        let path = format!("/search/{}", kind.tmdb_path());

        let url = self.url(&path, &[("query", title)]);
        debug!(url = %url, "TMDB search");
        let body: Option<TmdbSearchResponse> = self.get_json(&url).await;

        if let Some(hit) = body.as_ref().and_then(|b| b.results.first()) {
            return Some(hit.id);
        }

        let year = year?;
        let url = self.url(&path, &[("query", title), ("year", year)]);
        debug!(url = %url, "TMDB search retry with year");
        let body: TmdbSearchResponse = self.get_json(&url).await?;
        body.results.first().map(|hit| hit.id)
    }
}

#[async_trait]
impl DetailsProvider for TmdbClient {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn title_details(
        &self,
        kind: MediaKind,
        tmdb_id: Option<u64>,
        title: &str,
        year: Option<&str>,
    ) -> Option<TitleDetails> {
        let id = match tmdb_id {
            Some(id) => id,
            None => self.search_first_id(kind, title, year).await?,
        };

        let detail = self.fetch_detail(kind, id).await?;

        Some(TitleDetails {
            tmdb_id: Some(detail.id),
            title: detail.title.or(detail.name),
            overview: detail.overview.filter(|o| !o.is_empty()),
            release_date: detail.release_date.or(detail.first_air_date),
            poster: detail.poster_path.map(|p| format!("{TMDB_POSTER_BASE}{p}")),
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
        })
    }

    async fn title_images(&self, kind: MediaKind, tmdb_id: u64) -> Option<TitleImages> {
        let url = self.url(&format!("/{}/{tmdb_id}/images", kind.tmdb_path()), &[]);
        debug!(url = %url, "TMDB images lookup");

        let resp: TmdbImagesResponse = self.get_json(&url).await?;

        Some(TitleImages {
            logos: resp
                .logos
                .into_iter()
                .map(|img| LogoImage {
                    url: format!("{TMDB_LOGO_BASE}{}", img.file_path),
                    language: img.iso_639_1,
                })
                .collect(),
        })
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";
