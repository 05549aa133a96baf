//! Shared data types for the metadata pipeline.
//!
//! [`CatalogMeta`] is the normalized output record served to clients; the
//! remaining types are the partial records each source client returns for the
//! resolver to merge.

use serde::{Deserialize, Serialize};

use crate::catalog::MediaKind;

// ---------------------------------------------------------------------------
// Normalized output record
// ---------------------------------------------------------------------------

/// The merged metadata record for one catalog title.
///
/// Poster and description are always populated: the merge policy guarantees a
/// terminal fallback for both. The rotten-tomatoes field is present only when
/// the enrichment provider supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMeta {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: MediaKind,

    /// Display name; series entries have any trailing season suffix stripped.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    pub poster: String,

    pub description: String,

    /// Four-digit year, `"TBA"` for unscheduled titles, or `"N/A"`.
    pub release_info: String,

    pub imdb_rating: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotten_tomatoes_rating: Option<String>,

    /// Never empty; falls back to a fixed default pair.
    pub genres: Vec<String>,
}

// ---------------------------------------------------------------------------
// Per-source partial records
// ---------------------------------------------------------------------------

/// What the primary provider knows about a title.
#[derive(Debug, Clone, Default)]
pub struct TitleDetails {
    /// The provider's numeric id, once resolved; keys the images lookup.
    pub tmdb_id: Option<u64>,
    pub title: Option<String>,
    pub overview: Option<String>,
    /// Release or first-air date as the provider reports it (`YYYY-MM-DD`).
    pub release_date: Option<String>,
    /// Full poster URL.
    pub poster: Option<String>,
    pub genres: Vec<String>,
}

/// Artwork from the primary provider.
#[derive(Debug, Clone, Default)]
pub struct TitleImages {
    pub logos: Vec<LogoImage>,
}

#[derive(Debug, Clone)]
pub struct LogoImage {
    pub url: String,
    /// ISO-639-1 language code, when the provider tags one.
    pub language: Option<String>,
}

impl TitleImages {
    /// The logo to serve: an English one when available, else the first.
    pub fn best_logo(&self) -> Option<&str> {
        self.logos
            .iter()
            .find(|l| l.language.as_deref() == Some("en"))
            .or_else(|| self.logos.first())
            .map(|l| l.url.as_str())
    }
}

/// What the secondary provider returned for an IMDb id.
///
/// `poster` is kept verbatim, including the provider's literal `"N/A"`
/// placeholder — filtering that placeholder is a merge-policy rule, not a
/// client concern. Plot and rating have the placeholder normalized away.
#[derive(Debug, Clone, Default)]
pub struct RatingsRecord {
    pub poster: Option<String>,
    pub plot: Option<String>,
    pub rating: Option<String>,
}

/// Ratings and poster override from the enrichment provider. Only produced
/// after the caller's key passed validation.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentData {
    pub poster: Option<String>,
    pub imdb_rating: Option<String>,
    pub rotten_tomatoes_rating: Option<String>,
}
