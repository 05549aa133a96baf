//! Catalog entry records and lookup-identifier parsing.
//!
//! A [`CatalogEntry`] is one title in a static dataset. Entries carry whatever
//! the dataset author knew up front (title, year, sometimes ids and a poster);
//! everything else is filled in by the metadata pipeline at request time.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Media kind
// ---------------------------------------------------------------------------

/// Content type of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    /// Unrecognised type string in the dataset; such entries are skipped.
    #[serde(other)]
    Unknown,
}

impl MediaKind {
    /// Wire name, also used in catalog URLs and enrichment lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Unknown => "unknown",
        }
    }

    /// Path segment used by the TMDB v3 API (`movie` / `tv`).
    pub fn tmdb_path(&self) -> &'static str {
        match self {
            MediaKind::Series => "tv",
            _ => "movie",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tagged lookup identifier
// ---------------------------------------------------------------------------

/// Identifier family of a lookup id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// IMDb-style id (`tt` followed by digits).
    Imdb,
    /// Internal `tmdb_<digits>` id carrying a TMDB numeric id.
    Tmdb,
    /// Anything else (dataset-internal ids such as `marvel_iron_man`).
    Unknown,
}

/// A parsed lookup identifier.
///
/// Produced once per entry by [`TitleId::parse`] and consumed everywhere else
/// without re-parsing. `raw` always preserves the original string so it can be
/// echoed back as the record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleId {
    pub kind: IdKind,
    pub raw: String,
}

impl TitleId {
    /// Classify a raw identifier into its family.
    pub fn parse(raw: &str) -> Self {
        let kind = if raw
            .strip_prefix("tt")
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        {
            IdKind::Imdb
        } else if raw
            .strip_prefix("tmdb_")
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        {
            IdKind::Tmdb
        } else {
            IdKind::Unknown
        };

        Self {
            kind,
            raw: raw.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The numeric TMDB id carried by a `tmdb_<digits>` identifier.
    pub fn tmdb_numeric(&self) -> Option<u64> {
        match self.kind {
            IdKind::Tmdb => self.raw.strip_prefix("tmdb_")?.parse().ok(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog entry
// ---------------------------------------------------------------------------

/// A genre label in a dataset, either an object (`{"name": "Action"}`) or a
/// bare string. Both forms appear in the wild.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenreTag {
    Named { name: String },
    Plain(String),
}

impl GenreTag {
    pub fn name(&self) -> &str {
        match self {
            GenreTag::Named { name } => name,
            GenreTag::Plain(name) => name,
        }
    }
}

/// One title in a static dataset. Loaded once at startup, never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Dataset-internal identifier (e.g. `marvel_iron_man`).
    #[serde(default)]
    pub id: Option<String>,

    /// Known IMDb id, preferred over `id` for lookups.
    #[serde(default)]
    pub imdb_id: Option<String>,

    /// Known TMDB numeric id. Datasets write this as a number or a string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub tmdb_id: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<MediaKind>,

    #[serde(default)]
    pub title: Option<String>,

    /// Known release year: `"2008"`, a full date, or `"TBA"`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub release_year: Option<String>,

    /// Known poster URL; still subject to the existence probe at merge time.
    #[serde(default)]
    pub poster: Option<String>,

    #[serde(default)]
    pub overview: Option<String>,

    #[serde(default)]
    pub genres: Vec<GenreTag>,
}

impl CatalogEntry {
    /// The identifier used for lookups: the explicit IMDb id when present,
    /// otherwise the internal id. `None` when the entry has neither.
    pub fn lookup_id(&self) -> Option<TitleId> {
        let raw = non_empty(self.imdb_id.as_deref()).or_else(|| non_empty(self.id.as_deref()))?;
        Some(TitleId::parse(raw))
    }

    /// The TMDB numeric id known ahead of any network resolution: either the
    /// explicit `tmdbId` field or one embedded in a `tmdb_<digits>` lookup id.
    pub fn effective_tmdb_id(&self) -> Option<u64> {
        if let Some(id) = non_empty(self.tmdb_id.as_deref()).and_then(|s| s.parse().ok()) {
            return Some(id);
        }
        self.lookup_id()?.tmdb_numeric()
    }

    /// Display name for the merged record. Series entries named per-season in
    /// the dataset have the trailing `" Season N"` suffix stripped.
    pub fn display_name(&self) -> Option<String> {
        let title = non_empty(self.title.as_deref())?;
        if self.kind == Some(MediaKind::Series) {
            static SEASON_SUFFIX: OnceLock<Regex> = OnceLock::new();
            let re = SEASON_SUFFIX.get_or_init(|| Regex::new(r"\s+Season \d+$").unwrap());
            return Some(re.replace(title, "").into_owned());
        }
        Some(title.to_string())
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name().to_string()).collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accept a JSON string or number as an optional string field.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
