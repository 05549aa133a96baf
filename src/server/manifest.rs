//! Addon manifest and catalog listing data.
//!
//! The manifest is the static description clients use to discover the
//! catalogs; a custom manifest narrows it to a caller-selected subset.

use std::collections::BTreeMap;

use serde::Serialize;

const ADDON_LOGO: &str =
    "https://raw.githubusercontent.com/catalogforge/catalogforge/main/assets/icon.png";
const ADDON_BACKGROUND: &str =
    "https://raw.githubusercontent.com/catalogforge/catalogforge/main/assets/background.jpg";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub logo: &'static str,
    pub background: &'static str,
    pub catalogs: Vec<ManifestCatalog>,
    pub resources: Vec<&'static str>,
    pub types: Vec<&'static str>,
    pub id_prefixes: Vec<&'static str>,
    pub behavior_hints: ManifestBehaviorHints,
    pub contact_email: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestBehaviorHints {
    pub configurable: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Vec<ExtraField>>,
    pub behavior_hints: CatalogBehaviorHints,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBehaviorHints {
    pub order_hint: u8,
}

/// A selectable extra on a catalog; only the sort selector is used, carried
/// in the `genre` extra for client compatibility.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraField {
    pub name: &'static str,
    pub options: Vec<&'static str>,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    pub option_labels: BTreeMap<&'static str, &'static str>,
}

fn sort_extra(options: &[&'static str], default: Option<&'static str>) -> ExtraField {
    let mut labels = BTreeMap::new();
    for option in options {
        let label = match *option {
            "new" => "New to Old",
            "old" => "Old to New",
            other => other,
        };
        labels.insert(*option, label);
    }
    ExtraField {
        name: "genre",
        options: options.to_vec(),
        is_required: false,
        default,
        option_labels: labels,
    }
}

/// Every catalog the addon serves, in display order.
pub fn all_catalogs() -> Vec<ManifestCatalog> {
    vec![
        ManifestCatalog {
            kind: "Marvel",
            id: "marvel-mcu",
            name: "MCU Chronological Order",
            extra: Some(vec![sort_extra(&["new", "old"], None)]),
            behavior_hints: CatalogBehaviorHints { order_hint: 1 },
        },
        ManifestCatalog {
            kind: "Marvel",
            id: "xmen",
            name: "X-Men",
            extra: None,
            behavior_hints: CatalogBehaviorHints { order_hint: 2 },
        },
        ManifestCatalog {
            kind: "Marvel",
            id: "movies",
            name: "Movies",
            extra: Some(vec![sort_extra(&["new"], None)]),
            behavior_hints: CatalogBehaviorHints { order_hint: 3 },
        },
        ManifestCatalog {
            kind: "Marvel",
            id: "series",
            name: "Series",
            extra: Some(vec![sort_extra(&["new"], None)]),
            behavior_hints: CatalogBehaviorHints { order_hint: 4 },
        },
        ManifestCatalog {
            kind: "Marvel",
            id: "animations",
            name: "Animations",
            extra: Some(vec![sort_extra(&["new", "old"], Some("old"))]),
            behavior_hints: CatalogBehaviorHints { order_hint: 5 },
        },
    ]
}

/// Build the manifest, optionally narrowed to the given catalog ids. Unknown
/// ids are ignored; an empty or all-unknown selection keeps every catalog.
pub fn build_manifest(selected: Option<&[String]>) -> Manifest {
    let catalogs = all_catalogs();
    let (id_suffix, name_suffix, catalogs) = match selected {
        Some(ids) if !ids.is_empty() => {
            let filtered: Vec<_> = catalogs
                .iter()
                .filter(|c| ids.iter().any(|id| id == c.id))
                .cloned()
                .collect();
            if filtered.is_empty() {
                ("", "", catalogs)
            } else {
                (".custom", " Custom", filtered)
            }
        }
        _ => ("", "", catalogs),
    };

    Manifest {
        id: format!("com.catalogforge.marvel{id_suffix}"),
        name: format!("Marvel Catalogs{name_suffix}"),
        description: "Browse the Marvel catalog: MCU and X-Men in chronological order, \
                      plus movies, series, and animations."
            .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        logo: ADDON_LOGO,
        background: ADDON_BACKGROUND,
        catalogs,
        resources: vec!["catalog"],
        types: vec!["movie", "series"],
        id_prefixes: vec!["marvel_", "tt", "tmdb_"],
        behavior_hints: ManifestBehaviorHints { configurable: true },
        contact_email: "support@catalogforge.dev",
    }
}

/// Catalog descriptions for the configure UI.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub fn catalog_infos() -> Vec<CatalogInfo> {
    vec![
        CatalogInfo {
            id: "marvel-mcu",
            name: "MCU Chronological Order",
            category: "Timeline",
            description: "Browse the Marvel Cinematic Universe in chronological story order",
            icon: "calendar-alt",
        },
        CatalogInfo {
            id: "xmen",
            name: "X-Men",
            category: "Character",
            description: "All X-Men movies and related content",
            icon: "mask",
        },
        CatalogInfo {
            id: "movies",
            name: "Movies",
            category: "Content Type",
            description: "All Marvel movies across different franchises",
            icon: "film",
        },
        CatalogInfo {
            id: "series",
            name: "Series",
            category: "Content Type",
            description: "All Marvel television series",
            icon: "tv",
        },
        CatalogInfo {
            id: "animations",
            name: "Animations",
            category: "Content Type",
            description: "All Marvel animated features and series",
            icon: "play-circle",
        },
    ]
}
