//! Named, ordered collections of catalog entries.
//!
//! Five datasets ship embedded in the binary; a configured data directory may
//! override any of them (or add new ones) with `<id>.json` files. A dataset
//! file must contain a JSON array of entries — anything else degrades to an
//! empty catalog for that id, logged and never fatal.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::entry::CatalogEntry;
use super::sort::SortDirective;

/// Built-in datasets: id, embedded JSON, default sort applied when a request
/// carries no directive.
const BUILTIN_DATASETS: &[(&str, &str, Option<SortDirective>)] = &[
    (
        "marvel-mcu",
        include_str!("../../assets/data/marvel-mcu.json"),
        None,
    ),
    ("xmen", include_str!("../../assets/data/xmen.json"), None),
    ("movies", include_str!("../../assets/data/movies.json"), None),
    ("series", include_str!("../../assets/data/series.json"), None),
    (
        "animations",
        include_str!("../../assets/data/animations.json"),
        Some(SortDirective::Old),
    ),
];

/// Failure to load one dataset. Always recovered: the affected catalog
/// resolves as empty.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset is not a JSON array of entries: {0}")]
    Shape(#[from] serde_json::Error),
}

/// In-memory store of all datasets, built once at startup.
pub struct DatasetStore {
    datasets: HashMap<String, Arc<Vec<CatalogEntry>>>,
    defaults: HashMap<String, SortDirective>,
}

impl DatasetStore {
    /// Build the store from the embedded datasets, overlaying `<id>.json`
    /// files found in `data_dir` when given.
    pub fn load(data_dir: Option<&Path>) -> Self {
        let mut store = Self {
            datasets: HashMap::new(),
            defaults: HashMap::new(),
        };

        for &(id, raw, default) in BUILTIN_DATASETS {
            let entries = match parse_dataset(raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dataset = id, error = %e, "Embedded dataset is invalid; catalog will be empty");
                    Vec::new()
                }
            };
            store.datasets.insert(id.to_string(), Arc::new(entries));
            if let Some(directive) = default {
                store.defaults.insert(id.to_string(), directive);
            }
        }

        if let Some(dir) = data_dir {
            store.overlay_dir(dir);
        }

        store
    }

    /// Build a store from in-memory datasets. No default directives.
    pub fn from_entries<I>(datasets: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<CatalogEntry>)>,
    {
        Self {
            datasets: datasets
                .into_iter()
                .map(|(id, entries)| (id, Arc::new(entries)))
                .collect(),
            defaults: HashMap::new(),
        }
    }

    fn overlay_dir(&mut self, dir: &Path) {
        let read_dir = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot read dataset directory");
                return;
            }
        };

        for file in read_dir.flatten() {
            let path = file.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match load_dataset_file(&path) {
                Ok(entries) => {
                    debug!(dataset = id, count = entries.len(), "Loaded dataset override");
                    self.datasets.insert(id.to_string(), Arc::new(entries));
                }
                Err(e) => {
                    // The embedded version (if any) keeps serving this id.
                    warn!(dataset = id, error = %e, "Ignoring invalid dataset file");
                }
            }
        }
    }

    /// The entries of a dataset, or `None` for an unknown id.
    pub fn get(&self, id: &str) -> Option<Arc<Vec<CatalogEntry>>> {
        self.datasets.get(id).cloned()
    }

    /// The sort applied to a dataset when the request carries no directive.
    pub fn default_directive(&self, id: &str) -> Option<SortDirective> {
        self.defaults.get(id).copied()
    }
}

fn parse_dataset(raw: &str) -> Result<Vec<CatalogEntry>, DatasetError> {
    Ok(serde_json::from_str(raw)?)
}

fn load_dataset_file(path: &Path) -> Result<Vec<CatalogEntry>, DatasetError> {
    parse_dataset(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_datasets_load() {
        let store = DatasetStore::load(None);
        for (id, _, _) in BUILTIN_DATASETS {
            let entries = store.get(id).unwrap_or_else(|| panic!("missing {id}"));
            assert!(!entries.is_empty(), "dataset {id} is empty");
        }
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn animations_default_to_oldest_first() {
        let store = DatasetStore::load(None);
        assert_eq!(
            store.default_directive("animations"),
            Some(SortDirective::Old)
        );
        assert_eq!(store.default_directive("marvel-mcu"), None);
    }

    #[test]
    fn data_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("xmen.json"),
            r#"[{"id": "x", "type": "movie", "title": "Only One"}]"#,
        )
        .unwrap();

        let store = DatasetStore::load(Some(dir.path()));
        let entries = store.get("xmen").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_deref(), Some("Only One"));
    }

    #[test]
    fn invalid_override_keeps_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("xmen.json"), r#"{"not": "an array"}"#).unwrap();

        let store = DatasetStore::load(Some(dir.path()));
        assert!(!store.get("xmen").unwrap().is_empty());
    }

    #[test]
    fn new_dataset_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("extra.json"),
            r#"[{"id": "e1", "type": "movie", "title": "Extra"}]"#,
        )
        .unwrap();

        let store = DatasetStore::load(Some(dir.path()));
        assert_eq!(store.get("extra").unwrap().len(), 1);
    }
}
