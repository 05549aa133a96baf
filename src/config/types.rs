use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub datasets: DatasetsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the configure page and other static assets.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// TMDB API key. Without it catalogs serve entry-local metadata only.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// OMDb API key, used for IMDb-family lookups.
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// Language tag passed to TMDB (ISO-639-1, e.g. "en-US").
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatasetsConfig {
    /// Directory of `<id>.json` files overriding or extending the embedded
    /// datasets.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7000
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            omdb_api_key: None,
            language: default_language(),
        }
    }
}

impl ProvidersConfig {
    pub fn tmdb_key(&self) -> &str {
        self.tmdb_api_key.as_deref().unwrap_or("")
    }

    pub fn omdb_key(&self) -> &str {
        self.omdb_api_key.as_deref().unwrap_or("")
    }
}
