mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./catalogforge.toml",
        "~/.config/catalogforge/config.toml",
        "/etc/catalogforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Overlay environment variables on a loaded config. `TMDB_API_KEY` and
/// `OMDB_API_KEY` fill in missing provider keys; `PORT` overrides the listen
/// port when it parses.
pub fn apply_env_overrides(config: &mut Config) {
    if config.providers.tmdb_api_key.is_none() {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.is_empty() {
                config.providers.tmdb_api_key = Some(key);
            }
        }
    }
    if config.providers.omdb_api_key.is_none() {
        if let Ok(key) = std::env::var("OMDB_API_KEY") {
            if !key.is_empty() {
                config.providers.omdb_api_key = Some(key);
            }
        }
    }
    if let Ok(port) = std::env::var("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!(%port, "Ignoring unparseable PORT override"),
        }
    }

    if config.providers.tmdb_api_key.is_none() || config.providers.omdb_api_key.is_none() {
        tracing::error!(
            "API keys (TMDB_API_KEY, OMDB_API_KEY) are missing; catalogs will serve \
             entry-local metadata only"
        );
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if let Some(dir) = &config.datasets.data_dir {
        if !dir.exists() {
            tracing::warn!("Dataset directory does not exist: {:?}", dir);
        }
    }

    if let Some(dir) = &config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
