mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use catalogforge::catalog::{DatasetStore, SortDirective};
use catalogforge::config::{self, Config};
use catalogforge::metadata::{
    CatalogService, HeadImageProbe, ItemResolver, OmdbClient, RpdbClient, TmdbClient,
};
use catalogforge::server;
use catalogforge::state::AppState;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "catalogforge=trace,tower_http=debug".to_string()
        } else {
            "catalogforge=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Catalog { id, sort } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(print_catalog(&id, sort.as_deref(), cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("catalogforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Build the resolution pipeline from config: source clients, resolver,
/// dataset store, and the shared cache/tracker state.
fn build_service(config: &Config, state: &Arc<AppState>) -> Arc<CatalogService> {
    let tmdb = Arc::new(TmdbClient::new(
        config.providers.tmdb_key().to_string(),
        config.providers.language.clone(),
    ));
    let omdb = Arc::new(OmdbClient::new(config.providers.omdb_key().to_string()));
    let rpdb = Arc::new(RpdbClient::new(state.invalid_keys.clone()));
    let probe = Arc::new(HeadImageProbe::new());

    let resolver = ItemResolver::new(tmdb, omdb, rpdb.clone(), probe);
    let datasets = DatasetStore::load(config.datasets.data_dir.as_deref());

    Arc::new(CatalogService::new(datasets, resolver, rpdb, state.clone()))
}

async fn start_server(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;
    config::apply_env_overrides(&mut config);

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting catalogforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let state = Arc::new(AppState::new());
    let service = build_service(&config, &state);

    server::start_server(config, service, state).await
}

async fn print_catalog(
    id: &str,
    sort: Option<&str>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    config::apply_env_overrides(&mut config);

    let directive = match sort {
        Some(raw) => Some(
            raw.parse::<SortDirective>()
                .map_err(|_| anyhow::anyhow!("Invalid sort directive: {raw} (use new or old)"))?,
        ),
        None => None,
    };

    let state = Arc::new(AppState::new());
    let service = build_service(&config, &state);

    let metas = service.resolve_catalog(id, directive, None).await;
    if metas.is_empty() {
        tracing::warn!(catalog = id, "Catalog resolved empty");
    }

    println!("{}", serde_json::to_string_pretty(&*metas)?);
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  TMDB key configured: {}",
                config.providers.tmdb_api_key.is_some()
            );
            println!(
                "  OMDb key configured: {}",
                config.providers.omdb_api_key.is_some()
            );
            println!("  Dataset dir: {:?}", config.datasets.data_dir);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
