use crate::config::Config;
use crate::metadata::CatalogService;
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub mod manifest;
pub mod routes_admin;
pub mod routes_catalog;

/// Assembled catalogs only change on dataset updates, so responses are
/// cacheable for three weeks.
const CACHE_CONTROL_VALUE: &str = "public, max-age=1814400";

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub service: Arc<CatalogService>,
    pub state: Arc<AppState>,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Addon discovery
        .route("/manifest.json", get(routes_catalog::default_manifest))
        // Configure UI support + administration
        .route("/api/catalogs", get(routes_admin::catalog_info))
        .route("/api/clear-cache", get(routes_admin::clear_cache))
        .route("/api/validate-rpdb", get(routes_admin::validate_rpdb))
        // Default install: `/catalog/:type/:id.json`. The same position also
        // carries `/catalog/:param/manifest.json` and `/catalog/:param/configure`
        // for customised installs, so the handler dispatches on the second
        // segment.
        .route(
            "/catalog/:first/:second",
            get(routes_catalog::catalog_or_manifest),
        )
        // Customised install: `/catalog/:param/catalog/:type/:id.json`.
        .route(
            "/catalog/:first/catalog/:kind/:id",
            get(routes_catalog::custom_catalog),
        )
        .route("/", get(root_redirect));

    let mut app = app
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_VALUE),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Serve the configure page from the static directory when one is
    // configured; otherwise a built-in placeholder keeps /configure alive.
    match static_dir.filter(|dir| dir.exists()) {
        Some(dir) => {
            tracing::info!("Serving static files from {:?}", dir);
            let configure = dir.join("configure.html");
            app = app
                .route_service("/configure", ServeFile::new(configure))
                .fallback_service(ServeDir::new(&dir));
        }
        None => {
            app = app.route("/configure", get(configure_placeholder));
        }
    }

    app
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn root_redirect() -> Redirect {
    Redirect::to("/configure")
}

async fn configure_placeholder() -> Html<&'static str> {
    Html(
        "<!doctype html><html><body>\
         <h1>Marvel Catalogs</h1>\
         <p>Install the addon with <code>/manifest.json</code>, or a custom \
         selection with <code>/catalog/CATALOG_IDS/manifest.json</code>.</p>\
         </body></html>",
    )
}

/// Start the HTTP server
pub async fn start_server(
    config: Config,
    service: Arc<CatalogService>,
    state: Arc<AppState>,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext {
        service,
        state,
        config: Arc::new(config),
    };

    let app = create_router(ctx, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
