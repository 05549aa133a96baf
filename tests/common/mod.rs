//! Shared test harness for integration tests.
//!
//! Provides [`ProviderDoubles`] (wiremock stand-ins for TMDB, OMDb, RPDB,
//! and an image host answering the existence probe) and [`TestHarness`],
//! which wires the full resolution pipeline around them with in-memory
//! datasets. [`TestHarness::serve`] starts Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalogforge::catalog::{CatalogEntry, DatasetStore, GenreTag, MediaKind};
use catalogforge::config::Config;
use catalogforge::metadata::{
    CatalogService, HeadImageProbe, ItemResolver, OmdbClient, RpdbClient, TmdbClient,
};
use catalogforge::server::{create_router, AppContext};
use catalogforge::state::AppState;

/// Wiremock doubles for every upstream the pipeline talks to.
pub struct ProviderDoubles {
    /// Primary metadata provider.
    pub tmdb: MockServer,
    /// Secondary ratings provider.
    pub omdb: MockServer,
    /// Enrichment provider.
    pub rpdb: MockServer,
    /// Host for poster/logo URLs answering the existence probe.
    pub images: MockServer,
}

impl ProviderDoubles {
    pub async fn start() -> Self {
        Self {
            tmdb: MockServer::start().await,
            omdb: MockServer::start().await,
            rpdb: MockServer::start().await,
            images: MockServer::start().await,
        }
    }

    /// Absolute URL on the image host.
    pub fn image_url(&self, path: &str) -> String {
        format!("{}{path}", self.images.uri())
    }

    /// Mount a HEAD responder so `image_path` passes the existence probe.
    pub async fn mount_image(&self, image_path: &str) {
        Mock::given(method("HEAD"))
            .and(path(image_path))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/jpeg"))
            .mount(&self.images)
            .await;
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] whose upstream
/// providers are the wiremock doubles.
pub struct TestHarness {
    pub ctx: AppContext,
    pub state: Arc<AppState>,
    pub upstream: ProviderDoubles,
}

impl TestHarness {
    /// Create a harness serving the given datasets against fresh doubles.
    pub async fn new(datasets: Vec<(String, Vec<CatalogEntry>)>) -> Self {
        Self::with_doubles(ProviderDoubles::start().await, datasets)
    }

    /// Create a harness around doubles started ahead of time — needed when
    /// dataset entries must reference URLs on the image host.
    pub fn with_doubles(
        upstream: ProviderDoubles,
        datasets: Vec<(String, Vec<CatalogEntry>)>,
    ) -> Self {
        let state = Arc::new(AppState::new());

        let tmdb_client = Arc::new(
            TmdbClient::new("test-tmdb-key".into(), "en-US".into())
                .with_base_url(upstream.tmdb.uri()),
        );
        let omdb_client =
            Arc::new(OmdbClient::new("test-omdb-key".into()).with_base_url(upstream.omdb.uri()));
        let rpdb_client = Arc::new(
            RpdbClient::new(state.invalid_keys.clone()).with_base_url(upstream.rpdb.uri()),
        );
        let probe = Arc::new(HeadImageProbe::new());

        let resolver = ItemResolver::new(tmdb_client, omdb_client, rpdb_client.clone(), probe);
        let service = Arc::new(CatalogService::new(
            DatasetStore::from_entries(datasets),
            resolver,
            rpdb_client,
            state.clone(),
        ));

        let ctx = AppContext {
            service,
            state: state.clone(),
            config: Arc::new(Config::default()),
        };

        Self {
            ctx,
            state,
            upstream,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server(
        datasets: Vec<(String, Vec<CatalogEntry>)>,
    ) -> (Self, SocketAddr) {
        Self::new(datasets).await.serve().await
    }

    /// Bind Axum to a random port for this harness.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = create_router(self.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (self, addr)
    }
}

/// A movie entry with an IMDb id and a known TMDB id.
pub fn imdb_entry(internal: &str, imdb: &str, tmdb: u64, title: &str, year: &str) -> CatalogEntry {
    CatalogEntry {
        id: Some(internal.to_string()),
        imdb_id: Some(imdb.to_string()),
        tmdb_id: Some(tmdb.to_string()),
        kind: Some(MediaKind::Movie),
        title: Some(title.to_string()),
        release_year: Some(year.to_string()),
        genres: vec![GenreTag::Plain("Action".into())],
        ..Default::default()
    }
}

/// A movie entry carrying only dataset-internal knowledge.
pub fn internal_entry(internal: &str, title: &str, year: &str) -> CatalogEntry {
    CatalogEntry {
        id: Some(internal.to_string()),
        kind: Some(MediaKind::Movie),
        title: Some(title.to_string()),
        release_year: Some(year.to_string()),
        ..Default::default()
    }
}

/// Fetch a catalog over HTTP and return its `metas` array.
pub async fn fetch_metas(addr: SocketAddr, path_and_query: &str) -> Vec<serde_json::Value> {
    let body: serde_json::Value = reqwest::get(format!("http://{addr}{path_and_query}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["metas"].as_array().cloned().unwrap_or_default()
}
