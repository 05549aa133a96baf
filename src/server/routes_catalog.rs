//! Manifest and catalog routes.
//!
//! Default catalogs are served at `/catalog/:type/:id.json`; customised
//! installs prefix everything with a comma-separated `catalogsParam` segment
//! that selects catalogs and may smuggle an enrichment key as a
//! `rpdb_<key>` entry. Axum path parameters span whole segments, so the
//! `.json` suffixes of the addon URL scheme are stripped inside the handlers.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::catalog::SortDirective;
use crate::server::{manifest, AppContext};

#[derive(Deserialize)]
pub struct CatalogQuery {
    /// Sort selector; carried in the `genre` extra for client compatibility.
    pub genre: Option<String>,
}

impl CatalogQuery {
    fn directive(&self) -> Option<SortDirective> {
        self.genre.as_deref().and_then(|g| g.parse().ok())
    }
}

/// Split a `catalogsParam` segment into selected catalog ids and the optional
/// enrichment key. The first `rpdb_…` entry wins; `rpdb_…` entries are never
/// catalog ids.
pub(crate) fn parse_catalogs_param(param: &str) -> (Vec<String>, Option<String>) {
    let mut ids = Vec::new();
    let mut key = None;

    for part in param.split(',').filter(|p| !p.is_empty()) {
        if let Some(suffix) = part.strip_prefix("rpdb_") {
            if key.is_none() && !suffix.is_empty() {
                key = Some(suffix.to_string());
            }
        } else {
            ids.push(part.to_string());
        }
    }

    (ids, key)
}

/// `GET /manifest.json`
pub async fn default_manifest() -> impl IntoResponse {
    info!("Default manifest requested");
    Json(manifest::build_manifest(None))
}

/// `GET /catalog/:first/:second` — either a customised manifest
/// (`second == "manifest.json"`), the configure page, or a default catalog
/// where `first` is the display type and `second` the catalog id.
pub async fn catalog_or_manifest(
    State(ctx): State<AppContext>,
    Path((first, second)): Path<(String, String)>,
    Query(query): Query<CatalogQuery>,
) -> Response {
    match second.as_str() {
        "manifest.json" => {
            let (ids, _) = parse_catalogs_param(&first);
            info!(selected = ?ids, "Custom manifest requested");
            Json(manifest::build_manifest(Some(&ids))).into_response()
        }
        "configure" => Redirect::to("/configure").into_response(),
        _ => {
            let id = second.strip_suffix(".json").unwrap_or(&second);
            serve_catalog(&ctx, &first, id, &query, None)
                .await
                .into_response()
        }
    }
}

/// `GET /catalog/:first/catalog/:kind/:id` — a catalog under a customised
/// install; the leading segment carries the selection and enrichment key.
pub async fn custom_catalog(
    State(ctx): State<AppContext>,
    Path((param, kind, id)): Path<(String, String, String)>,
    Query(query): Query<CatalogQuery>,
) -> Response {
    let (_, rpdb_key) = parse_catalogs_param(&param);
    if rpdb_key.is_some() {
        debug!("Enrichment key supplied with catalog request");
    }

    let id = id.strip_suffix(".json").unwrap_or(&id);
    serve_catalog(&ctx, &kind, id, &query, rpdb_key.as_deref())
        .await
        .into_response()
}

async fn serve_catalog(
    ctx: &AppContext,
    kind: &str,
    id: &str,
    query: &CatalogQuery,
    enrichment_key: Option<&str>,
) -> Json<serde_json::Value> {
    info!(
        kind,
        id,
        genre = query.genre.as_deref().unwrap_or("default"),
        "Catalog requested"
    );

    let metas = ctx
        .service
        .resolve_catalog(id, query.directive(), enrichment_key)
        .await;

    Json(json!({ "metas": &*metas }))
}
