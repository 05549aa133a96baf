//! Administrative and configure-UI support routes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::server::{manifest, AppContext};

/// `GET /api/catalogs` — catalog descriptions for the configure UI.
pub async fn catalog_info() -> impl IntoResponse {
    Json(manifest::catalog_infos())
}

/// `GET /api/clear-cache` — drop cached catalogs and forget rejected
/// enrichment keys.
pub async fn clear_cache(State(ctx): State<AppContext>) -> impl IntoResponse {
    ctx.service.clear_cache();
    Json(json!({ "message": "Cache cleared successfully." }))
}

#[derive(Deserialize)]
pub struct ValidateQuery {
    pub key: Option<String>,
}

/// `GET /api/validate-rpdb?key=…` — explicit enrichment-key validation with
/// the same semantics (including invalid-key recording) as resolution-time
/// checks.
pub async fn validate_rpdb(
    State(ctx): State<AppContext>,
    Query(params): Query<ValidateQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(key) = params.key.filter(|k| !k.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "error": "No RPDB API Key provided." })),
        );
    };

    if ctx.service.validate_enrichment_key(&key).await {
        info!("Enrichment key validated");
        (StatusCode::OK, Json(json!({ "valid": true })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "valid": false,
                "error": "Invalid RPDB API Key. Copy the key exactly from \
                          ratingposterdb.com without spaces, or check its status \
                          in your RPDB dashboard."
            })),
        )
    }
}
