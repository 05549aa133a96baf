//! Enrichment-provider integration tests.
//!
//! Covers key validation, the invalid-key memory (an authorization-denied
//! key is never probed again and suppresses all ratings/poster calls), and
//! the precedence of enrichment data in the merge.

mod common;

use common::{fetch_metas, imdb_entry, ProviderDoubles, TestHarness};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// Ratings path RPDB is probed on during key validation.
const VALIDATION_PATH: &str = "/ratings/movie/tt0848228";

#[tokio::test]
async fn denied_key_is_remembered_and_suppresses_enrichment_calls() {
    let datasets = vec![(
        "mcu".to_string(),
        vec![imdb_entry(
            "marvel_iron_man",
            "tt0371746",
            1726,
            "Iron Man",
            "2008",
        )],
    )];
    let (harness, addr) = TestHarness::with_server(datasets).await;

    // Authorization denied, exactly once: the second resolution must not
    // re-validate.
    Mock::given(method("GET"))
        .and(path(VALIDATION_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&harness.upstream.rpdb)
        .await;

    // No data calls may ever be issued for the dead key.
    Mock::given(method("GET"))
        .and(path("/ratings/movie/tt0371746"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&harness.upstream.rpdb)
        .await;
    Mock::given(method("GET"))
        .and(path("/posters/movie/tt0371746"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&harness.upstream.rpdb)
        .await;

    let metas = fetch_metas(addr, "/catalog/rpdb_dead-key/catalog/Marvel/mcu.json").await;
    assert_eq!(metas.len(), 1);
    // Resolution proceeded on non-enrichment fallbacks.
    assert_eq!(metas[0]["imdbRating"], "N/A");
    assert!(metas[0].get("rottenTomatoesRating").is_none());

    assert!(harness.state.invalid_keys.is_known_invalid("dead-key"));

    // Same key again, different sort so the catalog cache cannot hide a
    // second validation attempt.
    let metas = fetch_metas(
        addr,
        "/catalog/rpdb_dead-key/catalog/Marvel/mcu.json?genre=new",
    )
    .await;
    assert_eq!(metas.len(), 1);
}

#[tokio::test]
async fn transient_validation_failure_does_not_invalidate_key() {
    let datasets = vec![(
        "mcu".to_string(),
        vec![imdb_entry(
            "marvel_iron_man",
            "tt0371746",
            1726,
            "Iron Man",
            "2008",
        )],
    )];
    let (harness, addr) = TestHarness::with_server(datasets).await;

    Mock::given(method("GET"))
        .and(path(VALIDATION_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.upstream.rpdb)
        .await;

    fetch_metas(addr, "/catalog/rpdb_shaky-key/catalog/Marvel/mcu.json").await;

    // A server error is not an authorization denial.
    assert!(!harness.state.invalid_keys.is_known_invalid("shaky-key"));
}

#[tokio::test]
async fn valid_key_enrichment_overrides_poster_and_ratings() {
    let doubles = ProviderDoubles::start().await;

    let rpdb_poster = doubles.image_url("/rpdb/iron-man.jpg");
    doubles.mount_image("/rpdb/iron-man.jpg").await;

    Mock::given(method("GET"))
        .and(path(VALIDATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&doubles.rpdb)
        .await;

    Mock::given(method("GET"))
        .and(path("/ratings/movie/tt0371746"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imdb": { "rating": 8.1 },
            "rotten_tomatoes": { "rating": "94%" }
        })))
        .mount(&doubles.rpdb)
        .await;

    Mock::given(method("GET"))
        .and(path("/posters/movie/tt0371746"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "poster": rpdb_poster })),
        )
        .mount(&doubles.rpdb)
        .await;

    // Secondary rating present but outranked by enrichment.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imdbRating": "7.9",
            "Response": "True"
        })))
        .mount(&doubles.omdb)
        .await;

    let expected_poster = rpdb_poster.clone();
    let entry = imdb_entry("marvel_iron_man", "tt0371746", 1726, "Iron Man", "2008");
    let harness = TestHarness::with_doubles(doubles, vec![("mcu".to_string(), vec![entry])]);
    let (_harness, addr) = harness.serve().await;

    let metas = fetch_metas(addr, "/catalog/rpdb_tier1-key/catalog/Marvel/mcu.json").await;
    assert_eq!(metas.len(), 1);

    let meta = &metas[0];
    assert_eq!(meta["poster"], json!(expected_poster));
    assert_eq!(meta["imdbRating"], "8.1");
    assert_eq!(meta["rottenTomatoesRating"], "94%");
}

#[tokio::test]
async fn poster_tier_denial_still_serves_ratings() {
    let datasets = vec![(
        "mcu".to_string(),
        vec![imdb_entry(
            "marvel_iron_man",
            "tt0371746",
            1726,
            "Iron Man",
            "2008",
        )],
    )];
    let (harness, addr) = TestHarness::with_server(datasets).await;

    Mock::given(method("GET"))
        .and(path(VALIDATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&harness.upstream.rpdb)
        .await;

    Mock::given(method("GET"))
        .and(path("/ratings/movie/tt0371746"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imdb": { "rating": "8.1" }
        })))
        .mount(&harness.upstream.rpdb)
        .await;

    // Posters are a higher subscription tier.
    Mock::given(method("GET"))
        .and(path("/posters/movie/tt0371746"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&harness.upstream.rpdb)
        .await;

    let metas = fetch_metas(addr, "/catalog/rpdb_base-key/catalog/Marvel/mcu.json").await;
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0]["imdbRating"], "8.1");
    // Tier denial must not poison the key.
    assert!(!harness.state.invalid_keys.is_known_invalid("base-key"));
}

// ---------------------------------------------------------------------------
// Explicit validation endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validate_endpoint_requires_a_key() {
    let (_harness, addr) = TestHarness::with_server(Vec::new()).await;

    let resp = reqwest::get(format!("http://{addr}/api/validate-rpdb"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], false);
    assert_eq!(body["error"], "No RPDB API Key provided.");
}

#[tokio::test]
async fn validate_endpoint_reports_key_status() {
    let (harness, addr) = TestHarness::with_server(Vec::new()).await;

    Mock::given(method("GET"))
        .and(path(VALIDATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&harness.upstream.rpdb)
        .await;

    let resp = reqwest::get(format!("http://{addr}/api/validate-rpdb?key=good-key"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn validate_endpoint_denied_key_not_reprobed() {
    let (harness, addr) = TestHarness::with_server(Vec::new()).await;

    Mock::given(method("GET"))
        .and(path(VALIDATION_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&harness.upstream.rpdb)
        .await;

    let resp = reqwest::get(format!("http://{addr}/api/validate-rpdb?key=dead-key"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // The key is now known invalid; a second validation answers from memory.
    let resp = reqwest::get(format!("http://{addr}/api/validate-rpdb?key=dead-key"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    assert!(harness.state.invalid_keys.is_known_invalid("dead-key"));
}
