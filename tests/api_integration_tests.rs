//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint, with the upstream
//! replaced by an in-memory card table.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use card_fetcher::{
    api::create_router,
    config::Config,
    models::CardRecord,
    upstream::{shared_connector, Attempt, CardLookup},
    AppState, CardService,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

struct FixtureLookup;

#[async_trait]
impl CardLookup for FixtureLookup {
    async fn lookup(&self, name: &str) -> Attempt {
        match name {
            "black lotus" => Attempt::Found(CardRecord::found(
                "Black Lotus",
                "{T}, Sacrifice Black Lotus: Add three mana of any one color.",
                "{0}",
                "Artifact",
                "Limited Edition Alpha",
            )),
            "Lightning Bolt" => Attempt::Found(CardRecord::found(
                "Lightning Bolt",
                "Lightning Bolt deals 3 damage to any target.",
                "{R}",
                "Instant",
                "Limited Edition Alpha",
            )),
            _ => Attempt::NotFound,
        }
    }
}

fn test_config() -> Config {
    Config {
        rate_limit_delay_ms: 0,
        ..Config::default()
    }
}

fn create_test_state(config: Config) -> AppState {
    AppState::new(CardService::with_connector(
        &config,
        shared_connector(Arc::new(FixtureLookup)),
    ))
}

fn create_test_app() -> Router {
    create_router(create_test_state(test_config()))
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// == FETCH Endpoint Tests ==

#[tokio::test]
async fn test_fetch_queues_uncached_names() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/fetch",
            r#"{"card_names":["black lotus","  ","Xyzzyxnonexistent"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["name"], "black lotus");
    assert_eq!(results[0]["status"], "queued");
    assert!(results[0].get("oracle_text").is_none());
    assert_eq!(results[1]["status"], "queued");
}

#[tokio::test]
async fn test_fetch_resolves_after_worker_drains_queue() {
    let state = create_test_state(test_config());
    let app = create_router(state.clone());
    state.service.start().await;

    let body = r#"{"card_names":["black lotus","Xyzzyxnonexistent"]}"#;
    app.clone()
        .oneshot(json_request("POST", "/fetch", body))
        .await
        .unwrap();
    state.service.worker().join().await;

    let response = app
        .oneshot(json_request("POST", "/fetch", body))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json[0]["name"], "Black Lotus");
    assert_eq!(json[0]["mana_cost"], "{0}");
    assert_eq!(json[0]["type_line"], "Artifact");
    assert_eq!(json[0]["status"], "found");
    assert_eq!(json[1]["name"], "Xyzzyxnonexistent");
    assert_eq!(json[1]["status"], "not found");

    state.service.shutdown().await;
}

#[tokio::test]
async fn test_fetch_empty_list_returns_cached_cards() {
    let state = create_test_state(test_config());
    state.service.cache().write().await.set(
        "Opt",
        CardRecord::found("Opt", "Scry 1. Draw a card.", "{U}", "Instant", "Ixalan"),
    );
    let app = create_router(state);

    let response = app
        .oneshot(json_request("POST", "/fetch", r#"{"card_names":[]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Opt");
    assert_eq!(results[0]["status"], "found");
}

#[tokio::test]
async fn test_fetch_blank_names_do_not_dump_cache() {
    let state = create_test_state(test_config());
    state.service.cache().write().await.set(
        "secret",
        CardRecord::found("Secret", "Hidden.", "{B}", "Sorcery", "Promo"),
    );
    let app = create_router(state.clone());

    let response = app
        .oneshot(json_request("POST", "/fetch", r#"{"card_names":["   ",""]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json.as_array().unwrap().is_empty());
    assert_eq!(state.service.status().await.queue_size, 0);
}

#[tokio::test]
async fn test_fetch_reports_queue_full() {
    let app = create_router(create_test_state(Config {
        max_queue_size: 1,
        enqueue_timeout: 0,
        ..test_config()
    }));

    let response = app
        .oneshot(json_request(
            "POST",
            "/fetch",
            r#"{"card_names":["Opt","Shock"]}"#,
        ))
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json[0]["status"], "queued");
    assert_eq!(json[1]["status"], "queue full");
}

#[tokio::test]
async fn test_fetch_rate_limited() {
    let app = create_router(create_test_state(Config {
        rate_limit: 2,
        ..test_config()
    }));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/fetch", r#"{"card_names":[]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(json_request("POST", "/fetch", r#"{"card_names":[]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_fetch_rejects_malformed_body() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("POST", "/fetch", r#"{"card_names":"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid request"));
}

// == EXPORT Endpoint Tests ==

#[tokio::test]
async fn test_export_returns_csv_attachment() {
    let state = create_test_state(test_config());
    state.service.cache().write().await.set(
        "Lightning Bolt",
        CardRecord::found(
            "Lightning Bolt",
            "Lightning Bolt deals 3 damage to any target.",
            "{R}",
            "Instant",
            "Limited Edition Alpha",
        ),
    );
    let app = create_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/export",
            r#"{"card_names":["Lightning Bolt","Nope"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("card_data.csv"));

    let body = body_to_string(response.into_body()).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Name,Oracle Text,Mana Cost,Type Line,Set Name,Status"
    );
    assert!(lines[1].starts_with("Lightning Bolt,"));
    assert!(lines[1].ends_with(",found"));
    assert_eq!(lines[2], "Nope,,,,,not found");
}

#[tokio::test]
async fn test_export_blank_names_is_header_only() {
    let state = create_test_state(test_config());
    state.service.cache().write().await.set(
        "secret",
        CardRecord::found("Secret", "Hidden.", "{B}", "Sorcery", "Promo"),
    );
    let app = create_router(state);

    let response = app
        .oneshot(json_request("POST", "/export", r#"{"card_names":["  "]}"#))
        .await
        .unwrap();

    let body = body_to_string(response.into_body()).await;
    assert_eq!(
        body.trim_end(),
        "Name,Oracle Text,Mana Cost,Type Line,Set Name,Status"
    );
}

#[tokio::test]
async fn test_export_empty_cache_is_header_only() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("POST", "/export", r#"{}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    assert_eq!(
        body.trim_end(),
        "Name,Oracle Text,Mana Cost,Type Line,Set Name,Status"
    );
}

// == STATUS Endpoint Tests ==

#[tokio::test]
async fn test_status_reflects_queue_and_worker() {
    let state = create_test_state(test_config());
    let app = create_router(state.clone());

    app.clone()
        .oneshot(json_request(
            "POST",
            "/fetch",
            r#"{"card_names":["Opt","Shock"]}"#,
        ))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["queue_size"], 2);
    assert_eq!(json["cache_size"], 0);
    assert_eq!(json["is_fetching"], false);
}

#[tokio::test]
async fn test_status_running_worker() {
    let state = create_test_state(test_config());
    state.service.start().await;
    let app = create_router(state.clone());

    let response = app.oneshot(get_request("/status")).await.unwrap();
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["is_fetching"], true);
    state.service.shutdown().await;
}

// == CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_clear_endpoint() {
    let state = create_test_state(test_config());
    state
        .service
        .cache()
        .write()
        .await
        .set("Xyz", CardRecord::not_found("Xyz"));
    state.service.start().await;
    let app = create_router(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clear")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "All cards cleared");

    let response = app.oneshot(get_request("/status")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cache_size"], 0);
    assert_eq!(json["is_fetching"], true);

    state.service.shutdown().await;
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_counts_hits_and_misses() {
    let state = create_test_state(test_config());
    state.service.cache().write().await.set(
        "Opt",
        CardRecord::found("Opt", "Scry 1. Draw a card.", "{U}", "Instant", "Ixalan"),
    );
    let app = create_router(state);

    app.clone()
        .oneshot(json_request(
            "POST",
            "/fetch",
            r#"{"card_names":["Opt","Shock"]}"#,
        ))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert!((json["hit_rate"].as_f64().unwrap() - 0.5).abs() < f64::EPSILON);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Fallback Tests ==

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/cards")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}
