//! HTTP surface tests
//!
//! Binds the real router to an ephemeral port and drives it with a
//! plain reqwest client, wiremock standing in for remote origins.

use pagescope::analyzer::Analyzer;
use pagescope::config::{FetchConfig, ProbeConfig};
use pagescope::fetch::HttpFetcher;
use pagescope::probe::LinkProbeEngine;
use pagescope::server::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts the app on an ephemeral port and returns its base URL.
async fn spawn_app() -> String {
    let fetcher = Arc::new(HttpFetcher::new(&FetchConfig::default()).unwrap());
    let engine = Arc::new(LinkProbeEngine::new(
        fetcher.clone(),
        ProbeConfig {
            link_timeout: Duration::from_secs(2),
            ..ProbeConfig::default()
        },
    ));
    engine.start();
    let analyzer = Arc::new(Analyzer::new(fetcher, engine.clone()));

    let app = router(AppState {
        analyzer,
        engine,
        request_budget: Duration::from_secs(10),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;
    let response = reqwest::get(format!("{}/health", app)).await.unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "pagescope");
}

#[tokio::test]
async fn test_analyze_happy_path() {
    let app = spawn_app().await;
    let origin = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<!DOCTYPE html><html><head><title>Ex</title></head><body><h1>T</h1><a href="/a">A</a></body></html>"#,
        ))
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&origin)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/analyze", app))
        .json(&json!({ "url": format!("{}/", origin.uri()) }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["document_version"], "HTML5");
    assert_eq!(body["title"], "Ex");
    assert_eq!(body["heading_counts"]["h1"], 1);
    assert_eq!(body["link_summary"]["total"], 1);
    assert_eq!(body["link_summary"]["inaccessible"], 0);
    assert_eq!(body["has_login_form"], false);
}

#[tokio::test]
async fn test_analyze_missing_url_is_400() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/analyze", app))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "URL is required");
    assert_eq!(body["status_code"], 400);
}

#[tokio::test]
async fn test_analyze_malformed_json_is_400() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/analyze", app))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request format");
}

#[tokio::test]
async fn test_analyze_unfetchable_root_is_500() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/analyze", app))
        .json(&json!({ "url": "http://127.0.0.1:1/" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to analyze URL");
}

#[tokio::test]
async fn test_check_links_batch() {
    let app = spawn_app().await;
    let origin = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&origin)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/links/check", app))
        .header("x-request-id", "test-batch-1")
        .json(&json!({
            "links": [
                { "url": format!("{}/ok", origin.uri()), "text": "OK", "type": "internal" },
                { "url": format!("{}/gone", origin.uri()), "text": "Gone", "type": "external" },
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    let statuses = body["link_statuses"].as_array().unwrap();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0]["accessible"], true);
    assert_eq!(statuses[0]["status_code"], 200);
    assert_eq!(statuses[1]["accessible"], false);
    assert_eq!(statuses[1]["status_code"], 404);
    assert_eq!(statuses[1]["error"], "HTTP 404");
    assert!(body["duration"].as_str().is_some());
    assert!(body["checked_at"].as_str().is_some());
}

#[tokio::test]
async fn test_check_links_empty_is_400() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/links/check", app))
        .json(&json!({ "links": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No links provided");
}

#[tokio::test]
async fn test_check_single_link() {
    let app = spawn_app().await;
    let origin = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/target"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&origin)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/links/check-one", app))
        .json(&json!({
            "link": { "url": format!("{}/target", origin.uri()), "text": "T", "type": "external" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["accessible"], true);
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["link"]["url"], format!("{}/target", origin.uri()));
}

#[tokio::test]
async fn test_check_single_link_empty_url_is_400() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/links/check-one", app))
        .json(&json!({ "link": { "url": "", "text": "", "type": "internal" } }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Link URL is required");
}
