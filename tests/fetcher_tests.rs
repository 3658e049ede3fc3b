//! Integration tests for the HTTP fetcher
//!
//! These use wiremock origins to exercise the real reqwest client:
//! status handling, transparent gzip, the body cap, and deadlines.

use pagescope::config::FetchConfig;
use pagescope::fetch::{Fetch, HttpFetcher, Probe};
use pagescope::FetchError;
use std::io::Write;
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn far_deadline() -> Instant {
    Instant::now() + Duration::from_secs(30)
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn test_fetch_returns_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let page = fetcher
        .fetch(far_deadline(), &format!("{}/page", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body, b"<html>hi</html>");
}

#[tokio::test]
async fn test_status_404_is_not_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let page = fetcher
        .fetch(far_deadline(), &format!("{}/missing", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.status, 404);
    assert_eq!(page.body, b"not here");
}

#[tokio::test]
async fn test_gzip_body_is_decompressed_transparently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zipped"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip(b"<!DOCTYPE html><title>Zip</title>"))
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let page = fetcher
        .fetch(far_deadline(), &format!("{}/zipped", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.body, b"<!DOCTYPE html><title>Zip</title>");
}

#[tokio::test]
async fn test_deflate_body_is_decompressed_transparently() {
    let deflated = {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"<!DOCTYPE html><title>Deflated</title>").unwrap();
        encoder.finish().unwrap()
    };

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deflated"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(deflated)
                .insert_header("content-encoding", "deflate"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let page = fetcher
        .fetch(far_deadline(), &format!("{}/deflated", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.body, b"<!DOCTYPE html><title>Deflated</title>");
}

#[tokio::test]
async fn test_body_is_truncated_at_cap_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 64 * 1024]))
        .mount(&server)
        .await;

    let config = FetchConfig {
        max_body_bytes: 16 * 1024,
        ..FetchConfig::default()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    let page = fetcher
        .fetch(far_deadline(), &format!("{}/big", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body.len(), 16 * 1024);
}

#[tokio::test]
async fn test_fetch_times_out_at_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let deadline = Instant::now() + Duration::from_millis(100);
    let result = fetcher
        .fetch(deadline, &format!("{}/slow", server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_probe_reports_status_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/target"))
        .respond_with(ResponseTemplate::new(301).set_body_string("moved"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let code = fetcher
        .probe(far_deadline(), &format!("{}/target", server.uri()))
        .await
        .unwrap();

    assert_eq!(code, 301);
}

#[tokio::test]
async fn test_probe_connection_failure_is_an_error() {
    // Nothing listens on this port.
    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let result = fetcher.probe(far_deadline(), "http://127.0.0.1:1/").await;

    assert!(result.is_err());
}
