//! JSON/HTTP surface
//!
//! Three inbound operations carry a request into the orchestrator and
//! the probe engine: analyze one URL, probe a batch of links, probe a
//! single link. Error bodies share one shape everywhere:
//! `{"error", "status_code", "timestamp"}`.

use crate::analyzer::Analyzer;
use crate::models::{ErrorBody, HealthStatus, Link, LinkStatus};
use crate::probe::LinkProbeEngine;
use crate::{AnalysisError, FetchError};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Shared handler state: the orchestrator, the probe engine, and the
/// per-request deadline budget.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub engine: Arc<LinkProbeEngine>,
    pub request_budget: Duration,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct CheckLinksRequest {
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct CheckLinkRequest {
    link: Link,
}

#[derive(Debug, Serialize)]
struct CheckLinksResponse {
    link_statuses: Vec<LinkStatus>,
    checked_at: DateTime<Utc>,
    duration: String,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/links/check", post(check_links))
        .route("/links/check-one", post(check_link))
        .route("/health", get(health))
        .with_state(state)
}

async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request format"),
    };

    if request.url.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "URL is required");
    }

    let request_id = request_id(&headers);
    tracing::info!(url = %request.url, request_id, "processing analyze request");

    let deadline = Instant::now() + state.request_budget;
    match state.analyzer.analyze(deadline, &request.url).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(AnalysisError::BadRequest { url }) => {
            tracing::warn!(url = %url, request_id, "rejected invalid URL");
            error_response(StatusCode::BAD_REQUEST, "Invalid request format")
        }
        Err(AnalysisError::Fetch {
            url,
            source: FetchError::Timeout { .. },
        }) => {
            tracing::warn!(url = %url, request_id, "analysis deadline elapsed");
            error_response(StatusCode::GATEWAY_TIMEOUT, "Analysis timeout")
        }
        Err(e) => {
            tracing::error!(error = %e, request_id, "analysis failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to analyze URL")
        }
    }
}

async fn check_links(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CheckLinksRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request format"),
    };

    if request.links.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No links provided");
    }

    let request_id = request_id(&headers);
    tracing::info!(
        link_count = request.links.len(),
        request_id,
        "processing batch link check request"
    );

    let started = std::time::Instant::now();
    let deadline = Instant::now() + state.request_budget;
    let statuses = match state.engine.check_batch(deadline, &request.links).await {
        Ok(statuses) => statuses,
        Err(e) => {
            tracing::error!(error = %e, request_id, "failed to check links");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to check links");
        }
    };

    let duration = started.elapsed();
    tracing::info!(
        link_count = statuses.len(),
        duration = ?duration,
        request_id,
        "batch link check completed"
    );

    (
        StatusCode::OK,
        Json(CheckLinksResponse {
            link_statuses: statuses,
            checked_at: Utc::now(),
            duration: format!("{:.3?}", duration),
        }),
    )
        .into_response()
}

async fn check_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CheckLinkRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request format"),
    };

    if request.link.url.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Link URL is required");
    }

    let request_id = request_id(&headers);
    tracing::info!(url = %request.link.url, request_id, "processing single link check");

    let status = state.engine.check_link(request.link).await;

    tracing::info!(
        url = %status.link.url,
        accessible = status.accessible,
        status_code = status.status_code,
        request_id,
        "single link check completed"
    );

    (StatusCode::OK, Json(status)).into_response()
}

async fn health() -> Response {
    let body = HealthStatus {
        status: "ok".to_string(),
        service: "pagescope".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody::new(message, status.as_u16()))).into_response()
}
