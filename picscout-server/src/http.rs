//! picscout HTTP API
//!
//! Axum-based HTTP server that proxies image searches to the external
//! search API and records every successfully submitted query.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function. The inner functions are directly testable without axum
//! dispatch machinery.
//!
//! Endpoints:
//! - GET /                        — home page with absolute API URLs
//! - GET /api/imagesearch/*query  — proxy an image search, log the query
//! - GET /api/latest/imagesearch/ — most recently submitted queries

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use picscout_core::store::RECENT_LIMIT;
use picscout_core::{HttpConfig, ImageSearchClient, QueryLog};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub search: ImageSearchClient,
    pub log: QueryLog,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/api/imagesearch/*query", get(image_search_handler))
        .route("/api/latest/imagesearch/", get(latest_queries_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    config: &HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("picscout listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    /// Raw query-string value; parsed permissively, anything invalid
    /// coerces to 0.
    pub offset: Option<String>,
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner home page — injects the request's base URL into the page.
pub fn home_inner(base_url: &str) -> String {
    include_str!("../templates/index.html").replace("__BASE_URL__", base_url)
}

/// Inner image search — proxies to the gateway and records the query.
/// The entry is written only after the upstream call succeeded; a
/// failed log write discards the fetched results.
pub async fn image_search_inner(
    state: &HttpState,
    query: &str,
    offset: u32,
) -> (StatusCode, serde_json::Value) {
    let results = match state.search.search(query, offset).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(query, error = %e, "image search failed");
            return internal_error();
        }
    };

    if let Err(e) = state.log.save(query).await {
        tracing::error!(query, error = %e, "failed to record query");
        return internal_error();
    }

    (StatusCode::OK, serde_json::json!(results))
}

/// Inner recent-queries listing. Store errors surface as a server
/// error rather than an empty body.
pub async fn latest_queries_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    match state.log.get_recent(RECENT_LIMIT).await {
        Ok(entries) => (StatusCode::OK, serde_json::json!(entries)),
        Err(e) => {
            tracing::error!(error = %e, "failed to read recent queries");
            internal_error()
        }
    }
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn home_handler(headers: HeaderMap) -> Html<String> {
    Html(home_inner(&scheme_and_host(&headers)))
}

pub async fn image_search_handler(
    State(state): State<Arc<HttpState>>,
    Path(query): Path<String>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let offset = parse_offset(params.offset.as_deref());
    let (status, body) = image_search_inner(&state, &query, offset).await;
    (status, Json(body))
}

pub async fn latest_queries_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = latest_queries_inner(&state).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

/// Base website URL as seen by the client, from the request headers.
pub fn scheme_and_host(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}

/// Permissive offset parse: invalid or negative input coerces to 0.
pub fn parse_offset(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

fn internal_error() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({
            "error": "internal server error",
            "status": "error",
        }),
    )
}

// ============================================================================
// Unit Tests — pure helpers
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_offset_valid() {
        assert_eq!(parse_offset(Some("5")), 5);
        assert_eq!(parse_offset(Some("0")), 0);
    }

    #[test]
    fn test_parse_offset_coerces_invalid_to_zero() {
        assert_eq!(parse_offset(Some("abc")), 0);
        assert_eq!(parse_offset(Some("-3")), 0);
        assert_eq!(parse_offset(Some("")), 0);
        assert_eq!(parse_offset(None), 0);
    }

    #[test]
    fn test_scheme_and_host_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com:3000"));

        assert_eq!(scheme_and_host(&headers), "http://example.com:3000");
    }

    #[test]
    fn test_scheme_and_host_honors_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        assert_eq!(scheme_and_host(&headers), "https://example.com");
    }

    #[test]
    fn test_home_inner_injects_base_url() {
        let page = home_inner("http://example.com:3000");

        assert!(page.contains("http://example.com:3000/api/imagesearch/"));
        assert!(page.contains("http://example.com:3000/api/latest/imagesearch/"));
        assert!(!page.contains("__BASE_URL__"));
    }
}
