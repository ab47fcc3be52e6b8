//! Router-level tests for the search and health endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bloomserver_filter::BloomFilter;
use bloomserver_gateway::{GatewayConfig, QueryGatewayService};
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

fn filter_with(words: &[&str]) -> Arc<BloomFilter> {
    let mut filter = BloomFilter::new(1 << 16, 5).unwrap();
    for word in words {
        filter.insert(word.as_bytes());
    }
    Arc::new(filter)
}

fn app_with(config: GatewayConfig, words: &[&str]) -> (QueryGatewayService, Router) {
    let service = QueryGatewayService::new(config, filter_with(words)).unwrap();
    let router = service.router();
    (service, router)
}

fn app(words: &[&str]) -> Router {
    app_with(GatewayConfig::default(), words).1
}

fn search(query: &str, body: impl Into<Vec<u8>>) -> Request<Body> {
    let body = body.into();
    Request::builder()
        .method("GET")
        .uri(format!("/api/search{}", query))
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> (StatusCode, Vec<u8>) {
    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    (status, bytes.to_vec())
}

async fn guilty(resp: axum::response::Response) -> Vec<String> {
    let (status, bytes) = body_bytes(resp).await;
    assert_eq!(status, StatusCode::OK);
    let json: JsonValue = serde_json::from_slice(&bytes).expect("valid JSON response");
    serde_json::from_value(json["guiltySubstrings"].clone()).unwrap()
}

// =============================================================================
// SUCCESSFUL SEARCHES
// =============================================================================

#[tokio::test]
async fn search_reports_matches_in_scan_order() {
    let resp = app(&["ab", "bcd"])
        .oneshot(search("?substringLength=1", "abcd"))
        .await
        .unwrap();

    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(guilty(resp).await, vec!["ab", "bcd"]);
}

#[tokio::test]
async fn search_without_length_tests_whole_text_only() {
    for query in ["", "?substringLength="] {
        let resp = app(&["ab", "abcd"])
            .oneshot(search(query, "abcd"))
            .await
            .unwrap();
        assert_eq!(guilty(resp).await, vec!["abcd"]);
    }
}

#[tokio::test]
async fn search_with_no_matches_returns_empty_array() {
    let resp = app(&["zebra"])
        .oneshot(search("?substringLength=2", "hello"))
        .await
        .unwrap();

    let (status, bytes) = body_bytes(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, br#"{"guiltySubstrings":[]}"#);
}

#[tokio::test]
async fn search_length_longer_than_text_is_not_an_error() {
    let resp = app(&["ab"])
        .oneshot(search("?substringLength=10", "ab"))
        .await
        .unwrap();
    assert!(guilty(resp).await.is_empty());
}

#[tokio::test]
async fn search_handles_multibyte_text() {
    let resp = app(&["ñé"])
        .oneshot(search("?substringLength=2", "añéb"))
        .await
        .unwrap();
    assert_eq!(guilty(resp).await, vec!["ñé"]);
}

// =============================================================================
// REJECTIONS
// =============================================================================

async fn assert_rejected(router: Router, request: Request<Body>, expected: StatusCode) {
    let resp = router.oneshot(request).await.unwrap();
    let (status, bytes) = body_bytes(resp).await;
    assert_eq!(status, expected);
    assert!(bytes.is_empty(), "error responses carry no body");
}

#[tokio::test]
async fn invalid_substring_length_is_bad_request() {
    for query in ["?substringLength=abc", "?substringLength=-1", "?substringLength=65536"] {
        assert_rejected(app(&[]), search(query, "abcd"), StatusCode::BAD_REQUEST).await;
    }
}

#[tokio::test]
async fn missing_or_zero_content_length_is_bad_request() {
    let no_header = Request::builder()
        .method("GET")
        .uri("/api/search")
        .body(Body::from("abcd"))
        .unwrap();
    assert_rejected(app(&[]), no_header, StatusCode::BAD_REQUEST).await;

    assert_rejected(app(&[]), search("", ""), StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let config = GatewayConfig {
        max_request_body_length: 8,
        ..Default::default()
    };
    let (_service, router) = app_with(config, &[]);

    // Any attempt to read the body aborts the test.
    let body = Body::from("123456789").map_frame(|frame| {
        if frame.is_data() {
            panic!("oversized body was read");
        } else {
            frame
        }
    });
    let request = Request::builder()
        .method("GET")
        .uri("/api/search")
        .header(header::CONTENT_LENGTH, "9")
        .body(Body::new(body))
        .unwrap();
    assert_rejected(router, request, StatusCode::PAYLOAD_TOO_LARGE).await;
}

#[tokio::test]
async fn body_at_limit_is_accepted() {
    let config = GatewayConfig {
        max_request_body_length: 4,
        ..Default::default()
    };
    let (_service, router) = app_with(config, &["abcd"]);
    let resp = router.oneshot(search("", "abcd")).await.unwrap();
    assert_eq!(guilty(resp).await, vec!["abcd"]);
}

#[tokio::test]
async fn short_body_is_bad_request() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/search")
        .header(header::CONTENT_LENGTH, "5")
        .body(Body::from("ab"))
        .unwrap();
    assert_rejected(app(&[]), request, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn invalid_utf8_is_bad_request() {
    assert_rejected(
        app(&[]),
        search("?substringLength=1", vec![0x61, 0xff, 0xfe]),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn scan_over_budget_is_request_timeout() {
    let config = GatewayConfig {
        max_request_body_length: 1 << 16,
        scan_timeout_ms: 1,
        ..Default::default()
    };
    let (service, router) = app_with(config, &["needle"]);
    let text = "x".repeat(20_000);

    assert_rejected(router, search("?substringLength=1", text), StatusCode::REQUEST_TIMEOUT).await;
    assert_eq!(service.metrics().snapshot().requests_timeout, 1);
}

#[tokio::test]
async fn post_is_not_routed() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/search")
        .header(header::CONTENT_LENGTH, "4")
        .body(Body::from("abcd"))
        .unwrap();
    let resp = app(&[]).oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn health_reports_filter_and_counters() {
    let (service, router) = app_with(GatewayConfig::default(), &["ab", "bcd"]);

    router
        .clone()
        .oneshot(search("?substringLength=1", "abcd"))
        .await
        .unwrap();
    router
        .clone()
        .oneshot(search("?substringLength=x", "abcd"))
        .await
        .unwrap();

    let resp = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, bytes) = body_bytes(resp).await;
    assert_eq!(status, StatusCode::OK);

    let json: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["m"], 1 << 16);
    assert_eq!(json["k"], 5);
    assert!(json["bitsSet"].as_u64().unwrap() > 0);
    assert_eq!(json["metrics"]["requestsTotal"], 2);
    assert_eq!(json["metrics"]["requestsSuccess"], 1);
    assert_eq!(json["metrics"]["requestsRejected"], 1);
    assert_eq!(json["metrics"]["substringsMatched"], 2);

    assert_eq!(service.metrics().snapshot().requests_total, 2);
}
