// tests/metrics.rs
//
// The /metrics exposition carries the lookup series once traffic has gone
// through the adapters. One recorder per process, so everything runs in a
// single test.

mod common;

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use medi_glossary::cache::{SystemClock, DEFAULT_TTL_SECS};
use medi_glossary::metrics::Metrics;
use medi_glossary::{create_router, AppState, ProviderRegistry};

use common::*;

// One video item missing most of its snippet; it is dropped during
// normalization.
const BROKEN_VIDEO_JSON: &str = r#"{"items":[{"id":{"videoId":"abc123"},"snippet":{"title":"Insulin basics"}}]}"#;

async fn status_of(app: &Router, uri: &str) -> StatusCode {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let metrics = Metrics::init(DEFAULT_TTL_SECS).expect("install prometheus recorder");

    let stub = StubTransport::new()
        .on(DICTIONARY_URL, 200, DICTIONARY_JSON)
        .on(MEDLINE_URL, 200, r#"{"error":"maintenance"}"#)
        .on(VIDEO_URL, 200, BROKEN_VIDEO_JSON)
        .shared();
    let registry = ProviderRegistry::from_config(&test_config(), stub.clone(), Arc::new(SystemClock));
    let app = create_router(AppState::new(registry)).merge(metrics.router());

    // miss, then hit
    assert_eq!(status_of(&app, "/api/v1/dictionary?query=diabetes").await, StatusCode::OK);
    assert_eq!(status_of(&app, "/api/v1/dictionary?query=diabetes").await, StatusCode::OK);
    assert_eq!(stub.calls_to(DICTIONARY_URL), 1);

    assert_eq!(
        status_of(&app, "/api/v1/medline?query=diabetes").await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(status_of(&app, "/api/v1/video?query=insulin").await, StatusCode::NOT_FOUND);

    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "lookup_requests_total",
        "lookup_cache_hits_total{provider=\"dictionary\"} 1",
        "lookup_cache_misses_total{provider=\"dictionary\"} 1",
        "lookup_upstream_ms",
        "lookup_cache_ttl_secs",
        "lookup_schema_violations_total{provider=\"medline\"} 1",
        "lookup_schema_violations_total{provider=\"video\"} 1",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
