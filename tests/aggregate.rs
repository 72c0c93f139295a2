// tests/aggregate.rs
//
// Fan-out over a registry built from config with a stub transport:
// partial failure isolation, all-failed mapping, unconfigured providers.

mod common;

use std::sync::Arc;

use medi_glossary::cache::SystemClock;
use medi_glossary::http::TransportError;
use medi_glossary::lookup::{Aggregator, ProviderId, ProviderPayload, ProviderRegistry};
use medi_glossary::{ErrorKind, ProviderError};
use serde_json::json;

use common::*;

fn aggregator(stub: Arc<StubTransport>) -> Aggregator {
    let registry = ProviderRegistry::from_config(&test_config(), stub, Arc::new(SystemClock));
    Aggregator::new(Arc::new(registry))
}

#[tokio::test]
async fn literature_failure_does_not_affect_web_search() {
    let stub = StubTransport::new()
        .on(SEARCH_URL, 200, SEARCH_JSON)
        .fail(ESEARCH_URL, TransportError::Connect("connection refused".into()))
        .shared();

    let out = aggregator(stub)
        .aggregate_for_query(&[ProviderId::WebSearch, ProviderId::Literature], "diabetes")
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    match out.get(ProviderId::WebSearch) {
        Some(Ok(ProviderPayload::WebSearch(rec))) => {
            assert_eq!(rec.items.len(), 2);
            assert_eq!(rec.items[1].snippet, "No snippet available");
        }
        other => panic!("web search should succeed, got {other:?}"),
    }
    assert!(matches!(
        out.get(ProviderId::Literature),
        Some(Err(ProviderError::UpstreamUnavailable { .. }))
    ));
}

#[tokio::test]
async fn every_branch_failing_still_yields_full_mapping() {
    // nothing routed: every upstream answers 404
    let stub = StubTransport::new().shared();

    let out = aggregator(stub.clone())
        .aggregate_for_query(&ProviderId::ALL, "diabetes")
        .await
        .unwrap();

    assert_eq!(out.len(), ProviderId::ALL.len());
    assert_eq!(out.ok_count(), 0);
    for (_, result) in out.iter() {
        let err = result.as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(err.status_code().as_u16(), 404);
    }
    // pubmed stops after esearch fails
    assert_eq!(stub.total_calls(), ProviderId::ALL.len());
}

#[tokio::test]
async fn duplicate_ids_are_queried_once() {
    let stub = StubTransport::new().on(MEDLINE_URL, 200, MEDLINE_XML).shared();

    let out = aggregator(stub.clone())
        .aggregate_for_query(
            &[ProviderId::HealthTopics, ProviderId::HealthTopics],
            "diabetes",
        )
        .await
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(stub.total_calls(), 1);
}

#[tokio::test]
async fn unregistered_provider_is_not_configured() {
    let stub = StubTransport::new().on(DICTIONARY_URL, 200, DICTIONARY_JSON).shared();
    let mut cfg = test_config();
    cfg.video.enabled = false;
    let registry = ProviderRegistry::from_config(&cfg, stub, Arc::new(SystemClock));
    assert!(registry.get(ProviderId::Video).is_none());

    let out = Aggregator::new(Arc::new(registry))
        .aggregate_for_query(&[ProviderId::Dictionary, ProviderId::Video], "diabetes")
        .await
        .unwrap();

    assert!(out.get(ProviderId::Dictionary).unwrap().is_ok());
    assert!(matches!(
        out.get(ProviderId::Video),
        Some(Err(ProviderError::NotConfigured { .. }))
    ));
}

#[tokio::test]
async fn blank_query_fails_before_any_call() {
    let stub = StubTransport::new().shared();
    let err = aggregator(stub.clone())
        .aggregate_for_query(&ProviderId::ALL, "  ")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::MissingInput));
    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test]
async fn serialized_shape_is_keyed_by_slug() {
    let stub = StubTransport::new()
        .on(MEDLINE_URL, 200, MEDLINE_XML)
        .on(ESEARCH_URL, 200, r#"{"esearchresult":{"idlist":[]}}"#)
        .shared();

    let out = aggregator(stub)
        .aggregate_for_query(&[ProviderId::HealthTopics, ProviderId::Literature], "diabetes")
        .await
        .unwrap();
    let v = serde_json::to_value(&out).unwrap();

    assert_eq!(v["medline"]["status"], "ok");
    assert_eq!(v["medline"]["data"][1], json!({ "title": "", "snippet": "high blood sugar" }));
    assert_eq!(
        v["pubmed"],
        json!({ "status": "error", "kind": "no_results", "code": 404, "error": "No results found" })
    );
}
