// tests/pubmed_two_step.rs
//
// esearch → esummary protocol, checked through call counts on the stub.

mod common;

use std::sync::Arc;

use medi_glossary::cache::SystemClock;
use medi_glossary::lookup::providers::PubMedProvider;
use medi_glossary::lookup::Adapter;
use medi_glossary::ProviderError;

use common::*;

fn adapter(stub: Arc<StubTransport>) -> Adapter<PubMedProvider> {
    let provider = PubMedProvider::new(stub, &test_config().literature).unwrap();
    Adapter::new(provider, Arc::new(SystemClock))
}

#[tokio::test]
async fn zero_ids_skips_summary_step() {
    let empty = r#"{"esearchresult":{"count":"0","retmax":"0","idlist":[]}}"#;
    let stub = StubTransport::new()
        .on(ESEARCH_URL, 200, empty)
        .on(ESUMMARY_URL, 200, ESUMMARY_JSON)
        .shared();

    let err = adapter(stub.clone()).fetch("zzzqqq").await.unwrap_err();

    assert!(matches!(err, ProviderError::NoResults { .. }));
    assert_eq!(stub.calls_to(ESEARCH_URL), 1);
    assert_eq!(stub.calls_to(ESUMMARY_URL), 0, "summary step must not run");
}

#[tokio::test]
async fn summary_requested_for_exactly_the_found_ids() {
    let stub = StubTransport::new()
        .on(ESEARCH_URL, 200, ESEARCH_JSON)
        .on(ESUMMARY_URL, 200, ESUMMARY_JSON)
        .shared();

    let articles = adapter(stub.clone()).fetch("insulin resistance").await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    let search = &requests[0];
    assert_eq!(search.query_value("db"), Some("pubmed"));
    assert_eq!(search.query_value("retmode"), Some("json"));
    assert_eq!(search.query_value("sort"), Some("relevance"));
    assert_eq!(search.query_value("api_key"), None);
    assert_eq!(
        requests[1].query_value("id"),
        Some("38012345,37999001,37888777")
    );

    // 37888777 is absent from the summary and skipped
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].id, "38012345");
    assert_eq!(articles[0].title, "Insulin resistance in type 2 diabetes.");
    assert_eq!(articles[0].abstract_text, "");
    assert_eq!(articles[1].title, "No title");
    assert_eq!(articles[1].abstract_text, "Background: glycemic control.");
}

#[tokio::test]
async fn summary_failure_keeps_upstream_status() {
    let stub = StubTransport::new()
        .on(ESEARCH_URL, 200, ESEARCH_JSON)
        .on(ESUMMARY_URL, 429, "API rate limit exceeded")
        .shared();

    let err = adapter(stub).fetch("insulin").await.unwrap_err();
    match err {
        ProviderError::UpstreamUnavailable { status, message, .. } => {
            assert_eq!(status, Some(429));
            assert_eq!(message, "API rate limit exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn wrong_title_type_is_invalid_data() {
    let summary = r#"{"result":{"uids":["1"],"1":{"title":42}}}"#;
    let stub = StubTransport::new()
        .on(ESEARCH_URL, 200, r#"{"esearchresult":{"idlist":["1"]}}"#)
        .on(ESUMMARY_URL, 200, summary)
        .shared();

    let adapter = adapter(stub);
    let err = adapter.fetch("anything").await.unwrap_err();
    match err {
        ProviderError::InvalidUpstreamData { source, .. } => {
            assert_eq!(source.paths(), vec!["$[0].title"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(adapter.cache().is_empty(), "invalid data must not be cached");
}
