// tests/common/mod.rs
//
// Shared helpers: a canned HttpTransport that routes by URL fragment and
// records every request, plus a provider config with literal test keys.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use medi_glossary::config::{ProvidersConfig, Secret};
use medi_glossary::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};

pub const MEDLINE_XML: &str = include_str!("../fixtures/medline_diabetes.xml");
pub const DICTIONARY_JSON: &str = include_str!("../fixtures/dictionary_diabetes.json");
pub const ESEARCH_JSON: &str = include_str!("../fixtures/pubmed_esearch.json");
pub const ESUMMARY_JSON: &str = include_str!("../fixtures/pubmed_esummary.json");
pub const SEARCH_JSON: &str = include_str!("../fixtures/search_diabetes.json");

enum Reply {
    Response(HttpResponse),
    Fail(TransportError),
}

struct Route {
    fragment: String,
    reply: Reply,
}

/// First route whose fragment occurs in the request URL answers. Unrouted
/// requests get a 404 so a missing stub shows up as an upstream error.
#[derive(Default)]
pub struct StubTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, fragment: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            fragment: fragment.to_string(),
            reply: Reply::Response(HttpResponse::new(status, body)),
        });
        self
    }

    pub fn fail(mut self, fragment: &str, err: TransportError) -> Self {
        self.routes.push(Route {
            fragment: fragment.to_string(),
            reply: Reply::Fail(err),
        });
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        self.calls.lock().push(request);

        match self.routes.iter().find(|r| url.contains(&r.fragment)) {
            Some(Route {
                reply: Reply::Response(resp),
                ..
            }) => Ok(resp.clone()),
            Some(Route {
                reply: Reply::Fail(err),
                ..
            }) => Err(err.clone()),
            None => Ok(HttpResponse::new(404, "no stub for url")),
        }
    }
}

/// Default endpoints with literal keys, so nothing reads the environment.
pub fn test_config() -> ProvidersConfig {
    let mut cfg = ProvidersConfig::default();
    cfg.dictionary.api_key = Secret::new("dict-key");
    cfg.web_search.api_key = Secret::new("search-key");
    cfg.web_search.engine_id = Secret::new("engine-id");
    cfg.video.api_key = Secret::new("yt-key");
    cfg.literature.api_key = Secret::new("");
    cfg.assistant.api_key = Secret::new("gemini-key");
    cfg
}

// Fragments of the default upstream URLs.
pub const DICTIONARY_URL: &str = "dictionaryapi.com";
pub const SEARCH_URL: &str = "customsearch/v1";
pub const VIDEO_URL: &str = "youtube/v3/search";
pub const ESEARCH_URL: &str = "esearch.fcgi";
pub const ESUMMARY_URL: &str = "esummary.fcgi";
pub const MEDLINE_URL: &str = "wsearch.nlm.nih.gov";
pub const ASSISTANT_URL: &str = "generateContent";
