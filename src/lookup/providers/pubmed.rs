// src/lookup/providers/pubmed.rs
//! PubMed via NCBI E-utilities. Two requests per lookup: `esearch` resolves
//! the term to PMIDs, `esummary` fetches the records for exactly those ids.
//! The second request is skipped when the first finds nothing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::LiteratureSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{HttpRequest, HttpTransport};
use crate::lookup::types::{Article, ProviderId};
use crate::lookup::{parse_json, send_checked, Provider};
use crate::query::NormalizedQuery;
use crate::schema::SchemaError;

pub const API_KEY_ENV: &str = "NCBI_API_KEY";

const NO_TITLE: &str = "No title";

pub struct PubMedProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
    max_ids: usize,
}

impl PubMedProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: &LiteratureSettings) -> anyhow::Result<Self> {
        Ok(Self {
            transport,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.resolve_optional(API_KEY_ENV),
            max_ids: settings.max_ids,
        })
    }

    fn request(&self, endpoint: &str) -> HttpRequest {
        let req = HttpRequest::get(format!("{}/{endpoint}", self.base_url)).with_query("db", "pubmed");
        match &self.api_key {
            Some(key) => req.with_query("api_key", key.as_str()),
            None => req,
        }
    }

    async fn search_ids(&self, query: &NormalizedQuery) -> ProviderResult<Vec<String>> {
        let request = self
            .request("esearch.fcgi")
            .with_query("term", query.as_str())
            .with_query("retmax", self.max_ids.to_string())
            .with_query("retmode", "json")
            .with_query("sort", "relevance");
        let body = send_checked(self.transport.as_ref(), self.id(), request).await?;
        Ok(extract_ids(&parse_json(self.id(), &body)?, self.max_ids))
    }

    async fn summaries(&self, ids: &[String]) -> ProviderResult<Value> {
        let request = self
            .request("esummary.fcgi")
            .with_query("id", ids.join(","))
            .with_query("retmode", "json");
        let body = send_checked(self.transport.as_ref(), self.id(), request).await?;
        parse_json(self.id(), &body)
    }
}

/// PMIDs from an `esearch` body, capped at `max`. A missing list counts as empty.
pub fn extract_ids(body: &Value, max: usize) -> Vec<String> {
    body.pointer("/esearchresult/idlist")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .take(max)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Build `[{id, title, abstract}]` in PMID order from an `esummary` body.
/// Ids missing from the summary are skipped.
pub fn build_articles(ids: &[String], summary: &Value) -> ProviderResult<Value> {
    let result = summary
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ProviderError::invalid(
                ProviderId::Literature,
                SchemaError::single("$.result", "expected object in summary response"),
            )
        })?;

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(article) = result.get(id).filter(|a| a.is_object()) else {
            tracing::debug!(pmid = %id, "pmid missing from summary result");
            continue;
        };
        out.push(json!({
            "id": id,
            "title": or_default(article.get("title"), NO_TITLE),
            "abstract": or_default(article.get("abstract"), ""),
        }));
    }
    Ok(Value::Array(out))
}

/// Missing, null or empty string falls back; other types are kept so the
/// schema check rejects them.
fn or_default(v: Option<&Value>, default: &str) -> Value {
    match v {
        None | Some(Value::Null) => json!(default),
        Some(Value::String(s)) if s.is_empty() => json!(default),
        Some(other) => other.clone(),
    }
}

#[async_trait]
impl Provider for PubMedProvider {
    type Output = Vec<Article>;

    fn id(&self) -> ProviderId {
        ProviderId::Literature
    }

    async fn fetch_raw(&self, query: &NormalizedQuery) -> ProviderResult<Value> {
        let ids = self.search_ids(query).await?;
        if ids.is_empty() {
            return Err(ProviderError::NoResults {
                provider: self.id(),
            });
        }
        let summary = self.summaries(&ids).await?;
        build_articles(&ids, &summary)
    }
}
