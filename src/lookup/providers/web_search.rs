// src/lookup/providers/web_search.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::config::WebSearchSettings;
use crate::error::ProviderResult;
use crate::http::{HttpRequest, HttpTransport};
use crate::lookup::types::{ProviderId, SearchRecommendation};
use crate::lookup::{copy_fields, parse_json, send_checked, Provider};
use crate::query::NormalizedQuery;

pub const API_KEY_ENV: &str = "GOOGLE_SEARCH_API_KEY";
pub const ENGINE_ID_ENV: &str = "GOOGLE_SEARCH_ENGINE_ID";

const NO_SNIPPET: &str = "No snippet available";

/// Google Custom Search JSON API.
pub struct WebSearchProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl WebSearchProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: &WebSearchSettings) -> anyhow::Result<Self> {
        Ok(Self {
            transport,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.resolve(API_KEY_ENV)?,
            engine_id: settings.engine_id.resolve(ENGINE_ID_ENV)?,
        })
    }
}

/// Reshape the raw response into `{ info, items }`.
pub fn normalize(body: &Value) -> Value {
    let mut out = Map::new();
    if let Some(info) = body.get("searchInformation") {
        let mut dst = Map::new();
        copy_fields(
            info,
            &mut dst,
            &[
                "totalResults",
                "searchTime",
                "formattedTotalResults",
                "formattedSearchTime",
            ],
        );
        out.insert("info".into(), Value::Object(dst));
    }

    // No hits: Google omits `items` entirely.
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(normalize_item).collect())
        .unwrap_or_default();
    out.insert("items".into(), Value::Array(items));

    Value::Object(out)
}

fn normalize_item(item: &Value) -> Value {
    let mut out = Map::new();
    copy_fields(item, &mut out, &["link", "title"]);

    let snippet = match item.get("snippet") {
        None | Some(Value::Null) => json!(NO_SNIPPET),
        Some(Value::String(s)) if s.is_empty() => json!(NO_SNIPPET),
        Some(other) => other.clone(),
    };
    out.insert("snippet".into(), snippet);

    if let Some(thumb) = item.pointer("/pagemap/cse_thumbnail/0") {
        let mut dst = Map::new();
        copy_fields(thumb, &mut dst, &["src", "width", "height"]);
        out.insert("thumbnail".into(), Value::Object(dst));
    }

    Value::Object(out)
}

#[async_trait]
impl Provider for WebSearchProvider {
    type Output = SearchRecommendation;

    fn id(&self) -> ProviderId {
        ProviderId::WebSearch
    }

    async fn fetch_raw(&self, query: &NormalizedQuery) -> ProviderResult<Value> {
        let request = HttpRequest::get(self.base_url.as_str())
            .with_query("key", self.api_key.as_str())
            .with_query("cx", self.engine_id.as_str())
            .with_query("q", query.as_str());
        let body = send_checked(self.transport.as_ref(), self.id(), request).await?;
        Ok(normalize(&parse_json(self.id(), &body)?))
    }
}
