// src/lookup/providers/video.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::VideoSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{HttpRequest, HttpTransport};
use crate::lookup::types::{ProviderId, Video};
use crate::lookup::{log_violations, parse_json, send_checked, Provider};
use crate::query::NormalizedQuery;
use crate::schema::{self, Validated};

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// YouTube Data API v3 `search.list`, videos only.
pub struct VideoProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    max_results: u32,
}

impl VideoProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: &VideoSettings) -> anyhow::Result<Self> {
        Ok(Self {
            transport,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.resolve(API_KEY_ENV)?,
            max_results: settings.max_results,
        })
    }
}

/// Flatten one search item (`id.videoId` + `snippet.*`).
fn flatten_item(item: &Value) -> Value {
    let mut out = Map::new();
    let mut put = |key: &str, pointer: &str| {
        if let Some(v) = item.pointer(pointer) {
            out.insert(key.to_string(), v.clone());
        }
    };
    put("videoId", "/id/videoId");
    put("publishedAt", "/snippet/publishedAt");
    put("channelId", "/snippet/channelId");
    put("title", "/snippet/title");
    put("description", "/snippet/description");
    put("channelTitle", "/snippet/channelTitle");
    put("liveBroadcastContent", "/snippet/liveBroadcastContent");

    let mut high = Map::new();
    for key in ["url", "height", "width"] {
        if let Some(v) = item.pointer(&format!("/snippet/thumbnails/high/{key}")) {
            high.insert(key.to_string(), v.clone());
        }
    }
    out.insert("high".into(), Value::Object(high));

    Value::Object(out)
}

/// Keep only the items that validate on their own; a bad item does not
/// sink the whole answer.
pub fn normalize(body: &Value) -> ProviderResult<Value> {
    let no_results = || ProviderError::NoResults {
        provider: ProviderId::Video,
    };

    let items = match body.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => return Err(no_results()),
    };

    let item_schema = Video::schema();
    let mut kept = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let flat = flatten_item(item);
        match schema::check(&item_schema, &flat) {
            Ok(()) => kept.push(flat),
            Err(err) => {
                log_violations(ProviderId::Video, &err);
                tracing::warn!(provider = "video", index = i, "dropping invalid video item");
            }
        }
    }

    if kept.is_empty() {
        return Err(no_results());
    }
    Ok(Value::Array(kept))
}

#[async_trait]
impl Provider for VideoProvider {
    type Output = Vec<Video>;

    fn id(&self) -> ProviderId {
        ProviderId::Video
    }

    async fn fetch_raw(&self, query: &NormalizedQuery) -> ProviderResult<Value> {
        let request = HttpRequest::get(self.base_url.as_str())
            .with_query("part", "snippet")
            .with_query("q", query.as_str())
            .with_query("type", "video")
            .with_query("maxResults", self.max_results.to_string())
            .with_query("key", self.api_key.as_str());
        let body = send_checked(self.transport.as_ref(), self.id(), request).await?;
        normalize(&parse_json(self.id(), &body)?)
    }
}
