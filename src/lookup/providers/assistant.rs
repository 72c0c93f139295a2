// src/lookup/providers/assistant.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::AssistantSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{HttpRequest, HttpTransport};
use crate::lookup::types::{AssistantAnswer, ProviderId};
use crate::lookup::{parse_json, send_checked, Provider};
use crate::query::NormalizedQuery;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Questions to the model may run longer than a search term.
pub const MAX_PROMPT_LEN: usize = 500;

/// Gemini `generateContent`, one user turn per lookup.
pub struct AssistantProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    model: String,
    api_key: String,
}

impl AssistantProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: &AssistantSettings) -> anyhow::Result<Self> {
        Ok(Self {
            transport,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.resolve(API_KEY_ENV)?,
        })
    }
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "safetySettings": [{
            "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "threshold": "BLOCK_LOW_AND_ABOVE"
        }]
    })
}

/// Join the text parts of the first candidate into `{ text }`.
pub fn normalize(body: &Value) -> ProviderResult<Value> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array);

    let text: String = parts
        .into_iter()
        .flatten()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        if let Some(reason) = body.pointer("/promptFeedback/blockReason").and_then(Value::as_str) {
            tracing::info!(provider = "assistant", block_reason = reason, "prompt blocked");
        }
        return Err(ProviderError::NoResults {
            provider: ProviderId::Assistant,
        });
    }
    Ok(json!({ "text": text }))
}

#[async_trait]
impl Provider for AssistantProvider {
    type Output = AssistantAnswer;

    fn id(&self) -> ProviderId {
        ProviderId::Assistant
    }

    fn max_query_len(&self) -> usize {
        MAX_PROMPT_LEN
    }

    async fn fetch_raw(&self, query: &NormalizedQuery) -> ProviderResult<Value> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request =
            HttpRequest::post_json(url, request_body(query.as_str())).with_query("key", self.api_key.as_str());
        let body = send_checked(self.transport.as_ref(), self.id(), request).await?;
        normalize(&parse_json(self.id(), &body)?)
    }
}
