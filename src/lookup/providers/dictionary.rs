// src/lookup/providers/dictionary.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::DictionarySettings;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{HttpRequest, HttpTransport};
use crate::lookup::types::{DictionaryEntry, ProviderId};
use crate::lookup::{parse_json, send_checked, Provider};
use crate::query::NormalizedQuery;

pub const API_KEY_ENV: &str = "DICTIONARY_API_KEY";

/// Merriam-Webster medical dictionary: `GET {base}/{term}?key=...`.
pub struct DictionaryProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

impl DictionaryProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: &DictionarySettings) -> anyhow::Result<Self> {
        let api_key = settings.api_key.resolve(API_KEY_ENV)?;
        Ok(Self {
            transport,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// Unknown words come back as a list of spelling suggestions (plain
/// strings) instead of entries; treat that like an empty answer.
fn classify(body: Value) -> ProviderResult<Value> {
    match &body {
        Value::Array(items) if items.is_empty() => Err(ProviderError::NoResults {
            provider: ProviderId::Dictionary,
        }),
        Value::Array(items) if items.iter().all(Value::is_string) => {
            tracing::debug!(suggestions = items.len(), "dictionary returned suggestions only");
            Err(ProviderError::NoResults {
                provider: ProviderId::Dictionary,
            })
        }
        _ => Ok(body),
    }
}

#[async_trait]
impl Provider for DictionaryProvider {
    type Output = Vec<DictionaryEntry>;

    fn id(&self) -> ProviderId {
        ProviderId::Dictionary
    }

    async fn fetch_raw(&self, query: &NormalizedQuery) -> ProviderResult<Value> {
        let url = format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(query.as_str())
        );
        let request = HttpRequest::get(url).with_query("key", self.api_key.as_str());
        let body = send_checked(self.transport.as_ref(), self.id(), request).await?;
        classify(parse_json(self.id(), &body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_array_is_no_results() {
        assert!(matches!(
            classify(json!([])),
            Err(ProviderError::NoResults { .. })
        ));
    }

    #[test]
    fn suggestions_are_no_results() {
        assert!(matches!(
            classify(json!(["diabetic", "diabetes insipidus"])),
            Err(ProviderError::NoResults { .. })
        ));
    }

    #[test]
    fn entries_pass_through_for_validation() {
        let body = json!([{ "meta": {} }]);
        assert_eq!(classify(body.clone()).unwrap(), body);
        // non-array bodies are left for the schema check to reject
        assert_eq!(classify(json!({})).unwrap(), json!({}));
    }
}
