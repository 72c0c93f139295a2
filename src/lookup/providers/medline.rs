// src/lookup/providers/medline.rs
//! MedlinePlus health topics web service (XML).
//!
//! Each `<document>` carries a list of `<content name="...">` fields with
//! HTML-escaped text. Only `title` and `snippet` are kept; either one may be
//! missing and then defaults to an empty string.

use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use serde_json::Value;

use crate::config::HealthTopicsSettings;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{HttpRequest, HttpTransport};
use crate::lookup::types::{HealthTopic, ProviderId};
use crate::lookup::{send_checked, strip_markup, Provider};
use crate::query::NormalizedQuery;
use crate::schema::SchemaError;

#[derive(Debug, Deserialize)]
struct NlmSearchResult {
    #[serde(default)]
    list: Option<DocumentList>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentList {
    #[serde(rename = "document", default)]
    documents: Vec<Document>,
}

// A document with a single `<content>` child and one with several both land
// in `fields` as a Vec, so callers never branch on the shape.
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "content", default)]
    fields: Vec<ContentField>,
}

/// One `{name, value}` pair of a document's field list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContentField {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

impl ContentField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Collapse a field list into `{title, snippet}`; other fields are ignored.
pub fn flatten_fields<I>(fields: I) -> HealthTopic
where
    I: IntoIterator<Item = ContentField>,
{
    let mut topic = HealthTopic::default();
    for field in fields {
        match field.name.as_str() {
            "title" => topic.title = strip_markup(&field.value),
            "snippet" => topic.snippet = strip_markup(&field.value),
            _ => {}
        }
    }
    topic
}

/// Parse the XML envelope into flattened topics. A missing `<list>` is an
/// empty result.
pub fn parse_topics(xml: &str) -> ProviderResult<Vec<HealthTopic>> {
    let invalid = |msg: String| {
        ProviderError::invalid(ProviderId::HealthTopics, SchemaError::single("$", msg))
    };

    if !xml.trim_start().starts_with('<') {
        return Err(invalid("expected an XML document".to_string()));
    }

    let xml_clean = scrub_html_entities_for_xml(xml);
    let envelope: NlmSearchResult =
        from_str(&xml_clean).map_err(|e| invalid(format!("parsing health topics xml: {e}")))?;

    Ok(envelope
        .list
        .unwrap_or_default()
        .documents
        .into_iter()
        .map(|doc| flatten_fields(doc.fields))
        .collect())
}

/// HTML-only entities are not valid XML; map the common ones first.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

pub struct MedlineProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    retmax: u32,
    tool: String,
    email: String,
}

impl MedlineProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: &HealthTopicsSettings) -> anyhow::Result<Self> {
        Ok(Self {
            transport,
            base_url: settings.base_url.clone(),
            retmax: settings.retmax,
            tool: settings.tool.clone(),
            email: settings.email.trim().to_string(),
        })
    }
}

#[async_trait]
impl Provider for MedlineProvider {
    type Output = Vec<HealthTopic>;

    fn id(&self) -> ProviderId {
        ProviderId::HealthTopics
    }

    async fn fetch_raw(&self, query: &NormalizedQuery) -> ProviderResult<Value> {
        let mut request = HttpRequest::get(self.base_url.as_str())
            .with_query("db", "healthTopics")
            .with_query("term", query.as_str())
            .with_query("retmax", self.retmax.to_string())
            .with_query("rettype", "brief")
            .with_query("tool", self.tool.as_str());
        if !self.email.is_empty() {
            request = request.with_query("email", self.email.as_str());
        }

        let body = send_checked(self.transport.as_ref(), self.id(), request).await?;
        let topics = parse_topics(&body)?;
        serde_json::to_value(&topics).map_err(|e| ProviderError::unexpected(self.id(), e.to_string()))
    }
}
