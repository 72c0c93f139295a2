// src/lookup/types.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Field, Schema, Validated};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "dictionary")]
    Dictionary,
    #[serde(rename = "search")]
    WebSearch,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "pubmed")]
    Literature,
    #[serde(rename = "medline")]
    HealthTopics,
    #[serde(rename = "assistant")]
    Assistant,
}

impl ProviderId {
    pub const ALL: [ProviderId; 6] = [
        Self::Dictionary,
        Self::WebSearch,
        Self::Video,
        Self::Literature,
        Self::HealthTopics,
        Self::Assistant,
    ];

    /// Path segment under `/api/v1/` and key in aggregate responses.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Dictionary => "dictionary",
            Self::WebSearch => "search",
            Self::Video => "video",
            Self::Literature => "pubmed",
            Self::HealthTopics => "medline",
            Self::Assistant => "assistant",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|p| p.slug().eq_ignore_ascii_case(s))
    }

    /// Name used in caller-facing error messages.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Dictionary => "Merriam-Webster",
            Self::WebSearch => "Google Search",
            Self::Video => "YouTube",
            Self::Literature => "PubMed",
            Self::HealthTopics => "MedlinePlus",
            Self::Assistant => "Gemini",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// Dictionary (Merriam-Webster medical)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub meta: EntryMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hom: Option<u32>,
    pub hwi: Headword,
    pub fl: String,
    pub def: Vec<DefinitionSection>,
    pub shortdef: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryMeta {
    pub id: String,
    pub uuid: String,
    pub src: String,
    pub section: String,
    pub stems: Vec<String>,
    pub offensive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Headword {
    pub hw: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prs: Vec<Pronunciation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pronunciation {
    pub mw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<Sound>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sound {
    pub audio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionSection {
    /// Sense sequence: groups of `["sense", {...}]` pairs.
    pub sseq: Vec<Vec<SenseItem>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SenseTag {
    #[serde(rename = "sense")]
    Sense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TextTag {
    #[serde(rename = "text")]
    Text,
}

/// `["sense", Sense]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SenseItem(pub SenseTag, pub Sense);

/// `["text", "..."]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefiningText(pub TextTag, pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sn: Option<String>,
    pub dt: Vec<DefiningText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdsense: Option<DividedSense>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DividedSense {
    pub sd: String,
    pub dt: Vec<DefiningText>,
}

fn defining_text_schema() -> Schema {
    Schema::array(Schema::tagged("text", Schema::String))
}

impl Validated for DictionaryEntry {
    fn schema() -> Schema {
        let sense = Schema::object([
            Field::optional("sn", Schema::String),
            Field::required("dt", defining_text_schema()),
            Field::optional(
                "sdsense",
                Schema::object([
                    Field::required("sd", Schema::String),
                    Field::required("dt", defining_text_schema()),
                ]),
            ),
        ]);

        Schema::object([
            Field::required(
                "meta",
                Schema::object([
                    Field::required("id", Schema::String),
                    Field::required("uuid", Schema::String),
                    Field::required("src", Schema::String),
                    Field::required("section", Schema::String),
                    Field::required("stems", Schema::array(Schema::String)),
                    Field::required("offensive", Schema::Bool),
                ]),
            ),
            Field::optional("hom", Schema::Integer),
            Field::required(
                "hwi",
                Schema::object([
                    Field::required("hw", Schema::String),
                    Field::optional(
                        "prs",
                        Schema::array(Schema::object([
                            Field::required("mw", Schema::String),
                            Field::optional(
                                "sound",
                                Schema::object([Field::required("audio", Schema::String)]),
                            ),
                        ])),
                    ),
                ]),
            ),
            Field::required("fl", Schema::String),
            Field::required(
                "def",
                Schema::array(Schema::object([Field::required(
                    "sseq",
                    Schema::array(Schema::array(Schema::tagged("sense", sense))),
                )])),
            ),
            Field::required("shortdef", Schema::array(Schema::String)),
        ])
    }
}

// ---------------------------------------------------------------------------
// Web search (Google Custom Search)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRecommendation {
    pub info: SearchInfo,
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub total_results: String,
    pub search_time: f64,
    pub formatted_total_results: String,
    pub formatted_search_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchItem {
    pub link: String,
    pub title: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

/// Google reports thumbnail dimensions as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thumbnail {
    pub src: String,
    pub width: String,
    pub height: String,
}

impl Validated for SearchRecommendation {
    fn schema() -> Schema {
        Schema::object([
            Field::required(
                "info",
                Schema::object([
                    Field::required("totalResults", Schema::String),
                    Field::required("searchTime", Schema::Number),
                    Field::required("formattedTotalResults", Schema::String),
                    Field::required("formattedSearchTime", Schema::String),
                ]),
            ),
            Field::required(
                "items",
                Schema::array(Schema::object([
                    Field::required("link", Schema::String),
                    Field::required("title", Schema::String),
                    Field::required("snippet", Schema::String),
                    Field::optional(
                        "thumbnail",
                        Schema::object([
                            Field::required("src", Schema::String),
                            Field::required("width", Schema::String),
                            Field::required("height", Schema::String),
                        ]),
                    ),
                ])),
            ),
        ])
    }
}

// ---------------------------------------------------------------------------
// Video search (YouTube)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub video_id: String,
    pub published_at: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub live_broadcast_content: String,
    pub high: VideoThumbnail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoThumbnail {
    pub url: String,
    pub height: u32,
    pub width: u32,
}

impl Validated for Video {
    fn schema() -> Schema {
        Schema::object([
            Field::required("videoId", Schema::String),
            Field::required("publishedAt", Schema::String),
            Field::required("channelId", Schema::String),
            Field::required("title", Schema::String),
            Field::required("description", Schema::String),
            Field::required("channelTitle", Schema::String),
            Field::required("liveBroadcastContent", Schema::String),
            Field::required(
                "high",
                Schema::object([
                    Field::required("url", Schema::String),
                    Field::required("height", Schema::Integer),
                    Field::required("width", Schema::Integer),
                ]),
            ),
        ])
    }
}

// ---------------------------------------------------------------------------
// Literature (PubMed)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

impl Validated for Article {
    fn schema() -> Schema {
        Schema::object([
            Field::required("id", Schema::String),
            Field::required("title", Schema::String),
            Field::required("abstract", Schema::String),
        ])
    }
}

// ---------------------------------------------------------------------------
// Health topics (MedlinePlus)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthTopic {
    pub title: String,
    pub snippet: String,
}

impl Validated for HealthTopic {
    fn schema() -> Schema {
        Schema::object([
            Field::required("title", Schema::String),
            Field::required("snippet", Schema::String),
        ])
    }
}

// ---------------------------------------------------------------------------
// Assistant (Gemini)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantAnswer {
    pub text: String,
}

impl Validated for AssistantAnswer {
    fn schema() -> Schema {
        Schema::object([Field::required("text", Schema::String)])
    }
}

// ---------------------------------------------------------------------------
// Type-erased payload for the registry and the aggregator
// ---------------------------------------------------------------------------

/// Serializes as the bare provider payload (array or object).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ProviderPayload {
    Dictionary(Vec<DictionaryEntry>),
    WebSearch(SearchRecommendation),
    Video(Vec<Video>),
    Literature(Vec<Article>),
    HealthTopics(Vec<HealthTopic>),
    Assistant(AssistantAnswer),
}

impl From<Vec<DictionaryEntry>> for ProviderPayload {
    fn from(v: Vec<DictionaryEntry>) -> Self {
        Self::Dictionary(v)
    }
}

impl From<SearchRecommendation> for ProviderPayload {
    fn from(v: SearchRecommendation) -> Self {
        Self::WebSearch(v)
    }
}

impl From<Vec<Video>> for ProviderPayload {
    fn from(v: Vec<Video>) -> Self {
        Self::Video(v)
    }
}

impl From<Vec<Article>> for ProviderPayload {
    fn from(v: Vec<Article>) -> Self {
        Self::Literature(v)
    }
}

impl From<Vec<HealthTopic>> for ProviderPayload {
    fn from(v: Vec<HealthTopic>) -> Self {
        Self::HealthTopics(v)
    }
}

impl From<AssistantAnswer> for ProviderPayload {
    fn from(v: AssistantAnswer) -> Self {
        Self::Assistant(v)
    }
}
