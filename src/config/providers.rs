// src/config/providers.rs
use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use std::{env, fmt, fs, path::Path, path::PathBuf};

use super::{DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};

/// API key or identifier. The literal "ENV" (the default) means: read it from
/// the provider's environment variable when the adapter is built.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    fn is_env_ref(&self) -> bool {
        self.0.trim().eq_ignore_ascii_case("env")
    }

    /// Resolve to a non-empty value or fail; used for required keys.
    pub fn resolve(&self, env_var: &str) -> anyhow::Result<String> {
        if self.is_env_ref() {
            return env::var(env_var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("Missing {env_var} env var"));
        }
        let v = self.0.trim();
        if v.is_empty() {
            bail!("Empty value configured for {env_var}");
        }
        Ok(v.to_string())
    }

    /// Resolve an optional key; missing or empty yields `None`.
    pub fn resolve_optional(&self, env_var: &str) -> Option<String> {
        self.resolve(env_var).ok()
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self("ENV".to_string())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_env_ref() {
            f.write_str("Secret(ENV)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("medi-glossary/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 4,
            timeout_secs: 10,
        }
    }
}

/// Merriam-Webster medical dictionary. Key: `DICTIONARY_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DictionarySettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Secret,
}

impl Default for DictionarySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://dictionaryapi.com/api/v3/references/medical/json".into(),
            api_key: Secret::default(),
        }
    }
}

/// Google Custom Search. Keys: `GOOGLE_SEARCH_API_KEY`, `GOOGLE_SEARCH_ENGINE_ID`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSearchSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Secret,
    pub engine_id: Secret,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.googleapis.com/customsearch/v1".into(),
            api_key: Secret::default(),
            engine_id: Secret::default(),
        }
    }
}

/// YouTube Data API search. Key: `YOUTUBE_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Secret,
    pub max_results: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.googleapis.com/youtube/v3/search".into(),
            api_key: Secret::default(),
            max_results: 10,
        }
    }
}

/// PubMed E-utilities. `NCBI_API_KEY` is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiteratureSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Secret,
    pub max_ids: usize,
}

impl Default for LiteratureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".into(),
            api_key: Secret::default(),
            max_ids: 10,
        }
    }
}

/// MedlinePlus health topics web service. No key; `tool`/`email` identify us.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthTopicsSettings {
    pub enabled: bool,
    pub base_url: String,
    pub retmax: u32,
    pub tool: String,
    pub email: String,
}

impl Default for HealthTopicsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://wsearch.nlm.nih.gov/ws/query".into(),
            retmax: 10,
            tool: "medi_glossary".into(),
            email: String::new(),
        }
    }
}

/// Gemini generateContent. Key: `GEMINI_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Secret,
    pub model: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: Secret::default(),
            model: "gemini-1.5-flash".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub http: HttpSettings,
    pub dictionary: DictionarySettings,
    pub web_search: WebSearchSettings,
    pub video: VideoSettings,
    pub literature: LiteratureSettings,
    pub health_topics: HealthTopicsSettings,
    pub assistant: AssistantSettings,
}

impl ProvidersConfig {
    /// Load using env var + fallbacks:
    /// 1) $MEDI_CONFIG_PATH (must exist)
    /// 2) config/providers.toml
    /// 3) built-in defaults
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from_file(&pb);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from_file(default_path);
        }
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading provider config from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing provider config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: ProvidersConfig = toml::from_str(s)?;

        // Sanitize limits
        if cfg.literature.max_ids == 0 {
            cfg.literature.max_ids = LiteratureSettings::default().max_ids;
        }
        if cfg.video.max_results == 0 {
            cfg.video.max_results = VideoSettings::default().max_results;
        }
        if cfg.health_topics.retmax == 0 {
            cfg.health_topics.retmax = HealthTopicsSettings::default().retmax;
        }

        Ok(cfg)
    }
}
