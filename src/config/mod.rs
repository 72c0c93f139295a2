//! Configuration: an optional TOML file for endpoints and limits, secrets
//! from the environment.

pub mod providers;

pub use providers::{
    AssistantSettings, DictionarySettings, HealthTopicsSettings, HttpSettings, LiteratureSettings,
    ProvidersConfig, Secret, VideoSettings, WebSearchSettings,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/providers.toml";
pub const ENV_CONFIG_PATH: &str = "MEDI_CONFIG_PATH";
