// src/lookup/registry.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::cache::SharedClock;
use crate::config::ProvidersConfig;
use crate::http::HttpTransport;
use crate::lookup::providers::{
    AssistantProvider, DictionaryProvider, MedlineProvider, PubMedProvider, VideoProvider,
    WebSearchProvider,
};
use crate::lookup::{Adapter, Lookup, Provider, ProviderId, ProviderPayload};

/// The adapters that were built successfully, keyed by provider.
///
/// A provider that is disabled or lacks credentials is simply absent; callers
/// turn that into `NotConfigured`.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    adapters: BTreeMap<ProviderId, Arc<dyn Lookup>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an adapter under its own id.
    pub fn insert(&mut self, adapter: Arc<dyn Lookup>) {
        self.adapters.insert(adapter.id(), adapter);
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn Lookup>> {
        self.adapters.get(&id).cloned()
    }

    /// Registered ids in canonical order.
    pub fn ids(&self) -> Vec<ProviderId> {
        self.adapters.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Build every enabled adapter from config. Construction failures (mostly
    /// missing API keys) are logged and leave that provider unregistered.
    pub fn from_config(
        cfg: &ProvidersConfig,
        transport: Arc<dyn HttpTransport>,
        clock: SharedClock,
    ) -> Self {
        let mut reg = Self::new();
        let t = &transport;

        reg.build(ProviderId::Dictionary, cfg.dictionary.enabled, &clock, || {
            DictionaryProvider::new(t.clone(), &cfg.dictionary)
        });
        reg.build(ProviderId::WebSearch, cfg.web_search.enabled, &clock, || {
            WebSearchProvider::new(t.clone(), &cfg.web_search)
        });
        reg.build(ProviderId::Video, cfg.video.enabled, &clock, || {
            VideoProvider::new(t.clone(), &cfg.video)
        });
        reg.build(ProviderId::Literature, cfg.literature.enabled, &clock, || {
            PubMedProvider::new(t.clone(), &cfg.literature)
        });
        reg.build(ProviderId::HealthTopics, cfg.health_topics.enabled, &clock, || {
            MedlineProvider::new(t.clone(), &cfg.health_topics)
        });
        reg.build(ProviderId::Assistant, cfg.assistant.enabled, &clock, || {
            AssistantProvider::new(t.clone(), &cfg.assistant)
        });

        info!(providers = ?reg.ids(), "provider registry ready");
        reg
    }

    fn build<P, F>(&mut self, id: ProviderId, enabled: bool, clock: &SharedClock, make: F)
    where
        P: Provider + 'static,
        P::Output: Into<ProviderPayload>,
        F: FnOnce() -> anyhow::Result<P>,
    {
        if !enabled {
            info!(provider = %id, "provider disabled in config");
            return;
        }
        match make() {
            Ok(provider) => self.insert(Arc::new(Adapter::new(provider, clock.clone()))),
            Err(e) => error!(provider = %id, error = %e, "provider not configured"),
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
