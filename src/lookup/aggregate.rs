// src/lookup/aggregate.rs
//! Fan one query out to several adapters and collect every outcome.
//!
//! Settle-all: each branch runs to completion and its `ProviderResult` is
//! stored as-is. Failures are never re-classified here.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

use crate::error::{ProviderError, ProviderResult};
use crate::lookup::{ProviderId, ProviderPayload, ProviderRegistry};
use crate::query::fingerprint;

/// Per-provider outcome of one aggregation.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    results: BTreeMap<ProviderId, ProviderResult<ProviderPayload>>,
}

impl AggregateResult {
    pub fn get(&self, id: ProviderId) -> Option<&ProviderResult<ProviderPayload>> {
        self.results.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProviderId, &ProviderResult<ProviderPayload>)> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn ok_count(&self) -> usize {
        self.results.values().filter(|r| r.is_ok()).count()
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (id, result) in &self.results {
            let entry = match result {
                Ok(data) => json!({ "status": "ok", "data": data }),
                Err(e) => json!({
                    "status": "error",
                    "kind": e.kind(),
                    "code": e.status_code().as_u16(),
                    "error": e.public_message(),
                }),
            };
            map.serialize_entry(id.slug(), &entry)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: Arc<ProviderRegistry>,
}

impl Aggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Query every requested provider concurrently. A blank query fails
    /// before any provider is called; anything else yields a full mapping,
    /// even when every branch failed.
    pub async fn aggregate_for_query(
        &self,
        providers: &[ProviderId],
        query: &str,
    ) -> Result<AggregateResult, ProviderError> {
        if query.trim().is_empty() {
            return Err(ProviderError::MissingInput);
        }

        let mut wanted = providers.to_vec();
        wanted.sort();
        wanted.dedup();

        let branches = wanted.iter().map(|&id| {
            let adapter = self.registry.get(id);
            async move {
                let result = match adapter {
                    Some(adapter) => adapter.lookup(query).await,
                    None => Err(ProviderError::NotConfigured { provider: id }),
                };
                (id, result)
            }
        });

        let results: BTreeMap<_, _> = join_all(branches).await.into_iter().collect();
        let out = AggregateResult { results };

        tracing::info!(
            query_id = %fingerprint(query.trim()),
            requested = out.len(),
            ok = out.ok_count(),
            "aggregate lookup settled"
        );
        Ok(out)
    }
}
