// src/lookup/mod.rs
//! Provider adapters: one cached, validated fetch path shared by every
//! external data source.
//!
//! A [`Provider`] only knows how to talk to its upstream and how to reshape
//! the answer into JSON. [`Adapter`] wraps it with the per-provider TTL cache
//! and the schema check, so nothing reaches a caller or the cache without
//! passing validation.

pub mod aggregate;
pub mod providers;
pub mod registry;
pub mod types;

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde_json::{Map, Value};

use crate::cache::{SharedClock, TtlCache};
use crate::error::{ProviderError, ProviderResult};
use crate::http::{HttpRequest, HttpTransport};
use crate::query::{NormalizedQuery, MAX_QUERY_LEN};
use crate::schema::{self, SchemaError, Validated};

pub use aggregate::{AggregateResult, Aggregator};
pub use registry::ProviderRegistry;
pub use types::{ProviderId, ProviderPayload};

/// Upstream-specific half of an adapter.
#[async_trait]
pub trait Provider: Send + Sync {
    type Output: Validated + Clone + Send + Sync + 'static;

    fn id(&self) -> ProviderId;

    fn max_query_len(&self) -> usize {
        MAX_QUERY_LEN
    }

    /// Issue the upstream request(s) and return the normalized, not yet
    /// validated payload. Transport and "no results" outcomes are classified
    /// here.
    async fn fetch_raw(&self, query: &NormalizedQuery) -> ProviderResult<Value>;
}

/// Cache keys are scoped by provider so identical text never collides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: ProviderId,
    pub query: NormalizedQuery,
}

pub struct Adapter<P: Provider> {
    provider: P,
    cache: TtlCache<CacheKey, P::Output>,
}

impl<P: Provider> Adapter<P> {
    pub fn new(provider: P, clock: SharedClock) -> Self {
        Self {
            provider,
            cache: TtlCache::new(clock),
        }
    }

    pub fn id(&self) -> ProviderId {
        self.provider.id()
    }

    pub fn cache(&self) -> &TtlCache<CacheKey, P::Output> {
        &self.cache
    }

    pub async fn fetch(&self, raw_query: &str) -> ProviderResult<P::Output> {
        crate::metrics::ensure_metrics_described();
        let id = self.provider.id();
        let result = self.fetch_inner(raw_query).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        counter!("lookup_requests_total", "provider" => id.slug(), "outcome" => outcome)
            .increment(1);
        result
    }

    async fn fetch_inner(&self, raw_query: &str) -> ProviderResult<P::Output> {
        let id = self.provider.id();
        let query = NormalizedQuery::with_max_len(raw_query, self.provider.max_query_len())?;
        let key = CacheKey {
            provider: id,
            query,
        };

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(provider = %id, query_id = %key.query.fingerprint(), "cache hit");
            counter!("lookup_cache_hits_total", "provider" => id.slug()).increment(1);
            return Ok(hit);
        }
        counter!("lookup_cache_misses_total", "provider" => id.slug()).increment(1);

        let t0 = Instant::now();
        let raw = self.provider.fetch_raw(&key.query).await;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("lookup_upstream_ms", "provider" => id.slug()).record(ms);

        let raw = raw.inspect_err(|e| {
            tracing::warn!(
                provider = %id,
                query_id = %key.query.fingerprint(),
                error = %e,
                "provider fetch failed"
            );
            // bodies rejected before the schema check still report their paths
            if let ProviderError::InvalidUpstreamData { source, .. } = e {
                log_violations(id, source);
            }
        })?;

        let validated = schema::validate::<P::Output>(raw).map_err(|err| {
            log_violations(id, &err);
            ProviderError::invalid(id, err)
        })?;

        self.cache.set(key, validated.clone());
        Ok(validated)
    }
}

pub(crate) fn log_violations(id: ProviderId, err: &SchemaError) {
    counter!("lookup_schema_violations_total", "provider" => id.slug()).increment(1);
    let details: Vec<String> = err.violations.iter().map(ToString::to_string).collect();
    tracing::warn!(provider = %id, violations = ?details, "upstream payload failed validation");
}

/// Object-safe view of an adapter, used by the registry and the aggregator.
#[async_trait]
pub trait Lookup: Send + Sync {
    fn id(&self) -> ProviderId;
    async fn lookup(&self, query: &str) -> ProviderResult<ProviderPayload>;
}

#[async_trait]
impl<P> Lookup for Adapter<P>
where
    P: Provider,
    P::Output: Into<ProviderPayload>,
{
    fn id(&self) -> ProviderId {
        self.provider.id()
    }

    async fn lookup(&self, query: &str) -> ProviderResult<ProviderPayload> {
        self.fetch(query).await.map(Into::into)
    }
}

// ------------------------------------------------------------
// Helpers shared by the concrete providers
// ------------------------------------------------------------

/// Send a request and return the body of a 2xx answer.
pub(crate) async fn send_checked(
    transport: &dyn HttpTransport,
    provider: ProviderId,
    request: HttpRequest,
) -> ProviderResult<String> {
    match transport.send(request).await {
        Ok(resp) if resp.is_success() => Ok(resp.body),
        Ok(resp) => Err(ProviderError::upstream(provider, Some(resp.status), resp.body)),
        Err(e) => Err(ProviderError::upstream(provider, None, e.to_string())),
    }
}

pub(crate) fn parse_json(provider: ProviderId, body: &str) -> ProviderResult<Value> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid(
            provider,
            SchemaError::single("$", format!("body is not valid JSON: {e}")),
        )
    })
}

/// Copy the listed keys from `src` into `dst` when present. Absent keys stay
/// absent so validation reports them.
pub(crate) fn copy_fields(src: &Value, dst: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(v) = src.get(*key) {
            dst.insert((*key).to_string(), v.clone());
        }
    }
}

/// Strip HTML tags, decode entities, trim.
pub fn strip_markup(s: &str) -> String {
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"</?[^>]+(>|$)").unwrap());
    let stripped = re_tags.replace_all(s, "");
    html_escape::decode_html_entities(&stripped).trim().to_string()
}
