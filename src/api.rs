// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::error::ProviderError;
use crate::lookup::{Aggregator, ProviderId, ProviderRegistry};
use crate::query::require_query;

#[derive(Clone)]
pub struct AppState {
    registry: Arc<ProviderRegistry>,
    aggregator: Aggregator,
}

impl AppState {
    pub fn new(registry: ProviderRegistry) -> Self {
        let registry = Arc::new(registry);
        Self {
            aggregator: Aggregator::new(registry.clone()),
            registry,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/lookup", get(lookup_many))
        .route("/api/v1/{provider}", get(lookup_one))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct LookupParams {
    query: Option<String>,
    providers: Option<String>,
}

fn bad_request(msg: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
}

async fn lookup_one(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<LookupParams>,
) -> Response {
    let Some(id) = ProviderId::from_slug(&slug) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Unknown provider" }))).into_response();
    };
    let query = match require_query(params.query.as_deref()) {
        Ok(q) => q,
        Err(e) => return e.into_response(),
    };
    let Some(adapter) = state.registry.get(id) else {
        return ProviderError::NotConfigured { provider: id }.into_response();
    };

    match adapter.lookup(query).await {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn lookup_many(State(state): State<AppState>, Query(params): Query<LookupParams>) -> Response {
    let wanted = match parse_providers(params.providers.as_deref(), state.registry()) {
        Ok(ids) => ids,
        Err(unknown) => return bad_request(format!("Unknown provider: {unknown}")),
    };
    let query = match require_query(params.query.as_deref()) {
        Ok(q) => q,
        Err(e) => return e.into_response(),
    };

    match state.aggregator.aggregate_for_query(&wanted, query).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `providers=a,b` → ids; absent or blank means every registered provider.
/// Returns the first unknown slug as the error.
fn parse_providers(raw: Option<&str>, registry: &ProviderRegistry) -> Result<Vec<ProviderId>, String> {
    let slugs: Vec<&str> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if slugs.is_empty() {
        return Ok(registry.ids());
    }
    slugs
        .into_iter()
        .map(|s| ProviderId::from_slug(s).ok_or_else(|| s.to_string()))
        .collect()
}
