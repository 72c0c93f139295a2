//! medi-glossary binary entrypoint.
//! Boots the Axum HTTP server with the provider registry and `/metrics`.

use std::sync::Arc;

use medi_glossary::cache::{SystemClock, DEFAULT_TTL_SECS};
use medi_glossary::config::ProvidersConfig;
use medi_glossary::http::ReqwestTransport;
use medi_glossary::metrics::Metrics;
use medi_glossary::{create_router, AppState, ProviderRegistry};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` filter (default `medi_glossary=info,warn`); JSON lines when
/// `LOG_FORMAT=json`. Leaves an already installed subscriber in place.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medi_glossary=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ProvidersConfig::load()?;
    let transport = Arc::new(ReqwestTransport::from_settings(&cfg.http)?);
    let registry = ProviderRegistry::from_config(&cfg, transport, Arc::new(SystemClock));

    let metrics = Metrics::init(DEFAULT_TTL_SECS)?;
    let router = create_router(AppState::new(registry)).merge(metrics.router());

    Ok(router.into())
}
