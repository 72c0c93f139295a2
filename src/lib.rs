// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lookup;
pub mod metrics;
pub mod query;
pub mod schema;

pub use crate::api::{create_router, AppState};
pub use crate::error::{ErrorKind, ProviderError, ProviderResult};
pub use crate::lookup::{AggregateResult, Aggregator, ProviderId, ProviderPayload, ProviderRegistry};
