//! Error taxonomy shared by every provider adapter and the aggregator.
//!
//! Adapters classify their own failures into a [`ProviderError`]; the
//! aggregator and the HTTP boundary only carry it. The HTTP status and the
//! public body are derived here so every route answers the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::lookup::types::ProviderId;
use crate::schema::SchemaError;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Coarse classification used for status codes, metrics labels and the
/// aggregate response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    UpstreamUnavailable,
    NoResults,
    InvalidUpstreamData,
    NotConfigured,
    Unexpected,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::NoResults => "no_results",
            Self::InvalidUpstreamData => "invalid_upstream_data",
            Self::NotConfigured => "not_configured",
            Self::Unexpected => "unexpected",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("query parameter is required")]
    MissingInput,

    /// Non-2xx answer (`status` is set, `message` is the upstream body) or a
    /// transport failure (`status` is `None`, `message` is the local error).
    #[error("{provider} upstream unavailable (status {status:?}): {message}")]
    UpstreamUnavailable {
        provider: ProviderId,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} returned no results")]
    NoResults { provider: ProviderId },

    #[error("invalid data structure from {provider}: {source}")]
    InvalidUpstreamData {
        provider: ProviderId,
        #[source]
        source: SchemaError,
    },

    #[error("{provider} is not configured")]
    NotConfigured { provider: ProviderId },

    #[error("unexpected error in {provider}: {message}")]
    Unexpected {
        provider: ProviderId,
        message: String,
    },
}

impl ProviderError {
    pub fn upstream(provider: ProviderId, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn invalid(provider: ProviderId, source: SchemaError) -> Self {
        Self::InvalidUpstreamData { provider, source }
    }

    pub fn unexpected(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Unexpected {
            provider,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput => ErrorKind::MissingInput,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::NoResults { .. } => ErrorKind::NoResults,
            Self::InvalidUpstreamData { .. } => ErrorKind::InvalidUpstreamData,
            Self::NotConfigured { .. } => ErrorKind::NotConfigured,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::MissingInput => None,
            Self::UpstreamUnavailable { provider, .. }
            | Self::NoResults { provider }
            | Self::InvalidUpstreamData { provider, .. }
            | Self::NotConfigured { provider }
            | Self::Unexpected { provider, .. } => Some(*provider),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingInput => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable {
                status: Some(code), ..
            } => StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::UpstreamUnavailable { status: None, .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoResults { .. } => StatusCode::NOT_FOUND,
            Self::InvalidUpstreamData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing text. Schema violations and local transport errors stay
    /// in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingInput => "Query parameter is required".to_string(),
            Self::UpstreamUnavailable {
                provider,
                status,
                message,
            } => {
                if status.is_some() && !message.trim().is_empty() {
                    message.clone()
                } else {
                    format!("Error fetching data from {}", provider.display_name())
                }
            }
            Self::NoResults { .. } => "No results found".to_string(),
            Self::InvalidUpstreamData { provider, .. } => {
                format!("Invalid data structure from {}", provider.display_name())
            }
            Self::NotConfigured { provider } => {
                format!("{} is not configured", provider.display_name())
            }
            Self::Unexpected { .. } => "An unexpected error occurred".to_string(),
        }
    }

    /// JSON body for the single-provider routes. `NoResults` uses the
    /// `message` key, everything else `error`; upstream bodies that are JSON
    /// are passed through as JSON.
    pub fn public_body(&self) -> Value {
        match self {
            Self::NoResults { .. } => json!({ "message": self.public_message() }),
            Self::UpstreamUnavailable {
                status: Some(_),
                message,
                ..
            } if !message.trim().is_empty() => {
                let passthrough = serde_json::from_str::<Value>(message)
                    .unwrap_or_else(|_| Value::String(message.clone()));
                json!({ "error": passthrough })
            }
            _ => json!({ "error": self.public_message() }),
        }
    }
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.public_body())).into_response()
    }
}
