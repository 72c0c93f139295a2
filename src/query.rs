//! Query normalization: trim, cap the length, keep a visible truncation marker.

use std::fmt;

use crate::error::ProviderError;

/// Longest query (in chars) sent upstream or used as a cache key.
pub const MAX_QUERY_LEN: usize = 100;

const TRUNCATION_MARKER: &str = "...";

/// The trimmed, length-capped form of a user query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    /// Normalize with the default cap of [`MAX_QUERY_LEN`].
    pub fn new(raw: &str) -> Result<Self, ProviderError> {
        Self::with_max_len(raw, MAX_QUERY_LEN)
    }

    /// Queries longer than `max_len` keep their first `max_len - 3` chars
    /// followed by `...`, so the result is exactly `max_len` chars long.
    pub fn with_max_len(raw: &str, max_len: usize) -> Result<Self, ProviderError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::MissingInput);
        }

        if trimmed.chars().count() <= max_len {
            return Ok(Self(trimmed.to_string()));
        }

        let keep = max_len.saturating_sub(TRUNCATION_MARKER.len());
        let mut out: String = trimmed.chars().take(keep).collect();
        out.push_str(TRUNCATION_MARKER);
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_truncated(&self) -> bool {
        self.0.ends_with(TRUNCATION_MARKER)
    }

    /// Short stable id for logs; the raw query is never logged.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

impl fmt::Display for NormalizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accept a query parameter only when it has non-whitespace content.
pub fn require_query(raw: Option<&str>) -> Result<&str, ProviderError> {
    match raw {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(ProviderError::MissingInput),
    }
}

pub(crate) fn fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
