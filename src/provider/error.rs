//! Error types for secondary media provider lookups.
//!
//! None of these are fatal: the materializer falls back to default link or
//! media handling whenever a lookup fails.

use thiserror::Error;

/// Errors that can occur while resolving media through the provider API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A temporary bearer token could not be obtained.
    #[error("provider credential unavailable: {reason}")]
    CredentialUnavailable {
        /// Why the token request failed.
        reason: String,
    },

    /// The lookup was rejected even after a credential refresh.
    #[error("provider rejected credential for '{id}'")]
    Unauthorized {
        /// The media id being looked up.
        id: String,
    },

    /// The lookup failed or returned no usable rendition.
    #[error("failed to resolve provider media '{id}': {reason}")]
    ResolutionFailed {
        /// The media id being looked up.
        id: String,
        /// Why resolution failed.
        reason: String,
    },

    /// No provider id could be extracted from the item.
    #[error("no provider id found in item '{item}'")]
    MissingId {
        /// Item key used for logs.
        item: String,
    },
}

impl ProviderError {
    /// Creates a `CredentialUnavailable` error.
    pub fn credential_unavailable(reason: impl ToString) -> Self {
        Self::CredentialUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Creates a `ResolutionFailed` error.
    pub fn resolution_failed(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResolutionFailed {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failed_display() {
        let error = ProviderError::resolution_failed("abc", "HTTP 500");
        let msg = error.to_string();
        assert!(msg.contains("abc"), "Expected id in: {msg}");
        assert!(msg.contains("HTTP 500"), "Expected reason in: {msg}");
    }

    #[test]
    fn test_credential_unavailable_display() {
        let error = ProviderError::credential_unavailable("connection refused");
        assert!(error.to_string().contains("connection refused"));
    }
}
