//! Shared bearer-token cache for the provider API.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use super::error::ProviderError;

/// How long a fetched token is reused.
pub const CREDENTIAL_TTL: Duration = Duration::from_secs(25 * 60);

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Process-wide token cache.
///
/// The lock is held across the fetch, so concurrent callers that find the
/// token missing or stale wait for one refresh and then share its result.
#[derive(Debug)]
pub struct CredentialCache {
    ttl: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self::new(CREDENTIAL_TTL)
    }
}

impl CredentialCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Returns a valid token, calling `fetch` when none is cached, the cached
    /// one has expired, or the cached one equals `rejected`.
    ///
    /// Passing the token a server just rejected forces a refresh without
    /// discarding a newer token another task already fetched.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fetch`.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        rejected: Option<&str>,
        fetch: F,
    ) -> Result<String, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ProviderError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
            && rejected != Some(cached.token.as_str())
        {
            return Ok(cached.token.clone());
        }

        debug!(forced = rejected.is_some(), "refreshing provider credential");
        let token = fetch().await?;
        *slot = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }

    /// Drops any cached token.
    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }
}
