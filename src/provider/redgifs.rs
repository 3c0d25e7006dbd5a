//! `RedGIFs` API client: temporary-token auth and media lookup.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::credential::CredentialCache;
use super::error::ProviderError;
use super::extract_id;
use crate::download::build_http_client;
use crate::listing::Item;
use crate::user_agent;

/// Default provider API base URL.
pub const API_BASE: &str = "https://api.redgifs.com/v2";

/// Rendition keys in preference order.
const RENDITION_PREFERENCE: [&str; 5] = ["hd", "sd", "mobile", "vmobile", "nhd"];

const PROVIDER_CONNECT_TIMEOUT_SECS: u64 = 10;
const PROVIDER_READ_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// Resolves provider ids to direct video URLs.
#[derive(Debug, Clone)]
pub struct RedgifsClient {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialCache>,
}

impl RedgifsClient {
    /// Creates a client against the public API with a shared credential cache.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if TLS setup fails.
    pub fn new(credentials: Arc<CredentialCache>) -> Result<Self, reqwest::Error> {
        Self::with_base_url(API_BASE, credentials)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if TLS setup fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: Arc<CredentialCache>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            user_agent::default_download_user_agent(),
            PROVIDER_CONNECT_TIMEOUT_SECS,
            PROVIDER_READ_TIMEOUT_SECS,
        )?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Extracts the id from `item` and resolves it.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingId`] when no id can be extracted, and
    /// propagates errors from [`Self::resolve_media_url`].
    pub async fn resolve_item(&self, item: &Item) -> Result<String, ProviderError> {
        let id = extract_id(item).ok_or_else(|| ProviderError::MissingId {
            item: item.key().to_string(),
        })?;
        self.resolve_media_url(&id).await
    }

    /// Looks up `id` and returns the best available rendition URL.
    ///
    /// A 401 triggers exactly one forced credential refresh and one retry.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::CredentialUnavailable`] if no token can be
    /// obtained, [`ProviderError::Unauthorized`] if the retry is also
    /// rejected, and [`ProviderError::ResolutionFailed`] otherwise.
    #[instrument(skip(self))]
    pub async fn resolve_media_url(&self, id: &str) -> Result<String, ProviderError> {
        let token = self.credential(None).await?;
        match self.lookup(id, &token).await? {
            Lookup::Found(url) => Ok(url),
            Lookup::Unauthorized => {
                warn!("provider credential rejected, refreshing once");
                let fresh = self.credential(Some(&token)).await?;
                match self.lookup(id, &fresh).await? {
                    Lookup::Found(url) => Ok(url),
                    Lookup::Unauthorized => Err(ProviderError::Unauthorized { id: id.to_string() }),
                }
            }
        }
    }

    async fn credential(&self, rejected: Option<&str>) -> Result<String, ProviderError> {
        self.credentials
            .get_or_refresh(rejected, || self.fetch_token())
            .await
    }

    async fn fetch_token(&self) -> Result<String, ProviderError> {
        let url = format!("{}/auth/temporary", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::credential_unavailable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::credential_unavailable(format!(
                "HTTP {} from token endpoint",
                status.as_u16()
            )));
        }
        let body: TokenResponse = response
            .json()
            .await
            .map_err(ProviderError::credential_unavailable)?;
        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::credential_unavailable("token missing from response"))?;
        info!("fetched provider credential");
        Ok(token)
    }

    async fn lookup(&self, id: &str, token: &str) -> Result<Lookup, ProviderError> {
        let url = format!("{}/gifs/{}", self.base_url, urlencoding::encode(id));
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::resolution_failed(id, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Lookup::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProviderError::resolution_failed(
                id,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::resolution_failed(id, e))?;
        let url = best_rendition(&body)
            .ok_or_else(|| ProviderError::resolution_failed(id, "no renditions available"))?;
        debug!(url = %url, "provider media resolved");
        Ok(Lookup::Found(url))
    }
}

enum Lookup {
    Found(String),
    Unauthorized,
}

/// Picks the preferred rendition from a lookup response.
fn best_rendition(body: &Value) -> Option<String> {
    let urls = body
        .pointer("/gif/urls")
        .or_else(|| body.get("urls"));
    if let Some(urls) = urls {
        for key in RENDITION_PREFERENCE {
            if let Some(url) = urls.get(key).and_then(Value::as_str)
                && !url.is_empty()
            {
                return Some(url.to_string());
            }
        }
    }
    let legacy = body.get("gif").unwrap_or(body);
    ["hdUrl", "sdUrl"]
        .iter()
        .find_map(|key| {
            legacy
                .get(*key)
                .or_else(|| body.get(*key))
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
        })
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[test]
    fn test_best_rendition_prefers_hd() {
        let body = json!({"gif": {"urls": {"sd": "https://x/sd.mp4", "hd": "https://x/hd.mp4"}}});
        assert_eq!(best_rendition(&body).as_deref(), Some("https://x/hd.mp4"));
    }

    #[test]
    fn test_best_rendition_falls_through_order() {
        let body = json!({"urls": {"vmobile": "https://x/vm.mp4", "nhd": "https://x/nhd.mp4"}});
        assert_eq!(best_rendition(&body).as_deref(), Some("https://x/vm.mp4"));

        let legacy = json!({"sdUrl": "https://x/legacy.mp4"});
        assert_eq!(best_rendition(&legacy).as_deref(), Some("https://x/legacy.mp4"));

        assert_eq!(best_rendition(&json!({"gif": {"urls": {}}})), None);
    }

    #[test]
    fn test_best_rendition_reads_legacy_urls_under_gif() {
        let nested = json!({"gif": {
            "hdUrl": "https://x/nested-hd.mp4",
            "sdUrl": "https://x/nested-sd.mp4"
        }});
        assert_eq!(best_rendition(&nested).as_deref(), Some("https://x/nested-hd.mp4"));

        let sd_only = json!({"gif": {"sdUrl": "https://x/nested-sd.mp4"}});
        assert_eq!(best_rendition(&sd_only).as_deref(), Some("https://x/nested-sd.mp4"));

        let top_level = json!({"gif": {}, "hdUrl": "https://x/top.mp4"});
        assert_eq!(best_rendition(&top_level).as_deref(), Some("https://x/top.mp4"));
    }

    #[tokio::test]
    async fn test_resolve_reuses_cached_token() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/auth/temporary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gifs/happycat"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"gif": {"urls": {"hd": "https://media/hc.mp4"}}})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client =
            RedgifsClient::with_base_url(server.uri(), Arc::new(CredentialCache::default()))
                .unwrap();
        assert_eq!(client.resolve_media_url("happycat").await.unwrap(), "https://media/hc.mp4");
        assert_eq!(client.resolve_media_url("happycat").await.unwrap(), "https://media/hc.mp4");
    }

    #[tokio::test]
    async fn test_not_found_is_resolution_failed() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/auth/temporary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gifs/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client =
            RedgifsClient::with_base_url(server.uri(), Arc::new(CredentialCache::default()))
                .unwrap();
        let result = client.resolve_media_url("missing").await;
        assert!(matches!(result, Err(ProviderError::ResolutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_token_endpoint_failure_is_credential_unavailable() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/auth/temporary"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client =
            RedgifsClient::with_base_url(server.uri(), Arc::new(CredentialCache::default()))
                .unwrap();
        let result = client.resolve_media_url("anything").await;
        assert!(matches!(result, Err(ProviderError::CredentialUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_resolve_item_without_id_is_missing_id() {
        let client = RedgifsClient::with_base_url(
            "http://127.0.0.1:9",
            Arc::new(CredentialCache::default()),
        )
        .unwrap();
        let result = client.resolve_item(&Item::default()).await;
        assert!(matches!(result, Err(ProviderError::MissingId { .. })));
    }
}
