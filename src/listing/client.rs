//! HTTP client for listing pages, discussion threads, and single posts.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::ListingError;
use super::model::{Item, Listing};
use super::thread::DiscussionNode;
use super::{ListingPage, MAX_PAGE_LIMIT, PageQuery, Source};
use crate::download::build_http_client;
use crate::user_agent;

/// Public origin of the listing API.
pub const REDDIT_ORIGIN: &str = "https://www.reddit.com";

const LISTING_CONNECT_TIMEOUT_SECS: u64 = 10;
const LISTING_READ_TIMEOUT_SECS: u64 = 30;

/// Client for the listing and discussion endpoints.
#[derive(Debug, Clone)]
pub struct ListingClient {
    client: Client,
    base_url: String,
}

impl ListingClient {
    /// Creates a client against the public origin.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if TLS setup fails.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(REDDIT_ORIGIN)
    }

    /// Creates a client against a custom origin (used by tests).
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if TLS setup fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            user_agent::default_listing_user_agent(),
            LISTING_CONNECT_TIMEOUT_SECS,
            LISTING_READ_TIMEOUT_SECS,
        )?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one page of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::SourceUnavailable`] for error statuses and empty
    /// pages, [`ListingError::Transport`] for network failures, and
    /// [`ListingError::Decode`] for bodies that are not a listing.
    #[instrument(skip(self, query), fields(source = %source, after = ?query.after))]
    pub async fn fetch_page(
        &self,
        source: &Source,
        query: &PageQuery,
    ) -> Result<ListingPage, ListingError> {
        let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);
        let url = self.page_url(source, query);
        let mut params: Vec<(&str, String)> = Vec::with_capacity(4);
        if !source.is_user() {
            params.push(("sort", query.sort.as_str().to_string()));
            params.push(("t", query.window.as_str().to_string()));
        }
        params.push(("limit", limit.to_string()));
        if let Some(after) = &query.after {
            params.push(("after", after.clone()));
        }

        let mut page_url = url::Url::parse(&url).map_err(|e| {
            ListingError::source_unavailable(
                source.to_string(),
                format!("invalid listing URL {url}: {e}"),
            )
        })?;
        page_url.query_pairs_mut().extend_pairs(&params);

        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .map_err(|e| ListingError::transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::source_unavailable(
                source.to_string(),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ListingError::transport(&url, e))?;
        let listing: Listing<Item> =
            serde_json::from_str(&body).map_err(|e| ListingError::decode(&url, e))?;

        let Some(data) = listing.data else {
            let reason = listing
                .message
                .unwrap_or_else(|| "listing has no data".to_string());
            return Err(ListingError::source_unavailable(source.to_string(), reason));
        };
        if data.children.is_empty() {
            return Err(ListingError::source_unavailable(
                source.to_string(),
                "no posts returned",
            ));
        }

        let items: Vec<Item> = data.children.into_iter().map(|thing| thing.data).collect();
        debug!(count = items.len(), requested = limit, "listing page received");
        Ok(ListingPage {
            items,
            after: data.after,
            requested: limit,
        })
    }

    /// Fetches the discussion thread attached to `item`.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::ThreadFetchFailed`] for any failure; callers
    /// treat it as an empty thread.
    #[instrument(skip(self, item), fields(item = %item.key()))]
    pub async fn fetch_thread(&self, item: &Item) -> Result<Vec<DiscussionNode>, ListingError> {
        let Some(permalink) = item.permalink.as_deref() else {
            return Err(ListingError::thread_fetch_failed(
                item.key(),
                "item has no permalink",
            ));
        };
        let url = format!("{}{}.json", self.base_url, permalink.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ListingError::thread_fetch_failed(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::thread_fetch_failed(
                &url,
                format!("HTTP {}", status.as_u16()),
            ));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| ListingError::thread_fetch_failed(&url, e))?;

        let Some(comments) = body.get(1) else {
            warn!(url = %url, "discussion response has no comment listing");
            return Err(ListingError::thread_fetch_failed(
                &url,
                "response has no comment listing",
            ));
        };
        Ok(DiscussionNode::from_listing(comments))
    }

    /// Fetches a single post by its full URL (`https://www.reddit.com/r/x/comments/...`).
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::SourceUnavailable`] when the post is gone, and
    /// [`ListingError::Decode`] when the body has no post.
    #[instrument(skip(self))]
    pub async fn fetch_post(&self, post_url: &str) -> Result<Item, ListingError> {
        let url = self.rebase_post_url(post_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ListingError::transport(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::source_unavailable(
                post_url,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ListingError::decode(&url, e))?;
        let post = body
            .get(0)
            .and_then(|listing| listing.pointer("/data/children/0/data"))
            .cloned()
            .ok_or_else(|| ListingError::decode(&url, "response has no post"))?;
        serde_json::from_value(post).map_err(|e| ListingError::decode(&url, e))
    }

    fn page_url(&self, source: &Source, query: &PageQuery) -> String {
        match source {
            Source::Community(name) => format!(
                "{}/r/{}/{}/.json",
                self.base_url,
                urlencoding::encode(name),
                query.sort.as_str()
            ),
            Source::User(name) => format!(
                "{}/user/{}/submitted/.json",
                self.base_url,
                urlencoding::encode(name)
            ),
        }
    }

    fn rebase_post_url(&self, post_url: &str) -> String {
        let trimmed = post_url.trim().split(['?', '#']).next().unwrap_or_default();
        let path = trimmed.strip_prefix(REDDIT_ORIGIN).unwrap_or(trimmed);
        let path = path.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{path}.json", self.base_url)
        } else {
            format!("{path}.json")
        }
    }
}
