//! Listing API models and client.
//!
//! The listing API serves cursor-paginated pages for community feeds
//! (`/r/<name>/<sort>/.json`) and user feeds (`/user/<name>/submitted/.json`),
//! plus a per-item discussion endpoint (`<permalink>.json`).

mod client;
mod error;
pub mod model;
mod thread;

pub use client::{ListingClient, REDDIT_ORIGIN};
pub use error::ListingError;
pub use model::Item;
pub use thread::DiscussionNode;

use std::fmt;

use crate::config::{SortMode, TimeWindow};

/// Maximum number of items the listing API returns per page.
pub const MAX_PAGE_LIMIT: usize = 100;

/// A feed the operator asked to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Community feed (`r/<name>`).
    Community(String),
    /// User feed (`u/<name>`).
    User(String),
}

impl Source {
    /// Parses an operator-supplied source identifier.
    ///
    /// Anything mentioning `u/`, `user/`, or `/u/` is a user feed; the name is
    /// whatever follows the user marker. Everything else is a community name,
    /// with an optional `r/` prefix. Whitespace is removed.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let trimmed = compact.trim_start_matches('/');

        if let Some(pos) = trimmed.rfind("user/") {
            return Self::User(trimmed[pos + "user/".len()..].trim_matches('/').to_string());
        }
        if let Some(pos) = trimmed.rfind("u/")
            && (pos == 0 || trimmed[..pos].ends_with('/'))
        {
            return Self::User(trimmed[pos + 2..].trim_matches('/').to_string());
        }
        let community = trimmed.strip_prefix("r/").unwrap_or(trimmed);
        Self::Community(community.trim_matches('/').to_string())
    }

    /// Bare feed name without the `r/` or `u/` prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Community(name) | Self::User(name) => name,
        }
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Community(name) => write!(f, "r/{name}"),
            Self::User(name) => write!(f, "u/{name}"),
        }
    }
}

/// Parameters for one page request.
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub sort: SortMode,
    pub window: TimeWindow,
    /// Requested item count, already clamped to [`MAX_PAGE_LIMIT`].
    pub limit: usize,
    /// Continuation cursor; `None` for the first page.
    pub after: Option<String>,
}

/// One fetched page, held only until its items are dispatched.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub items: Vec<Item>,
    /// Cursor returned by the provider.
    pub after: Option<String>,
    /// How many items were requested.
    pub requested: usize,
}

impl ListingPage {
    /// True when the provider returned fewer items than requested.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.items.len() < self.requested
    }

    /// Fullname of the last item on the page, used as the next community cursor.
    #[must_use]
    pub fn last_item_name(&self) -> Option<&str> {
        self.items.last().and_then(|item| item.name.as_deref())
    }
}
