//! Secondary media provider (`RedGIFs`) detection and lookup.
//!
//! Items hosted on the provider only expose a watch page; the direct video
//! URL needs an authenticated lookup. Detection and id extraction are pure
//! functions over item fields. Lookups go through [`RedgifsClient`], which
//! shares one [`CredentialCache`] across every in-flight item.

mod credential;
mod error;
mod redgifs;

pub use credential::{CREDENTIAL_TTL, CredentialCache};
pub use error::ProviderError;
pub use redgifs::{API_BASE, RedgifsClient};

use std::sync::LazyLock;

use regex::Regex;

use crate::listing::Item;

const PROVIDER_DOMAIN: &str = "redgifs.com";

/// Id patterns, tried in order against each candidate field.
#[allow(clippy::expect_used)]
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)redgifs\.com/(?:watch|ifr)/([\w-]+)(?:[/?#].*)?$",
        r"(?i)redgifs\.com/([\w-]+)(?:[/?#].*)?$",
        r"(?i)thumbs\d*\.redgifs\.com/([\w-]+)-",
        r"(?i)i\.redgifs\.com/([\w-]+)\.[a-z0-9]+",
        r#"(?i)src=["']https?://(?:www\.)?redgifs\.com/(?:ifr|watch)/([\w-]+)["']"#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("provider id regex is valid"))
    .collect()
});

/// True when any provider-bearing field mentions the provider domain.
#[must_use]
pub fn is_redgifs_item(item: &Item) -> bool {
    let oembed = item.oembed();
    [
        item.domain.as_deref(),
        item.url_overridden_by_dest.as_deref(),
        item.url.as_deref(),
        item.permalink.as_deref(),
        oembed.and_then(|o| o.html.as_deref()),
        oembed.and_then(|o| o.provider_name.as_deref()),
        item.preview_source_url(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(PROVIDER_DOMAIN))
}

/// Extracts the provider media id from `item`, if any field carries one.
#[must_use]
pub fn extract_id(item: &Item) -> Option<String> {
    let oembed = item.oembed();
    let candidates = [
        item.url_overridden_by_dest.as_deref(),
        item.url.as_deref(),
        item.permalink.as_deref(),
        item.domain.as_deref(),
        oembed.and_then(|o| o.html.as_deref()),
        oembed.and_then(|o| o.thumbnail_url.as_deref()),
        item.preview_source_url(),
    ];

    candidates.into_iter().flatten().find_map(|field| {
        ID_PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(field)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|id| !is_path_keyword(id))
                .map(str::to_string)
        })
    })
}

// The bare-path pattern also matches `/watch/` and `/ifr/` prefixes.
fn is_path_keyword(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("watch") || segment.eq_ignore_ascii_case("ifr")
}
