//! Shared User-Agent strings for listing, provider, and download HTTP clients.
//!
//! The listing API rejects anonymous default agents, so every client identifies
//! the tool with the same project URL and crate version.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/post-archiver";

/// Default User-Agent for listing and discussion requests.
#[must_use]
pub(crate) fn default_listing_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("post-archiver/{version} (personal-archive-tool; +{PROJECT_UA_URL})")
}

/// Default User-Agent for content downloads and secondary-provider lookups.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("post-archiver/{version} (+{PROJECT_UA_URL})")
}
