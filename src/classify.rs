//! Content-kind classification of listing items.
//!
//! Listing items carry inconsistent hint fields: some kinds set `post_hint`,
//! some only set a flag, and many leave both out. [`classify`] applies an
//! ordered set of rules and falls back to [`ContentKind::Link`], so it never
//! fails.

use std::fmt;

use crate::listing::Item;

/// The five content kinds an item can be persisted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    SelfPost,
    Media,
    Link,
    Poll,
    Gallery,
}

impl ContentKind {
    /// Short label used in summaries and logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SelfPost => "self",
            Self::Media => "media",
            Self::Link => "link",
            Self::Poll => "poll",
            Self::Gallery => "gallery",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies `item`. First matching rule wins.
#[must_use]
pub fn classify(item: &Item) -> ContentKind {
    let hint = item.post_hint();
    let domain = item.domain();

    if hint == "self" || item.is_self.unwrap_or(false) {
        return ContentKind::SelfPost;
    }
    if is_media(item, hint, domain) {
        return ContentKind::Media;
    }
    if item.poll_data.is_some() {
        return ContentKind::Poll;
    }
    if domain.contains("reddit.com") && item.is_gallery.unwrap_or(false) {
        return ContentKind::Gallery;
    }
    ContentKind::Link
}

fn is_media(item: &Item, hint: &str, domain: &str) -> bool {
    if matches!(hint, "image" | "hosted:video") {
        return true;
    }
    // Streaming-video embeds route to a player page, not a file.
    if hint == "rich:video" && !domain.contains("youtu") {
        return true;
    }
    if hint == "link" && domain.contains("imgur") {
        let dest = item.url_overridden_by_dest.as_deref().unwrap_or("");
        if !dest.contains("gallery") {
            return true;
        }
    }
    if domain.contains("i.redd.it") || domain.contains("i.reddituploads.com") {
        return true;
    }
    hint == "link" && domain.contains("redgifs.com")
}
