//! Typed listing API payloads.
//!
//! Every field the pipeline reads is optional: the listing API omits or nulls
//! fields depending on the kind of post, and classification must stay total.

use std::collections::HashMap;

use serde::Deserialize;

/// `{ "kind": "Listing", "data": { "after": ..., "children": [...] } }`
#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    #[serde(default)]
    pub data: Option<ListingData<T>>,
    /// Present on error bodies such as `{"message": "Not Found", "error": 404}`.
    #[serde(default)]
    pub message: Option<String>,
}

/// Listing payload: children plus the continuation cursor.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

/// A kind-tagged wrapper around a listing child.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    #[serde(default)]
    pub kind: Option<String>,
    pub data: T,
}

/// One post returned by the listing API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: Option<String>,
    /// Fullname (`t3_<id>`), used as the pagination cursor.
    pub name: Option<String>,
    pub title: Option<String>,
    pub permalink: Option<String>,
    pub created_utc: Option<f64>,
    pub created: Option<f64>,
    pub score: Option<i64>,
    pub author: Option<String>,
    pub subreddit: Option<String>,
    pub selftext: Option<String>,
    pub url: Option<String>,
    pub url_overridden_by_dest: Option<String>,
    pub domain: Option<String>,
    pub post_hint: Option<String>,
    pub is_self: Option<bool>,
    pub is_gallery: Option<bool>,
    pub over_18: Option<bool>,
    pub preview: Option<Preview>,
    pub media: Option<Media>,
    pub poll_data: Option<PollData>,
    pub gallery_data: Option<GalleryData>,
    pub media_metadata: Option<HashMap<String, MediaMetadataEntry>>,
}

impl Item {
    /// Identifier used for logs and tracker bookkeeping.
    #[must_use]
    pub fn key(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unknown>")
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn post_hint(&self) -> &str {
        self.post_hint.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn subreddit(&self) -> &str {
        self.subreddit.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or("[deleted]")
    }

    #[must_use]
    pub fn is_nsfw(&self) -> bool {
        self.over_18.unwrap_or(false)
    }

    /// Creation time in seconds since the epoch, preferring the UTC field.
    #[must_use]
    pub fn created_secs(&self) -> Option<f64> {
        self.created_utc.or(self.created)
    }

    /// First preview image source URL, if any.
    #[must_use]
    pub fn preview_source_url(&self) -> Option<&str> {
        self.preview
            .as_ref()
            .and_then(|p| p.images.first())
            .and_then(|img| img.source.as_ref())
            .and_then(|s| s.url.as_deref())
    }

    #[must_use]
    pub fn oembed(&self) -> Option<&Oembed> {
        self.media.as_ref().and_then(|m| m.oembed.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Preview {
    pub images: Vec<PreviewImage>,
    pub reddit_video_preview: Option<VideoRendition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewImage {
    pub source: Option<PreviewSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewSource {
    pub url: Option<String>,
}

/// A first-party hosted video rendition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideoRendition {
    pub fallback_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Media {
    pub reddit_video: Option<VideoRendition>,
    pub oembed: Option<Oembed>,
}

/// Embed descriptor supplied for third-party rich media.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Oembed {
    pub html: Option<String>,
    pub provider_name: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PollData {
    pub options: Vec<PollOption>,
    pub total_vote_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PollOption {
    pub text: String,
    pub vote_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryData {
    pub items: Vec<GalleryEntry>,
}

/// Ordered gallery entry pointing into `media_metadata`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryEntry {
    pub media_id: String,
    /// Numeric in practice; kept loose so unusual payloads still decode.
    pub id: serde_json::Value,
}

impl GalleryEntry {
    /// Stable name for the entry's file on disk.
    #[must_use]
    pub fn file_stem(&self) -> String {
        match &self.id {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            _ => self.media_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaMetadataEntry {
    pub status: Option<String>,
    pub s: Option<MediaSource>,
}

/// Largest rendition of a gallery entry (`u` for stills, `gif`/`mp4` for animations).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaSource {
    pub u: Option<String>,
    pub gif: Option<String>,
    pub mp4: Option<String>,
}

impl MediaSource {
    #[must_use]
    pub fn best_url(&self) -> Option<&str> {
        self.u
            .as_deref()
            .or(self.gif.as_deref())
            .or(self.mp4.as_deref())
    }
}
