//! Media items: resolve the best direct file and download it.

use tracing::{debug, info};

use super::{ItemContext, ItemOutcome, MaterializeError, Materializer, SkipReason};
use crate::classify::ContentKind;
use crate::listing::Item;
use crate::summary::SummaryDetails;

/// Extensions recognized inside preview source URLs, in priority order.
const PREVIEW_FORMATS: [&str; 7] = ["jpeg", "jpg", "gif", "png", "mp4", "webm", "gifv"];

const FALLBACK_EXTENSION: &str = "bin";

/// Where a media item's content file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTarget {
    pub url: String,
    pub extension: String,
}

impl MediaTarget {
    fn new(url: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extension: extension.into(),
        }
    }
}

/// Picks the download URL and file type for a media item.
///
/// Starts from the item URL. A provider-resolved URL replaces it as mp4.
/// Otherwise, when preview data exists, the first of these wins: the video
/// preview fallback, the destination URL with `.gifv` swapped for `.mp4`, or
/// the preview image source. First-party hosted video always overrides the
/// result; an embed thumbnail overrides it unless the provider resolved.
#[must_use]
pub fn resolve_media_target(item: &Item, provider_url: Option<&str>) -> Option<MediaTarget> {
    let mut target = item
        .url
        .as_deref()
        .or(item.url_overridden_by_dest.as_deref())
        .filter(|url| !url.is_empty())
        .map(|url| MediaTarget::new(url, extension_of(url)));

    if let Some(url) = provider_url {
        target = Some(MediaTarget::new(url, "mp4"));
    } else if let Some(preview) = &item.preview {
        let video_preview = preview
            .reddit_video_preview
            .as_ref()
            .and_then(|v| v.fallback_url.as_deref());
        let gifv = item
            .url_overridden_by_dest
            .as_deref()
            .filter(|dest| dest.contains(".gifv"));

        if let Some(fallback) = video_preview {
            target = Some(MediaTarget::new(fallback, "mp4"));
        } else if let Some(dest) = gifv {
            target = Some(MediaTarget::new(dest.replacen(".gifv", ".mp4", 1), "mp4"));
        } else if let Some(source) = item.preview_source_url() {
            let lowered = source.to_lowercase();
            let extension = PREVIEW_FORMATS
                .iter()
                .find(|format| lowered.contains(*format))
                .map(|format| (*format).to_string())
                .or_else(|| target.as_ref().map(|t| t.extension.clone()))
                .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
            target = Some(MediaTarget::new(source.replace("&amp;", "&"), extension));
        }
    }

    let media = item.media.as_ref();
    let hosted_video = media
        .and_then(|m| m.reddit_video.as_ref())
        .and_then(|v| v.fallback_url.as_deref());
    let embed_thumbnail = item.oembed().and_then(|o| o.thumbnail_url.as_deref());

    match item.post_hint() {
        "hosted:video" => {
            if let Some(url) = hosted_video {
                target = Some(MediaTarget::new(url, "mp4"));
            }
        }
        "rich:video" if provider_url.is_none() => {
            if let Some(url) = embed_thumbnail {
                target = Some(MediaTarget::new(url, "gif"));
            }
        }
        _ => {}
    }

    target
}

/// Extension of the URL path, or `bin` when there is none.
fn extension_of(url: &str) -> String {
    let path = url::Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or_default().to_string());
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

impl Materializer {
    pub(super) async fn materialize_media(
        &self,
        ctx: &ItemContext<'_>,
    ) -> Result<ItemOutcome, MaterializeError> {
        let provider_url = self.try_provider(ctx.item).await;
        let target = resolve_media_target(ctx.item, provider_url.as_deref())
            .ok_or_else(|| MaterializeError::missing_url(ctx.item.key()))?;
        let file_name = format!("{}.{}", ctx.name, target.extension);
        debug!(url = %target.url, file = %file_name, "media target resolved");

        let thread = self.fetch_thread(ctx.item).await;
        let mut details = SummaryDetails {
            files: vec![file_name.clone()],
            source_url: Some(target.url.clone()),
            ..SummaryDetails::default()
        };

        if !self.config.download_media_posts {
            info!(title = ctx.item.title(), "skipping media post");
            let note = "Media skipped by configuration.";
            details.note = Some(note.to_string());
            self.write_summary(ctx, ContentKind::Media, &details, thread.as_deref())
                .await?;
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::Filtered,
                note: Some(note.to_string()),
            });
        }

        self.write_summary(ctx, ContentKind::Media, &details, thread.as_deref())
            .await?;
        self.save_download(ctx, &target.url, &file_name, None).await
    }
}
