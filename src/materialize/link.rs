//! Link items: provider video, streaming-video mux, or redirect document.

use tracing::{info, warn};

use super::{ItemContext, ItemOutcome, MaterializeError, Materializer, SavedAs, SkipReason};
use crate::classify::ContentKind;
use crate::summary::{SummaryDetails, redirect_document};

const PROVIDER_LINK_NOTE: &str = "Original post was a link; video downloaded from RedGIFs.";
const LINK_DISABLED_TARGET: &str = "(not saved due to configuration)";
const STREAMING_NOTE: &str = "Video fetched from a streaming site and merged.";
const STREAMING_FALLBACK_NOTE: &str = "Saved as HTML redirect (streaming-video fallback).";

impl Materializer {
    pub(super) async fn materialize_link(
        &self,
        ctx: &ItemContext<'_>,
    ) -> Result<ItemOutcome, MaterializeError> {
        let thread = self.fetch_thread(ctx.item).await;

        if let Some(video_url) = self.try_provider(ctx.item).await {
            let file_name = format!("{}.mp4", ctx.name);
            let details = SummaryDetails {
                files: vec![file_name.clone()],
                source_url: Some(video_url.clone()),
                note: Some(PROVIDER_LINK_NOTE.to_string()),
                ..SummaryDetails::default()
            };
            self.write_summary(ctx, ContentKind::Media, &details, thread.as_deref())
                .await?;
            return self
                .save_download(ctx, &video_url, &file_name, Some(PROVIDER_LINK_NOTE.to_string()))
                .await;
        }

        if !self.config.download_link_posts {
            info!(title = ctx.item.title(), "skipping link post");
            let details = SummaryDetails {
                link_target: Some(LINK_DISABLED_TARGET.to_string()),
                ..SummaryDetails::default()
            };
            self.write_summary(ctx, ctx.kind, &details, thread.as_deref())
                .await?;
            return Ok(ItemOutcome::skipped(SkipReason::Filtered));
        }

        let url = ctx
            .item
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| MaterializeError::missing_url(ctx.item.key()))?;

        let mut note = None;
        if let Some(muxer) = self.muxer.as_ref()
            && self.config.download_streaming_videos_experimental
            && ctx.item.domain().contains("youtu")
        {
            let file_name = format!("{}.mp4", ctx.name);
            let path = ctx.dir.join(&file_name);
            info!(
                muxer = muxer.name(),
                title = ctx.item.title(),
                "fetching streaming video, this may take a while"
            );
            match muxer.fetch_and_mux(url, &path).await {
                Ok(()) => {
                    let details = SummaryDetails {
                        link_target: Some(file_name),
                        note: Some(STREAMING_NOTE.to_string()),
                        ..SummaryDetails::default()
                    };
                    self.write_summary(ctx, ContentKind::Link, &details, thread.as_deref())
                        .await?;
                    return Ok(ItemOutcome::Saved {
                        counter: SavedAs::Link,
                        files: vec![path],
                        note: Some(STREAMING_NOTE.to_string()),
                    });
                }
                Err(e) => {
                    warn!(error = %e, "streaming video fetch failed, saving redirect instead");
                    note = Some(STREAMING_FALLBACK_NOTE.to_string());
                }
            }
        }

        let html_name = format!("{}.html", ctx.name);
        let html_path = ctx.dir.join(&html_name);
        super::write_file(&html_path, redirect_document(url).as_bytes()).await?;

        let details = SummaryDetails {
            link_target: Some(html_name),
            note: note.clone(),
            ..SummaryDetails::default()
        };
        self.write_summary(ctx, ContentKind::Link, &details, thread.as_deref())
            .await?;
        Ok(ItemOutcome::Saved {
            counter: SavedAs::Link,
            files: vec![html_path],
            note,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::config::ArchiverConfig;
    use crate::download::{MuxError, VideoMuxer};
    use crate::listing::Item;
    use crate::materialize::tests::{offline_materializer, title_only};
    use crate::materialize::{ItemOutcome, SavedAs, SkipReason};

    struct StubMuxer {
        succeed: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VideoMuxer for StubMuxer {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_and_mux(&self, _page_url: &str, output: &Path) -> Result<(), MuxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                std::fs::write(output, b"video").unwrap();
                Ok(())
            } else {
                Err(MuxError::ToolMissing {
                    tool: "yt-dlp".into(),
                })
            }
        }
    }

    fn link_item(domain: &str, url: &str) -> Item {
        Item {
            title: Some("Clip".into()),
            subreddit: Some("videos".into()),
            domain: Some(domain.into()),
            url: Some(url.into()),
            post_hint: Some("link".into()),
            ..Item::default()
        }
    }

    #[tokio::test]
    async fn test_link_writes_redirect_document() {
        let temp = TempDir::new().unwrap();
        let materializer = offline_materializer(title_only(), temp.path());
        let outcome = materializer
            .materialize(&link_item("example.com", "https://example.com/story"), None)
            .await;

        let html_path = temp.path().join("videos").join("Clip.html");
        assert_eq!(
            outcome,
            ItemOutcome::Saved {
                counter: SavedAs::Link,
                files: vec![html_path.clone()],
                note: None
            }
        );
        let html = std::fs::read_to_string(html_path).unwrap();
        assert!(html.contains("window.location.href = \"https://example.com/story\""));
        let md = std::fs::read_to_string(temp.path().join("videos").join("Clip.md")).unwrap();
        assert!(md.contains("Saved as: Clip.html"));
    }

    #[tokio::test]
    async fn test_disabled_links_are_filtered_with_summary() {
        let temp = TempDir::new().unwrap();
        let config = ArchiverConfig {
            download_link_posts: false,
            ..title_only()
        };
        let materializer = offline_materializer(config, temp.path());
        let outcome = materializer
            .materialize(&link_item("example.com", "https://example.com/story"), None)
            .await;
        assert!(matches!(
            outcome,
            ItemOutcome::Skipped {
                reason: SkipReason::Filtered,
                ..
            }
        ));
        let md = std::fs::read_to_string(temp.path().join("videos").join("Clip.md")).unwrap();
        assert!(md.contains("(not saved due to configuration)"));
        assert!(!temp.path().join("videos").join("Clip.html").exists());
    }

    #[tokio::test]
    async fn test_streaming_video_muxed_when_enabled() {
        let temp = TempDir::new().unwrap();
        let config = ArchiverConfig {
            download_streaming_videos_experimental: true,
            ..title_only()
        };
        let muxer = Arc::new(StubMuxer {
            succeed: true,
            calls: AtomicUsize::new(0),
        });
        let materializer =
            offline_materializer(config, temp.path()).with_muxer(muxer.clone());
        let outcome = materializer
            .materialize(&link_item("youtube.com", "https://youtube.com/watch?v=x"), None)
            .await;

        assert_eq!(muxer.calls.load(Ordering::SeqCst), 1);
        let ItemOutcome::Saved { counter, files, .. } = outcome else {
            panic!("expected saved outcome, got {outcome:?}");
        };
        assert_eq!(counter, SavedAs::Link);
        assert_eq!(files, vec![temp.path().join("videos").join("Clip.mp4")]);
    }

    #[tokio::test]
    async fn test_streaming_failure_falls_back_to_redirect() {
        let temp = TempDir::new().unwrap();
        let config = ArchiverConfig {
            download_streaming_videos_experimental: true,
            ..title_only()
        };
        let muxer = Arc::new(StubMuxer {
            succeed: false,
            calls: AtomicUsize::new(0),
        });
        let materializer = offline_materializer(config, temp.path()).with_muxer(muxer);
        let outcome = materializer
            .materialize(&link_item("youtu.be", "https://youtu.be/x"), None)
            .await;

        let ItemOutcome::Saved { counter, note, .. } = outcome else {
            panic!("expected saved outcome, got {outcome:?}");
        };
        assert_eq!(counter, SavedAs::Link);
        assert!(note.unwrap().contains("streaming-video fallback"));
        assert!(temp.path().join("videos").join("Clip.html").exists());
    }

    #[tokio::test]
    async fn test_streaming_disabled_skips_muxer() {
        let temp = TempDir::new().unwrap();
        let muxer = Arc::new(StubMuxer {
            succeed: true,
            calls: AtomicUsize::new(0),
        });
        let materializer =
            offline_materializer(title_only(), temp.path()).with_muxer(muxer.clone());
        materializer
            .materialize(&link_item("youtube.com", "https://youtube.com/watch?v=x"), None)
            .await;
        assert_eq!(muxer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_link_without_url_fails() {
        let temp = TempDir::new().unwrap();
        let materializer = offline_materializer(title_only(), temp.path());
        let item = Item {
            title: Some("Nothing".into()),
            subreddit: Some("videos".into()),
            ..Item::default()
        };
        let outcome = materializer.materialize(&item, None).await;
        assert!(matches!(outcome, ItemOutcome::Failed { .. }));
    }
}
