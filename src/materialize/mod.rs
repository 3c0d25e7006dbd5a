//! Per-item persistence, one handler per content kind.
//!
//! [`Materializer::materialize`] classifies an item, decides its target
//! paths, writes the summary and content files, and reports exactly one
//! [`ItemOutcome`]. Failures never escape an item: they come back as
//! [`ItemOutcome::Failed`].

mod error;
mod gallery;
mod link;
mod media;
mod text;

pub use error::MaterializeError;
pub use gallery::{GalleryFile, gallery_files};
pub use media::{MediaTarget, resolve_media_target};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::classify::{ContentKind, classify};
use crate::config::ArchiverConfig;
use crate::download::{HttpClient, VideoMuxer};
use crate::listing::{DiscussionNode, Item, ListingClient, Source};
use crate::naming::{OutputLayout, build_file_name, should_download};
use crate::provider::{RedgifsClient, is_redgifs_item};
use crate::summary::{SummaryDetails, build_summary};

/// Which counter a saved item increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedAs {
    /// Text-like items: self posts and polls.
    SelfPost,
    Media,
    Link,
}

/// Why an item was not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target already exists and redownload is off.
    Duplicate,
    /// The item's kind is disabled by configuration.
    Filtered,
}

/// Terminal result of materializing one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Saved {
        counter: SavedAs,
        files: Vec<PathBuf>,
        note: Option<String>,
    },
    Skipped {
        reason: SkipReason,
        note: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl ItemOutcome {
    fn saved(counter: SavedAs, files: Vec<PathBuf>) -> Self {
        Self::Saved {
            counter,
            files,
            note: None,
        }
    }

    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason, note: None }
    }
}

/// Everything a handler needs to know about one item.
pub(crate) struct ItemContext<'a> {
    pub item: &'a Item,
    pub kind: ContentKind,
    pub dir: PathBuf,
    /// Base file name without extension.
    pub name: String,
}

impl ItemContext<'_> {
    pub fn path_with_ext(&self, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{ext}", self.name))
    }
}

/// Persists classified items under an [`OutputLayout`].
pub struct Materializer {
    config: Arc<ArchiverConfig>,
    layout: OutputLayout,
    listing: ListingClient,
    downloads: HttpClient,
    provider: Option<RedgifsClient>,
    muxer: Option<Arc<dyn VideoMuxer>>,
}

impl Materializer {
    #[must_use]
    pub fn new(
        config: Arc<ArchiverConfig>,
        layout: OutputLayout,
        listing: ListingClient,
        downloads: HttpClient,
    ) -> Self {
        Self {
            config,
            layout,
            listing,
            downloads,
            provider: None,
            muxer: None,
        }
    }

    /// Enables secondary-provider lookups.
    #[must_use]
    pub fn with_provider(mut self, provider: RedgifsClient) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Enables streaming-video fetch-and-mux for link items.
    #[must_use]
    pub fn with_muxer(mut self, muxer: Arc<dyn VideoMuxer>) -> Self {
        self.muxer = Some(muxer);
        self
    }

    #[must_use]
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    #[must_use]
    pub fn config(&self) -> &ArchiverConfig {
        &self.config
    }

    /// Persists `item` and reports its outcome.
    ///
    /// `source` is the feed the item came from, if any; user feeds get their
    /// own directory.
    #[instrument(skip(self, item, source), fields(item = %item.key()))]
    pub async fn materialize(&self, item: &Item, source: Option<&Source>) -> ItemOutcome {
        let kind = classify(item);
        if self.config.detailed_logs {
            info!(
                kind = %kind,
                post_hint = item.post_hint(),
                domain = item.domain(),
                "item classified"
            );
        }

        let ctx = ItemContext {
            item,
            kind,
            dir: self.layout.directory_for(item, source),
            name: build_file_name(item, &self.config.file_naming_scheme),
        };
        if let Err(e) = tokio::fs::create_dir_all(&ctx.dir).await {
            let error = MaterializeError::write(&ctx.dir, e);
            warn!(error = %error, "cannot create item directory");
            return ItemOutcome::Failed {
                error: error.to_string(),
            };
        }

        let result = match kind {
            ContentKind::SelfPost => self.materialize_self(&ctx).await,
            ContentKind::Poll => self.materialize_poll(&ctx).await,
            ContentKind::Media => self.materialize_media(&ctx).await,
            ContentKind::Link => self.materialize_link(&ctx).await,
            ContentKind::Gallery => self.materialize_gallery(&ctx).await,
        };

        match result {
            Ok(outcome) => {
                debug!(?outcome, "item materialized");
                outcome
            }
            Err(error) => {
                warn!(kind = %kind, title = item.title(), error = %error, "item failed");
                ItemOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    /// Best-effort discussion fetch; `None` omits the comments section.
    async fn fetch_thread(&self, item: &Item) -> Option<Vec<DiscussionNode>> {
        match self.listing.fetch_thread(item).await {
            Ok(nodes) => Some(nodes),
            Err(e) => {
                debug!(error = %e, "discussion unavailable, omitting comments");
                None
            }
        }
    }

    /// Resolves a provider-hosted video when the item qualifies and lookups are on.
    async fn try_provider(&self, item: &Item) -> Option<String> {
        if !self.config.download_redgifs_videos || !is_redgifs_item(item) {
            return None;
        }
        let provider = self.provider.as_ref()?;
        match provider.resolve_item(item).await {
            Ok(url) => {
                info!(url = %url, "resolved provider video");
                Some(url)
            }
            Err(e) => {
                warn!(error = %e, "provider resolution failed, using default handling");
                None
            }
        }
    }

    /// Writes the summary unless one exists and redownload is off.
    async fn write_summary(
        &self,
        ctx: &ItemContext<'_>,
        kind: ContentKind,
        details: &SummaryDetails,
        thread: Option<&[DiscussionNode]>,
    ) -> Result<PathBuf, MaterializeError> {
        let path = ctx.path_with_ext("md");
        if should_download(&path, self.config.redownload_posts) {
            let markdown = build_summary(ctx.item, kind, details, thread);
            write_file(&path, markdown.as_bytes()).await?;
        }
        Ok(path)
    }

    /// Downloads `url` to `<dir>/<file_name>` unless it already exists.
    async fn save_download(
        &self,
        ctx: &ItemContext<'_>,
        url: &str,
        file_name: &str,
        note: Option<String>,
    ) -> Result<ItemOutcome, MaterializeError> {
        let path = ctx.dir.join(file_name);
        if !should_download(&path, self.config.redownload_posts) {
            return Ok(ItemOutcome::skipped(SkipReason::Duplicate));
        }
        if let Err(e) = self.downloads.download_to_path(url, &path).await {
            if e.is_host_not_found() {
                warn!(url, "hostname not found, skipping item");
            }
            return Err(e.into());
        }
        Ok(ItemOutcome::Saved {
            counter: SavedAs::Media,
            files: vec![path],
            note,
        })
    }
}

pub(crate) async fn write_file(path: &Path, contents: &[u8]) -> Result<(), MaterializeError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| MaterializeError::write(path, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::config::NamingScheme;
    use tempfile::TempDir;

    pub(crate) fn offline_materializer(config: ArchiverConfig, base: &Path) -> Materializer {
        Materializer::new(
            Arc::new(config),
            OutputLayout::new(base, false),
            ListingClient::with_base_url("http://127.0.0.1:9").unwrap(),
            HttpClient::new().unwrap(),
        )
    }

    pub(crate) fn title_only() -> ArchiverConfig {
        ArchiverConfig {
            file_naming_scheme: NamingScheme {
                show_date: false,
                show_score: false,
                show_subreddit: false,
                show_author: false,
                show_title: true,
            },
            ..ArchiverConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unwritable_directory_fails_item() {
        let temp = TempDir::new().unwrap();
        // A file where the item directory should go.
        let blocker = temp.path().join("pics");
        std::fs::write(&blocker, "x").unwrap();

        let materializer = offline_materializer(title_only(), temp.path());
        let item = Item {
            is_self: Some(true),
            title: Some("t".into()),
            subreddit: Some("pics".into()),
            ..Item::default()
        };
        let outcome = materializer.materialize(&item, None).await;
        assert!(matches!(outcome, ItemOutcome::Failed { .. }));
    }
}
