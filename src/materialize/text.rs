//! Self posts and polls: summary-only items.

use super::{ItemContext, ItemOutcome, MaterializeError, Materializer, SavedAs, SkipReason};
use crate::classify::ContentKind;
use crate::naming::should_download;
use crate::summary::{SummaryDetails, build_summary};

impl Materializer {
    pub(super) async fn materialize_self(
        &self,
        ctx: &ItemContext<'_>,
    ) -> Result<ItemOutcome, MaterializeError> {
        let path = ctx.path_with_ext("md");
        if !should_download(&path, self.config.redownload_posts) {
            return Ok(ItemOutcome::skipped(SkipReason::Duplicate));
        }
        if !self.config.download_self_posts {
            tracing::info!(title = ctx.item.title(), "skipping self post");
            return Ok(ItemOutcome::skipped(SkipReason::Filtered));
        }

        let thread = self.fetch_thread(ctx.item).await;
        let markdown = build_summary(
            ctx.item,
            ContentKind::SelfPost,
            &SummaryDetails::default(),
            thread.as_deref(),
        );
        super::write_file(&path, markdown.as_bytes()).await?;
        Ok(ItemOutcome::saved(SavedAs::SelfPost, vec![path]))
    }

    /// Polls have no enable flag and count as self posts.
    pub(super) async fn materialize_poll(
        &self,
        ctx: &ItemContext<'_>,
    ) -> Result<ItemOutcome, MaterializeError> {
        let thread = self.fetch_thread(ctx.item).await;
        let path = self
            .write_summary(
                ctx,
                ContentKind::Poll,
                &SummaryDetails::default(),
                thread.as_deref(),
            )
            .await?;
        Ok(ItemOutcome::saved(SavedAs::SelfPost, vec![path]))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::ArchiverConfig;
    use crate::listing::Item;
    use crate::listing::model::{PollData, PollOption};
    use crate::materialize::tests::{offline_materializer, title_only};
    use crate::materialize::{ItemOutcome, SavedAs, SkipReason};
    use tempfile::TempDir;

    fn self_item(title: &str) -> Item {
        Item {
            is_self: Some(true),
            title: Some(title.into()),
            subreddit: Some("rust".into()),
            selftext: Some("hello body".into()),
            ..Item::default()
        }
    }

    #[tokio::test]
    async fn test_self_post_writes_summary_without_thread() {
        let temp = TempDir::new().unwrap();
        let materializer = offline_materializer(title_only(), temp.path());

        let outcome = materializer.materialize(&self_item("First"), None).await;
        let ItemOutcome::Saved { counter, files, .. } = outcome else {
            panic!("expected saved outcome, got {outcome:?}");
        };
        assert_eq!(counter, SavedAs::SelfPost);
        assert_eq!(files, vec![temp.path().join("rust").join("First.md")]);

        let md = std::fs::read_to_string(&files[0]).unwrap();
        assert!(md.contains("## Post\n\nhello body\n"));
        assert!(!md.contains("## Comments"), "thread fetch failed, so no comments");
    }

    #[tokio::test]
    async fn test_existing_summary_is_duplicate_before_filter() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("rust")).unwrap();
        std::fs::write(temp.path().join("rust").join("Again.md"), "old").unwrap();

        let config = ArchiverConfig {
            download_self_posts: false,
            ..title_only()
        };
        let materializer = offline_materializer(config, temp.path());
        let outcome = materializer.materialize(&self_item("Again"), None).await;
        assert_eq!(
            outcome,
            ItemOutcome::Skipped {
                reason: SkipReason::Duplicate,
                note: None
            }
        );
    }

    #[tokio::test]
    async fn test_disabled_self_posts_are_filtered() {
        let temp = TempDir::new().unwrap();
        let config = ArchiverConfig {
            download_self_posts: false,
            ..title_only()
        };
        let materializer = offline_materializer(config, temp.path());
        let outcome = materializer.materialize(&self_item("Off"), None).await;
        assert!(matches!(
            outcome,
            ItemOutcome::Skipped {
                reason: SkipReason::Filtered,
                ..
            }
        ));
        assert!(!temp.path().join("rust").join("Off.md").exists());
    }

    #[tokio::test]
    async fn test_poll_counts_as_self_and_lists_options() {
        let temp = TempDir::new().unwrap();
        let materializer = offline_materializer(title_only(), temp.path());
        let item = Item {
            title: Some("Vote".into()),
            subreddit: Some("rust".into()),
            poll_data: Some(PollData {
                options: vec![PollOption {
                    text: "Ferris".into(),
                    vote_count: Some(10),
                }],
                total_vote_count: Some(10),
            }),
            ..Item::default()
        };
        let outcome = materializer.materialize(&item, None).await;
        assert!(matches!(
            outcome,
            ItemOutcome::Saved {
                counter: SavedAs::SelfPost,
                ..
            }
        ));
        let md = std::fs::read_to_string(temp.path().join("rust").join("Vote.md")).unwrap();
        assert!(md.contains("- Ferris (10 votes)"));
        assert!(md.contains("- Type: poll"));
    }
}
