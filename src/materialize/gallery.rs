//! Gallery items: one file per entry under `<name>/`.

use tracing::{info, warn};

use super::{ItemContext, ItemOutcome, MaterializeError, Materializer, SavedAs, SkipReason};
use crate::classify::ContentKind;
use crate::listing::Item;
use crate::naming::should_download;
use crate::summary::SummaryDetails;

/// One downloadable gallery entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryFile {
    pub url: String,
    pub stem: String,
    pub extension: String,
}

/// Direct-file URLs for every gallery entry that has usable metadata, in order.
#[must_use]
pub fn gallery_files(item: &Item) -> Vec<GalleryFile> {
    let (Some(gallery), Some(metadata)) = (&item.gallery_data, &item.media_metadata) else {
        return Vec::new();
    };

    gallery
        .items
        .iter()
        .filter_map(|entry| {
            let source = metadata.get(&entry.media_id)?.s.as_ref()?;
            let url = source.best_url()?.replace("&amp;", "&");
            let without_query = url.split('?').next().unwrap_or_default();
            let extension = without_query
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_string())
                .filter(|ext| !ext.is_empty() && !ext.contains('/'))?;
            Some(GalleryFile {
                stem: entry.file_stem(),
                extension,
                url,
            })
        })
        .collect()
}

impl Materializer {
    pub(super) async fn materialize_gallery(
        &self,
        ctx: &ItemContext<'_>,
    ) -> Result<ItemOutcome, MaterializeError> {
        let thread = self.fetch_thread(ctx.item).await;

        if !self.config.download_gallery_posts {
            info!(title = ctx.item.title(), "skipping gallery post");
            let note = "Gallery skipped by configuration.";
            self.write_summary(
                ctx,
                ContentKind::Gallery,
                &SummaryDetails::with_note(note),
                thread.as_deref(),
            )
            .await?;
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::Filtered,
                note: Some(note.to_string()),
            });
        }

        let files = gallery_files(ctx.item);
        if files.is_empty() {
            return Err(MaterializeError::missing_url(ctx.item.key()));
        }

        let entry_dir = ctx.dir.join(&ctx.name);
        tokio::fs::create_dir_all(&entry_dir)
            .await
            .map_err(|e| MaterializeError::write(&entry_dir, e))?;

        let mut planned = Vec::with_capacity(files.len());
        let mut saved = Vec::new();
        let mut first_error = None;
        let mut failed = 0usize;

        for file in &files {
            let relative = format!("{}/{}.{}", ctx.name, file.stem, file.extension);
            let path = ctx.dir.join(&relative);
            planned.push(relative);

            if !should_download(&path, self.config.redownload_posts) {
                continue;
            }
            match self.downloads.download_to_path(&file.url, &path).await {
                Ok(_) => saved.push(path),
                Err(e) => {
                    warn!(url = %file.url, error = %e, "gallery entry failed");
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        let details = SummaryDetails {
            gallery_items: planned,
            ..SummaryDetails::default()
        };
        self.write_summary(ctx, ContentKind::Gallery, &details, thread.as_deref())
            .await?;

        if saved.is_empty() {
            return match first_error {
                Some(e) => Err(e.into()),
                None => Ok(ItemOutcome::skipped(SkipReason::Duplicate)),
            };
        }
        let note = (failed > 0).then(|| format!("{failed} of {} gallery items failed.", files.len()));
        Ok(ItemOutcome::Saved {
            counter: SavedAs::Media,
            files: saved,
            note,
        })
    }
}
