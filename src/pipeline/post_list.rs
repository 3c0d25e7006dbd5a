//! Post-list mode: archive an explicit list of post URLs instead of feeds.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use super::driver::report_throughput;
use super::error::PipelineError;
use super::tracker::{ProgressCounters, ProgressTracker};
use super::{RunSummary, SourceReport};
use crate::config::PostListOptions;
use crate::listing::{ListingClient, REDDIT_ORIGIN};
use crate::materialize::{ItemOutcome, Materializer};

const POST_LIST_LABEL: &str = "post list";

/// Keeps lines that look like post URLs; comments and blanks are dropped.
#[must_use]
pub fn parse_post_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| {
            let is_post = line.starts_with(REDDIT_ORIGIN) && line.contains("/comments/");
            if !is_post {
                warn!(line, "ignoring post-list line that is not a post URL");
            }
            is_post
        })
        .map(str::to_string)
        .collect()
}

/// Archives every post in the list file, repeating when configured.
///
/// # Errors
///
/// Returns [`PipelineError::PostListRead`] when the file cannot be read,
/// [`PipelineError::EmptyPostList`] when it has no post URLs, and
/// [`PipelineError::Setup`] when the output directory cannot be created.
#[instrument(skip(listing, materializer, options), fields(path = %options.path.display()))]
pub async fn run_post_list(
    listing: ListingClient,
    materializer: Arc<Materializer>,
    options: &PostListOptions,
    post_delay: Duration,
) -> Result<RunSummary, PipelineError> {
    let base = materializer.layout().base().to_path_buf();
    tokio::fs::create_dir_all(&base)
        .await
        .map_err(|e| PipelineError::setup(&base, e))?;

    let started = Instant::now();
    let mut summary = RunSummary::default();
    loop {
        let urls = read_post_list(&options.path).await?;
        info!(posts = urls.len(), "archiving post list");

        let cycle_started = Instant::now();
        let counters = archive_posts(&listing, &materializer, urls, post_delay).await;
        info!(source = POST_LIST_LABEL, counters = %counters, "source finished");
        report_throughput(cycle_started.elapsed(), &counters, false);

        summary.totals.accumulate(&counters);
        summary.sources.push(SourceReport {
            source: POST_LIST_LABEL.to_string(),
            counters,
        });
        summary.cycles += 1;

        if !options.repeat_forever {
            break;
        }
        info!(
            delay_ms = options.time_between_runs_ms,
            "post list complete, repeating after delay"
        );
        tokio::time::sleep(Duration::from_millis(options.time_between_runs_ms)).await;
    }
    summary.elapsed = started.elapsed();
    Ok(summary)
}

async fn read_post_list(path: &Path) -> Result<Vec<String>, PipelineError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::PostListRead {
            path: path.to_path_buf(),
            source,
        })?;
    let urls = parse_post_list(&contents);
    if urls.is_empty() {
        return Err(PipelineError::EmptyPostList {
            path: path.to_path_buf(),
        });
    }
    Ok(urls)
}

async fn archive_posts(
    listing: &ListingClient,
    materializer: &Arc<Materializer>,
    urls: Vec<String>,
    post_delay: Duration,
) -> ProgressCounters {
    let mut tracker = ProgressTracker::new(Some(u64::try_from(urls.len()).unwrap_or(u64::MAX)));
    tracker.begin_page(urls.len(), true, None);

    let mut in_flight: JoinSet<ItemOutcome> = JoinSet::new();
    for url in urls {
        tokio::time::sleep(post_delay).await;
        let listing = listing.clone();
        let materializer = Arc::clone(materializer);
        in_flight.spawn(async move {
            match listing.fetch_post(&url).await {
                Ok(item) => materializer.materialize(&item, None).await,
                Err(e) => {
                    warn!(url = %url, error = %e, "failed to fetch post");
                    ItemOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            }
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        let outcome = joined.unwrap_or_else(|e| ItemOutcome::Failed {
            error: format!("item task aborted: {e}"),
        });
        tracker.record(&outcome);
    }
    tracker.reset()
}
