//! Pagination driver: an explicit state machine over `(source, cursor)`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use super::error::PipelineError;
use super::tracker::{ProgressCounters, ProgressTracker, TrackerDecision};
use super::{PAGE_SIZE, ProgressSnapshot, RunSummary, SourceReport};
use crate::config::RunOptions;
use crate::listing::{ListingClient, ListingPage, PageQuery, Source};
use crate::materialize::{ItemOutcome, Materializer};

/// Driver states. [`PaginationDriver::transition`] maps one to the next.
#[derive(Debug, Clone)]
pub enum DriverState {
    /// Request the next page of the current source.
    Fetching,
    /// Dispatch every item of a fetched page.
    Dispatching(ListingPage),
    /// Close out the current source and move to the next one.
    AdvancingSource,
    /// No sources remain; `forced` when the last source failed.
    Finished { forced: bool },
    /// Waiting out the delay before a repeat run.
    Sleeping,
    /// Terminal.
    Done,
}

impl DriverState {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Dispatching(_) => "dispatching",
            Self::AdvancingSource => "advancing",
            Self::Finished { .. } => "finished",
            Self::Sleeping => "sleeping",
            Self::Done => "done",
        }
    }
}

/// Walks every source page by page, materializing each item.
///
/// Items are dispatched one at a time with a fixed delay before each, while
/// their downloads overlap in flight. Per-source counters live in a
/// [`ProgressTracker`] that decides when a source is done.
pub struct PaginationDriver {
    listing: ListingClient,
    materializer: Arc<Materializer>,
    options: RunOptions,
    tracker: ProgressTracker,
    source_index: usize,
    cursor: Option<String>,
    progress: watch::Sender<ProgressSnapshot>,
    summary: RunSummary,
    cycle_totals: ProgressCounters,
    started: Instant,
    max_cycles: Option<u32>,
}

impl PaginationDriver {
    #[must_use]
    pub fn new(listing: ListingClient, materializer: Arc<Materializer>, options: RunOptions) -> Self {
        let (progress, _) = watch::channel(ProgressSnapshot::default());
        Self {
            listing,
            materializer,
            tracker: ProgressTracker::new(options.target),
            options,
            source_index: 0,
            cursor: None,
            progress,
            summary: RunSummary::default(),
            cycle_totals: ProgressCounters::default(),
            started: Instant::now(),
            max_cycles: None,
        }
    }

    /// Stops after `cycles` full passes even when repeating forever.
    #[must_use]
    pub fn with_max_cycles(mut self, cycles: u32) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Receiver for live progress snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }

    /// Runs until every source is finished (forever with `repeat_forever`).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoSources`] for an empty source list and
    /// [`PipelineError::Setup`] when the output directory cannot be created.
    #[instrument(skip(self), fields(sources = self.options.sources.len()))]
    pub async fn run(mut self) -> Result<RunSummary, PipelineError> {
        if self.options.sources.is_empty() {
            return Err(PipelineError::NoSources);
        }
        let base = self.materializer.layout().base().to_path_buf();
        tokio::fs::create_dir_all(&base)
            .await
            .map_err(|e| PipelineError::setup(&base, e))?;

        self.started = Instant::now();
        let mut state = DriverState::Fetching;
        while !matches!(state, DriverState::Done) {
            state = self.transition(state).await;
            self.publish(&state);
        }
        self.summary.elapsed = self.started.elapsed();
        Ok(self.summary)
    }

    /// Single transition function of the driver.
    pub async fn transition(&mut self, state: DriverState) -> DriverState {
        match state {
            DriverState::Fetching => self.fetch().await,
            DriverState::Dispatching(page) => self.dispatch(page).await,
            DriverState::AdvancingSource => self.advance_source(),
            DriverState::Finished { forced } => self.finish(forced),
            DriverState::Sleeping => {
                tokio::time::sleep(self.options.time_between_runs).await;
                self.source_index = 0;
                self.cursor = None;
                self.cycle_totals = ProgressCounters::default();
                self.started = Instant::now();
                DriverState::Fetching
            }
            DriverState::Done => DriverState::Done,
        }
    }

    fn current_source(&self) -> Option<&Source> {
        self.options.sources.get(self.source_index)
    }

    async fn fetch(&mut self) -> DriverState {
        let (left, _) = self.tracker.remaining();
        if left == 0 {
            return DriverState::AdvancingSource;
        }
        let Some(source) = self.current_source().cloned() else {
            return DriverState::Finished { forced: false };
        };

        let limit = usize::try_from(left).unwrap_or(usize::MAX).min(PAGE_SIZE);
        let query = PageQuery {
            sort: self.options.sort,
            window: self.options.window,
            limit,
            after: self.cursor.clone(),
        };

        match self.listing.fetch_page(&source, &query).await {
            Ok(page) => {
                // Community feeds continue after the last item; user feeds
                // carry the provider cursor forward.
                let next_cursor = if source.is_user() {
                    page.after.clone()
                } else {
                    page.last_item_name().map(str::to_string)
                };
                // Without a cursor the next request would repeat this page.
                let is_last = page.is_last() || next_cursor.is_none();
                self.tracker.begin_page(page.items.len(), is_last, next_cursor);
                DriverState::Dispatching(page)
            }
            Err(e) => {
                warn!(source = %source, error = %e, "source unavailable");
                if self.source_index + 1 < self.options.sources.len() {
                    DriverState::AdvancingSource
                } else {
                    self.close_source();
                    DriverState::Finished { forced: true }
                }
            }
        }
    }

    async fn dispatch(&mut self, page: ListingPage) -> DriverState {
        let source = self.current_source().cloned();
        let mut in_flight: JoinSet<ItemOutcome> = JoinSet::new();

        for item in page.items {
            tokio::time::sleep(self.options.post_delay).await;
            let materializer = Arc::clone(&self.materializer);
            let source = source.clone();
            in_flight.spawn(async move { materializer.materialize(&item, source.as_ref()).await });
        }

        let mut decision = TrackerDecision::Pending;
        while let Some(joined) = in_flight.join_next().await {
            let outcome = joined.unwrap_or_else(|e| ItemOutcome::Failed {
                error: format!("item task aborted: {e}"),
            });
            decision = self.tracker.record(&outcome);
            self.publish_counts();
        }

        let (left, total) = self.tracker.remaining();
        info!(
            source = %source.as_ref().map(ToString::to_string).unwrap_or_default(),
            processed = total,
            remaining = %remaining_label(left),
            counters = %self.tracker.counters(),
            "page complete"
        );

        match decision {
            TrackerDecision::NextPage { cursor } => {
                self.cursor = cursor;
                DriverState::Fetching
            }
            TrackerDecision::SourceFinished => DriverState::AdvancingSource,
            TrackerDecision::Pending => {
                warn!("page finished with items unaccounted for, closing source");
                DriverState::AdvancingSource
            }
        }
    }

    fn advance_source(&mut self) -> DriverState {
        self.close_source();
        self.source_index += 1;
        if self.source_index >= self.options.sources.len() {
            DriverState::Finished { forced: false }
        } else {
            DriverState::Fetching
        }
    }

    /// Logs the per-source summary and resets counters and cursor.
    fn close_source(&mut self) {
        let label = self
            .current_source()
            .map(ToString::to_string)
            .unwrap_or_default();
        let counters = self.tracker.reset();
        self.cursor = None;
        info!(source = %label, counters = %counters, "source finished");
        self.summary.totals.accumulate(&counters);
        self.cycle_totals.accumulate(&counters);
        self.summary.sources.push(SourceReport {
            source: label,
            counters,
        });
    }

    fn finish(&mut self, forced: bool) -> DriverState {
        self.summary.cycles += 1;
        let elapsed = self.started.elapsed();
        report_throughput(elapsed, &self.cycle_totals, forced);

        let cycles_left = self
            .max_cycles
            .is_none_or(|max| self.summary.cycles < max);
        if self.options.repeat_forever && cycles_left {
            let delay_ms =
                u64::try_from(self.options.time_between_runs.as_millis()).unwrap_or(u64::MAX);
            info!(delay_ms, "run complete, repeating after delay");
            DriverState::Sleeping
        } else {
            DriverState::Done
        }
    }

    fn publish(&self, state: &DriverState) {
        self.progress.send_modify(|snapshot| {
            snapshot.state = state.label();
            snapshot.source = self
                .current_source()
                .map(ToString::to_string)
                .unwrap_or_default();
            snapshot.source_index = self.source_index;
            snapshot.source_count = self.options.sources.len();
            snapshot.target = self.options.target;
            snapshot.counters = *self.tracker.counters();
        });
    }

    fn publish_counts(&self) {
        let counters = *self.tracker.counters();
        self.progress
            .send_modify(|snapshot| snapshot.counters = counters);
    }
}

pub(crate) fn remaining_label(left: u64) -> String {
    if left == u64::MAX {
        "all".to_string()
    } else {
        left.to_string()
    }
}

pub(crate) fn report_throughput(elapsed: Duration, totals: &ProgressCounters, forced: bool) {
    let processed = totals.total();
    let secs = elapsed.as_secs_f64();
    #[allow(clippy::cast_precision_loss)]
    let per_post = if processed == 0 {
        0.0
    } else {
        secs / processed as f64
    };
    info!(
        forced,
        processed,
        elapsed_secs = secs,
        secs_per_post = per_post,
        totals = %totals,
        "all sources finished"
    );
}
