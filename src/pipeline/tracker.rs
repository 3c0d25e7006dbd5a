//! Per-source progress counters and the completion decision.

use std::fmt;

use crate::materialize::{ItemOutcome, SavedAs, SkipReason};

/// Six named counters scoped to the current source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounters {
    pub self_posts: u64,
    pub media: u64,
    pub link: u64,
    pub failed: u64,
    pub skipped_duplicate: u64,
    pub skipped_filtered: u64,
}

impl ProgressCounters {
    /// Sum of all six counters.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.self_posts
            + self.media
            + self.link
            + self.failed
            + self.skipped_duplicate
            + self.skipped_filtered
    }

    /// Increments the counter matching `outcome`.
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Saved { counter, .. } => match counter {
                SavedAs::SelfPost => self.self_posts += 1,
                SavedAs::Media => self.media += 1,
                SavedAs::Link => self.link += 1,
            },
            ItemOutcome::Skipped { reason, .. } => match reason {
                SkipReason::Duplicate => self.skipped_duplicate += 1,
                SkipReason::Filtered => self.skipped_filtered += 1,
            },
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Adds `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        self.self_posts += other.self_posts;
        self.media += other.media;
        self.link += other.link;
        self.failed += other.failed;
        self.skipped_duplicate += other.skipped_duplicate;
        self.skipped_filtered += other.skipped_filtered;
    }
}

impl fmt::Display for ProgressCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ self: {}, media: {}, link: {}, failed: {}, skipped_due_to_duplicate: {}, skipped_due_to_fileType: {} }}",
            self.self_posts,
            self.media,
            self.link,
            self.failed,
            self.skipped_duplicate,
            self.skipped_filtered
        )
    }
}

/// What the driver should do after an item completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerDecision {
    /// Other items on the current page are still in flight.
    Pending,
    /// The page is done and the source has more; continue at `cursor`.
    NextPage { cursor: Option<String> },
    /// The source is exhausted, reached its target, or was forced to stop.
    SourceFinished,
}

#[derive(Debug, Clone, Default)]
struct PageProgress {
    expected: usize,
    completed: usize,
    is_last: bool,
    next_cursor: Option<String>,
}

/// Tracks counters for the current source and decides when it is done.
///
/// "Last page" means the provider returned fewer items than requested; the
/// page-size batching never ends a source on its own.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    target: Option<u64>,
    counters: ProgressCounters,
    page: PageProgress,
}

impl ProgressTracker {
    /// `target` of `None` means no limit.
    #[must_use]
    pub fn new(target: Option<u64>) -> Self {
        Self {
            target,
            counters: ProgressCounters::default(),
            page: PageProgress::default(),
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<u64> {
        self.target
    }

    #[must_use]
    pub fn counters(&self) -> &ProgressCounters {
        &self.counters
    }

    /// `(posts_left, total_processed)` for the current source.
    ///
    /// `posts_left` is `u64::MAX` when the target is unbounded.
    #[must_use]
    pub fn remaining(&self) -> (u64, u64) {
        let total = self.counters.total();
        let left = self
            .target
            .map_or(u64::MAX, |target| target.saturating_sub(total));
        (left, total)
    }

    /// Registers a freshly fetched page of `item_count` items.
    pub fn begin_page(&mut self, item_count: usize, is_last: bool, next_cursor: Option<String>) {
        self.page = PageProgress {
            expected: item_count,
            completed: 0,
            is_last,
            next_cursor,
        };
    }

    /// Records one terminal outcome and decides the next step.
    pub fn record(&mut self, outcome: &ItemOutcome) -> TrackerDecision {
        self.counters.record(outcome);
        self.page.completed += 1;
        self.decide(false)
    }

    /// Decision for the current state; `forced` ends the source immediately.
    #[must_use]
    pub fn decide(&self, forced: bool) -> TrackerDecision {
        if forced || self.target_reached() {
            return TrackerDecision::SourceFinished;
        }
        if self.page.completed < self.page.expected {
            return TrackerDecision::Pending;
        }
        if self.page.is_last {
            TrackerDecision::SourceFinished
        } else {
            TrackerDecision::NextPage {
                cursor: self.page.next_cursor.clone(),
            }
        }
    }

    fn target_reached(&self) -> bool {
        self.target
            .is_some_and(|target| self.counters.total() >= target)
    }

    /// Clears counters and page state for the next source.
    pub fn reset(&mut self) -> ProgressCounters {
        self.page = PageProgress::default();
        std::mem::take(&mut self.counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn saved(counter: SavedAs) -> ItemOutcome {
        ItemOutcome::Saved {
            counter,
            files: vec![PathBuf::from("x")],
            note: None,
        }
    }

    #[test]
    fn test_counters_sum_after_n_outcomes() {
        let mut tracker = ProgressTracker::new(Some(10));
        tracker.begin_page(10, false, Some("t3_j".into()));
        let outcomes = [
            saved(SavedAs::SelfPost),
            saved(SavedAs::Media),
            saved(SavedAs::Link),
            ItemOutcome::Failed {
                error: "boom".into(),
            },
            ItemOutcome::Skipped {
                reason: SkipReason::Filtered,
                note: None,
            },
        ];
        for outcome in &outcomes {
            assert_eq!(tracker.record(outcome), TrackerDecision::Pending);
        }
        assert_eq!(tracker.counters().total(), 5);
        assert_eq!(tracker.remaining(), (5, 5));
    }

    #[test]
    fn test_target_reached_finishes_source() {
        let mut tracker = ProgressTracker::new(Some(3));
        tracker.begin_page(3, false, Some("t3_c".into()));
        tracker.record(&saved(SavedAs::SelfPost));
        tracker.record(&saved(SavedAs::SelfPost));
        assert_eq!(
            tracker.record(&saved(SavedAs::SelfPost)),
            TrackerDecision::SourceFinished
        );
        assert_eq!(tracker.remaining(), (0, 3));
    }

    #[test]
    fn test_full_page_requests_next_page() {
        let mut tracker = ProgressTracker::new(None);
        tracker.begin_page(2, false, Some("t3_b".into()));
        assert_eq!(tracker.record(&saved(SavedAs::Media)), TrackerDecision::Pending);
        assert_eq!(
            tracker.record(&saved(SavedAs::Media)),
            TrackerDecision::NextPage {
                cursor: Some("t3_b".into())
            }
        );
    }

    #[test]
    fn test_short_page_finishes_even_below_target() {
        let mut tracker = ProgressTracker::new(Some(50));
        tracker.begin_page(2, true, Some("t3_b".into()));
        tracker.record(&saved(SavedAs::Link));
        assert_eq!(
            tracker.record(&saved(SavedAs::Link)),
            TrackerDecision::SourceFinished
        );
        assert_eq!(tracker.remaining(), (48, 2));
    }

    #[test]
    fn test_forced_decision_finishes() {
        let tracker = ProgressTracker::new(Some(10));
        assert_eq!(tracker.decide(true), TrackerDecision::SourceFinished);
    }

    #[test]
    fn test_unbounded_remaining_and_reset() {
        let mut tracker = ProgressTracker::new(None);
        tracker.begin_page(1, false, None);
        tracker.record(&saved(SavedAs::SelfPost));
        assert_eq!(tracker.remaining(), (u64::MAX, 1));

        let finished = tracker.reset();
        assert_eq!(finished.self_posts, 1);
        assert_eq!(tracker.counters().total(), 0);
    }

    #[test]
    fn test_counters_display_uses_report_names() {
        let counters = ProgressCounters {
            self_posts: 3,
            ..ProgressCounters::default()
        };
        let text = counters.to_string();
        assert!(text.contains("self: 3"));
        assert!(text.contains("skipped_due_to_fileType: 0"));
    }
}
