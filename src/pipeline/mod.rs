//! Progress tracking and the pagination driver.
//!
//! [`PaginationDriver`] walks each source page by page and hands items to the
//! [`crate::materialize::Materializer`]. A [`ProgressTracker`] counts the
//! outcomes and decides whether to fetch another page, move to the next
//! source, or finish. [`run_post_list`] is the feed-less variant for an
//! explicit list of post URLs.

mod driver;
mod error;
mod post_list;
mod tracker;

pub use driver::{DriverState, PaginationDriver};
pub use error::PipelineError;
pub use post_list::{parse_post_list, run_post_list};
pub use tracker::{ProgressCounters, ProgressTracker, TrackerDecision};

use std::time::Duration;

use crate::listing::MAX_PAGE_LIMIT;

/// Items requested per listing page.
pub const PAGE_SIZE: usize = MAX_PAGE_LIMIT;

/// Live view of a run, published on every driver transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub state: &'static str,
    pub source: String,
    pub source_index: usize,
    pub source_count: usize,
    /// `None` when unbounded.
    pub target: Option<u64>,
    pub counters: ProgressCounters,
}

/// Final counters for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub counters: ProgressCounters,
}

/// Everything a finished run reports.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// One entry per finished source, in order (repeated per cycle).
    pub sources: Vec<SourceReport>,
    pub totals: ProgressCounters,
    pub elapsed: Duration,
    /// Completed passes over the source list.
    pub cycles: u32,
}
