//! Post Archiver Core Library
//!
//! This library provides the core functionality for the post archiver, which
//! walks paginated community and user feeds, classifies every post by content
//! kind, and persists each one (plus a markdown summary with its discussion
//! thread) to a local directory tree.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`classify`] - Content-kind classification of listing items
//! - [`provider`] - Secondary media provider (`RedGIFs`) detection and lookup
//! - [`listing`] - Listing/discussion models and the listing HTTP client
//! - [`naming`] - File naming policy, output layout, and dedup checks
//! - [`summary`] - Markdown summary and redirect document generation
//! - [`download`] - Streaming content downloads and the video muxer seam
//! - [`materialize`] - Per-item persistence, one handler per content kind
//! - [`pipeline`] - Progress tracking and the pagination driver
//! - [`config`] - User configuration loading and validation

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod download;
pub mod listing;
pub mod materialize;
pub mod naming;
pub mod pipeline;
pub mod provider;
pub mod summary;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use classify::{ContentKind, classify};
pub use config::{
    ArchiverConfig, ConfigError, NamingScheme, PostListOptions, PresetRun, RunOptions, SortMode,
    TimeWindow, load_config, resolve_default_config_path,
};
pub use download::{CliVideoMuxer, DownloadError, HttpClient, MuxError, VideoMuxer};
pub use listing::{
    DiscussionNode, Item, ListingClient, ListingError, ListingPage, PageQuery, Source,
};
pub use materialize::{ItemOutcome, Materializer, SavedAs, SkipReason};
pub use naming::{OutputLayout, build_file_name, sanitize_file_name, should_download};
pub use pipeline::{
    DriverState, PAGE_SIZE, PaginationDriver, PipelineError, ProgressCounters, ProgressSnapshot,
    ProgressTracker, RunSummary, SourceReport, TrackerDecision, parse_post_list, run_post_list,
};
pub use provider::{CredentialCache, ProviderError, RedgifsClient, extract_id, is_redgifs_item};
pub use summary::{SummaryDetails, build_summary, redirect_document, render_thread};
