//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use archiver_core::{SortMode, TimeWindow};
use clap::Parser;

/// Archive community and user feeds to a local directory tree.
///
/// Every post is classified (self, media, link, poll, gallery) and saved
/// together with a markdown summary of its discussion thread.
#[derive(Parser, Debug)]
#[command(name = "post-archiver")]
#[command(author, version, about)]
pub struct Args {
    /// Sources to archive: community names (`rust`) or user feeds (`u/name`)
    pub sources: Vec<String>,

    /// Posts to process per source (0 for every available post)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub limit: u64,

    /// Listing order: top, new, hot, rising, controversial
    #[arg(short, long, default_value_t = SortMode::default())]
    pub sort: SortMode,

    /// Time window for top/controversial: hour, day, week, month, year, all
    #[arg(short, long, default_value_t = TimeWindow::default())]
    pub time: TimeWindow,

    /// Start over from the first source after the last one finishes
    #[arg(long)]
    pub repeat: bool,

    /// Delay between repeated runs in milliseconds
    #[arg(long, default_value_t = 60_000)]
    pub interval_ms: u64,

    /// Minimum delay between post dispatches in milliseconds (max 60000)
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_ms: u64,

    /// Base output directory
    #[arg(short, long, default_value = "downloads")]
    pub output: PathBuf,

    /// Config file (defaults to $XDG_CONFIG_HOME/post-archiver/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Archive the post URLs listed in this file instead of feeds
    #[arg(long)]
    pub post_list: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
