//! Markdown summary and redirect document generation.
//!
//! Every processed item gets a `.md` summary next to its content: a title
//! heading, a metadata block, a kind-specific section, and the discussion
//! thread when one was fetched.

mod thread;

pub use thread::render_thread;

use std::fmt::Write as _;

use chrono::DateTime;

use crate::classify::ContentKind;
use crate::listing::{DiscussionNode, Item, REDDIT_ORIGIN};

/// Kind-specific details gathered while materializing an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryDetails {
    /// Saved content files (media), relative to the summary.
    pub files: Vec<String>,
    /// Where media was fetched from.
    pub source_url: Option<String>,
    /// File the link was saved as (redirect document or muxed video).
    pub link_target: Option<String>,
    /// Saved-or-planned gallery entry paths.
    pub gallery_items: Vec<String>,
    /// Free-form note (skips, fallbacks).
    pub note: Option<String>,
}

impl SummaryDetails {
    #[must_use]
    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }
}

/// Builds the markdown summary for `item`.
///
/// `thread` is `None` when the discussion fetch failed; the comments section
/// is then omitted.
#[must_use]
pub fn build_summary(
    item: &Item,
    kind: ContentKind,
    details: &SummaryDetails,
    thread: Option<&[DiscussionNode]>,
) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# {}", item.title());
    md.push_str(&metadata_block(item, kind));
    md.push_str("\n---\n");
    push_kind_section(&mut md, item, kind, details);

    if let Some(nodes) = thread {
        md.push_str("\n---\n\n## Comments\n\n");
        md.push_str(&render_thread(nodes, 0));
    }
    md
}

/// Minimal HTML page that navigates to `url` on open.
#[must_use]
pub fn redirect_document(url: &str) -> String {
    let escaped = url.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "<html><body><script type='text/javascript'>window.location.href = \"{escaped}\";</script></body></html>"
    )
}

/// Permanent link for `item`, falling back to its URL.
#[must_use]
pub fn permalink_url(item: &Item) -> Option<String> {
    match item.permalink.as_deref() {
        Some(permalink) if !permalink.is_empty() => Some(format!("{REDDIT_ORIGIN}{permalink}")),
        _ => item.url.clone().filter(|url| !url.is_empty()),
    }
}

fn metadata_block(item: &Item, kind: ContentKind) -> String {
    let mut lines = vec![
        format!("- Author: u/{}", item.author()),
        format!("- Subreddit: r/{}", item.subreddit()),
        format!("- Score: {}", item.score.unwrap_or(0)),
        format!("- Created: {}", format_created(item.created_secs())),
        format!("- Type: {}", kind.label()),
    ];
    if let Some(permalink) = permalink_url(item) {
        lines.push(format!("- Permalink: {permalink}"));
    }
    lines.join("\n")
}

#[allow(clippy::cast_possible_truncation)]
fn format_created(created: Option<f64>) -> String {
    created
        .and_then(|secs| {
            let millis = (secs * 1000.0).round() as i64;
            DateTime::from_timestamp_millis(millis)
        })
        .map_or_else(
            || "N/A".to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        )
}

fn push_kind_section(md: &mut String, item: &Item, kind: ContentKind, details: &SummaryDetails) {
    match kind {
        ContentKind::SelfPost => {
            let _ = writeln!(md, "## Post\n\n{}", item.selftext.as_deref().unwrap_or(""));
        }
        ContentKind::Media => {
            md.push_str("## Media\n");
            if !details.files.is_empty() {
                let plural = if details.files.len() > 1 { "s" } else { "" };
                let _ = write!(md, "\nSaved file{plural}:");
                for file in &details.files {
                    let _ = write!(md, "\n- {file}");
                }
                md.push('\n');
            }
            if let Some(source) = &details.source_url {
                let _ = writeln!(md, "\nSource URL: {source}");
            }
        }
        ContentKind::Link => {
            md.push_str("## Link\n");
            let _ = writeln!(md, "\nTarget: {}", item.url.as_deref().unwrap_or(""));
            if let Some(target) = &details.link_target {
                let _ = writeln!(md, "\nSaved as: {target}");
            }
        }
        ContentKind::Gallery => {
            md.push_str("## Gallery\n");
            if !details.gallery_items.is_empty() {
                md.push_str("\nItems:");
                for entry in &details.gallery_items {
                    let _ = write!(md, "\n- {entry}");
                }
                md.push('\n');
            }
        }
        ContentKind::Poll => {
            md.push_str("## Poll\n");
            match &item.poll_data {
                Some(poll) if !poll.options.is_empty() => {
                    for option in &poll.options {
                        let _ = write!(md, "\n- {}", option.text);
                        if let Some(votes) = option.vote_count {
                            let _ = write!(md, " ({votes} votes)");
                        }
                    }
                    md.push('\n');
                    if let Some(total) = poll.total_vote_count {
                        let _ = writeln!(md, "\nTotal votes: {total}");
                    }
                }
                _ => md.push_str("\nPoll details unavailable.\n"),
            }
        }
    }
    if kind != ContentKind::SelfPost
        && let Some(note) = &details.note
    {
        let _ = writeln!(md, "\n{note}");
    }
}
