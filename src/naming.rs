//! File naming policy, output directory layout, and dedup checks.

use std::path::{Path, PathBuf};

use chrono::DateTime;

use crate::config::NamingScheme;
use crate::listing::{Item, Source};

/// Maximum generated file-name length, in characters.
pub const MAX_FILE_NAME_CHARS: usize = 240;

const FORBIDDEN_CHARS: [char; 10] = ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];
const STRIPPED_CHARS: [char; 5] = ['\t', '\r', '\n', '\u{FE0E}', '\u{FE0F}'];

/// Makes `name` safe to use as a single path component.
///
/// Idempotent: `sanitize_file_name(&sanitize_file_name(x)) == sanitize_file_name(x)`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '-' } else { c })
        .take(MAX_FILE_NAME_CHARS)
        .collect()
}

/// Builds the base file name (no extension) for `item` from the enabled
/// scheme components, in order: date, score, subreddit, author, title.
#[must_use]
pub fn build_file_name(item: &Item, scheme: &NamingScheme) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);
    if scheme.show_date {
        parts.push(format_date(item.created_secs()));
    }
    if scheme.show_score {
        parts.push(format!("score={}", item.score.unwrap_or(0)));
    }
    if scheme.show_subreddit {
        parts.push(item.subreddit().to_string());
    }
    if scheme.show_author {
        parts.push(item.author().to_string());
    }
    if scheme.show_title {
        parts.push(item.title().to_string());
    }
    sanitize_file_name(&parts.join("_"))
}

#[allow(clippy::cast_possible_truncation)]
fn format_date(created: Option<f64>) -> String {
    created
        .and_then(|secs| DateTime::from_timestamp(secs.floor() as i64, 0))
        .map_or_else(|| "unknown-date".to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}

/// True when the target should be written: always under `redownload`,
/// otherwise only if nothing exists at `path` yet.
///
/// The check is advisory; two items racing for one name may both write.
#[must_use]
pub fn should_download(path: &Path, redownload: bool) -> bool {
    redownload || !path.exists()
}

/// Decides the directory each item is written into.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    base: PathBuf,
    separate_clean_nsfw: bool,
}

impl OutputLayout {
    #[must_use]
    pub fn new(base: impl Into<PathBuf>, separate_clean_nsfw: bool) -> Self {
        Self {
            base: base.into(),
            separate_clean_nsfw,
        }
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory for `item` fetched from `source`.
    ///
    /// User feeds go to `<base>/user_<name>`; everything else to
    /// `<base>/[nsfw|clean/]<subreddit>`.
    #[must_use]
    pub fn directory_for(&self, item: &Item, source: Option<&Source>) -> PathBuf {
        if let Some(Source::User(name)) = source {
            return self.base.join(format!("user_{}", sanitize_file_name(name)));
        }

        let subreddit = sanitize_file_name(item.subreddit());
        let subreddit = if subreddit.is_empty() {
            "unknown".to_string()
        } else {
            subreddit
        };
        if self.separate_clean_nsfw {
            let bucket = if item.is_nsfw() { "nsfw" } else { "clean" };
            self.base.join(bucket).join(subreddit)
        } else {
            self.base.join(subreddit)
        }
    }
}
