//! User configuration: JSON-backed policy toggles and run options.
//!
//! The configuration file controls per-kind enable flags, dedup policy,
//! directory layout, and naming. Run options (sources, counts, sort) come from
//! the CLI unless the file carries a `preset` run.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::listing::Source;

/// Default delay between item dispatches.
pub const DEFAULT_POST_DELAY: Duration = Duration::from_millis(250);

/// Default post-list file name.
pub const DEFAULT_POST_LIST_PATH: &str = "download_post_list.txt";

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`ArchiverConfig`].
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration cannot produce a working run.
    #[error("invalid configuration: {reason}")]
    ConfigurationInvalid {
        /// What is wrong.
        reason: String,
    },

    /// A sort or time-window value was not recognized.
    #[error("invalid {field} '{value}': expected one of {expected}")]
    InvalidChoice {
        /// Option name.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SortMode {
    #[default]
    Top,
    New,
    Hot,
    Rising,
    Controversial,
}

impl SortMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::New => "new",
            Self::Hot => "hot",
            Self::Rising => "rising",
            Self::Controversial => "controversial",
        }
    }
}

impl FromStr for SortMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_choice(value).as_str() {
            "top" => Ok(Self::Top),
            "new" => Ok(Self::New),
            "hot" => Ok(Self::Hot),
            "rising" => Ok(Self::Rising),
            "controversial" => Ok(Self::Controversial),
            _ => Err(ConfigError::InvalidChoice {
                field: "sort",
                value: value.to_string(),
                expected: "top, new, hot, rising, controversial",
            }),
        }
    }
}

impl TryFrom<String> for SortMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TimeWindow {
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeWindow {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_choice(value).as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "all" => Ok(Self::All),
            _ => Err(ConfigError::InvalidChoice {
                field: "time",
                value: value.to_string(),
                expected: "hour, day, week, month, year, all",
            }),
        }
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_choice(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Which components make up a generated file name, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct NamingScheme {
    #[serde(alias = "showDate")]
    pub show_date: bool,
    #[serde(alias = "showScore")]
    pub show_score: bool,
    #[serde(alias = "showSubreddit")]
    pub show_subreddit: bool,
    #[serde(alias = "showAuthor")]
    pub show_author: bool,
    #[serde(alias = "showTitle")]
    pub show_title: bool,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self {
            show_date: true,
            show_score: true,
            show_subreddit: true,
            show_author: true,
            show_title: true,
        }
    }
}

impl NamingScheme {
    /// Number of enabled components.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        [
            self.show_date,
            self.show_score,
            self.show_subreddit,
            self.show_author,
            self.show_title,
        ]
        .into_iter()
        .filter(|enabled| *enabled)
        .count()
    }

    /// Number of enabled components that tell posts apart (date, author, title).
    #[must_use]
    pub fn distinguishing_count(&self) -> usize {
        [self.show_date, self.show_author, self.show_title]
            .into_iter()
            .filter(|enabled| *enabled)
            .count()
    }
}

/// A pre-seeded run that bypasses the CLI run options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PresetRun {
    pub sources: Vec<String>,
    pub number_of_posts: u64,
    pub sorting: SortMode,
    pub time: TimeWindow,
    pub repeat_forever: bool,
    pub time_between_runs_ms: u64,
    pub download_directory: Option<PathBuf>,
}

/// Settings for archiving an explicit list of post URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostListOptions {
    pub enabled: bool,
    pub path: PathBuf,
    pub repeat_forever: bool,
    pub time_between_runs_ms: u64,
}

impl Default for PostListOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from(DEFAULT_POST_LIST_PATH),
            repeat_forever: false,
            time_between_runs_ms: 0,
        }
    }
}

/// Policy toggles loaded from the JSON config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ArchiverConfig {
    pub file_naming_scheme: NamingScheme,
    pub download_self_posts: bool,
    pub download_media_posts: bool,
    pub download_link_posts: bool,
    pub download_gallery_posts: bool,
    pub download_streaming_videos_experimental: bool,
    pub download_redgifs_videos: bool,
    pub redownload_posts: bool,
    pub separate_clean_nsfw: bool,
    pub detailed_logs: bool,
    pub preset: Option<PresetRun>,
    pub post_list: PostListOptions,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            file_naming_scheme: NamingScheme::default(),
            download_self_posts: true,
            download_media_posts: true,
            download_link_posts: true,
            download_gallery_posts: true,
            download_streaming_videos_experimental: false,
            download_redgifs_videos: true,
            redownload_posts: false,
            separate_clean_nsfw: false,
            detailed_logs: false,
            preset: None,
            post_list: PostListOptions::default(),
        }
    }
}

impl ArchiverConfig {
    /// Parses a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON or invalid choices.
    pub fn from_json_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigurationInvalid`] when the naming scheme has
    /// no enabled components, since no file could be named.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme = &self.file_naming_scheme;
        if scheme.enabled_count() == 0 {
            return Err(ConfigError::ConfigurationInvalid {
                reason: "file_naming_scheme has no enabled fields; posts cannot be named"
                    .to_string(),
            });
        }
        if scheme.distinguishing_count() < 2 {
            warn!(
                enabled = scheme.enabled_count(),
                "file_naming_scheme is poorly set; enable at least two of show_date, show_author, show_title"
            );
        }
        Ok(())
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/post-archiver/config.json`
/// 2. `$HOME/.config/post-archiver/config.json`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("post-archiver")
                .join("config.json"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("post-archiver")
            .join("config.json"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads configuration from `explicit`, or the default path, or defaults.
///
/// An explicit path must exist; a missing default file yields defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<ArchiverConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match resolve_default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ArchiverConfig::default()),
        },
    };
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    ArchiverConfig::from_json_str(&raw, &path)
}

/// Fully resolved options for one archive run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub sources: Vec<Source>,
    /// Items to process per source; `None` means unbounded.
    pub target: Option<u64>,
    pub sort: SortMode,
    pub window: TimeWindow,
    pub repeat_forever: bool,
    pub time_between_runs: Duration,
    pub output_dir: PathBuf,
    pub post_delay: Duration,
}

impl RunOptions {
    /// Builds options from a preset, treating a zero post count as unbounded.
    #[must_use]
    pub fn from_preset(preset: &PresetRun, fallback_output: PathBuf) -> Self {
        Self {
            sources: preset.sources.iter().map(|s| Source::parse(s)).collect(),
            target: (preset.number_of_posts > 0).then_some(preset.number_of_posts),
            sort: preset.sorting,
            window: preset.time,
            repeat_forever: preset.repeat_forever,
            time_between_runs: Duration::from_millis(preset.time_between_runs_ms),
            output_dir: preset
                .download_directory
                .clone()
                .unwrap_or(fallback_output),
            post_delay: DEFAULT_POST_DELAY,
        }
    }

    /// Human-readable target, `all` when unbounded.
    #[must_use]
    pub fn target_label(&self) -> String {
        self.target
            .map_or_else(|| "all".to_string(), |t| t.to_string())
    }
}
