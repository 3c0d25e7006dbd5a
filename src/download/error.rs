//! Error types for the download module.
//!
//! This module defines structured errors for content downloads and for the
//! external streaming-video muxer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during content downloads.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns true when the host could not be resolved at all.
    #[must_use]
    pub fn is_host_not_found(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_connect())
    }
}

/// Errors from the external streaming-video fetch-and-mux tool.
#[derive(Debug, Error)]
pub enum MuxError {
    /// The muxer binary is not installed or not on `PATH`.
    #[error("streaming-video tool '{tool}' not found on PATH")]
    ToolMissing {
        /// Binary name that was searched for.
        tool: String,
    },

    /// The tool ran but exited unsuccessfully.
    #[error("streaming-video tool exited with status {status}: {stderr}")]
    ToolFailed {
        /// Process exit code, or -1 when killed by a signal.
        status: i32,
        /// Trimmed stderr output.
        stderr: String,
    },

    /// Spawning the tool or inspecting its output failed.
    #[error("IO error running streaming-video tool for {path}: {source}")]
    Io {
        /// Intended output path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
