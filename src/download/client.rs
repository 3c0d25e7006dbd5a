//! HTTP client wrapper for streaming content files to disk.
//!
//! Unlike a general-purpose downloader, the archiver always knows the exact
//! target path up front (the naming policy decides it), so the client writes
//! to that path and never derives names from response headers.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use crate::user_agent;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large videos).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// HTTP client for content downloads with streaming support.
///
/// Created once per run and shared by every in-flight download, taking
/// advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if TLS or proxy setup fails.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if TLS or proxy setup fails.
    pub fn new_with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            user_agent::default_download_user_agent(),
            connect_timeout_secs,
            read_timeout_secs,
        )?;
        Ok(Self { client })
    }

    /// Streams `url` into `file_path`, returning the number of bytes written.
    ///
    /// A partially written file is removed when the stream fails.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Writing to disk fails
    #[instrument(skip(self), fields(url = %url, path = %file_path.display()))]
    pub async fn download_to_path(&self, url: &str, file_path: &Path) -> Result<u64, DownloadError> {
        debug!("starting download");
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }
        let mut file = File::create(file_path)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        let stream_result = stream_to_file(&mut file, response, url, file_path).await;
        if stream_result.is_err() {
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(file_path).await;
        }
        let bytes = stream_result?;

        info!(bytes, "download complete");
        Ok(bytes)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

/// Builds a reqwest client with the shared timeout and compression policy.
pub(crate) fn build_http_client(
    user_agent: String,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent)
        .build()
}
