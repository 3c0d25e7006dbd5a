//! Streaming-video fetch-and-mux seam.
//!
//! Streaming sites serve audio and video as separate streams. Fetching and
//! merging them is delegated to an external tool behind [`VideoMuxer`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::error::MuxError;

/// Binary used by [`CliVideoMuxer::from_path`].
pub const DEFAULT_MUX_TOOL: &str = "yt-dlp";

/// Fetches separate audio/video streams for a page URL and merges them into one file.
#[async_trait]
pub trait VideoMuxer: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Downloads `page_url` and writes the merged mp4 to `output`.
    async fn fetch_and_mux(&self, page_url: &str, output: &Path) -> Result<(), MuxError>;
}

/// [`VideoMuxer`] backed by an external `yt-dlp` binary (which calls ffmpeg to merge).
#[derive(Debug, Clone)]
pub struct CliVideoMuxer {
    binary_path: PathBuf,
}

impl CliVideoMuxer {
    /// Creates a muxer with an explicit binary path.
    #[must_use]
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Looks up the default tool on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::ToolMissing`] when the binary cannot be found.
    pub fn from_path() -> Result<Self, MuxError> {
        which::which(DEFAULT_MUX_TOOL)
            .map(Self::new)
            .map_err(|_| MuxError::ToolMissing {
                tool: DEFAULT_MUX_TOOL.to_string(),
            })
    }
}

#[async_trait]
impl VideoMuxer for CliVideoMuxer {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    #[instrument(skip(self), fields(tool = %self.binary_path.display()))]
    async fn fetch_and_mux(&self, page_url: &str, output: &Path) -> Result<(), MuxError> {
        let result = Command::new(&self.binary_path)
            .arg("--quiet")
            .arg("--no-playlist")
            .args(["-f", "bestvideo+bestaudio/best"])
            .args(["--merge-output-format", "mp4"])
            .arg("-o")
            .arg(output)
            .arg(page_url)
            .output()
            .await
            .map_err(|source| MuxError::Io {
                path: output.to_path_buf(),
                source,
            })?;

        if !result.status.success() {
            return Err(MuxError::ToolFailed {
                status: result.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        debug!(output = %output.display(), "streaming video merged");
        Ok(())
    }
}
