//! Content download client for media files.
//!
//! This module provides functionality for streaming media from HTTP/HTTPS
//! URLs to a caller-chosen path, plus the seam for muxing separate
//! audio/video streams from streaming sites.
//!
//! # Example
//!
//! ```no_run
//! use archiver_core::download::HttpClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let bytes = client
//!     .download_to_path("https://i.redd.it/abc.jpg", Path::new("./downloads/pics/post.jpg"))
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod mux;

pub(crate) use client::build_http_client;
pub use client::{CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};
pub use error::{DownloadError, MuxError};
pub use mux::{CliVideoMuxer, DEFAULT_MUX_TOOL, VideoMuxer};
