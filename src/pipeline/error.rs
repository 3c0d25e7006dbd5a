//! Fatal pipeline errors.
//!
//! Per-item failures never surface here; they are counted as `failed`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The output directory could not be prepared.
    #[error("failed to set up output directory '{path}': {source}")]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run was started without any sources.
    #[error("no sources to archive")]
    NoSources,

    /// The post-list file could not be read.
    #[error("failed to read post list '{path}': {source}")]
    PostListRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The post-list file has no usable post URLs.
    #[error("post list '{path}' has no post URLs")]
    EmptyPostList { path: PathBuf },
}

impl PipelineError {
    pub fn setup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Setup {
            path: path.into(),
            source,
        }
    }
}
