//! Errors raised inside a single item's materialization.
//!
//! These never leave the item boundary: [`super::Materializer::materialize`]
//! converts them into [`super::ItemOutcome::Failed`].

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;

#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Content download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Writing a summary or redirect document failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The item carries nothing that could be downloaded.
    #[error("item '{item}' has no downloadable URL")]
    MissingUrl { item: String },
}

impl MaterializeError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn missing_url(item: impl Into<String>) -> Self {
        Self::MissingUrl { item: item.into() }
    }
}
