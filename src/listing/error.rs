//! Error types for listing and discussion requests.

use thiserror::Error;

/// Errors that can occur while talking to the listing API.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The source is private, banned, nonexistent, or returned no items.
    #[error("source '{source_name}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Display name of the source.
        source_name: String,
        /// Why the source was rejected.
        reason: String,
    },

    /// Network-level failure reaching the listing API.
    #[error("network error requesting {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected listing shape.
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// Decoder message.
        reason: String,
    },

    /// The discussion thread for an item could not be fetched.
    #[error("failed to fetch discussion thread {url}: {reason}")]
    ThreadFetchFailed {
        /// Discussion URL.
        url: String,
        /// Why the fetch failed.
        reason: String,
    },
}

impl ListingError {
    /// Creates a `SourceUnavailable` error.
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Transport` error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a `Decode` error.
    pub fn decode(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `ThreadFetchFailed` error.
    pub fn thread_fetch_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::ThreadFetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_display() {
        let error = ListingError::source_unavailable("r/private", "HTTP 403");
        let msg = error.to_string();
        assert!(msg.contains("r/private"), "Expected source in: {msg}");
        assert!(msg.contains("403"), "Expected reason in: {msg}");
    }

    #[test]
    fn test_thread_fetch_failed_display() {
        let error = ListingError::thread_fetch_failed("https://example.com/c.json", "HTTP 500");
        assert!(error.to_string().contains("discussion thread"));
    }
}
