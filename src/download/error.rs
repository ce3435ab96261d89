//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading a font file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout { url: String },

    /// Response status was not 200.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    /// Response carried no usable `content-type` header.
    #[error("missing content-type downloading {url} (expected {expected})")]
    MissingContentType { url: String, expected: String },

    /// `content-type` did not contain the expected format.
    #[error("content-type {actual:?} downloading {url} does not contain {expected:?}")]
    ContentTypeMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    /// File system error while writing the font file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The download task ended without producing a result.
    #[error("download task for {url} did not complete: {message}")]
    TaskFailed { url: String, message: String },

    /// Every attempt failed; carries the last failure.
    #[error("giving up on {url} after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<DownloadError>,
    },
}

impl DownloadError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn missing_content_type(url: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MissingContentType {
            url: url.into(),
            expected: expected.into(),
        }
    }

    pub fn content_type_mismatch(
        url: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ContentTypeMismatch {
            url: url.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn task_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TaskFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn retries_exhausted(url: impl Into<String>, attempts: u32, last: DownloadError) -> Self {
        Self::RetriesExhausted {
            url: url.into(),
            attempts,
            last: Box::new(last),
        }
    }

    /// Returns the innermost failure, unwrapping [`DownloadError::RetriesExhausted`].
    #[must_use]
    pub fn last_failure(&self) -> &DownloadError {
        match self {
            Self::RetriesExhausted { last, .. } => last.last_failure(),
            other => other,
        }
    }

    /// Number of attempts made, when known.
    #[must_use]
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::RetriesExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let error = DownloadError::http_status("https://fonts.example/a.woff2", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("https://fonts.example/a.woff2"));
    }

    #[test]
    fn test_content_type_mismatch_display() {
        let error = DownloadError::content_type_mismatch(
            "https://fonts.example/a.woff2",
            "woff2",
            "application/octet-stream",
        );
        let msg = error.to_string();
        assert!(msg.contains("application/octet-stream"), "got: {msg}");
        assert!(msg.contains("woff2"), "got: {msg}");
    }

    #[test]
    fn test_io_display_contains_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = DownloadError::io(PathBuf::from("/tmp/font.ttf"), io_error);
        assert!(error.to_string().contains("/tmp/font.ttf"));
    }

    #[test]
    fn test_retries_exhausted_unwraps_last_failure() {
        let error = DownloadError::retries_exhausted(
            "https://fonts.example/a.ttf",
            5,
            DownloadError::http_status("https://fonts.example/a.ttf", 500),
        );
        assert_eq!(error.attempts(), Some(5));
        assert!(matches!(
            error.last_failure(),
            DownloadError::HttpStatus { status: 500, .. }
        ));
        assert!(error.to_string().contains("5 attempt(s)"));
    }

    #[test]
    fn test_attempts_none_for_single_failure() {
        let error = DownloadError::timeout("https://fonts.example/a.ttf");
        assert_eq!(error.attempts(), None);
        assert!(matches!(error.last_failure(), DownloadError::Timeout { .. }));
    }
}
