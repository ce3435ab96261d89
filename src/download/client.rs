//! HTTP client for downloading single font files.
//!
//! [`FontFileClient`] fetches one URL to one path, validating that the
//! response is a 200 whose `content-type` names the expected format, and
//! retries each failed attempt according to its [`RetryPolicy`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::retry::RetryPolicy;
use crate::user_agent;

/// HTTP client for font file downloads.
///
/// Create once and clone freely; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use font_cache_core::download::FontFileClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FontFileClient::new();
/// client
///     .download("https://fonts.example/roboto.woff2", Path::new("./roboto.woff2"), "woff2")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FontFileClient {
    client: Client,
    retry_policy: RetryPolicy,
}

impl Default for FontFileClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FontFileClient {
    /// Creates a client with default timeouts and the default retry policy.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeouts and the default retry policy.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeouts.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = build_client(connect_timeout_secs, read_timeout_secs)
            .expect("failed to build HTTP client with static configuration");
        Self::from_client(client, RetryPolicy::default())
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub fn from_client(client: Client, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Downloads `url` to `dest`, overwriting any existing file.
    ///
    /// `format` must appear in the response `content-type`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::RetriesExhausted`] wrapping the last failure
    /// once every attempt has failed. An attempt fails when:
    /// - the URL is invalid or the request fails (network error, timeout)
    /// - the status is not 200
    /// - `content-type` is missing, empty or lacks `format`
    /// - streaming the body to disk fails
    #[instrument(skip(self), fields(url = %url, dest = %dest.display()))]
    pub async fn download(&self, url: &str, dest: &Path, format: &str) -> Result<PathBuf, DownloadError> {
        self.retry_policy
            .run(|attempt| async move {
                debug!(attempt, "attempting download");
                self.download_once(url, dest, format).await
            })
            .await
            .map_err(|error| DownloadError::retries_exhausted(url, error.attempts, error.last))
    }

    /// One download attempt without retries.
    async fn download_once(&self, url: &str, dest: &Path, format: &str) -> Result<PathBuf, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DownloadError::http_status(url, status));
        }

        validate_content_type(&response, url, format)?;

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;

        let stream_result = stream_to_file(&mut file, response, url, dest).await;
        if stream_result.is_err() {
            debug!(path = %dest.display(), "cleaning up partial file after error");
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
        }
        let bytes = stream_result?;

        info!(path = %dest.display(), bytes, format, "font file downloaded");
        Ok(dest.to_path_buf())
    }
}

/// Checks that `content-type` is present, non-empty and contains `format`.
fn validate_content_type(
    response: &reqwest::Response,
    url: &str,
    format: &str,
) -> Result<(), DownloadError> {
    let Some(header) = response.headers().get(CONTENT_TYPE) else {
        return Err(DownloadError::missing_content_type(url, format));
    };

    let content_type = String::from_utf8_lossy(header.as_bytes());
    if content_type.trim().is_empty() {
        return Err(DownloadError::missing_content_type(url, format));
    }
    if !content_type.contains(format) {
        return Err(DownloadError::content_type_mismatch(
            url,
            format,
            content_type.into_owned(),
        ));
    }
    Ok(())
}

/// Streams the response body to `file`, returning bytes written.
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

fn build_client(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_uses_five_attempts() {
        let client = FontFileClient::new();
        assert_eq!(client.retry_policy().max_attempts(), 5);
    }

    #[test]
    fn test_with_retry_policy_replaces_budget() {
        let client = FontFileClient::new().with_retry_policy(RetryPolicy::with_max_attempts(2));
        assert_eq!(client.retry_policy().max_attempts(), 2);
    }

    #[tokio::test]
    async fn test_invalid_url_is_retried_then_reported() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let client = FontFileClient::new().with_retry_policy(RetryPolicy::with_max_attempts(3));
        let dest = temp_dir.path().join("font.woff2");

        let error = client.download("not a url", &dest, "woff2").await.unwrap_err();

        assert_eq!(error.attempts(), Some(3));
        assert!(matches!(error.last_failure(), DownloadError::InvalidUrl { .. }));
        assert!(!dest.exists());
    }
}
