//! Concurrent fetch pipeline for all files of a font.
//!
//! [`FetchPipeline::fetch_files`] fans out over every `{variant, format}` pair
//! of the supplied [`VariantCandidate`]s, downloading each into the cache
//! directory through a [`FontFileClient`].
//!
//! # Concurrency Model
//!
//! - Each file downloads in its own Tokio task
//! - A semaphore caps the number of simultaneous downloads
//! - Outcomes are pushed into a mutex-guarded collection shared by the tasks
//! - A failed file is logged and recorded, never cancelling its siblings

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, instrument, warn};

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::path::font_file_path;
use super::{DownloadError, FontFileClient};
use crate::font::{ResolvedFile, VariantCandidate};

/// Error type for pipeline construction.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency { value: usize },
}

/// A `{variant, format}` file whose download failed.
#[derive(Debug)]
pub struct FailedFile {
    pub variant: String,
    pub format: String,
    pub url: String,
    pub error: DownloadError,
}

/// Outcome of one `{variant, format}` download.
#[derive(Debug)]
pub enum FileOutcome {
    Downloaded(ResolvedFile),
    Failed(FailedFile),
}

impl FileOutcome {
    fn sort_key(&self) -> (&str, &str) {
        match self {
            Self::Downloaded(file) => (&file.variant, &file.format),
            Self::Failed(failed) => (&failed.variant, &failed.format),
        }
    }
}

/// Per-file outcomes of one [`FetchPipeline::fetch_files`] run, ordered by
/// variant then format.
#[derive(Debug, Default)]
pub struct FetchReport {
    outcomes: Vec<FileOutcome>,
}

impl FetchReport {
    #[must_use]
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Successfully downloaded files.
    pub fn files(&self) -> impl Iterator<Item = &ResolvedFile> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Downloaded(file) => Some(file),
            FileOutcome::Failed(_) => None,
        })
    }

    /// Files whose download failed after all retries.
    pub fn failures(&self) -> impl Iterator<Item = &FailedFile> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Failed(failed) => Some(failed),
            FileOutcome::Downloaded(_) => None,
        })
    }

    /// True when at least one file was attempted and none succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.files().next().is_none()
    }

    /// Splits the report into downloaded files and failures.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ResolvedFile>, Vec<FailedFile>) {
        let mut files = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome {
                FileOutcome::Downloaded(file) => files.push(file),
                FileOutcome::Failed(failed) => failures.push(failed),
            }
        }
        (files, failures)
    }

    /// Consumes the report, keeping only downloaded files.
    #[must_use]
    pub fn into_files(self) -> Vec<ResolvedFile> {
        self.into_parts().0
    }
}

/// Downloads every file of a font concurrently into the cache directory.
#[derive(Debug, Clone)]
pub struct FetchPipeline {
    client: FontFileClient,
    cache_dir: PathBuf,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl FetchPipeline {
    /// Creates a pipeline writing into `cache_dir` with at most `concurrency`
    /// simultaneous downloads.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConcurrency`] outside 1..=100.
    pub fn new(
        client: FontFileClient,
        cache_dir: impl AsRef<Path>,
        concurrency: usize,
    ) -> Result<Self, PipelineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(PipelineError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            cache_dir = %cache_dir.as_ref().display(),
            max_attempts = client.retry_policy().max_attempts(),
            "creating fetch pipeline"
        );

        Ok(Self {
            client,
            cache_dir: cache_dir.as_ref().to_path_buf(),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Downloads every `{variant, format}` pair of `variants`.
    ///
    /// Individual failures never abort the run; they appear as
    /// [`FileOutcome::Failed`] in the report.
    #[instrument(skip(self, variants), fields(variant_count = variants.len()))]
    pub async fn fetch_files(
        &self,
        font_id: &str,
        font_version: &str,
        variants: &[VariantCandidate],
    ) -> FetchReport {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();

        for variant in variants {
            for variant_url in &variant.urls {
                let dest = font_file_path(
                    &self.cache_dir,
                    font_id,
                    font_version,
                    &variant.subsets,
                    &variant.id,
                    &variant_url.format,
                );

                let client = self.client.clone();
                let semaphore = Arc::clone(&self.semaphore);
                let outcomes = Arc::clone(&outcomes);
                let font_id = font_id.to_string();
                let variant_id = variant.id.clone();
                let subsets = variant.subsets.join("_");
                let url = variant_url.url.clone();
                let format = variant_url.format.clone();

                let handle = tokio::spawn(async move {
                    // Permit is dropped when this block exits (RAII)
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        let error = DownloadError::task_failed(&url, "semaphore closed");
                        outcomes.lock().await.push(FileOutcome::Failed(FailedFile {
                            variant: variant_id,
                            format,
                            url,
                            error,
                        }));
                        return;
                    };

                    let outcome = match client.download(&url, &dest, &format).await {
                        Ok(path) => FileOutcome::Downloaded(ResolvedFile {
                            variant: variant_id,
                            format,
                            path,
                        }),
                        Err(error) => {
                            warn!(
                                font_id = %font_id,
                                subsets = %subsets,
                                url = %url,
                                format = %format,
                                path = %dest.display(),
                                error = %error,
                                "discarding font file"
                            );
                            FileOutcome::Failed(FailedFile {
                                variant: variant_id,
                                format,
                                url,
                                error,
                            })
                        }
                    };
                    outcomes.lock().await.push(outcome);
                });

                handles.push((variant.id.clone(), variant_url.clone(), handle));
            }
        }

        debug!(task_count = handles.len(), "waiting for downloads to complete");

        for (variant_id, variant_url, handle) in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, url = %variant_url.url, "download task panicked");
                outcomes.lock().await.push(FileOutcome::Failed(FailedFile {
                    variant: variant_id,
                    format: variant_url.format,
                    error: DownloadError::task_failed(&variant_url.url, e.to_string()),
                    url: variant_url.url,
                }));
            }
        }

        let mut outcomes = std::mem::take(&mut *outcomes.lock().await);
        outcomes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let report = FetchReport { outcomes };

        info!(
            downloaded = report.files().count(),
            failed = report.failures().count(),
            "font fetch complete"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn resolved(variant: &str, format: &str) -> FileOutcome {
        FileOutcome::Downloaded(ResolvedFile {
            variant: variant.to_string(),
            format: format.to_string(),
            path: PathBuf::from(format!("{variant}.{format}")),
        })
    }

    fn failed(variant: &str, format: &str) -> FileOutcome {
        FileOutcome::Failed(FailedFile {
            variant: variant.to_string(),
            format: format.to_string(),
            url: format!("https://fonts.example/{variant}.{format}"),
            error: DownloadError::http_status("https://fonts.example", 500),
        })
    }

    #[test]
    fn test_new_rejects_zero_concurrency() {
        let result = FetchPipeline::new(FontFileClient::new(), "cache", 0);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_new_rejects_excessive_concurrency() {
        let result = FetchPipeline::new(FontFileClient::new(), "cache", 101);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("between 1 and 100"));
    }

    #[test]
    fn test_new_accepts_bounds() {
        assert_eq!(
            FetchPipeline::new(FontFileClient::new(), "cache", 1)
                .unwrap()
                .concurrency(),
            1
        );
        assert_eq!(
            FetchPipeline::new(FontFileClient::new(), "cache", 100)
                .unwrap()
                .concurrency(),
            100
        );
    }

    #[test]
    fn test_report_splits_files_and_failures() {
        let report = FetchReport {
            outcomes: vec![resolved("regular", "woff2"), failed("regular", "ttf")],
        };
        assert_eq!(report.files().count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.all_failed());

        let (files, failures) = report.into_parts();
        assert_eq!(files[0].format, "woff2");
        assert_eq!(failures[0].format, "ttf");
    }

    #[test]
    fn test_report_all_failed_distinguishes_empty() {
        assert!(!FetchReport::default().all_failed());
        let report = FetchReport {
            outcomes: vec![failed("regular", "ttf")],
        };
        assert!(report.all_failed());
        assert!(report.into_files().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_files_without_variants_is_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let pipeline = FetchPipeline::new(FontFileClient::new(), temp_dir.path(), 2).unwrap();
        let report = pipeline.fetch_files("roboto", "v30", &[]).await;
        assert!(report.outcomes().is_empty());
    }
}
