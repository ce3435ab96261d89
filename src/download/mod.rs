//! Font file downloading: retry executor, single-file client and the
//! concurrent fetch pipeline.
//!
//! # Layers
//!
//! - [`RetryPolicy`] - bounded retry executor surfacing the last failure
//! - [`FontFileClient`] - one URL to one path, validating status and content-type
//! - [`FetchPipeline`] - semaphore-bounded fan-out over every `{variant, format}` pair
//! - [`font_file_path`] - the single source of cache file paths
//!
//! # Example
//!
//! ```no_run
//! use font_cache_core::download::{FetchPipeline, FontFileClient, RetryPolicy};
//! use font_cache_core::font::{VariantCandidate, VariantUrl};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FontFileClient::new().with_retry_policy(RetryPolicy::with_max_attempts(5));
//! let pipeline = FetchPipeline::new(client, "./font-cache", 10)?;
//! let variants = vec![VariantCandidate {
//!     id: "regular".to_string(),
//!     subsets: vec!["latin".to_string()],
//!     urls: vec![VariantUrl::new("https://fonts.example/roboto.woff2", "woff2")],
//! }];
//! let report = pipeline.fetch_files("roboto", "v30", &variants).await;
//! println!("downloaded {} file(s)", report.files().count());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod path;
mod pipeline;
mod retry;

pub use client::FontFileClient;
pub use constants::{
    DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_READ_TIMEOUT_SECS,
};
pub use error::DownloadError;
pub use path::font_file_path;
pub use pipeline::{FailedFile, FetchPipeline, FetchReport, FileOutcome, PipelineError};
pub use retry::{RetryError, RetryPolicy};
