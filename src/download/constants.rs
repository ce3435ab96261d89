//! Constants for the download module (timeouts, retry budget, concurrency).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (60 seconds; font files are small).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Default attempts per font file, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default number of simultaneous downloads per fetch.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Minimum allowed concurrency value.
pub(crate) const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub(crate) const MAX_CONCURRENCY: usize = 100;

/// Maximum jitter added to backoff delays.
pub(crate) const MAX_JITTER: Duration = Duration::from_millis(500);
