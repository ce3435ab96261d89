//! Font Cache Core Library
//!
//! A process-lifetime cache for web font files. Given a font id and requested
//! character subsets, it derives a stable store key, downloads every
//! `{variant, format}` file concurrently with per-file retries, and serves
//! later requests for the same key from memory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Runtime configuration and strictness
//! - [`font`] - Data model and store-key derivation
//! - [`source`] - Metadata source and variant resolver seams
//! - [`store`] - Write-once cache tables
//! - [`download`] - Retry executor, file client and fetch pipeline
//! - [`service`] - Cache-through loading

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod font;
pub mod service;
pub mod source;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use config::{CacheConfig, ConfigError, RuntimeMode};
pub use download::{
    DownloadError, FetchPipeline, FetchReport, FileOutcome, FontFileClient, RetryPolicy,
};
pub use font::{FontBundle, FontDescriptor, ResolvedFile, VariantCandidate, VariantUrl};
pub use service::{FontService, LoadedFonts, ServiceError};
pub use source::{FontMetadataSource, SourceError, VariantUrlResolver};
pub use store::{FontStore, PutOutcome, StoreError, StoreStats};
