//! Error types for the font store.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::source::SourceError;

/// Write-once table of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTable {
    Variants,
    Files,
}

impl fmt::Display for StoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variants => f.write_str("variants"),
            Self::Files => f.write_str("files"),
        }
    }
}

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Creating the cache directory failed.
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Loading font descriptors failed.
    #[error("failed to load fonts from {source_name}: {source}")]
    Metadata {
        source_name: String,
        #[source]
        source: SourceError,
    },

    /// A write-once key was written twice in strict mode.
    #[error("duplicate write of {table} for store key {store_key}")]
    DuplicateWrite { table: StoreTable, store_key: String },
}

impl StoreError {
    pub fn cache_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheDir {
            path: path.into(),
            source,
        }
    }

    pub fn metadata(source_name: impl Into<String>, source: SourceError) -> Self {
        Self::Metadata {
            source_name: source_name.into(),
            source,
        }
    }

    pub fn duplicate_write(table: StoreTable, store_key: impl Into<String>) -> Self {
        Self::DuplicateWrite {
            table,
            store_key: store_key.into(),
        }
    }
}
