//! Font metadata sources backed by memory or a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{FontMetadataSource, SourceError};
use crate::font::FontDescriptor;

/// Fixed, in-memory list of fonts.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    fonts: Vec<FontDescriptor>,
}

impl StaticMetadataSource {
    #[must_use]
    pub fn new(fonts: Vec<FontDescriptor>) -> Self {
        Self { fonts }
    }
}

#[async_trait]
impl FontMetadataSource for StaticMetadataSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_fonts(&self) -> Result<Vec<FontDescriptor>, SourceError> {
        Ok(self.fonts.clone())
    }
}

/// Reads a JSON array of [`FontDescriptor`]s on every fetch.
///
/// Re-reading makes [`FontStore::reinitialize`](crate::store::FontStore::reinitialize)
/// pick up edits to the file.
#[derive(Debug, Clone)]
pub struct JsonFileMetadataSource {
    path: PathBuf,
}

impl JsonFileMetadataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FontMetadataSource for JsonFileMetadataSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch_fonts(&self) -> Result<Vec<FontDescriptor>, SourceError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::io(&self.path, e))?;
        let fonts: Vec<FontDescriptor> =
            serde_json::from_slice(&raw).map_err(|e| SourceError::parse(&self.path, e))?;
        debug!(path = %self.path.display(), count = fonts.len(), "loaded font metadata");
        Ok(fonts)
    }
}
