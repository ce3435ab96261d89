//! Variant resolver backed by a font-id keyed manifest.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{SourceError, VariantUrlResolver, scope_to_bundle};
use crate::font::{FontBundle, VariantCandidate};

/// Resolves variants from a fixed `font id -> variants` manifest.
///
/// Only variants sharing at least one subset with the bundle are returned;
/// variants that declare no subsets are always included. Returned variants
/// carry the bundle's subsets, so each store key gets its own files. A font
/// missing from the manifest resolves to no variants.
#[derive(Debug, Clone, Default)]
pub struct ManifestResolver {
    entries: HashMap<String, Vec<VariantCandidate>>,
}

impl ManifestResolver {
    #[must_use]
    pub fn new(entries: HashMap<String, Vec<VariantCandidate>>) -> Self {
        Self { entries }
    }

    /// Loads a JSON object mapping font ids to variant arrays.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] or [`SourceError::Parse`].
    pub async fn from_json_file(path: &Path) -> Result<Self, SourceError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| SourceError::io(path, e))?;
        let entries: HashMap<String, Vec<VariantCandidate>> =
            serde_json::from_slice(&raw).map_err(|e| SourceError::parse(path, e))?;
        debug!(path = %path.display(), fonts = entries.len(), "loaded variant manifest");
        Ok(Self::new(entries))
    }
}

#[async_trait]
impl VariantUrlResolver for ManifestResolver {
    fn name(&self) -> &str {
        "manifest"
    }

    async fn resolve_variants(&self, bundle: &FontBundle) -> Result<Vec<VariantCandidate>, SourceError> {
        let Some(variants) = self.entries.get(&bundle.font().id) else {
            debug!(font_id = %bundle.font().id, "font not in manifest");
            return Ok(Vec::new());
        };

        let matching: Vec<VariantCandidate> = variants
            .iter()
            .filter(|variant| {
                variant.subsets.is_empty()
                    || variant
                        .subsets
                        .iter()
                        .any(|subset| bundle.subsets().contains(subset))
            })
            .cloned()
            .collect();

        Ok(scope_to_bundle(matching, bundle))
    }
}
