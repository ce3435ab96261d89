//! Font data model shared by the store, the fetch pipeline and collaborators.
//!
//! - [`FontDescriptor`] - one known font family as supplied by the metadata source
//! - [`VariantCandidate`] - one style/weight variant with its candidate URLs
//! - [`ResolvedFile`] - a successfully downloaded `{variant, format}` file
//! - [`FontBundle`] - the read-only handle used to address the cache
//!
//! Bundles are only built by [`FontStore::resolve_bundle`](crate::store::FontStore::resolve_bundle),
//! which guarantees the store key is derived from normalized subsets.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A known font family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDescriptor {
    /// Globally unique font id (e.g. `roboto`).
    pub id: String,
    /// Upstream version tag (e.g. `v30`).
    pub version: String,
    /// Subsets the font provides.
    pub subsets: Vec<String>,
    /// Subset used when a request names none.
    #[serde(alias = "defSubset")]
    pub default_subset: String,
}

impl FontDescriptor {
    /// Creates a descriptor from borrowed parts.
    pub fn new<S: AsRef<str>>(
        id: impl Into<String>,
        version: impl Into<String>,
        subsets: &[S],
        default_subset: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            subsets: subsets.iter().map(|s| s.as_ref().to_string()).collect(),
            default_subset: default_subset.into(),
        }
    }
}

/// One candidate source URL of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUrl {
    pub url: String,
    /// Format name, also the fragment expected in the response content-type.
    pub format: String,
}

impl VariantUrl {
    pub fn new(url: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: format.into(),
        }
    }
}

/// A style/weight variant of a font with candidate URLs in several formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCandidate {
    /// Variant id (e.g. `regular`, `700italic`).
    pub id: String,
    pub subsets: Vec<String>,
    pub urls: Vec<VariantUrl>,
}

/// A downloaded font file.
///
/// Variant and format are kept so consumers can filter files later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFile {
    pub variant: String,
    pub format: String,
    pub path: PathBuf,
}

/// Read-only handle combining a store key, normalized subsets and the font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontBundle {
    store_key: String,
    subsets: Vec<String>,
    font: FontDescriptor,
}

impl FontBundle {
    /// Builds a bundle from already sorted, deduplicated subsets.
    pub(crate) fn new(font: FontDescriptor, subsets: Vec<String>) -> Self {
        let store_key = store_key(&font.id, &font.version, &subsets);
        Self {
            store_key,
            subsets,
            font,
        }
    }

    /// Stable cache key for `(font id, version, subsets)`.
    #[must_use]
    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    /// Sorted, deduplicated subsets this bundle covers.
    #[must_use]
    pub fn subsets(&self) -> &[String] {
        &self.subsets
    }

    #[must_use]
    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }
}

/// Formats `<id>@<version>__<subset1>_<subset2>...`.
///
/// `subsets` must already be sorted and deduplicated.
#[must_use]
pub fn store_key(id: &str, version: &str, subsets: &[String]) -> String {
    format!("{id}@{version}__{}", subsets.join("_"))
}
