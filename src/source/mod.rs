//! Collaborator seams for font metadata and variant URL resolution.
//!
//! - [`FontMetadataSource`] - supplies every known [`FontDescriptor`] (e.g. a
//!   Google Fonts metadata fetcher)
//! - [`VariantUrlResolver`] - supplies the [`VariantCandidate`]s of a bundle
//!
//! Both traits use `async_trait` so the store and service can hold them as
//! trait objects. JSON-file and in-memory implementations are provided for
//! the CLI and for tests.
//!
//! File paths are derived from variant subsets, so resolvers return variants
//! carrying the bundle's subsets; two store keys never share a file.

mod error;
mod fixed;
mod manifest;
mod metadata;

pub use error::SourceError;
pub use fixed::StaticResolver;
pub use manifest::ManifestResolver;
pub use metadata::{JsonFileMetadataSource, StaticMetadataSource};

use async_trait::async_trait;

use crate::font::{FontBundle, FontDescriptor, VariantCandidate};

/// Supplies the full set of known fonts.
///
/// Implementations must return globally unique font ids; the store trusts
/// this and does not check internal consistency.
#[async_trait]
pub trait FontMetadataSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches every known font descriptor.
    async fn fetch_fonts(&self) -> Result<Vec<FontDescriptor>, SourceError>;
}

/// Resolves candidate URLs for the variants of a bundle.
///
/// Results are treated as already scoped to the bundle's subsets.
#[async_trait]
pub trait VariantUrlResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns the variants (with candidate URLs per format) for `bundle`.
    async fn resolve_variants(&self, bundle: &FontBundle) -> Result<Vec<VariantCandidate>, SourceError>;
}

/// Rewrites each variant's subsets to the bundle's subsets.
pub(crate) fn scope_to_bundle(
    variants: Vec<VariantCandidate>,
    bundle: &FontBundle,
) -> Vec<VariantCandidate> {
    variants
        .into_iter()
        .map(|variant| VariantCandidate {
            subsets: bundle.subsets().to_vec(),
            ..variant
        })
        .collect()
}
