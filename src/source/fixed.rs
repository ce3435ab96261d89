//! Resolver returning the same variants for every bundle.

use async_trait::async_trait;

use super::{SourceError, VariantUrlResolver, scope_to_bundle};
use crate::font::{FontBundle, VariantCandidate};

/// In-memory resolver for tests and single-font setups.
///
/// Every bundle resolves to the configured variants, rescoped to the
/// bundle's subsets.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    variants: Vec<VariantCandidate>,
}

impl StaticResolver {
    #[must_use]
    pub fn new(variants: Vec<VariantCandidate>) -> Self {
        Self { variants }
    }
}

#[async_trait]
impl VariantUrlResolver for StaticResolver {
    fn name(&self) -> &str {
        "static"
    }

    async fn resolve_variants(&self, bundle: &FontBundle) -> Result<Vec<VariantCandidate>, SourceError> {
        Ok(scope_to_bundle(self.variants.clone(), bundle))
    }
}
