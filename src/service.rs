//! Cache-through loading of font files.
//!
//! [`FontService::load`] resolves a bundle, serves cached files when present,
//! and otherwise resolves variant URLs, runs the [`FetchPipeline`] and stores
//! both results. Work for one store key runs under a per-key lock, so
//! concurrent identical requests trigger a single fetch and never race on the
//! write-once tables.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::download::{FailedFile, FetchPipeline};
use crate::font::{FontBundle, ResolvedFile, VariantCandidate};
use crate::source::{SourceError, VariantUrlResolver};
use crate::store::{FontStore, StoreError};

/// Errors that abort a load.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The variant resolver failed.
    #[error("variant resolution failed for {store_key}: {source}")]
    Resolve {
        store_key: String,
        #[source]
        source: SourceError,
    },

    /// A store write failed (duplicate write in strict mode).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Files available for a bundle.
///
/// An empty `files` list with a found bundle is a valid state: the font
/// exists but no file could be downloaded.
#[derive(Debug)]
pub struct LoadedFonts {
    pub bundle: FontBundle,
    pub variants: Vec<VariantCandidate>,
    pub files: Vec<ResolvedFile>,
    /// Files that failed during this call; always empty for cache hits.
    pub failures: Vec<FailedFile>,
    /// Whether the files came from the cache without fetching.
    pub from_cache: bool,
}

/// Loads font files through the store, fetching on cache misses.
///
/// A per-key lock lives only while a key is being fetched. Locks of failed
/// loads stay until the key is loaded successfully.
pub struct FontService {
    store: Arc<FontStore>,
    resolver: Arc<dyn VariantUrlResolver>,
    pipeline: FetchPipeline,
    key_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FontService {
    #[must_use]
    pub fn new(
        store: Arc<FontStore>,
        resolver: Arc<dyn VariantUrlResolver>,
        pipeline: FetchPipeline,
    ) -> Self {
        Self {
            store,
            resolver,
            pipeline,
            key_locks: DashMap::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<FontStore> {
        &self.store
    }

    /// Returns the files for `(font_id, subsets)`, fetching them on first use.
    ///
    /// Returns `Ok(None)` when the font is unknown or none of the requested
    /// subsets is available.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Resolve`] when the resolver fails (nothing is
    /// cached in that case) and [`ServiceError::Store`] on a strict duplicate
    /// write.
    #[instrument(skip(self, subsets), fields(resolver = self.resolver.name()))]
    pub async fn load<S: AsRef<str>>(
        &self,
        font_id: &str,
        subsets: &[S],
    ) -> Result<Option<LoadedFonts>, ServiceError> {
        let Some(bundle) = self.store.resolve_bundle(font_id, subsets) else {
            debug!("bundle not found");
            return Ok(None);
        };

        if let Some(loaded) = self.cached(&bundle) {
            return Ok(Some(loaded));
        }

        let lock = self.key_lock(bundle.store_key());
        let _guard = lock.lock().await;

        // Another request may have finished the fetch while we waited.
        if let Some(loaded) = self.cached(&bundle) {
            return Ok(Some(loaded));
        }

        let variants = match self.store.get_variants(&bundle) {
            Some(variants) => variants,
            None => {
                let variants = self
                    .resolver
                    .resolve_variants(&bundle)
                    .await
                    .map_err(|source| ServiceError::Resolve {
                        store_key: bundle.store_key().to_string(),
                        source,
                    })?;
                self.store.put_variants(&bundle, variants.clone())?;
                variants
            }
        };

        let font = bundle.font();
        let report = self
            .pipeline
            .fetch_files(&font.id, &font.version, &variants)
            .await;
        let (files, failures) = report.into_parts();
        self.store.put_files(&bundle, files.clone())?;

        // Files are cached now; later callers hit the cache before locking.
        self.key_locks.remove(bundle.store_key());

        info!(
            store_key = bundle.store_key(),
            files = files.len(),
            failed = failures.len(),
            "font bundle fetched"
        );

        Ok(Some(LoadedFonts {
            bundle,
            variants,
            files,
            failures,
            from_cache: false,
        }))
    }

    fn cached(&self, bundle: &FontBundle) -> Option<LoadedFonts> {
        let files = self.store.get_files(bundle)?;
        debug!(store_key = bundle.store_key(), "serving cached files");
        Some(LoadedFonts {
            bundle: bundle.clone(),
            variants: self.store.get_variants(bundle).unwrap_or_default(),
            files,
            failures: Vec::new(),
            from_cache: true,
        })
    }

    fn key_lock(&self, store_key: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.key_locks
                .entry(store_key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}
