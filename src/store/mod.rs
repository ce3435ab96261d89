//! Process-lifetime font cache.
//!
//! [`FontStore`] owns three tables:
//! - fonts by id, loaded wholesale from a [`FontMetadataSource`]
//! - variant candidates by store key
//! - resolved files by store key
//!
//! The keyed tables are write-once: the first write for a store key wins.
//! A second write is a [`StoreError::DuplicateWrite`] in strict mode and a
//! logged no-op otherwise. Check and insert happen under one `DashMap` entry
//! lock, so concurrent writers cannot both succeed.
//!
//! # Example
//!
//! ```no_run
//! use font_cache_core::config::CacheConfig;
//! use font_cache_core::source::StaticMetadataSource;
//! use font_cache_core::store::FontStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FontStore::new(&CacheConfig::default());
//! store.initialize(&StaticMetadataSource::default()).await?;
//! if let Some(bundle) = store.resolve_bundle("roboto", &["latin"]) {
//!     println!("cache key: {}", bundle.store_key());
//! }
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::{StoreError, StoreTable};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{CacheConfig, RuntimeMode};
use crate::font::{FontBundle, FontDescriptor, ResolvedFile, VariantCandidate};
use crate::source::FontMetadataSource;

/// Result of a write-once insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The value was stored.
    Stored,
    /// The key was already populated; the existing value was kept.
    KeptExisting,
}

/// Aggregate counts over the store tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreStats {
    pub font_count: usize,
    pub variant_key_count: usize,
    pub file_key_count: usize,
    /// Variant entries summed over all keys.
    pub total_variant_urls: usize,
    pub total_resolved_files: usize,
}

/// Process-wide font cache.
///
/// Construct once and share behind an `Arc`.
#[derive(Debug)]
pub struct FontStore {
    cache_dir: PathBuf,
    mode: RuntimeMode,
    strict: bool,
    fonts: DashMap<String, FontDescriptor>,
    variants: DashMap<String, Vec<VariantCandidate>>,
    files: DashMap<String, Vec<ResolvedFile>>,
}

impl FontStore {
    /// Creates an empty store; call [`initialize`](Self::initialize) before use.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache_dir: config.cache_dir.clone(),
            mode: config.mode,
            strict: config.strict_mode(),
            fonts: DashMap::new(),
            variants: DashMap::new(),
            files: DashMap::new(),
        }
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Whether duplicate writes are fatal.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Creates the cache directory and loads every font from `source`.
    ///
    /// Returns the number of fonts loaded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CacheDir`] if the directory cannot be created and
    /// [`StoreError::Metadata`] if the source fails.
    #[instrument(skip(self, source), fields(cache_dir = %self.cache_dir.display(), source = source.name()))]
    pub async fn initialize(&self, source: &dyn FontMetadataSource) -> Result<usize, StoreError> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| StoreError::cache_dir(&self.cache_dir, e))?;

        let fonts = source
            .fetch_fonts()
            .await
            .map_err(|e| StoreError::metadata(source.name(), e))?;

        for font in fonts {
            let id = font.id.clone();
            if self.fonts.insert(id.clone(), font).is_some() {
                warn!(font_id = %id, "metadata source returned duplicate font id, keeping last");
            }
        }

        let count = self.fonts.len();
        info!(fonts = count, "font store initialized");
        Ok(count)
    }

    /// Clears all three tables and re-runs [`initialize`](Self::initialize).
    ///
    /// # Errors
    ///
    /// Same as [`initialize`](Self::initialize).
    pub async fn reinitialize(&self, source: &dyn FontMetadataSource) -> Result<usize, StoreError> {
        if self.mode.is_test() {
            debug!("reinitializing font store");
        } else {
            info!("reinitializing font store, building fresh tables");
        }

        self.fonts.clear();
        self.variants.clear();
        self.files.clear();

        self.initialize(source).await
    }

    /// Snapshot of all known fonts, sorted by id.
    #[must_use]
    pub fn list_fonts(&self) -> Vec<FontDescriptor> {
        let mut fonts: Vec<FontDescriptor> =
            self.fonts.iter().map(|entry| entry.value().clone()).collect();
        fonts.sort_by(|a, b| a.id.cmp(&b.id));
        fonts
    }

    #[must_use]
    pub fn get_font(&self, font_id: &str) -> Option<FontDescriptor> {
        self.fonts.get(font_id).map(|entry| entry.value().clone())
    }

    /// Builds the bundle addressing `(font, wanted subsets)` in the cache.
    ///
    /// Empty `wanted` selects the font's default subset; otherwise the subsets
    /// are intersected with those the font provides. Returns `None` for an
    /// unknown font or an empty intersection. Subsets are deduplicated and
    /// sorted, so permutations of the same set share one store key.
    #[must_use]
    pub fn resolve_bundle<S: AsRef<str>>(&self, font_id: &str, wanted: &[S]) -> Option<FontBundle> {
        let font = self.get_font(font_id)?;

        let subsets: BTreeSet<String> = if wanted.is_empty() {
            BTreeSet::from([font.default_subset.clone()])
        } else {
            wanted
                .iter()
                .map(|subset| subset.as_ref())
                .filter(|subset| font.subsets.iter().any(|s| s == subset))
                .map(ToString::to_string)
                .collect()
        };

        if subsets.is_empty() {
            debug!(font_id, "no requested subset is provided by the font");
            return None;
        }

        Some(FontBundle::new(font, subsets.into_iter().collect()))
    }

    /// Cached variants; `None` means not fetched yet.
    #[must_use]
    pub fn get_variants(&self, bundle: &FontBundle) -> Option<Vec<VariantCandidate>> {
        self.variants
            .get(bundle.store_key())
            .map(|entry| entry.value().clone())
    }

    /// Cached files; `None` means not fetched yet.
    #[must_use]
    pub fn get_files(&self, bundle: &FontBundle) -> Option<Vec<ResolvedFile>> {
        self.files
            .get(bundle.store_key())
            .map(|entry| entry.value().clone())
    }

    /// Stores the variants of `bundle` once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateWrite`] in strict mode when the key is
    /// already populated.
    pub fn put_variants(
        &self,
        bundle: &FontBundle,
        variants: Vec<VariantCandidate>,
    ) -> Result<PutOutcome, StoreError> {
        let inserted = insert_if_absent(&self.variants, bundle.store_key(), variants);
        self.finish_put(StoreTable::Variants, bundle.store_key(), inserted)
    }

    /// Stores the resolved files of `bundle` once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateWrite`] in strict mode when the key is
    /// already populated.
    pub fn put_files(
        &self,
        bundle: &FontBundle,
        files: Vec<ResolvedFile>,
    ) -> Result<PutOutcome, StoreError> {
        let inserted = insert_if_absent(&self.files, bundle.store_key(), files);
        self.finish_put(StoreTable::Files, bundle.store_key(), inserted)
    }

    fn finish_put(
        &self,
        table: StoreTable,
        store_key: &str,
        inserted: bool,
    ) -> Result<PutOutcome, StoreError> {
        if inserted {
            debug!(%table, store_key, "stored cache entry");
            return Ok(PutOutcome::Stored);
        }

        warn!(%table, store_key, strict = self.strict, "duplicate save of store key");
        if self.strict {
            Err(StoreError::duplicate_write(table, store_key))
        } else {
            Ok(PutOutcome::KeptExisting)
        }
    }

    /// Aggregate counts over all tables.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            font_count: self.fonts.len(),
            variant_key_count: self.variants.len(),
            file_key_count: self.files.len(),
            total_variant_urls: self.variants.iter().map(|entry| entry.value().len()).sum(),
            total_resolved_files: self.files.iter().map(|entry| entry.value().len()).sum(),
        }
    }
}

/// Inserts `value` unless `key` exists; returns whether it was inserted.
fn insert_if_absent<V>(table: &DashMap<String, V>, key: &str, value: V) -> bool {
    match table.entry(key.to_string()) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(value);
            true
        }
    }
}
