//! Cached catalog access
//!
//! [`CatalogStore`] is the service-level entry point: hand it a document path
//! and it returns a built, shared [`CatalogIndex`], loading and inferring
//! only when the cache has no live copy. Cache keys are content fingerprints,
//! so an edited file re-ingests on the next request instead of serving the
//! stale catalog until its TTL runs out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use tracing::info;

use skudex_core::{CatalogIndex, CatalogPolicy, Result};

use crate::cache::{CacheConfig, CacheStats, Clock, DocumentCache};
use crate::loader::load_grid;

/// A fully ingested document and the index built from it
#[derive(Debug)]
pub struct CatalogDocument {
    pub source: PathBuf,
    pub fingerprint: String,
    pub index: CatalogIndex,
    pub ingested_at: SystemTime,
}

/// Policy-configured ingestion service with a TTL cache in front
pub struct CatalogStore {
    cache: DocumentCache<CatalogDocument>,
    policy: CatalogPolicy,
}

impl CatalogStore {
    pub fn new(policy: CatalogPolicy, config: CacheConfig) -> Result<Self> {
        Self::build(policy, DocumentCache::new(config))
    }

    /// Same store, test-controlled time
    pub fn with_clock(
        policy: CatalogPolicy,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::build(policy, DocumentCache::with_clock(config, clock))
    }

    fn build(mut policy: CatalogPolicy, cache: DocumentCache<CatalogDocument>) -> Result<Self> {
        policy.validate_and_normalize()?;
        Ok(Self { cache, policy })
    }

    /// The catalog for a document, served from cache when possible
    ///
    /// Two racing callers may both build the same document; the last insert
    /// wins and both returned references stay valid.
    pub fn catalog(&self, path: &Path) -> Result<Arc<CatalogDocument>> {
        let fingerprint = fingerprint(path)?;
        if let Some(doc) = self.cache.get(&fingerprint) {
            return Ok(doc);
        }

        let grid = load_grid(path, &self.policy)?;
        let index = CatalogIndex::from_grid(&grid, &self.policy)?;
        info!(
            path = %path.display(),
            records = index.len(),
            "ingested catalog"
        );
        let doc = CatalogDocument {
            source: path.to_path_buf(),
            fingerprint: fingerprint.clone(),
            index,
            ingested_at: SystemTime::now(),
        };
        Ok(self.cache.put(fingerprint, doc))
    }

    /// Drop the cached copy of one document; true when a copy was held
    pub fn invalidate(&self, path: &Path) -> Result<bool> {
        let fingerprint = fingerprint(path)?;
        Ok(self.cache.invalidate(&fingerprint))
    }

    /// Drop every cached document
    pub fn clear(&self) -> usize {
        self.cache.clear()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> &CatalogPolicy {
        &self.policy
    }
}

/// Cache key derived from the document path and its mtime
///
/// Touching the file changes the key, so a stale entry is simply never asked
/// for again and ages out of the cache on its own.
fn fingerprint(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)?;
    let mtime_nanos = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();

    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(mtime_nanos.to_le_bytes());
    let digest = hasher.finalize();
    Ok(digest.iter().map(|byte| format!("{:02x}", byte)).collect())
}
