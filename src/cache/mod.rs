// src/cache/mod.rs

//! Manifest cache
//!
//! Raw `md5sums` contents are cached per (package, version, architecture).
//! A published build never changes, so an entry is never rewritten once
//! stored; the only removal path is pruning.
//!
//! Two implementations are selected at startup:
//! - [`SqliteCache`]: persistent store on disk
//! - [`NullCache`]: caching disabled, every lookup misses

mod sqlite;

pub use sqlite::SqliteCache;

use crate::config::CacheLocation;
use crate::error::Result;
use std::collections::BTreeSet;
use std::fmt;

/// Cache key for one architecture build of a package
///
/// Rendered as `name_version_architecture`. Debian package names, versions
/// and architecture names cannot contain `_`, so distinct triples never
/// produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for a package build
    pub fn new(name: &str, version: &str, architecture: &str) -> Self {
        Self(format!("{}_{}_{}", name, version, architecture))
    }

    /// Wrap a key read back from storage
    pub fn from_stored(key: String) -> Self {
        Self(key)
    }

    /// Get the key as a string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key-value store for raw manifests
pub trait ManifestCache {
    /// Look up a raw manifest
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Store a raw manifest
    fn put(&mut self, key: &CacheKey, manifest: &[u8]) -> Result<()>;

    /// All keys currently stored
    fn keys(&self) -> Result<BTreeSet<CacheKey>>;

    /// Remove an entry; removing a missing key is not an error
    fn delete(&mut self, key: &CacheKey) -> Result<()>;

    /// Flush and release the store
    fn close(self: Box<Self>) -> Result<()>;
}

/// Cache used when caching is disabled
///
/// Always misses, and accepts writes and deletes without storing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl ManifestCache for NullCache {
    fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put(&mut self, _key: &CacheKey, _manifest: &[u8]) -> Result<()> {
        Ok(())
    }

    fn keys(&self) -> Result<BTreeSet<CacheKey>> {
        Ok(BTreeSet::new())
    }

    fn delete(&mut self, _key: &CacheKey) -> Result<()> {
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Open the cache selected by configuration
pub fn open_cache(location: &CacheLocation) -> Result<Box<dyn ManifestCache>> {
    match location {
        CacheLocation::Disabled => Ok(Box::new(NullCache)),
        CacheLocation::Path(path) => Ok(Box::new(SqliteCache::open(path)?)),
    }
}
