//! Disk-backed tile cache with a byte budget.
//!
//! DESIGN
//! ======
//! One file per tile, named by [`TileKey::file_name`], plus an in-memory
//! index of size and write time per key. `put` writes the blob to a unique
//! temp file without holding the index lock, then renames it into place and
//! updates the index under the lock, so a reader sees either the old blob,
//! the new blob, or nothing. `get` reads straight from disk and never locks.
//!
//! EVICTION
//! ========
//! When a write pushes the total over the budget, the oldest entries by
//! write time (ties broken by write order) are deleted until the total is at
//! or below `hysteresis × budget`. The budget is soft: it can be exceeded
//! between a write and the eviction pass that follows it.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::key::TileKey;

const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("invalid cache config: {0}")]
    InvalidConfig(String),
    #[error("cache I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Index record for one cached tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCacheEntry {
    pub key: TileKey,
    pub size_bytes: u64,
    pub last_touched: SystemTime,
    seq: u64,
}

#[derive(Default)]
struct CacheIndex {
    entries: HashMap<TileKey, TileCacheEntry>,
    total_bytes: u64,
    next_seq: u64,
}

impl CacheIndex {
    fn record(&mut self, key: TileKey, size_bytes: u64, last_touched: SystemTime) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = TileCacheEntry { key, size_bytes, last_touched, seq };
        if let Some(old) = self.entries.insert(key, entry) {
            self.total_bytes -= old.size_bytes;
        }
        self.total_bytes += size_bytes;
    }

    fn forget(&mut self, key: &TileKey) -> Option<TileCacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_bytes -= entry.size_bytes;
        Some(entry)
    }

    /// Keys oldest first.
    fn eviction_order(&self) -> Vec<TileKey> {
        let mut entries: Vec<&TileCacheEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.last_touched.cmp(&b.last_touched).then_with(|| a.seq.cmp(&b.seq)));
        entries.into_iter().map(|e| e.key).collect()
    }
}

/// Size-bounded tile store over a directory.
pub struct TileCache {
    dir: PathBuf,
    config: CacheConfig,
    index: Mutex<CacheIndex>,
}

impl TileCache {
    /// Open (or create) a cache directory and rebuild the index from its files.
    ///
    /// Stale temp files from interrupted writes are removed. Files that are
    /// not tiles are left alone and not counted.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidConfig`] for a zero budget or a hysteresis outside
    /// `(0, 1]`; [`CacheError::Io`] if the directory cannot be created or listed.
    pub fn open(dir: impl Into<PathBuf>, config: CacheConfig) -> Result<Self, CacheError> {
        if config.budget_bytes == 0 {
            return Err(CacheError::InvalidConfig("budget must be greater than zero".into()));
        }
        if !(config.hysteresis > 0.0 && config.hysteresis <= 1.0) {
            return Err(CacheError::InvalidConfig(format!("hysteresis must be in (0, 1], got {}", config.hysteresis)));
        }

        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;

        let mut found = Vec::new();
        let listing = std::fs::read_dir(&dir).map_err(|e| CacheError::io(&dir, e))?;
        for entry in listing.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(TEMP_SUFFIX) {
                if let Err(err) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %err, "failed to remove stale temp file");
                }
                continue;
            }
            let Some(key) = TileKey::from_file_name(&name) else {
                continue;
            };
            match entry.metadata() {
                Ok(meta) if meta.is_file() => {
                    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                    found.push((key, meta.len(), modified));
                }
                Ok(_) => {}
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable tile"),
            }
        }

        let mut index = CacheIndex::default();
        found.sort_by_key(|(key, _, modified)| (*modified, *key));
        for (key, size, modified) in found {
            index.record(key, size, modified);
        }

        let cache = Self { dir, config, index: Mutex::new(index) };
        info!(dir = %cache.dir.display(), tiles = cache.len(), bytes = cache.current_size(), "tile cache opened");
        if cache.current_size() > cache.config.budget_bytes {
            cache.evict();
        }
        Ok(cache)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    fn path_for(&self, key: &TileKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a cached blob. `Ok(None)` on a miss.
    ///
    /// # Errors
    ///
    /// [`CacheError::Io`] for read failures other than a missing file.
    pub fn get(&self, key: &TileKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CacheError::io(&path, err)),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &TileKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Index record for `key`, if cached.
    #[must_use]
    pub fn entry(&self, key: &TileKey) -> Option<TileCacheEntry> {
        self.lock().entries.get(key).copied()
    }

    /// Store a blob, replacing any previous one, then evict if over budget.
    ///
    /// # Errors
    ///
    /// [`CacheError::Io`] if the temp write or the rename fails. The index is
    /// only updated once the blob is in place.
    pub fn put(&self, key: &TileKey, blob: &[u8]) -> Result<(), CacheError> {
        let temp = self.dir.join(format!(".{}{TEMP_SUFFIX}", Uuid::new_v4()));
        std::fs::write(&temp, blob).map_err(|e| CacheError::io(&temp, e))?;

        let path = self.path_for(key);
        let mut index = self.lock();
        if let Err(err) = std::fs::rename(&temp, &path) {
            drop(index);
            if let Err(cleanup) = std::fs::remove_file(&temp) {
                debug!(path = %temp.display(), error = %cleanup, "temp cleanup failed");
            }
            return Err(CacheError::io(&path, err));
        }
        index.record(*key, blob.len() as u64, SystemTime::now());
        if index.total_bytes > self.config.budget_bytes {
            self.evict_locked(&mut index);
        }
        Ok(())
    }

    /// Delete oldest entries until the total is at or below the hysteresis
    /// target. Returns the number of tiles removed.
    pub fn evict(&self) -> usize {
        let mut index = self.lock();
        self.evict_locked(&mut index)
    }

    fn evict_locked(&self, index: &mut CacheIndex) -> usize {
        let target = self.config.target_bytes();
        let before = index.total_bytes;
        let mut removed = 0;
        for key in index.eviction_order() {
            if index.total_bytes <= target {
                break;
            }
            self.remove_file(&key);
            index.forget(&key);
            removed += 1;
        }
        info!(removed, before, after = index.total_bytes, target, "tile cache evicted");
        removed
    }

    /// Remove every cached tile.
    pub fn clear(&self) {
        let mut index = self.lock();
        let keys: Vec<TileKey> = index.entries.keys().copied().collect();
        for key in &keys {
            self.remove_file(key);
        }
        *index = CacheIndex::default();
        info!(removed = keys.len(), "tile cache cleared");
    }

    fn remove_file(&self, key: &TileKey) {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), error = %err, "failed to remove cached tile"),
        }
    }

    /// Sum of cached blob sizes in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.lock().total_bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}
