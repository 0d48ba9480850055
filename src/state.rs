//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` owns the tile cache and the downloader built on top of it.
//! Both are behind `Arc` so a download task and a cache query can run
//! against the same on-disk index.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use tiles::{CacheError, Downloader, FetchError, HttpTileSource, TileCache, TileSource};

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("open tile cache: {0}")]
    Cache(#[from] CacheError),
    #[error("build tile source: {0}")]
    Source(#[from] FetchError),
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cache: Arc<TileCache>,
    pub downloader: Arc<Downloader>,
}

impl AppState {
    /// Open the cache directory and build an HTTP tile source.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the cache cannot be opened or the HTTP
    /// client cannot be built.
    pub fn open(config: AppConfig) -> Result<Self, StateError> {
        let source: Arc<dyn TileSource> = Arc::new(HttpTileSource::new(&config.download)?);
        Self::with_source(config, source)
    }

    /// Same as [`AppState::open`] with a caller-supplied tile source.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the cache cannot be opened.
    pub fn with_source(config: AppConfig, source: Arc<dyn TileSource>) -> Result<Self, StateError> {
        let cache = Arc::new(TileCache::open(&config.cache_dir, config.cache)?);
        let downloader = Arc::new(Downloader::new(cache.clone(), source, config.download.pool_size));
        tracing::debug!(pool_size = config.download.pool_size, "downloader ready");
        Ok(Self { config, cache, downloader })
    }
}
