//! Region downloader: enumerate, skip cached, fetch the rest in parallel.
//!
//! DESIGN
//! ======
//! One dispatcher loop walks the missing tiles and, for each, acquires a
//! permit from a semaphore sized to the pool before spawning a worker, so at
//! most `pool_size` fetches are in flight. Each worker fetches through the
//! [`TileSource`] and writes through the [`TileCache`] on the blocking pool.
//!
//! PROGRESS
//! ========
//! Tiles already cached count as completed up front. Every tile that then
//! finishes, successfully or not, bumps the completed counter under a mutex
//! and sends `Progress` while still holding it, so receivers see a strictly
//! non-decreasing sequence. A single `Finished` event carries the report.
//!
//! CANCELLATION
//! ============
//! The dispatcher checks the [`CancelToken`] before each new fetch and stops
//! waiting for permits once it fires; in-flight workers race their fetch
//! against the token and abandon it. Individual tile failures never stop the
//! batch.

#[cfg(test)]
#[path = "downloader_test.rs"]
mod downloader_test;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, TileCache};
use crate::cancel::CancelToken;
use crate::key::TileKey;
use crate::region::DownloadRegion;
use crate::source::{FetchError, TileSource};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid download region: {0}")]
    InvalidRegion(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A blocking cache task panicked or was aborted.
    #[error("tile worker failed: {0}")]
    Worker(String),
}

/// How a download ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DownloadOutcome {
    /// Every tile is now cached.
    Complete,
    /// Every tile was attempted; `failed` of them could not be fetched or stored.
    Partial { failed: usize },
    /// Stopped early by the cancel token.
    Cancelled,
}

/// Final tally for one download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub total: usize,
    /// Tiles skipped because they were cached before the download began.
    pub already_cached: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// Tiles never finished because of cancellation.
    pub abandoned: usize,
    pub outcome: DownloadOutcome,
}

impl DownloadReport {
    /// Tiles that reached a final state (cached, downloaded, or failed).
    #[must_use]
    pub fn completed(&self) -> usize {
        self.already_cached + self.downloaded + self.failed
    }

    /// Completed fraction in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        fraction(self.completed(), self.total)
    }
}

/// Event stream for a running download.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress { completed: usize, total: usize },
    Finished(DownloadReport),
}

impl DownloadEvent {
    /// Completed fraction for `Progress`, or the report's for `Finished`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        match self {
            Self::Progress { completed, total } => fraction(*completed, *total),
            Self::Finished(report) => report.progress(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn fraction(completed: usize, total: usize) -> f64 {
    if total == 0 { 1.0 } else { completed as f64 / total as f64 }
}

#[derive(Default, Clone, Copy)]
struct Tally {
    completed: usize,
    downloaded: usize,
    failed: usize,
    abandoned: usize,
}

/// Shared counters plus the event sender, locked together.
struct Progress {
    total: usize,
    tally: Mutex<Tally>,
    events: mpsc::UnboundedSender<DownloadEvent>,
}

impl Progress {
    fn new(total: usize, already_cached: usize, events: mpsc::UnboundedSender<DownloadEvent>) -> Self {
        let tally = Tally { completed: already_cached, ..Tally::default() };
        Self { total, tally: Mutex::new(tally), events }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn announce(&self) {
        let tally = self.lock();
        self.emit(DownloadEvent::Progress { completed: tally.completed, total: self.total });
    }

    fn finish(&self, key: TileKey, result: Result<(), DownloadError>) {
        let mut tally = self.lock();
        match result {
            Ok(()) => tally.downloaded += 1,
            Err(DownloadError::Fetch(FetchError::Cancelled)) => {
                tally.abandoned += 1;
                return;
            }
            Err(err) => {
                warn!(%key, error = %err, "tile download failed");
                tally.failed += 1;
            }
        }
        tally.completed += 1;
        self.emit(DownloadEvent::Progress { completed: tally.completed, total: self.total });
    }

    fn snapshot(&self) -> Tally {
        *self.lock()
    }

    fn emit(&self, event: DownloadEvent) {
        if self.events.send(event).is_err() {
            debug!("download event receiver dropped");
        }
    }
}

/// Fetches regions of tiles into a [`TileCache`].
pub struct Downloader {
    cache: Arc<TileCache>,
    source: Arc<dyn TileSource>,
    pool_size: usize,
}

impl Downloader {
    #[must_use]
    pub fn new(cache: Arc<TileCache>, source: Arc<dyn TileSource>, pool_size: usize) -> Self {
        Self { cache, source, pool_size: pool_size.max(1) }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<TileCache> {
        &self.cache
    }

    /// Read path for the renderer: cache first, then the network with
    /// write-through. A failed cache write is logged and the tile is still
    /// returned.
    ///
    /// # Errors
    ///
    /// [`DownloadError::Cache`] if the cache read fails, [`DownloadError::Fetch`]
    /// on a miss that cannot be fetched.
    pub async fn load_tile(&self, key: TileKey) -> Result<Vec<u8>, DownloadError> {
        let cache = Arc::clone(&self.cache);
        let cached = tokio::task::spawn_blocking(move || cache.get(&key))
            .await
            .map_err(|e| DownloadError::Worker(e.to_string()))??;
        if let Some(bytes) = cached {
            return Ok(bytes);
        }

        let bytes = self.source.fetch(key).await?;
        if let Err(err) = store(&self.cache, key, bytes.clone()).await {
            warn!(%key, error = %err, "tile write-through failed");
        }
        Ok(bytes)
    }

    /// Download every tile of `region` that is not already cached.
    ///
    /// Progress and the final report are sent on `events`; the report is
    /// also returned. Cancellation is an outcome, not an error.
    ///
    /// # Errors
    ///
    /// [`DownloadError::InvalidRegion`] if the region fails validation; no
    /// events are sent in that case.
    pub async fn download(
        &self,
        region: &DownloadRegion,
        events: mpsc::UnboundedSender<DownloadEvent>,
        cancel: CancelToken,
    ) -> Result<DownloadReport, DownloadError> {
        region.validate().map_err(DownloadError::InvalidRegion)?;

        let tiles = region.tiles();
        let total = tiles.len();
        let missing: Vec<TileKey> = tiles.into_iter().filter(|key| !self.cache.contains(key)).collect();
        let already_cached = total - missing.len();
        info!(total, already_cached, pool_size = self.pool_size, "tile download started");

        let progress = Arc::new(Progress::new(total, already_cached, events));
        progress.announce();

        let not_started = self.dispatch(&missing, &progress, &cancel).await;

        let tally = progress.snapshot();
        let abandoned = tally.abandoned + not_started;
        let outcome = if cancel.is_cancelled() && abandoned > 0 {
            DownloadOutcome::Cancelled
        } else if tally.failed > 0 {
            DownloadOutcome::Partial { failed: tally.failed }
        } else {
            DownloadOutcome::Complete
        };
        let report = DownloadReport {
            total,
            already_cached,
            downloaded: tally.downloaded,
            failed: tally.failed,
            abandoned,
            outcome,
        };
        info!(
            total,
            downloaded = report.downloaded,
            failed = report.failed,
            abandoned = report.abandoned,
            outcome = ?report.outcome,
            "tile download finished"
        );
        progress.emit(DownloadEvent::Finished(report.clone()));
        Ok(report)
    }

    /// Run the worker pool over `missing`. Returns how many tiles were never
    /// started because of cancellation.
    async fn dispatch(&self, missing: &[TileKey], progress: &Arc<Progress>, cancel: &CancelToken) -> usize {
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut workers = JoinSet::new();
        let mut not_started = 0;

        for (i, key) in missing.iter().copied().enumerate() {
            let acquired = if cancel.is_cancelled() {
                None
            } else {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    permit = Arc::clone(&semaphore).acquire_owned() => Some(permit),
                }
            };
            let Some(Ok(permit)) = acquired else {
                not_started = missing.len() - i;
                debug!(not_started, "dispatch stopped");
                break;
            };

            let cache = Arc::clone(&self.cache);
            let source = Arc::clone(&self.source);
            let progress = Arc::clone(progress);
            let cancel = cancel.clone();
            workers.spawn(async move {
                let _permit = permit;
                let result = tokio::select! {
                    result = fetch_and_store(&cache, source.as_ref(), key) => result,
                    () = cancel.cancelled() => Err(FetchError::Cancelled.into()),
                };
                progress.finish(key, result);
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "tile worker panicked");
            }
        }
        not_started
    }
}

async fn fetch_and_store(cache: &Arc<TileCache>, source: &dyn TileSource, key: TileKey) -> Result<(), DownloadError> {
    let bytes = source.fetch(key).await?;
    store(cache, key, bytes).await
}

async fn store(cache: &Arc<TileCache>, key: TileKey, bytes: Vec<u8>) -> Result<(), DownloadError> {
    let cache = Arc::clone(cache);
    tokio::task::spawn_blocking(move || cache.put(&key, &bytes))
        .await
        .map_err(|e| DownloadError::Worker(e.to_string()))??;
    Ok(())
}
