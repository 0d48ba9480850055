//! Offline map tiles: a disk-backed cache and a concurrent region downloader.
//!
//! DESIGN
//! ======
//! The cache is a directory of `{z}_{x}_{y}.img` files plus an in-memory
//! index of sizes and write times behind a single mutex. Blob bytes are
//! written outside the lock and renamed into place inside it, so readers
//! never wait on a writer. The downloader enumerates a region's tiles,
//! skips what is cached, and feeds the rest to a semaphore-bounded worker
//! pool that writes through the cache.
//!
//! | Module | Role |
//! |--------|------|
//! | [`cache`] | `TileCache`: get/put/evict/clear over a directory |
//! | [`downloader`] | `Downloader`: region fetch with progress and cancellation |
//! | [`source`] | `TileSource` trait and the HTTP implementation |
//! | [`region`] | `DownloadRegion`, quality presets, tile enumeration |
//! | [`key`] | `TileKey` and slippy-map index math |
//! | [`cancel`] | `CancelToken` shared by the dispatcher and workers |
//! | [`config`] | Cache and download tunables loaded from the environment |

pub mod cache;
pub mod cancel;
pub mod config;
pub mod downloader;
pub mod key;
pub mod region;
pub mod source;

pub use cache::{CacheError, TileCache, TileCacheEntry};
pub use cancel::CancelToken;
pub use config::{CacheConfig, DownloadConfig};
pub use downloader::{DownloadError, DownloadEvent, DownloadOutcome, DownloadReport, Downloader};
pub use key::TileKey;
pub use region::{DownloadQuality, DownloadRegion};
pub use source::{FetchError, HttpTileSource, TileSource};
