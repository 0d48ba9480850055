//! Application configuration assembled from the environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use drawing::DrawingConfig;
use geometry::ZoneThresholds;
use geometry::consts::{DEFAULT_CRITICAL_FT, DEFAULT_SAFE_FT, DEFAULT_WARNING_FT};
use tiles::config::env_parse;
use tiles::{CacheConfig, DownloadConfig};

pub const DEFAULT_CACHE_DIR: &str = "./tile-cache";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cache_dir: PathBuf,
    pub cache: CacheConfig,
    pub download: DownloadConfig,
    pub zones: ZoneThresholds,
    pub drawing: DrawingConfig,
}

impl AppConfig {
    /// Load every section from environment variables, with defaults.
    ///
    /// Zone thresholds that are not ascending fall back to the defaults.
    pub fn from_env() -> Self {
        let cache_dir = match std::env::var("TILE_CACHE_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
            _ => PathBuf::from(DEFAULT_CACHE_DIR),
        };
        Self {
            cache_dir,
            cache: CacheConfig::from_env(),
            download: DownloadConfig::from_env(),
            zones: zone_thresholds_from_env(),
            drawing: DrawingConfig::from_env(),
        }
    }
}

fn zone_thresholds_from_env() -> ZoneThresholds {
    let bounds = [
        env_parse("ZONE_CRITICAL_FT", DEFAULT_CRITICAL_FT),
        env_parse("ZONE_WARNING_FT", DEFAULT_WARNING_FT),
        env_parse("ZONE_SAFE_FT", DEFAULT_SAFE_FT),
    ];
    let ascending = bounds.iter().all(|b| b.is_finite() && *b >= 0.0) && bounds[0] <= bounds[1] && bounds[1] <= bounds[2];
    if ascending {
        ZoneThresholds::from_array(bounds)
    } else {
        tracing::warn!(?bounds, "zone thresholds must be ascending; using defaults");
        ZoneThresholds::default()
    }
}
