#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

/// 500 MiB.
pub const DEFAULT_CACHE_BUDGET_BYTES: u64 = 500 * 1024 * 1024;
/// Eviction stops once the cache is at or below this fraction of the budget.
pub const DEFAULT_CACHE_HYSTERESIS: f64 = 0.8;

pub const DEFAULT_POOL_SIZE: usize = 6;
pub const DEFAULT_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("fieldmap-tiles/", env!("CARGO_PKG_VERSION"));

/// Size limits for the tile cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    /// Soft upper bound on the total bytes of cached blobs.
    pub budget_bytes: u64,
    /// Fraction of the budget eviction drains down to, in `(0, 1]`.
    pub hysteresis: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { budget_bytes: DEFAULT_CACHE_BUDGET_BYTES, hysteresis: DEFAULT_CACHE_HYSTERESIS }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            budget_bytes: env_parse("TILE_CACHE_BUDGET_BYTES", DEFAULT_CACHE_BUDGET_BYTES),
            hysteresis: env_parse("TILE_CACHE_HYSTERESIS", DEFAULT_CACHE_HYSTERESIS),
        }
    }

    /// Byte total eviction drains down to.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn target_bytes(&self) -> u64 {
        (self.budget_bytes as f64 * self.hysteresis) as u64
    }
}

/// Network and concurrency settings for tile fetching.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadConfig {
    /// Maximum concurrent fetches.
    pub pool_size: usize,
    /// Tile URL with `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DownloadConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let url_template = match std::env::var("TILE_URL_TEMPLATE") {
            Ok(template) if !template.trim().is_empty() => template.trim().to_string(),
            _ => DEFAULT_URL_TEMPLATE.to_string(),
        };
        Self {
            pool_size: env_parse("TILE_POOL_SIZE", DEFAULT_POOL_SIZE).max(1),
            url_template,
            request_timeout: Duration::from_secs(env_parse(
                "TILE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(env_parse(
                "TILE_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset or malformed.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
