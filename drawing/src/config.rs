#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use geometry::consts::{DEFAULT_CIRCLE_SEGMENTS, DEFAULT_SIMPLIFY_TOLERANCE_DEG};

use crate::consts::{DEFAULT_CLOSE_RADIUS_M, DEFAULT_SIMPLIFY_EVERY_N};

/// Tuning knobs for the drawing engine, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingConfig {
    /// Polygon auto-close radius around the first vertex, in meters.
    pub close_radius_m: f64,
    /// RDP tolerance for freehand paths, in degrees.
    pub simplify_tolerance_deg: f64,
    /// Freehand samples between simplification passes.
    pub simplify_every_n: usize,
    /// Vertex count of the circle tool's polygon.
    pub circle_segments: usize,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            close_radius_m: DEFAULT_CLOSE_RADIUS_M,
            simplify_tolerance_deg: DEFAULT_SIMPLIFY_TOLERANCE_DEG,
            simplify_every_n: DEFAULT_SIMPLIFY_EVERY_N,
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
        }
    }
}

impl DrawingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            close_radius_m: env_parse("DRAW_CLOSE_RADIUS_M", DEFAULT_CLOSE_RADIUS_M),
            simplify_tolerance_deg: env_parse("DRAW_SIMPLIFY_TOLERANCE_DEG", DEFAULT_SIMPLIFY_TOLERANCE_DEG),
            simplify_every_n: env_parse("DRAW_SIMPLIFY_EVERY_N", DEFAULT_SIMPLIFY_EVERY_N).max(1),
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset or malformed.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
