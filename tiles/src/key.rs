#[cfg(test)]
#[path = "key_test.rs"]
mod key_test;

use std::f64::consts::PI;
use std::fmt;

use geometry::Coordinate;
use serde::{Deserialize, Serialize};

/// Deepest zoom level a region may request.
pub const MAX_ZOOM: u8 = 22;

/// Web-mercator latitude limit; tiles do not exist beyond it.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

const FILE_EXTENSION: &str = "img";

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    #[must_use]
    pub const fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// The tile at zoom `z` containing `coord`, clamped to valid indices.
    #[must_use]
    pub fn containing(coord: Coordinate, z: u8) -> Self {
        debug_assert!(z <= MAX_ZOOM, "zoom {z} beyond {MAX_ZOOM}");
        let z = z.min(MAX_ZOOM);
        let n = f64::from(1_u32 << z);
        let lat = coord.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let x = ((coord.longitude + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * n).floor();
        Self { z, x: clamp_index(x, n), y: clamp_index(y, n) }
    }

    /// File name inside the cache directory.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.{FILE_EXTENSION}", self.z, self.x, self.y)
    }

    /// Inverse of [`TileKey::file_name`]. Returns `None` for anything else.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(FILE_EXTENSION)?.strip_suffix('.')?;
        let mut parts = stem.split('_');
        let z = parse_part(parts.next())?;
        let x = parse_part(parts.next())?;
        let y = parse_part(parts.next())?;
        if parts.next().is_some() {
            return None;
        }
        let key = Self { z, x, y };
        key.is_valid().then_some(key)
    }

    /// Whether `x` and `y` are within `0..2^z`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.z > MAX_ZOOM {
            return false;
        }
        let n = 1_u32 << self.z;
        self.x < n && self.y < n
    }

    /// Substitute this key into a `{z}/{x}/{y}` URL template.
    #[must_use]
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_index(raw: f64, n: f64) -> u32 {
    raw.clamp(0.0, n - 1.0) as u32
}

fn parse_part<T: std::str::FromStr>(part: Option<&str>) -> Option<T> {
    match part?.parse() {
        Ok(value) => Some(value),
        Err(_) => None,
    }
}
