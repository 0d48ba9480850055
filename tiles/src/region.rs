//! Download regions: a center, a radius, and the zoom levels to fetch.

#[cfg(test)]
#[path = "region_test.rs"]
mod region_test;

use geometry::Coordinate;
use geometry::consts::METERS_PER_DEGREE;
use serde::{Deserialize, Serialize};

use crate::key::{MAX_MERCATOR_LAT, MAX_ZOOM, TileKey};

/// Average tile size used for download estimates.
pub const ESTIMATED_BYTES_PER_TILE: u64 = 50 * 1024;

/// Largest radius offered for an offline region.
pub const MAX_RADIUS_METERS: f64 = 50_000.0;

/// Upper bound on the tiles a single region may enumerate.
pub const MAX_REGION_TILES: usize = 1_000_000;

/// Preset zoom sets offered on the download screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadQuality {
    Low,
    #[default]
    Standard,
    High,
    Maximum,
}

impl DownloadQuality {
    #[must_use]
    pub fn zoom_levels(self) -> Vec<u8> {
        match self {
            Self::Low => vec![13, 14, 15],
            Self::Standard => (14..=17).collect(),
            Self::High => (15..=18).collect(),
            Self::Maximum => (15..=20).collect(),
        }
    }
}

impl std::str::FromStr for DownloadQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            "maximum" | "max" => Ok(Self::Maximum),
            other => Err(format!("unknown quality '{other}' (expected low, standard, high, maximum)")),
        }
    }
}

/// A circular area to make available offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRegion {
    pub center: Coordinate,
    pub radius_meters: f64,
    pub zoom_levels: Vec<u8>,
}

impl DownloadRegion {
    #[must_use]
    pub fn new(center: Coordinate, radius_meters: f64, zoom_levels: Vec<u8>) -> Self {
        Self { center, radius_meters, zoom_levels }
    }

    #[must_use]
    pub fn with_quality(center: Coordinate, radius_meters: f64, quality: DownloadQuality) -> Self {
        Self::new(center, radius_meters, quality.zoom_levels())
    }

    /// Check the region can be enumerated.
    ///
    /// # Errors
    ///
    /// A human-readable reason when the center is out of range, the radius is
    /// not a positive finite number up to [`MAX_RADIUS_METERS`], no zoom is
    /// given, a zoom exceeds [`MAX_ZOOM`], or the region would enumerate more
    /// than [`MAX_REGION_TILES`] tiles.
    pub fn validate(&self) -> Result<(), String> {
        if !self.center.is_valid() {
            return Err(format!("center out of range: {:?}", self.center));
        }
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(format!("radius must be positive, got {}", self.radius_meters));
        }
        if self.radius_meters > MAX_RADIUS_METERS {
            return Err(format!("radius {} m exceeds maximum {MAX_RADIUS_METERS} m", self.radius_meters));
        }
        if self.zoom_levels.is_empty() {
            return Err("no zoom levels requested".to_string());
        }
        if let Some(z) = self.zoom_levels.iter().find(|z| **z > MAX_ZOOM) {
            return Err(format!("zoom {z} exceeds maximum {MAX_ZOOM}"));
        }
        let count = self.estimate_tile_count();
        if count > MAX_REGION_TILES {
            return Err(format!("region covers {count} tiles, maximum is {MAX_REGION_TILES}"));
        }
        Ok(())
    }

    /// South-west and north-east corners of the radius' bounding box.
    #[must_use]
    pub fn bounds(&self) -> (Coordinate, Coordinate) {
        let d_lat = self.radius_meters / METERS_PER_DEGREE;
        let cos_lat = self.center.latitude.to_radians().cos().max(f64::EPSILON);
        let d_lon = self.radius_meters / (METERS_PER_DEGREE * cos_lat);
        let south_west = Coordinate::new(
            (self.center.latitude - d_lat).max(-MAX_MERCATOR_LAT),
            (self.center.longitude - d_lon).max(-180.0),
        );
        let north_east = Coordinate::new(
            (self.center.latitude + d_lat).min(MAX_MERCATOR_LAT),
            (self.center.longitude + d_lon).min(180.0),
        );
        (south_west, north_east)
    }

    /// Every tile covering the bounding box, zoom by zoom, row-major.
    /// Duplicate zoom levels are enumerated once.
    #[must_use]
    pub fn tiles(&self) -> Vec<TileKey> {
        let mut tiles = Vec::new();
        for z in self.distinct_zooms() {
            let (min, max) = self.tile_span(z);
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    tiles.push(TileKey::new(z, x, y));
                }
            }
        }
        tiles
    }

    /// Number of tiles [`DownloadRegion::tiles`] would return.
    #[must_use]
    pub fn estimate_tile_count(&self) -> usize {
        self.distinct_zooms()
            .into_iter()
            .map(|z| {
                let (min, max) = self.tile_span(z);
                (max.x - min.x + 1) as usize * (max.y - min.y + 1) as usize
            })
            .sum()
    }

    /// Rough download size at 50 KiB per tile.
    #[must_use]
    pub fn estimate_bytes(&self) -> u64 {
        self.estimate_tile_count() as u64 * ESTIMATED_BYTES_PER_TILE
    }

    fn distinct_zooms(&self) -> Vec<u8> {
        let mut zooms: Vec<u8> = self.zoom_levels.iter().copied().filter(|z| *z <= MAX_ZOOM).collect();
        zooms.sort_unstable();
        zooms.dedup();
        zooms
    }

    /// North-west and south-east tiles at zoom `z`.
    fn tile_span(&self, z: u8) -> (TileKey, TileKey) {
        let (south_west, north_east) = self.bounds();
        let north_west = TileKey::containing(Coordinate::new(north_east.latitude, south_west.longitude), z);
        let south_east = TileKey::containing(Coordinate::new(south_west.latitude, north_east.longitude), z);
        (north_west, south_east)
    }
}
