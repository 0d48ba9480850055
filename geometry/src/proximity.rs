//! Distance from a position to a boundary, containment, and proximity zones.
//!
//! The boundary monitor feeds every live fix through
//! [`point_to_polygon_distance`] and classifies the result with
//! [`ZoneThresholds::classify`]. The eraser tool uses [`contains`] to find the
//! polygon under a tap.

#[cfg(test)]
#[path = "proximity_test.rs"]
mod proximity_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CRITICAL_FT, DEFAULT_SAFE_FT, DEFAULT_WARNING_FT, METERS_PER_DEGREE};
use crate::coord::Coordinate;
use crate::measure::distance;

/// Proximity band around an armed boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryZone {
    /// At or inside the critical threshold.
    Critical,
    /// Approaching the edge.
    Warning,
    /// Close enough to track, far enough to be comfortable.
    Safe,
    /// Beyond every threshold.
    None,
}

/// Haptic strength hint for a zone. Rendering it is the host's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticIntensity {
    Strong,
    Medium,
    None,
}

impl BoundaryZone {
    /// Short operator-facing banner text.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Critical => "BOUNDARY - 15 FT",
            Self::Warning => "Approaching Edge - 30 FT",
            Self::Safe => "Safe Zone",
            Self::None => "",
        }
    }

    #[must_use]
    pub fn haptic(self) -> HapticIntensity {
        match self {
            Self::Critical => HapticIntensity::Strong,
            Self::Warning => HapticIntensity::Medium,
            Self::Safe | Self::None => HapticIntensity::None,
        }
    }

    /// Severity rank, higher is closer to the boundary.
    #[must_use]
    pub fn severity(self) -> u8 {
        match self {
            Self::Critical => 3,
            Self::Warning => 2,
            Self::Safe => 1,
            Self::None => 0,
        }
    }
}

/// Inclusive upper bounds, in feet, for each zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    pub critical: f64,
    pub warning: f64,
    pub safe: f64,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self { critical: DEFAULT_CRITICAL_FT, warning: DEFAULT_WARNING_FT, safe: DEFAULT_SAFE_FT }
    }
}

impl ZoneThresholds {
    /// Build from `[critical, warning, safe]`.
    #[must_use]
    pub fn from_array(bounds: [f64; 3]) -> Self {
        debug_assert!(bounds[0] <= bounds[1] && bounds[1] <= bounds[2], "zone thresholds must be ascending");
        Self { critical: bounds[0], warning: bounds[1], safe: bounds[2] }
    }

    #[must_use]
    pub fn classify(&self, distance_feet: f64) -> BoundaryZone {
        if distance_feet <= self.critical {
            BoundaryZone::Critical
        } else if distance_feet <= self.warning {
            BoundaryZone::Warning
        } else if distance_feet <= self.safe {
            BoundaryZone::Safe
        } else {
            BoundaryZone::None
        }
    }
}

/// Classify with the default 15 / 30 / 50 ft thresholds.
#[must_use]
pub fn classify_zone(distance_feet: f64) -> BoundaryZone {
    ZoneThresholds::default().classify(distance_feet)
}

/// Minimum distance in meters from `point` to any edge of the closed `polygon`.
///
/// Each edge's closest point is found in a local planar projection centred on
/// `point`, then measured back with the great-circle [`distance`].
#[must_use]
pub fn point_to_polygon_distance(point: Coordinate, polygon: &[Coordinate]) -> f64 {
    debug_assert!(point.is_finite(), "point_to_polygon_distance: non-finite point {point:?}");
    debug_assert!(!polygon.is_empty(), "point_to_polygon_distance: empty polygon");
    let Some(&first) = polygon.first() else {
        return f64::INFINITY;
    };
    if polygon.len() == 1 {
        return distance(point, first);
    }

    let projection = LocalProjection::centered_on(point);
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let closest = projection.closest_on_segment(polygon[i], polygon[(i + 1) % n]);
            distance(point, closest)
        })
        .fold(f64::INFINITY, f64::min)
}

/// Even-odd ray cast: is `point` inside the closed `polygon`?
#[must_use]
pub fn contains(polygon: &[Coordinate], point: Coordinate) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (px, py) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].longitude, polygon[i].latitude);
        let (xj, yj) = (polygon[j].longitude, polygon[j].latitude);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Equirectangular projection in meters around a fixed origin.
struct LocalProjection {
    origin: Coordinate,
    meters_per_degree_lon: f64,
}

impl LocalProjection {
    fn centered_on(origin: Coordinate) -> Self {
        Self { origin, meters_per_degree_lon: METERS_PER_DEGREE * origin.latitude.to_radians().cos() }
    }

    fn project(&self, c: Coordinate) -> (f64, f64) {
        (
            (c.longitude - self.origin.longitude) * self.meters_per_degree_lon,
            (c.latitude - self.origin.latitude) * METERS_PER_DEGREE,
        )
    }

    fn unproject(&self, x: f64, y: f64) -> Coordinate {
        let longitude = if self.meters_per_degree_lon == 0.0 {
            self.origin.longitude
        } else {
            self.origin.longitude + x / self.meters_per_degree_lon
        };
        Coordinate::new(self.origin.latitude + y / METERS_PER_DEGREE, longitude)
    }

    /// Closest point on segment `a..b` to the projection origin.
    fn closest_on_segment(&self, a: Coordinate, b: Coordinate) -> Coordinate {
        let (ax, ay) = self.project(a);
        let (bx, by) = self.project(b);
        let dx = bx - ax;
        let dy = by - ay;

        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return a;
        }

        // The origin is (0, 0), so the projection scalar is -a·d / |d|².
        let t = (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0);
        self.unproject(ax + t * dx, ay + t * dy)
    }
}
