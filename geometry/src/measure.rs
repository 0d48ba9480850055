//! Area, perimeter, and great-circle primitives.
//!
//! Area uses a planar shoelace over (lon, lat) scaled to meters at the first
//! vertex's latitude. That reference latitude is held fixed for the whole
//! polygon, which slightly biases very large or far-north shapes; saved
//! measurements were computed this way, so it stays.

#[cfg(test)]
#[path = "measure_test.rs"]
mod measure_test;

use crate::consts::{EARTH_RADIUS_M, FEET_PER_METER, METERS_PER_DEGREE, SQ_METERS_PER_ACRE};
use crate::coord::Coordinate;

/// Great-circle (haversine) distance between two coordinates, in meters.
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    debug_assert!(a.is_finite() && b.is_finite(), "distance: non-finite coordinate {a:?} / {b:?}");
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Sum of great-circle segment lengths along `path`, in feet.
///
/// When `closed` is set the segment from the last vertex back to the first
/// is included.
#[must_use]
pub fn perimeter(path: &[Coordinate], closed: bool) -> f64 {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return 0.0;
    };
    if path.len() < 2 {
        return 0.0;
    }

    let mut meters: f64 = path.windows(2).map(|w| distance(w[0], w[1])).sum();
    if closed {
        meters += distance(last, first);
    }
    meters * FEET_PER_METER
}

/// Enclosed area of the implicitly closed `path`, in acres.
///
/// Fewer than three vertices, or colinear vertices, yield zero.
#[must_use]
pub fn area(path: &[Coordinate]) -> f64 {
    let Some(&origin) = path.first() else {
        return 0.0;
    };
    if path.len() < 3 {
        return 0.0;
    }
    debug_assert!(path.iter().all(Coordinate::is_finite), "area: non-finite coordinate in path");

    // Shoelace relative to the first vertex keeps the products small.
    let n = path.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let a = path[i];
            let b = path[(i + 1) % n];
            let (ax, ay) = (a.longitude - origin.longitude, a.latitude - origin.latitude);
            let (bx, by) = (b.longitude - origin.longitude, b.latitude - origin.latitude);
            ax * by - bx * ay
        })
        .sum();

    let square_degrees = twice_area.abs() / 2.0;
    let meters_per_degree_lon = METERS_PER_DEGREE * origin.latitude.to_radians().cos();
    let square_meters = square_degrees * METERS_PER_DEGREE * meters_per_degree_lon;
    square_meters / SQ_METERS_PER_ACRE
}

/// Initial great-circle bearing from `from` to `to`, in degrees `[0, 360)`.
#[must_use]
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// The point reached by travelling `meters` from `from` on `bearing_deg`.
#[must_use]
pub fn destination(from: Coordinate, bearing_deg: f64, meters: f64) -> Coordinate {
    let angular = meters / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat1 = from.latitude.to_radians();
    let lon1 = from.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * theta.cos()).asin();
    let lon2 = lon1 + (theta.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());
    Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
}
