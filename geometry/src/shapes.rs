#[cfg(test)]
#[path = "shapes_test.rs"]
mod shapes_test;

use std::f64::consts::TAU;

use crate::consts::CIRCLE_METERS_PER_DEGREE;
use crate::coord::Coordinate;

/// Regular `segments`-gon approximating a circle of `radius_m` around `center`.
#[must_use]
pub fn circle_polygon(center: Coordinate, radius_m: f64, segments: usize) -> Vec<Coordinate> {
    debug_assert!(radius_m >= 0.0 && radius_m.is_finite(), "circle_polygon: invalid radius {radius_m}");
    if segments == 0 {
        return Vec::new();
    }

    let meters_per_degree_lon = CIRCLE_METERS_PER_DEGREE * center.latitude.to_radians().cos();
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / segments as f64;

    (0..segments)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = i as f64 * step;
            let dx = radius_m * angle.cos();
            let dy = radius_m * angle.sin();
            Coordinate::new(
                center.latitude + dy / CIRCLE_METERS_PER_DEGREE,
                center.longitude + dx / meters_per_degree_lon,
            )
        })
        .collect()
}

/// Four corners of the lat/lon-aligned rectangle with opposite corners `a` and `b`.
#[must_use]
pub fn rectangle_from_corners(a: Coordinate, b: Coordinate) -> [Coordinate; 4] {
    [
        a,
        Coordinate::new(a.latitude, b.longitude),
        b,
        Coordinate::new(b.latitude, a.longitude),
    ]
}
