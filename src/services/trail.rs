//! Breadcrumb trail of recorded positions and the swath it covers.

#[cfg(test)]
#[path = "trail_test.rs"]
mod trail_test;

use geometry::consts::METERS_PER_FOOT;
use geometry::{Coordinate, area, bearing, destination, perimeter};

/// Trail length that triggers a trim.
pub const MAX_BREADCRUMBS: usize = 10_000;

/// Oldest points dropped when the trail exceeds [`MAX_BREADCRUMBS`].
pub const BREADCRUMB_TRIM: usize = 1_000;

/// Implement width used when none is given.
pub const DEFAULT_MACHINE_WIDTH_FT: f64 = 8.0;

#[derive(Debug, Clone, Default)]
pub struct BreadcrumbTrail {
    points: Vec<Coordinate>,
}

impl BreadcrumbTrail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fix. Non-finite fixes are dropped.
    pub fn record(&mut self, point: Coordinate) {
        if !point.is_finite() {
            return;
        }
        self.points.push(point);
        if self.points.len() > MAX_BREADCRUMBS {
            self.points.drain(..BREADCRUMB_TRIM);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[must_use]
    pub fn path(&self) -> &[Coordinate] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance travelled along the trail, in feet.
    #[must_use]
    pub fn length_feet(&self) -> f64 {
        perimeter(&self.points, false)
    }

    /// Polygon swept by an implement `width_feet` wide dragged along the
    /// trail, or `None` with two or fewer points.
    ///
    /// Each point is offset half the width to either side of the local
    /// heading. The ring runs back along the left edge and out along the
    /// right edge.
    #[must_use]
    pub fn coverage_polygon(&self, width_feet: f64) -> Option<Vec<Coordinate>> {
        if self.points.len() <= 2 || !width_feet.is_finite() || width_feet <= 0.0 {
            return None;
        }

        let half_width_m = width_feet * METERS_PER_FOOT / 2.0;
        let mut left = Vec::with_capacity(self.points.len());
        let mut right = Vec::with_capacity(self.points.len());
        for (i, &point) in self.points.iter().enumerate() {
            let heading = if i == 0 {
                bearing(point, self.points[1])
            } else {
                bearing(self.points[i - 1], point)
            };
            right.push(destination(point, heading + 90.0, half_width_m));
            left.push(destination(point, heading - 90.0, half_width_m));
        }

        left.reverse();
        left.extend(right);
        Some(left)
    }

    /// Acres covered by [`Self::coverage_polygon`], zero when there is none.
    #[must_use]
    pub fn coverage_acres(&self, width_feet: f64) -> f64 {
        self.coverage_polygon(width_feet).map_or(0.0, |ring| area(&ring))
    }
}
