#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use geometry::{Coordinate, contains};

use crate::doc::{MeasurementId, MeasurementKind, MeasurementStore, Shape};

/// The topmost area measurement whose polygon contains `point`.
///
/// Distance lines have no interior and are never hit.
#[must_use]
pub fn hit_area(point: Coordinate, store: &MeasurementStore) -> Option<MeasurementId> {
    store
        .topmost(|m| {
            m.kind == MeasurementKind::Area && matches!(&m.shape, Shape::Polygon(polygon) if contains(polygon, point))
        })
        .map(|m| m.id)
}
