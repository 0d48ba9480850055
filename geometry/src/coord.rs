#[cfg(test)]
#[path = "coord_test.rs"]
mod coord_test;

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// An ordered run of coordinates. Insertion order is measurement order.
pub type Path = Vec<Coordinate>;

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Finite and inside `[-90, 90] x [-180, 180]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_finite() && (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}
