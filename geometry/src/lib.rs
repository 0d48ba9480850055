//! Geodesic measurement engine for field boundaries.
//!
//! Everything in this crate is a pure function over latitude/longitude
//! sequences: no I/O, no shared state, safe to call from any thread. The
//! drawing state machine calls it for live feedback while a shape is being
//! built, and the boundary monitor calls it once per position fix.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`coord`] | `Coordinate` and the `Path` alias |
//! | [`measure`] | Area, perimeter, great-circle distance, bearing |
//! | [`simplify`] | Ramer–Douglas–Peucker path reduction |
//! | [`proximity`] | Point-to-boundary distance, containment, zones |
//! | [`shapes`] | Synthesized shapes (circle N-gon, rectangle corners) |
//! | [`units`] | Display units and conversions from canonical feet/acres |
//! | [`consts`] | Earth and unit-conversion constants |

pub mod consts;
pub mod coord;
pub mod measure;
pub mod proximity;
pub mod shapes;
pub mod simplify;
pub mod units;

pub use coord::{Coordinate, Path};
pub use measure::{area, bearing, destination, distance, perimeter};
pub use proximity::{BoundaryZone, HapticIntensity, ZoneThresholds, classify_zone, contains, point_to_polygon_distance};
pub use shapes::{circle_polygon, rectangle_from_corners};
pub use simplify::simplify;
