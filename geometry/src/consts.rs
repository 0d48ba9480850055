//! Shared numeric constants for the geometry crate.

// ── Earth model ─────────────────────────────────────────────────

/// Mean Earth radius in meters used for great-circle math.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters spanned by one degree of latitude in the planar area approximation.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Meters per degree used when synthesizing circle vertices.
pub const CIRCLE_METERS_PER_DEGREE: f64 = 111_111.0;

// ── Unit conversion ─────────────────────────────────────────────

/// Feet in one meter.
pub const FEET_PER_METER: f64 = 3.280_84;

/// Square meters in one acre.
pub const SQ_METERS_PER_ACRE: f64 = 4046.86;

/// Square feet in one acre.
pub const SQ_FEET_PER_ACRE: f64 = 43_560.0;

/// Hectares in one acre.
pub const HECTARES_PER_ACRE: f64 = 0.404_686;

/// Meters in one foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

// ── Defaults ────────────────────────────────────────────────────

/// Default Douglas-Peucker tolerance, in degrees.
pub const DEFAULT_SIMPLIFY_TOLERANCE_DEG: f64 = 0.000_01;

/// Vertex count of the regular polygon standing in for a circle.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 60;

/// Upper bound (feet, inclusive) of the critical proximity zone.
pub const DEFAULT_CRITICAL_FT: f64 = 15.0;

/// Upper bound (feet, inclusive) of the warning proximity zone.
pub const DEFAULT_WARNING_FT: f64 = 30.0;

/// Upper bound (feet, inclusive) of the safe proximity zone.
pub const DEFAULT_SAFE_FT: f64 = 50.0;
