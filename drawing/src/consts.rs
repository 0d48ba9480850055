//! Shared numeric constants for the drawing crate.

// ── Commit validation ───────────────────────────────────────────

/// Points needed to commit a distance line.
pub const MIN_LINE_POINTS: usize = 2;

/// Distinct vertices needed to commit a polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Taps that define a rectangle (two opposite corners).
pub const RECTANGLE_TAPS: usize = 2;

// ── Tool defaults ───────────────────────────────────────────────

/// A polygon tap this close to the first vertex closes the shape, in meters.
pub const DEFAULT_CLOSE_RADIUS_M: f64 = 30.0;

/// Freehand paths are re-simplified after this many new samples.
pub const DEFAULT_SIMPLIFY_EVERY_N: usize = 5;
