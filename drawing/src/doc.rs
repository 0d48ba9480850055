//! Measurement model: committed records, the in-memory store, and the JSON codec.
//!
//! A `Measurement` is produced once, on commit, and never mutated in place.
//! Renames and notes produce a whole replacement record which the owner puts
//! back with [`MeasurementStore::replace`]. Records cross the persistence
//! boundary as JSON through [`encode_measurements`] / [`decode_measurements`].

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use geometry::units::{AreaUnit, DistanceUnit};
use geometry::{Coordinate, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{MIN_LINE_POINTS, MIN_POLYGON_POINTS};
use crate::package::{ServicePackage, WorkEstimate};

/// Unique identifier for a measurement.
pub type MeasurementId = Uuid;

/// What a measurement's `value` means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// `value` is a length in feet.
    Distance,
    /// `value` is an area in acres.
    Area,
}

impl MeasurementKind {
    /// Prefix for auto-generated names, e.g. `"Area 3"`.
    #[must_use]
    pub fn default_name_prefix(self) -> &'static str {
        match self {
            Self::Distance => "Distance",
            Self::Area => "Area",
        }
    }
}

/// Geometry of a committed measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "lowercase")]
pub enum Shape {
    Point(Coordinate),
    /// Exactly two points.
    Line(Path),
    /// Three or more vertices, implicitly closed.
    Polygon(Path),
}

impl Shape {
    /// Vertices in insertion order.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        match self {
            Self::Point(c) => std::slice::from_ref(c),
            Self::Line(path) | Self::Polygon(path) => path,
        }
    }

    /// Structural check applied to decoded records.
    fn validate(&self) -> Result<(), String> {
        let points = self.points();
        if let Some(bad) = points.iter().find(|c| !c.is_valid()) {
            return Err(format!("coordinate out of range: {bad:?}"));
        }
        match self {
            Self::Point(_) => Ok(()),
            Self::Line(path) if path.len() != MIN_LINE_POINTS => {
                Err(format!("line needs {MIN_LINE_POINTS} points, got {}", path.len()))
            }
            Self::Polygon(path) if path.len() < MIN_POLYGON_POINTS => {
                Err(format!("polygon needs {MIN_POLYGON_POINTS} points, got {}", path.len()))
            }
            Self::Line(_) | Self::Polygon(_) => Ok(()),
        }
    }
}

/// A committed distance or area measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub name: String,
    pub kind: MeasurementKind,
    pub shape: Shape,
    /// Feet for `Distance`, acres for `Area`.
    pub value: f64,
    /// Closed perimeter in feet; `Area` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perimeter: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Horizontal accuracy of the fix at commit time, in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_accuracy: Option<f64>,
    /// Package a drawn work area is quoted at; `Area` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_package: Option<ServicePackage>,
}

impl Measurement {
    /// A copy of this record under a new name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self.clone() }
    }

    /// A copy of this record with `notes` replaced. Empty notes clear the field.
    #[must_use]
    pub fn with_notes(&self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        Self { notes: (!notes.is_empty()).then_some(notes), ..self.clone() }
    }

    /// Cost and time for a quoted area, `None` for distances and unquoted areas.
    #[must_use]
    pub fn estimate(&self) -> Option<WorkEstimate> {
        match self.kind {
            MeasurementKind::Area => self.service_package.map(|p| p.estimate(self.value)),
            MeasurementKind::Distance => None,
        }
    }

    /// The value in the operator's preferred units, e.g. `"3.06 ac"`.
    #[must_use]
    pub fn formatted_value(&self, distance_unit: DistanceUnit, area_unit: AreaUnit) -> String {
        match self.kind {
            MeasurementKind::Distance => distance_unit.format(self.value),
            MeasurementKind::Area => area_unit.format(self.value),
        }
    }
}

/// In-memory store of committed measurements.
///
/// Each record carries an insertion sequence so that "most recent" stays
/// well-defined when several commits land in the same millisecond.
pub struct MeasurementStore {
    measurements: HashMap<MeasurementId, (u64, Measurement)>,
    next_seq: u64,
    /// Highest default-name number handed out per kind. Never decreases on
    /// removal, so names are not reused.
    name_counters: HashMap<MeasurementKind, usize>,
}

impl MeasurementStore {
    #[must_use]
    pub fn new() -> Self {
        Self { measurements: HashMap::new(), next_seq: 0, name_counters: HashMap::new() }
    }

    /// Insert a measurement. An existing record with the same id is overwritten
    /// and moves to the top.
    pub fn insert(&mut self, measurement: Measurement) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(n) = default_name_number(&measurement) {
            let counter = self.name_counters.entry(measurement.kind).or_insert(0);
            *counter = (*counter).max(n);
        }
        self.measurements.insert(measurement.id, (seq, measurement));
    }

    /// Remove a measurement by id, returning it if it was present.
    pub fn remove(&mut self, id: &MeasurementId) -> Option<Measurement> {
        self.measurements.remove(id).map(|(_, m)| m)
    }

    #[must_use]
    pub fn get(&self, id: &MeasurementId) -> Option<&Measurement> {
        self.measurements.get(id).map(|(_, m)| m)
    }

    /// Swap in a whole replacement record, keeping its stacking position.
    /// Returns false if no record with that id exists.
    pub fn replace(&mut self, measurement: Measurement) -> bool {
        let Some(slot) = self.measurements.get_mut(&measurement.id) else {
            return false;
        };
        slot.1 = measurement;
        true
    }

    /// Replace all measurements with a full snapshot. Newer records stack on
    /// top; records with equal `created_at` keep their snapshot order.
    pub fn load_snapshot(&mut self, mut measurements: Vec<Measurement>) {
        self.measurements.clear();
        self.name_counters.clear();
        measurements.sort_by_key(|m| m.created_at);
        for measurement in measurements {
            self.insert(measurement);
        }
    }

    /// All measurements bottom to top, the order `load_snapshot` rebuilds.
    #[must_use]
    pub fn to_snapshot(&self) -> Vec<Measurement> {
        let mut entries: Vec<&(u64, Measurement)> = self.measurements.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, m)| m.clone()).collect()
    }

    /// Next auto-generated name for `kind`, e.g. `"Area 3"`.
    #[must_use]
    pub fn next_default_name(&self, kind: MeasurementKind) -> String {
        let issued = self.name_counters.get(&kind).copied().unwrap_or(0);
        format!("{} {}", kind.default_name_prefix(), issued + 1)
    }

    /// All measurements, newest first by `created_at`, then by insertion.
    #[must_use]
    pub fn sorted_by_recent(&self) -> Vec<&Measurement> {
        let mut entries: Vec<&(u64, Measurement)> = self.measurements.values().collect();
        entries.sort_by(|(seq_a, a), (seq_b, b)| b.created_at.cmp(&a.created_at).then_with(|| seq_b.cmp(seq_a)));
        entries.into_iter().map(|(_, m)| m).collect()
    }

    /// The most recently inserted measurement matching `pred`.
    pub fn topmost(&self, mut pred: impl FnMut(&Measurement) -> bool) -> Option<&Measurement> {
        self.measurements
            .values()
            .filter(|(_, m)| pred(m))
            .max_by_key(|(seq, _)| *seq)
            .map(|(_, m)| m)
    }

    /// Number of stored measurements of `kind`.
    #[must_use]
    pub fn count_kind(&self, kind: MeasurementKind) -> usize {
        self.measurements.values().filter(|(_, m)| m.kind == kind).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

impl Default for MeasurementStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `n` when `m` still carries its auto-generated `"<Prefix> n"` name.
fn default_name_number(m: &Measurement) -> Option<usize> {
    let digits = m.name.strip_prefix(m.kind.default_name_prefix())?.strip_prefix(' ')?;
    match digits.parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => None,
    }
}

/// Failure crossing the JSON boundary.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("measurement json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("measurement {id} is invalid: {reason}")]
    Invalid { id: MeasurementId, reason: String },
}

/// Serialize measurements as a JSON array.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_measurements(measurements: &[Measurement]) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(measurements)?)
}

/// Parse a JSON array of measurements and check each shape.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed input and [`CodecError::Invalid`]
/// for a record whose shape breaks its point-count or coordinate-range rules.
pub fn decode_measurements(json: &str) -> Result<Vec<Measurement>, CodecError> {
    let measurements: Vec<Measurement> = serde_json::from_str(json)?;
    for m in &measurements {
        m.shape.validate().map_err(|reason| CodecError::Invalid { id: m.id, reason })?;
    }
    Ok(measurements)
}
