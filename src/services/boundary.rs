//! Boundary service: live proximity alerts against an armed field edge.
//!
//! DESIGN
//! ======
//! `BoundaryMonitor` is plain synchronous state: the armed polygon, the
//! thresholds, and the last zone reported. `spawn_boundary_task` wraps it
//! in a background task that evaluates the latest position fix each time
//! the position channel changes. A `watch` channel only keeps the newest
//! value, so a slow consumer skips stale fixes instead of queueing them.
//!
//! ERROR HANDLING
//! ==============
//! Arming with fewer than three valid vertices is rejected. Non-finite
//! fixes are ignored. The task exits when either input channel closes or
//! the reading receiver is dropped.

#[cfg(test)]
#[path = "boundary_test.rs"]
mod boundary_test;

use geometry::consts::FEET_PER_METER;
use geometry::{BoundaryZone, Coordinate, HapticIntensity, ZoneThresholds, point_to_polygon_distance};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const MIN_BOUNDARY_VERTICES: usize = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoundaryError {
    #[error("boundary needs at least {MIN_BOUNDARY_VERTICES} vertices, got {got}")]
    TooFewVertices { got: usize },
    #[error("boundary vertex {index} is not a valid coordinate")]
    InvalidVertex { index: usize },
}

/// One evaluated fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundaryReading {
    pub distance_feet: f64,
    pub zone: BoundaryZone,
    pub haptic: HapticIntensity,
    /// The zone differs from the previous reading (or this is the first one).
    pub zone_changed: bool,
}

impl BoundaryReading {
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.zone.message()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoundaryMonitor {
    thresholds: ZoneThresholds,
    boundary: Option<Vec<Coordinate>>,
    last_zone: Option<BoundaryZone>,
}

impl BoundaryMonitor {
    #[must_use]
    pub fn new(thresholds: ZoneThresholds) -> Self {
        Self { thresholds, boundary: None, last_zone: None }
    }

    /// Arm against `polygon`, replacing any previous boundary.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundaryError`] if the polygon has fewer than three
    /// vertices or any vertex is out of range.
    pub fn arm(&mut self, polygon: Vec<Coordinate>) -> Result<(), BoundaryError> {
        validate_boundary(&polygon)?;
        info!(vertices = polygon.len(), "boundary armed");
        self.boundary = Some(polygon);
        self.last_zone = None;
        Ok(())
    }

    pub fn disarm(&mut self) {
        if self.boundary.take().is_some() {
            info!("boundary disarmed");
        }
        self.last_zone = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.boundary.is_some()
    }

    #[must_use]
    pub fn thresholds(&self) -> ZoneThresholds {
        self.thresholds
    }

    /// Distance and zone for `position`, or `None` when disarmed or the fix
    /// is not finite.
    pub fn evaluate(&mut self, position: Coordinate) -> Option<BoundaryReading> {
        let boundary = self.boundary.as_deref()?;
        if !position.is_finite() {
            debug!(?position, "ignoring non-finite fix");
            return None;
        }

        let distance_feet = point_to_polygon_distance(position, boundary) * FEET_PER_METER;
        let zone = self.thresholds.classify(distance_feet);
        let zone_changed = self.last_zone != Some(zone);
        if zone_changed {
            debug!(?zone, distance_feet, "boundary zone changed");
        }
        self.last_zone = Some(zone);

        Some(BoundaryReading { distance_feet, zone, haptic: zone.haptic(), zone_changed })
    }
}

fn validate_boundary(polygon: &[Coordinate]) -> Result<(), BoundaryError> {
    if polygon.len() < MIN_BOUNDARY_VERTICES {
        return Err(BoundaryError::TooFewVertices { got: polygon.len() });
    }
    match polygon.iter().position(|c| !c.is_valid()) {
        Some(index) => Err(BoundaryError::InvalidVertex { index }),
        None => Ok(()),
    }
}

/// Spawn the monitor task. Returns a handle for shutdown.
///
/// `boundary` arms (`Some`) or disarms (`None`) the monitor; `positions`
/// carries the latest fix. Every reading is sent on `readings`. A boundary
/// change is applied before a fix that arrived alongside it.
pub fn spawn_boundary_task(
    mut monitor: BoundaryMonitor,
    mut boundary: watch::Receiver<Option<Vec<Coordinate>>>,
    mut positions: watch::Receiver<Option<Coordinate>>,
    readings: mpsc::Sender<BoundaryReading>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        apply_boundary(&mut monitor, boundary.borrow_and_update().clone());
        loop {
            tokio::select! {
                biased;
                changed = boundary.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    apply_boundary(&mut monitor, boundary.borrow_and_update().clone());
                }
                changed = positions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let fix = *positions.borrow_and_update();
                    let Some(reading) = fix.and_then(|p| monitor.evaluate(p)) else {
                        continue;
                    };
                    if readings.send(reading).await.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("boundary task stopped");
    })
}

fn apply_boundary(monitor: &mut BoundaryMonitor, polygon: Option<Vec<Coordinate>>) {
    match polygon {
        Some(polygon) => {
            if let Err(e) = monitor.arm(polygon) {
                tracing::warn!(error = %e, "rejected boundary; monitor disarmed");
                monitor.disarm();
            }
        }
        None => monitor.disarm(),
    }
}
