//! The drawing engine: tool/mode state machine and commit validation.
//!
//! Every input handler returns the [`Action`]s the host should act on, in
//! order. Errors are returned for inputs the current mode cannot accept and
//! for commits that would produce a degenerate shape; the session is left
//! untouched in both cases unless the method says otherwise.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::{SystemTime, UNIX_EPOCH};

use geometry::{Coordinate, area, circle_polygon, distance, perimeter, rectangle_from_corners, simplify};
use serde::Serialize;
use tracing::debug;

use crate::config::DrawingConfig;
use crate::consts::{MIN_LINE_POINTS, MIN_POLYGON_POINTS, RECTANGLE_TAPS};
use crate::doc::{Measurement, MeasurementId, MeasurementKind, MeasurementStore, Shape};
use crate::hit::hit_area;
use crate::input::{DrawingSession, Mode, Tool, distinct_count};
use crate::package::ServicePackage;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The interaction mode changed.
    ModeChanged(Mode),
    /// New live readout for the working path.
    Feedback(Feedback),
    /// A measurement was validated and added to the engine's store.
    MeasurementCommitted(Measurement),
    /// The eraser picked a measurement; the owner confirms with `apply_delete`.
    DeleteRequested { id: MeasurementId },
}

/// Live readout for the path being built, by point count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feedback {
    None,
    FirstPoint,
    Distance { feet: f64 },
    Area { acres: f64, perimeter_feet: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    #[error("cannot change tools while in {mode:?} mode")]
    Busy { mode: Mode },
    #[error("{tool:?} does not accept this input in {mode:?} mode")]
    WrongInput { tool: Tool, mode: Mode },
    #[error("need at least {required} points, got {got}")]
    TooFewPoints { required: usize, got: usize },
    #[error("nothing to commit")]
    NothingToCommit,
}

/// Drawing state machine plus the store of committed measurements.
pub struct DrawingEngine {
    pub store: MeasurementStore,
    pub config: DrawingConfig,
    session: DrawingSession,
    gps_accuracy: Option<f64>,
    service_package: ServicePackage,
}

impl Default for DrawingEngine {
    fn default() -> Self {
        Self::with_config(DrawingConfig::default())
    }
}

impl DrawingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: DrawingConfig) -> Self {
        Self {
            store: MeasurementStore::new(),
            config,
            session: DrawingSession::default(),
            gps_accuracy: None,
            service_package: ServicePackage::default(),
        }
    }

    // --- Data inputs ---

    /// Hydrate the store from persisted measurements.
    pub fn load_snapshot(&mut self, measurements: Vec<Measurement>) {
        self.store.load_snapshot(measurements);
    }

    /// A measurement created elsewhere (import, another device).
    pub fn apply_create(&mut self, measurement: Measurement) {
        self.store.insert(measurement);
    }

    /// Swap in an edited record. Returns false if the id is unknown.
    pub fn apply_update(&mut self, measurement: Measurement) -> bool {
        self.store.replace(measurement)
    }

    /// Confirm a deletion, usually one the eraser requested.
    pub fn apply_delete(&mut self, id: &MeasurementId) -> Option<Measurement> {
        self.store.remove(id)
    }

    /// Accuracy of the latest position fix, stamped on subsequent commits.
    pub fn set_gps_accuracy(&mut self, accuracy_m: Option<f64>) {
        self.gps_accuracy = accuracy_m.filter(|a| a.is_finite() && *a >= 0.0);
    }

    /// Package stamped on areas drawn from now on. Allowed mid-gesture; the
    /// package in effect at commit wins.
    pub fn set_service_package(&mut self, package: ServicePackage) {
        self.service_package = package;
    }

    // --- Tool / mode ---

    /// Choose the tool for the next gesture.
    ///
    /// # Errors
    ///
    /// [`DrawError::Busy`] unless idle.
    pub fn select_tool(&mut self, tool: Tool) -> Result<(), DrawError> {
        self.require_idle()?;
        self.session = DrawingSession::new(tool);
        Ok(())
    }

    /// Enter ad-hoc measuring mode.
    ///
    /// # Errors
    ///
    /// [`DrawError::Busy`] unless idle.
    pub fn start_measuring(&mut self) -> Result<Vec<Action>, DrawError> {
        self.require_idle()?;
        self.session.reset();
        self.session.mode = Mode::Measuring;
        Ok(vec![Action::ModeChanged(Mode::Measuring), Action::Feedback(Feedback::None)])
    }

    // --- Input events ---

    /// A tap on the map.
    ///
    /// From idle, a tap tool starts drawing and the eraser looks for a saved
    /// area under the tap. A polygon tap near the first vertex closes and
    /// commits the shape; the second rectangle tap commits the rectangle. A
    /// degenerate rectangle is rejected and the second tap dropped, leaving
    /// the first corner in place.
    ///
    /// # Errors
    ///
    /// [`DrawError::WrongInput`] for drag tools, or any commit error when the
    /// tap closes a shape.
    pub fn add_point(&mut self, point: Coordinate) -> Result<Vec<Action>, DrawError> {
        debug_assert!(point.is_finite(), "add_point: non-finite coordinate {point:?}");
        let mut actions = Vec::new();

        let mode = match self.session.mode {
            Mode::Idle => {
                let tool = self.session.tool;
                if tool == Tool::Eraser {
                    return Ok(self.erase_at(point));
                }
                if !tool.is_tap() {
                    return Err(self.wrong_input());
                }
                self.session.mode = Mode::Drawing(tool);
                actions.push(Action::ModeChanged(self.session.mode));
                self.session.mode
            }
            Mode::Drawing(tool) if !tool.is_tap() => return Err(self.wrong_input()),
            mode => mode,
        };

        match mode {
            Mode::Drawing(Tool::Polygon) if self.closes_polygon(point) => {
                actions.extend(self.commit()?);
            }
            Mode::Drawing(Tool::Rectangle) => {
                self.session.push_point(point);
                if self.session.points.len() == RECTANGLE_TAPS {
                    let corners = rectangle_from_corners(self.session.points[0], self.session.points[1]);
                    let taps = std::mem::replace(&mut self.session.points, corners.to_vec());
                    match self.commit() {
                        Ok(committed) => actions.extend(committed),
                        Err(err) => {
                            // Back to the first corner so the next tap retries the second.
                            self.session.points = taps;
                            self.session.undo();
                            return Err(err);
                        }
                    }
                } else {
                    actions.push(Action::Feedback(self.feedback()));
                }
            }
            _ => {
                self.session.push_point(point);
                actions.push(Action::Feedback(self.feedback()));
            }
        }
        Ok(actions)
    }

    /// A drag sample. Freehand appends; circle resizes around the first sample.
    ///
    /// # Errors
    ///
    /// [`DrawError::WrongInput`] unless the active tool is a drag tool.
    pub fn drag_update(&mut self, point: Coordinate) -> Result<Vec<Action>, DrawError> {
        debug_assert!(point.is_finite(), "drag_update: non-finite coordinate {point:?}");
        let mut actions = Vec::new();

        let tool = match self.session.mode {
            Mode::Idle if self.session.tool.is_drag() => {
                let tool = self.session.tool;
                self.session.mode = Mode::Drawing(tool);
                actions.push(Action::ModeChanged(self.session.mode));
                tool
            }
            Mode::Drawing(tool) if tool.is_drag() => tool,
            _ => return Err(self.wrong_input()),
        };

        if tool == Tool::Circle {
            self.update_circle(point);
        } else {
            self.update_freehand(point);
        }
        actions.push(Action::Feedback(self.feedback()));
        Ok(actions)
    }

    /// The drag was released: commit the traced shape.
    ///
    /// # Errors
    ///
    /// A drag too short to form a polygon is discarded (the engine returns to
    /// idle) and the validation error is returned. [`DrawError::NothingToCommit`]
    /// when idle, [`DrawError::WrongInput`] outside a drag tool.
    pub fn drag_end(&mut self) -> Result<Vec<Action>, DrawError> {
        match self.session.mode {
            Mode::Idle => Err(DrawError::NothingToCommit),
            Mode::Drawing(tool) if tool.is_drag() => self.commit().inspect_err(|err| {
                debug!(?tool, %err, "drag discarded");
                self.session.reset();
            }),
            _ => Err(self.wrong_input()),
        }
    }

    /// Step back one point. No-op when there is no history.
    pub fn undo(&mut self) -> Vec<Action> {
        if self.session.mode == Mode::Idle || !self.session.undo() {
            return Vec::new();
        }
        vec![Action::Feedback(self.feedback())]
    }

    /// Re-apply the last undone step. No-op when there is nothing to redo.
    pub fn redo(&mut self) -> Vec<Action> {
        if self.session.mode == Mode::Idle || !self.session.redo() {
            return Vec::new();
        }
        vec![Action::Feedback(self.feedback())]
    }

    /// Validate the working path and turn it into a measurement.
    ///
    /// Drawing tools commit an area. Measuring mode commits a distance for
    /// exactly two points and an area for three or more.
    ///
    /// # Errors
    ///
    /// [`DrawError::NothingToCommit`] when idle; [`DrawError::TooFewPoints`]
    /// when the path cannot form the shape, with the session left intact.
    pub fn commit(&mut self) -> Result<Vec<Action>, DrawError> {
        let (kind, shape) = match self.session.mode {
            Mode::Idle => return Err(DrawError::NothingToCommit),
            Mode::Measuring if self.session.points.len() == MIN_LINE_POINTS => {
                (MeasurementKind::Distance, Shape::Line(self.session.points.clone()))
            }
            Mode::Measuring if self.session.points.len() < MIN_LINE_POINTS => {
                return Err(DrawError::TooFewPoints { required: MIN_LINE_POINTS, got: self.session.points.len() });
            }
            Mode::Measuring | Mode::Drawing(_) => (MeasurementKind::Area, Shape::Polygon(self.polygon_path()?)),
        };

        let measurement = self.build_measurement(kind, shape);
        debug!(id = %measurement.id, ?kind, value = measurement.value, "measurement committed");
        self.store.insert(measurement.clone());
        self.session.reset();

        Ok(vec![
            Action::MeasurementCommitted(measurement),
            Action::ModeChanged(Mode::Idle),
            Action::Feedback(Feedback::None),
        ])
    }

    /// Discard the session and return to idle.
    pub fn cancel(&mut self) -> Vec<Action> {
        let was_idle = self.session.mode == Mode::Idle;
        self.session.reset();
        if was_idle {
            return Vec::new();
        }
        vec![Action::ModeChanged(Mode::Idle), Action::Feedback(Feedback::None)]
    }

    // --- Queries ---

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.session.tool
    }

    /// The working path.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.session.points
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    #[must_use]
    pub fn service_package(&self) -> ServicePackage {
        self.service_package
    }

    #[must_use]
    pub fn measurement(&self, id: &MeasurementId) -> Option<&Measurement> {
        self.store.get(id)
    }

    /// Live readout for the working path.
    #[must_use]
    pub fn feedback(&self) -> Feedback {
        if self.session.mode == Mode::Idle {
            return Feedback::None;
        }
        let points = &self.session.points;
        match points.len() {
            0 => Feedback::None,
            1 => Feedback::FirstPoint,
            2 => Feedback::Distance { feet: perimeter(points, false) },
            _ => Feedback::Area { acres: area(points), perimeter_feet: perimeter(points, true) },
        }
    }

    // --- Internals ---

    fn require_idle(&self) -> Result<(), DrawError> {
        match self.session.mode {
            Mode::Idle => Ok(()),
            mode => Err(DrawError::Busy { mode }),
        }
    }

    fn wrong_input(&self) -> DrawError {
        DrawError::WrongInput { tool: self.session.tool, mode: self.session.mode }
    }

    fn erase_at(&self, point: Coordinate) -> Vec<Action> {
        match hit_area(point, &self.store) {
            Some(id) => {
                debug!(%id, "eraser hit");
                vec![Action::DeleteRequested { id }]
            }
            None => Vec::new(),
        }
    }

    fn closes_polygon(&self, point: Coordinate) -> bool {
        let points = &self.session.points;
        match points.first() {
            Some(&first) => points.len() >= MIN_POLYGON_POINTS && distance(point, first) <= self.config.close_radius_m,
            None => false,
        }
    }

    fn update_freehand(&mut self, point: Coordinate) {
        let session = &mut self.session;
        if session.points.is_empty() {
            session.checkpoint();
        }
        session.points.push(point);
        session.samples_since_simplify += 1;
        if session.samples_since_simplify >= self.config.simplify_every_n {
            session.points = simplify(&session.points, self.config.simplify_tolerance_deg);
            session.samples_since_simplify = 0;
        }
    }

    fn update_circle(&mut self, point: Coordinate) {
        let session = &mut self.session;
        match session.anchor {
            None => {
                session.checkpoint();
                session.anchor = Some(point);
                session.points = vec![point];
            }
            Some(center) => {
                session.points = circle_polygon(center, distance(center, point), self.config.circle_segments);
            }
        }
    }

    /// The working path as a polygon, simplified once more for freehand.
    fn polygon_path(&self) -> Result<Vec<Coordinate>, DrawError> {
        let path = if self.session.mode == Mode::Drawing(Tool::Freehand) {
            simplify(&self.session.points, self.config.simplify_tolerance_deg)
        } else {
            self.session.points.clone()
        };
        let distinct = distinct_count(&path);
        if distinct < MIN_POLYGON_POINTS {
            return Err(DrawError::TooFewPoints { required: MIN_POLYGON_POINTS, got: distinct });
        }
        Ok(path)
    }

    fn build_measurement(&self, kind: MeasurementKind, shape: Shape) -> Measurement {
        let points = shape.points();
        let (value, perimeter_feet) = match kind {
            MeasurementKind::Distance => (perimeter(points, false), None),
            MeasurementKind::Area => (area(points), Some(perimeter(points, true))),
        };
        let name = self.store.next_default_name(kind);
        // Measuring-mode areas are ad-hoc readings, not quoted work.
        let service_package = match self.session.mode {
            Mode::Drawing(_) if kind == MeasurementKind::Area => Some(self.service_package),
            _ => None,
        };
        Measurement {
            id: MeasurementId::new_v4(),
            name,
            kind,
            shape,
            value,
            perimeter: perimeter_feet,
            created_at: now_ms(),
            notes: None,
            gps_accuracy: self.gps_accuracy,
            service_package,
        }
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
