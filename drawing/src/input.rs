//! Input model: tools, modes, and the in-progress drawing session.
//!
//! `Tool` and `Mode` capture what the operator intends. `DrawingSession` is
//! the transient state tracked between the first point and commit or cancel:
//! the working path plus undo and redo history. It is reset whenever the
//! engine returns to idle.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use geometry::Coordinate;
use serde::{Deserialize, Serialize};

/// Which drawing tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Tap vertices; closes when a tap lands near the first vertex.
    #[default]
    Polygon,
    /// Tap two opposite corners.
    Rectangle,
    /// Drag to trace an outline.
    Freehand,
    /// Drag from the center outward.
    Circle,
    /// Tap inside a saved area to delete it.
    Eraser,
}

impl Tool {
    /// Whether this tool is driven by discrete taps.
    #[must_use]
    pub fn is_tap(self) -> bool {
        matches!(self, Self::Polygon | Self::Rectangle | Self::Eraser)
    }

    /// Whether this tool is driven by a continuous drag.
    #[must_use]
    pub fn is_drag(self) -> bool {
        matches!(self, Self::Freehand | Self::Circle)
    }
}

/// Top-level interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "tool", rename_all = "lowercase")]
pub enum Mode {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Building a shape with the given tool.
    Drawing(Tool),
    /// Tapping out an ad-hoc distance or area.
    Measuring,
}

/// Working path plus history for the shape being built.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    /// Tool selected while idle; applies to the next gesture.
    pub tool: Tool,
    /// Current interaction mode.
    pub mode: Mode,
    /// Working path in insertion order.
    pub points: Vec<Coordinate>,
    /// Circle center, fixed by the first drag sample.
    pub anchor: Option<Coordinate>,
    /// Freehand samples appended since the last simplification pass.
    pub samples_since_simplify: usize,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

/// One undo step: the path and the circle center that went with it.
#[derive(Debug, Clone)]
struct Snapshot {
    points: Vec<Coordinate>,
    anchor: Option<Coordinate>,
}

impl DrawingSession {
    #[must_use]
    pub fn new(tool: Tool) -> Self {
        Self { tool, ..Self::default() }
    }

    /// Snapshot the current path onto the undo stack and drop redo history.
    pub fn checkpoint(&mut self) {
        self.undo_stack.push(Snapshot { points: self.points.clone(), anchor: self.anchor });
        self.redo_stack.clear();
    }

    /// Append a point after checkpointing.
    pub fn push_point(&mut self, point: Coordinate) {
        self.checkpoint();
        self.points.push(point);
    }

    /// Restore the previous path. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.restore(previous);
        self.redo_stack.push(current);
        true
    }

    /// Re-apply the last undone path. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.restore(next);
        self.undo_stack.push(current);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop the whole session, keeping only the selected tool.
    pub fn reset(&mut self) {
        *self = Self::new(self.tool);
    }

    /// Number of distinct vertices in the working path.
    #[must_use]
    pub fn distinct_points(&self) -> usize {
        distinct_count(&self.points)
    }

    /// Swap `snapshot` in, returning the state it replaced.
    fn restore(&mut self, snapshot: Snapshot) -> Snapshot {
        let replaced = Snapshot {
            points: std::mem::replace(&mut self.points, snapshot.points),
            anchor: std::mem::replace(&mut self.anchor, snapshot.anchor),
        };
        if self.points.is_empty() {
            self.samples_since_simplify = 0;
        }
        replaced
    }
}

/// Number of distinct coordinates in `points`.
#[must_use]
pub fn distinct_count(points: &[Coordinate]) -> usize {
    let mut seen: Vec<Coordinate> = Vec::with_capacity(points.len());
    for point in points {
        if !seen.contains(point) {
            seen.push(*point);
        }
    }
    seen.len()
}
