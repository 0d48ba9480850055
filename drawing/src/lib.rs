//! Drawing and measurement interaction engine.
//!
//! Turns a stream of taps, drags, and tool changes into validated shapes.
//! The host wires its map gestures into [`engine::DrawingEngine`] and acts on
//! the returned [`engine::Action`]s: update the live readout, hand committed
//! measurements to persistence, confirm deletions.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | `DrawingEngine`, its actions, live feedback, and `DrawError` |
//! | [`input`] | Tools, modes, and the in-progress session with undo/redo |
//! | [`doc`] | Measurement records, the in-memory store, and the JSON codec |
//! | [`hit`] | Finding the measurement under a tap |
//! | [`package`] | Service packages and per-acre cost/time estimates |
//! | [`config`] | Tunables loaded from the environment |
//! | [`consts`] | Defaults and minimum point counts |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod package;

pub use config::DrawingConfig;
pub use doc::{Measurement, MeasurementId, MeasurementKind, MeasurementStore, Shape};
pub use engine::{Action, DrawError, DrawingEngine, Feedback};
pub use input::{Mode, Tool};
pub use package::{ServicePackage, WorkEstimate};
