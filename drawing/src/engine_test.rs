#![allow(clippy::float_cmp)]

use geometry::Coordinate;

use super::*;
use crate::package::ServicePackage;

// =============================================================
// Helpers
// =============================================================

fn c(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon)
}

/// Four corners of a roughly 220 m square near 40N.
fn square() -> [Coordinate; 4] {
    [c(40.0, -90.0), c(40.0, -89.998), c(40.002, -89.998), c(40.002, -90.0)]
}

/// A tap about 7 m from the first square corner.
fn near_first() -> Coordinate {
    c(40.000_05, -90.000_05)
}

fn committed(actions: &[Action]) -> &Measurement {
    actions
        .iter()
        .find_map(|a| match a {
            Action::MeasurementCommitted(m) => Some(m),
            _ => None,
        })
        .expect("no MeasurementCommitted action")
}

fn tap_all(engine: &mut DrawingEngine, points: &[Coordinate]) {
    for p in points {
        engine.add_point(*p).unwrap();
    }
}

fn approx(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * b.abs()
}

// =============================================================
// Tool and mode transitions
// =============================================================

#[test]
fn starts_idle_with_polygon_tool() {
    let engine = DrawingEngine::new();
    assert_eq!(engine.mode(), Mode::Idle);
    assert_eq!(engine.tool(), Tool::Polygon);
    assert_eq!(engine.feedback(), Feedback::None);
}

#[test]
fn select_tool_rejected_while_busy() {
    let mut engine = DrawingEngine::new();
    engine.start_measuring().unwrap();
    assert_eq!(engine.select_tool(Tool::Circle), Err(DrawError::Busy { mode: Mode::Measuring }));
    assert_eq!(engine.start_measuring(), Err(DrawError::Busy { mode: Mode::Measuring }));
}

#[test]
fn first_tap_enters_drawing_mode() {
    let mut engine = DrawingEngine::new();
    let actions = engine.add_point(square()[0]).unwrap();
    assert_eq!(
        actions,
        vec![Action::ModeChanged(Mode::Drawing(Tool::Polygon)), Action::Feedback(Feedback::FirstPoint)]
    );
}

#[test]
fn tap_with_drag_tool_is_wrong_input() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Freehand).unwrap();
    let err = engine.add_point(square()[0]).unwrap_err();
    assert_eq!(err, DrawError::WrongInput { tool: Tool::Freehand, mode: Mode::Idle });
    assert_eq!(engine.mode(), Mode::Idle);
}

#[test]
fn drag_with_tap_tool_is_wrong_input() {
    let mut engine = DrawingEngine::new();
    engine.add_point(square()[0]).unwrap();
    let err = engine.drag_update(square()[1]).unwrap_err();
    assert!(matches!(err, DrawError::WrongInput { tool: Tool::Polygon, .. }));
    assert_eq!(engine.points().len(), 1);
}

#[test]
fn drag_in_measuring_mode_is_wrong_input() {
    let mut engine = DrawingEngine::new();
    engine.start_measuring().unwrap();
    assert!(matches!(engine.drag_update(square()[0]), Err(DrawError::WrongInput { mode: Mode::Measuring, .. })));
}

// =============================================================
// Polygon
// =============================================================

#[test]
fn feedback_tracks_point_count() {
    let mut engine = DrawingEngine::new();
    let sq = square();
    engine.add_point(sq[0]).unwrap();
    assert_eq!(engine.feedback(), Feedback::FirstPoint);

    let actions = engine.add_point(sq[1]).unwrap();
    let feet = match actions.as_slice() {
        [Action::Feedback(Feedback::Distance { feet })] => *feet,
        other => panic!("expected distance feedback, got {other:?}"),
    };
    assert!(approx(feet, geometry::distance(sq[0], sq[1]) * 3.280_84, 1e-9));

    engine.add_point(sq[2]).unwrap();
    assert!(matches!(engine.feedback(), Feedback::Area { acres, perimeter_feet } if acres > 0.0 && perimeter_feet > feet));
}

#[test]
fn polygon_closes_on_tap_near_first_vertex() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square());
    let actions = engine.add_point(near_first()).unwrap();

    let m = committed(&actions);
    assert_eq!(m.kind, MeasurementKind::Area);
    assert_eq!(m.name, "Area 1");
    assert_eq!(m.shape, Shape::Polygon(square().to_vec()));
    assert!(approx(m.value, geometry::area(&square()), 1e-12));
    assert!(m.perimeter.is_some_and(|p| p > 0.0));

    assert_eq!(engine.mode(), Mode::Idle);
    assert!(engine.points().is_empty());
    assert_eq!(engine.store.len(), 1);
    assert!(engine.measurement(&m.id).is_some());
    assert_eq!(actions.last(), Some(&Action::Feedback(Feedback::None)));
}

#[test]
fn near_tap_with_two_points_does_not_close() {
    let mut engine = DrawingEngine::new();
    let sq = square();
    tap_all(&mut engine, &sq[..2]);
    engine.add_point(near_first()).unwrap();
    assert_eq!(engine.points().len(), 3);
    assert_eq!(engine.mode(), Mode::Drawing(Tool::Polygon));
}

#[test]
fn close_radius_comes_from_config() {
    let config = DrawingConfig { close_radius_m: 1.0, ..DrawingConfig::default() };
    let mut engine = DrawingEngine::with_config(config);
    tap_all(&mut engine, &square());
    engine.add_point(near_first()).unwrap();
    assert_eq!(engine.points().len(), 5);
    assert!(engine.store.is_empty());
}

#[test]
fn explicit_commit_of_open_polygon() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..3]);
    let actions = engine.commit().unwrap();
    assert_eq!(committed(&actions).shape.points().len(), 3);
}

#[test]
fn undo_three_times_then_commit_fails() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..3]);
    for _ in 0..3 {
        assert_eq!(engine.undo().len(), 1);
    }
    assert!(engine.undo().is_empty());

    let err = engine.commit().unwrap_err();
    assert_eq!(err, DrawError::TooFewPoints { required: 3, got: 0 });
    assert_eq!(engine.mode(), Mode::Drawing(Tool::Polygon));
    assert!(engine.store.is_empty());
}

#[test]
fn failed_commit_leaves_session_intact() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..2]);
    assert_eq!(engine.commit(), Err(DrawError::TooFewPoints { required: 3, got: 2 }));
    assert_eq!(engine.points(), &square()[..2]);
    assert!(engine.can_undo());
}

#[test]
fn repeated_vertices_do_not_count() {
    let mut engine = DrawingEngine::new();
    let sq = square();
    tap_all(&mut engine, &[sq[0], sq[1], sq[1]]);
    assert_eq!(engine.commit(), Err(DrawError::TooFewPoints { required: 3, got: 2 }));
}

#[test]
fn redo_restores_undone_point() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..2]);
    engine.undo();
    assert_eq!(engine.points().len(), 1);
    assert!(engine.can_redo());
    engine.redo();
    assert_eq!(engine.points(), &square()[..2]);
    assert!(engine.redo().is_empty());
}

#[test]
fn new_point_clears_redo() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..2]);
    engine.undo();
    engine.add_point(square()[2]).unwrap();
    assert!(!engine.can_redo());
}

// =============================================================
// Rectangle
// =============================================================

#[test]
fn rectangle_two_taps_commit_four_corners() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Rectangle).unwrap();
    let a = c(40.0, -90.0);
    let b = c(40.001, -89.999);

    let first = engine.add_point(a).unwrap();
    assert_eq!(first[0], Action::ModeChanged(Mode::Drawing(Tool::Rectangle)));
    let actions = engine.add_point(b).unwrap();

    let m = committed(&actions);
    let expected = vec![a, c(40.0, -89.999), b, c(40.001, -90.0)];
    assert_eq!(m.shape, Shape::Polygon(expected.clone()));
    assert_eq!(m.kind, MeasurementKind::Area);
    assert!(approx(m.value, geometry::area(&expected), 1e-12));
    assert!(approx(m.perimeter.unwrap_or_default(), geometry::perimeter(&expected, true), 1e-12));
    assert_eq!(engine.mode(), Mode::Idle);
    assert_eq!(engine.tool(), Tool::Rectangle);
}

#[test]
fn degenerate_rectangle_is_rejected() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Rectangle).unwrap();
    engine.add_point(c(40.0, -90.0)).unwrap();
    let err = engine.add_point(c(40.0, -89.999)).unwrap_err();
    assert_eq!(err, DrawError::TooFewPoints { required: 3, got: 2 });
    assert!(engine.store.is_empty());

    assert_eq!(engine.mode(), Mode::Drawing(Tool::Rectangle));
    assert_eq!(engine.points(), &[c(40.0, -90.0)]);

    let actions = engine.add_point(c(40.001, -89.999)).unwrap();
    let m = committed(&actions);
    assert_eq!(m.kind, MeasurementKind::Area);
    assert_eq!(m.shape.points().len(), 4);
    assert_eq!(engine.mode(), Mode::Idle);
    assert_eq!(engine.store.len(), 1);
}

#[test]
fn rectangle_at_equator_matches_side_squared() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Rectangle).unwrap();
    engine.add_point(c(0.0, 0.0)).unwrap();
    let actions = engine.add_point(c(0.001, 0.001)).unwrap();
    let m = committed(&actions);

    // 0.001 deg is 111.32 m on each side at the equator.
    let side_m = 111.32;
    let expected_acres = side_m * side_m / 4046.86;
    let expected_perimeter_ft = 4.0 * side_m * 3.280_84;
    assert!(approx(m.value, expected_acres, 0.001), "area {}", m.value);
    let perimeter = m.perimeter.unwrap();
    assert!(approx(perimeter, expected_perimeter_ft, 0.005), "perimeter {perimeter}");
}

// =============================================================
// Freehand
// =============================================================

#[test]
fn freehand_simplifies_every_fifth_sample() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Freehand).unwrap();
    for i in 0..4 {
        engine.drag_update(c(40.0, -90.0 + f64::from(i) * 0.0001)).unwrap();
    }
    assert_eq!(engine.points().len(), 4);
    engine.drag_update(c(40.0, -89.9996)).unwrap();
    // Five colinear samples collapse to their endpoints.
    assert_eq!(engine.points().len(), 2);
}

#[test]
fn freehand_loop_commits_area() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Freehand).unwrap();
    let sq = square();
    let mut samples = Vec::new();
    for i in 0..4 {
        let (from, to) = (sq[i], sq[(i + 1) % 4]);
        for step in 0..4 {
            let t = f64::from(step) / 4.0;
            samples.push(c(
                from.latitude + (to.latitude - from.latitude) * t,
                from.longitude + (to.longitude - from.longitude) * t,
            ));
        }
    }
    for s in &samples {
        engine.drag_update(*s).unwrap();
    }
    let actions = engine.drag_end().unwrap();
    let m = committed(&actions);
    assert_eq!(m.kind, MeasurementKind::Area);
    assert!(approx(m.value, geometry::area(&sq), 0.01), "{} vs {}", m.value, geometry::area(&sq));
    assert!(m.shape.points().len() < samples.len());
    assert_eq!(engine.mode(), Mode::Idle);
}

#[test]
fn short_freehand_drag_is_discarded() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Freehand).unwrap();
    engine.drag_update(c(40.0, -90.0)).unwrap();
    engine.drag_update(c(40.0, -89.999)).unwrap();
    let err = engine.drag_end().unwrap_err();
    assert_eq!(err, DrawError::TooFewPoints { required: 3, got: 2 });
    assert_eq!(engine.mode(), Mode::Idle);
    assert!(engine.points().is_empty());
    assert!(engine.store.is_empty());
}

// =============================================================
// Circle
// =============================================================

#[test]
fn circle_first_sample_is_center() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Circle).unwrap();
    let actions = engine.drag_update(c(40.0, -90.0)).unwrap();
    assert_eq!(
        actions,
        vec![Action::ModeChanged(Mode::Drawing(Tool::Circle)), Action::Feedback(Feedback::FirstPoint)]
    );
}

#[test]
fn circle_regenerates_polygon_each_update() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Circle).unwrap();
    let center = c(40.0, -90.0);
    engine.drag_update(center).unwrap();
    engine.drag_update(c(40.0005, -90.0)).unwrap();
    assert_eq!(engine.points().len(), 60);
    engine.drag_update(c(40.001, -90.0)).unwrap();
    assert_eq!(engine.points().len(), 60);

    let edge = c(40.001, -90.0);
    let radius = geometry::distance(center, edge);
    let expected_acres = std::f64::consts::PI * radius * radius / 4046.86;
    let actions = engine.drag_end().unwrap();
    let m = committed(&actions);
    assert!(approx(m.value, expected_acres, 0.01), "{} vs {expected_acres}", m.value);
}

#[test]
fn circle_without_radius_is_discarded() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Circle).unwrap();
    engine.drag_update(c(40.0, -90.0)).unwrap();
    assert_eq!(engine.drag_end(), Err(DrawError::TooFewPoints { required: 3, got: 1 }));
    assert_eq!(engine.mode(), Mode::Idle);
}

#[test]
fn undo_during_circle_clears_center() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Circle).unwrap();
    engine.drag_update(c(40.0, -90.0)).unwrap();
    engine.drag_update(c(40.001, -90.0)).unwrap();
    engine.undo();
    assert!(engine.points().is_empty());
    // Next sample becomes a fresh center.
    engine.drag_update(c(41.0, -91.0)).unwrap();
    assert_eq!(engine.points(), &[c(41.0, -91.0)]);
}

#[test]
fn redo_restores_circle_center() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Circle).unwrap();
    let center = c(40.0, -90.0);
    engine.drag_update(center).unwrap();
    engine.drag_update(c(40.001, -90.0)).unwrap();
    engine.undo();
    engine.redo();
    assert_eq!(engine.points().len(), 60);

    // Still resizing around the original center.
    let edge = c(40.002, -90.0);
    engine.drag_update(edge).unwrap();
    assert_eq!(engine.points().len(), 60);
    let radius = geometry::distance(center, edge);
    for vertex in engine.points() {
        assert!(approx(geometry::distance(center, *vertex), radius, 0.01));
    }
}

#[test]
fn drag_end_when_idle_has_nothing_to_commit() {
    let mut engine = DrawingEngine::new();
    assert_eq!(engine.drag_end(), Err(DrawError::NothingToCommit));
}

// =============================================================
// Measuring
// =============================================================

#[test]
fn measuring_two_points_commits_distance() {
    let mut engine = DrawingEngine::new();
    engine.start_measuring().unwrap();
    let sq = square();
    tap_all(&mut engine, &sq[..2]);
    let actions = engine.commit().unwrap();
    let m = committed(&actions);
    assert_eq!(m.kind, MeasurementKind::Distance);
    assert_eq!(m.name, "Distance 1");
    assert_eq!(m.shape, Shape::Line(sq[..2].to_vec()));
    assert!(approx(m.value, geometry::perimeter(&sq[..2], false), 1e-12));
    assert_eq!(m.perimeter, None);
}

#[test]
fn measuring_three_points_commits_area() {
    let mut engine = DrawingEngine::new();
    engine.start_measuring().unwrap();
    tap_all(&mut engine, &square()[..3]);
    let m = committed(&engine.commit().unwrap()).clone();
    assert_eq!(m.kind, MeasurementKind::Area);
}

#[test]
fn measuring_does_not_auto_close() {
    let mut engine = DrawingEngine::new();
    engine.start_measuring().unwrap();
    tap_all(&mut engine, &square());
    engine.add_point(near_first()).unwrap();
    assert_eq!(engine.points().len(), 5);
}

#[test]
fn measuring_single_point_is_too_few() {
    let mut engine = DrawingEngine::new();
    engine.start_measuring().unwrap();
    engine.add_point(square()[0]).unwrap();
    assert_eq!(engine.commit(), Err(DrawError::TooFewPoints { required: 2, got: 1 }));
}

#[test]
fn commit_when_idle_is_nothing_to_commit() {
    let mut engine = DrawingEngine::new();
    assert_eq!(engine.commit(), Err(DrawError::NothingToCommit));
}

// =============================================================
// Cancel
// =============================================================

#[test]
fn cancel_discards_session() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..3]);
    let actions = engine.cancel();
    assert_eq!(actions, vec![Action::ModeChanged(Mode::Idle), Action::Feedback(Feedback::None)]);
    assert!(engine.points().is_empty());
    assert!(!engine.can_undo());
    assert!(engine.store.is_empty());
}

#[test]
fn cancel_when_idle_is_silent() {
    let mut engine = DrawingEngine::new();
    assert!(engine.cancel().is_empty());
    assert!(engine.undo().is_empty());
}

// =============================================================
// Eraser and store hand-off
// =============================================================

#[test]
fn eraser_requests_delete_of_area_under_tap() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square());
    let id = committed(&engine.add_point(near_first()).unwrap()).id;

    engine.select_tool(Tool::Eraser).unwrap();
    let actions = engine.add_point(c(40.001, -89.999)).unwrap();
    assert_eq!(actions, vec![Action::DeleteRequested { id }]);
    assert_eq!(engine.mode(), Mode::Idle);
    assert!(engine.points().is_empty());
    // The engine never deletes on its own.
    assert_eq!(engine.store.len(), 1);

    assert!(engine.apply_delete(&id).is_some());
    assert!(engine.store.is_empty());
}

#[test]
fn eraser_miss_returns_nothing() {
    let mut engine = DrawingEngine::new();
    engine.select_tool(Tool::Eraser).unwrap();
    assert!(engine.add_point(c(10.0, 10.0)).unwrap().is_empty());
}

#[test]
fn default_names_count_per_kind() {
    let mut engine = DrawingEngine::new();
    for _ in 0..2 {
        tap_all(&mut engine, &square()[..3]);
        engine.commit().unwrap();
    }
    engine.start_measuring().unwrap();
    tap_all(&mut engine, &square()[..2]);
    engine.commit().unwrap();

    let mut names: Vec<_> = engine.store.sorted_by_recent().iter().map(|m| m.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["Area 1", "Area 2", "Distance 1"]);
}

#[test]
fn default_name_skips_deleted_numbers() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..3]);
    let first = committed(&engine.commit().unwrap()).id;
    tap_all(&mut engine, &square()[..3]);
    engine.commit().unwrap();
    engine.apply_delete(&first);

    tap_all(&mut engine, &square()[..3]);
    assert_eq!(committed(&engine.commit().unwrap()).name, "Area 3");
}

#[test]
fn drawn_areas_carry_the_service_package() {
    let mut engine = DrawingEngine::new();
    assert_eq!(engine.service_package(), ServicePackage::Medium);
    tap_all(&mut engine, &square()[..3]);
    let m = committed(&engine.commit().unwrap()).clone();
    assert_eq!(m.service_package, Some(ServicePackage::Medium));

    engine.set_service_package(ServicePackage::Max);
    tap_all(&mut engine, &square()[..3]);
    let m = committed(&engine.commit().unwrap()).clone();
    assert_eq!(m.service_package, Some(ServicePackage::Max));
    let est = m.estimate().unwrap();
    assert!(approx(est.cost, m.value * 3500.0, 1e-9));
    assert!(approx(est.hours, m.value * 2.5, 1e-9));
}

#[test]
fn measuring_mode_is_not_quoted() {
    let mut engine = DrawingEngine::new();
    engine.start_measuring().unwrap();
    tap_all(&mut engine, &square()[..3]);
    let area = committed(&engine.commit().unwrap()).clone();
    assert_eq!(area.service_package, None);
    assert!(area.estimate().is_none());

    engine.start_measuring().unwrap();
    tap_all(&mut engine, &square()[..2]);
    assert!(committed(&engine.commit().unwrap()).estimate().is_none());
}

#[test]
fn gps_accuracy_is_stamped_on_commit() {
    let mut engine = DrawingEngine::new();
    engine.set_gps_accuracy(Some(3.5));
    tap_all(&mut engine, &square()[..3]);
    assert_eq!(committed(&engine.commit().unwrap()).gps_accuracy, Some(3.5));

    engine.set_gps_accuracy(Some(-1.0));
    tap_all(&mut engine, &square()[..3]);
    assert_eq!(committed(&engine.commit().unwrap()).gps_accuracy, None);
}

#[test]
fn apply_update_and_snapshot() {
    let mut engine = DrawingEngine::new();
    tap_all(&mut engine, &square()[..3]);
    let m = committed(&engine.commit().unwrap()).clone();

    assert!(engine.apply_update(m.renamed("Creek field")));
    assert_eq!(engine.measurement(&m.id).map(|m| m.name.as_str()), Some("Creek field"));

    engine.load_snapshot(Vec::new());
    assert!(engine.store.is_empty());
    assert!(!engine.apply_update(m.clone()));
    engine.apply_create(m);
    assert_eq!(engine.store.len(), 1);
}
