//! Layout Scenario Tests - Placement, Calibration, Zoom, and Units
//!
//! End-to-end checks of the layout core: capacity and undo behavior of the
//! placement store, two-point calibration, the zoom fixed point, and the
//! feet/meter conversion.

use windfarm_canvas_engine::geometry::{CanvasPoint, WidgetSize};
use windfarm_canvas_engine::layout::{
    CalibrationEngine, CalibrationError, CalibrationMode, LengthUnit, PlacementStore, to_metric,
};
use windfarm_canvas_engine::view::{ViewTransform, ZoomDirection};

fn p(x: f32, y: f32) -> CanvasPoint {
    CanvasPoint::new(x, y)
}

/// Run a full calibration attempt on `engine`.
fn calibrate(
    engine: &mut CalibrationEngine,
    a: CanvasPoint,
    b: CanvasPoint,
    length: Option<f32>,
) -> Result<f32, CalibrationError> {
    engine.activate();
    engine.add_point(a);
    engine.add_point(b);
    engine.finish(length)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_eleventh_placement_rejected() {
    let engine = CalibrationEngine::default();
    let mut store = PlacementStore::default();
    assert_eq!(store.capacity(), 10);

    let results: Vec<_> = (0..11)
        .map(|i| store.place(p(i as f32, 2.0 * i as f32), engine.ratio()))
        .collect();

    assert!(results[..10].iter().all(|r| r.is_ok()));
    assert!(results[10].is_err());
    assert_eq!(store.len(), 10);
    assert_eq!(store.markers()[9].display_position, p(9.0, 18.0));
}

#[test]
fn test_scenario_calibrate_then_place() {
    let mut engine = CalibrationEngine::default();
    let ratio = calibrate(&mut engine, p(0.0, 0.0), p(10.0, 0.0), Some(50.0)).unwrap();
    assert_eq!(ratio, 5.0);
    assert_eq!(engine.ratio(), 5.0);

    let mut store = PlacementStore::default();
    let marker = store.place(p(2.0, 0.0), engine.ratio()).unwrap();
    assert_eq!(marker.real_position, p(10.0, 0.0));
}

#[test]
fn test_scenario_identical_points_keep_ratio() {
    let mut engine = CalibrationEngine::default();
    let result = calibrate(&mut engine, p(0.0, 0.0), p(0.0, 0.0), Some(50.0));
    assert_eq!(result, Err(CalibrationError::DegenerateSelection));
    assert_eq!(engine.ratio(), 1.0);
    assert_eq!(engine.mode(), CalibrationMode::Idle);
}

#[test]
fn test_scenario_undo_twice_leaves_first() {
    let mut store = PlacementStore::default();
    let first = store.place(p(1.0, 1.0), 1.0).unwrap();
    store.place(p(2.0, 2.0), 1.0).unwrap();
    store.place(p(3.0, 3.0), 1.0).unwrap();

    store.undo_last();
    store.undo_last();
    assert_eq!(store.markers(), &[first]);
}

// ============================================================================
// Placement Properties
// ============================================================================

#[test]
fn test_capacity_never_exceeded() {
    for capacity in [1, 3, 10] {
        let mut store = PlacementStore::new(capacity);
        for i in 0..25 {
            let before = store.markers().to_vec();
            let result = store.place(p(i as f32, 0.0), 1.0);
            assert!(store.len() <= capacity);
            if result.is_err() {
                assert_eq!(store.markers(), before.as_slice());
            }
        }
        assert_eq!(store.len(), capacity);
    }
}

#[test]
fn test_undo_inverts_place_under_interleaving() {
    let mut store = PlacementStore::new(50);
    // place, place, undo, place, undo, undo, place ...
    let script = [true, true, false, true, false, false, true, true, false];
    for (i, place) in script.iter().enumerate() {
        if *place {
            let before = store.markers().to_vec();
            store.place(p(i as f32, i as f32), 2.0).unwrap();
            let mut probe = store.clone();
            probe.undo_last();
            assert_eq!(probe.markers(), before.as_slice());
        } else {
            store.undo_last();
        }
    }
    assert_eq!(store.len(), 1);
    assert_eq!(store.markers()[0].display_position, p(6.0, 6.0));
}

#[test]
fn test_recalibration_does_not_touch_placed_markers() {
    let mut engine = CalibrationEngine::default();
    let mut store = PlacementStore::default();
    store.place(p(4.0, 4.0), engine.ratio()).unwrap();

    calibrate(&mut engine, p(0.0, 0.0), p(0.0, 2.0), Some(10.0)).unwrap();
    store.place(p(4.0, 4.0), engine.ratio()).unwrap();

    assert_eq!(store.markers()[0].real_position, p(4.0, 4.0));
    assert_eq!(store.markers()[1].real_position, p(20.0, 20.0));
}

// ============================================================================
// Calibration Properties
// ============================================================================

#[test]
fn test_calibration_ratio_is_length_over_distance() {
    let cases = [
        (p(0.0, 0.0), p(3.0, 4.0), 10.0, 2.0),
        (p(-5.0, 0.0), p(5.0, 0.0), 25.0, 2.5),
        (p(1.0, 1.0), p(1.0, 5.0), 1.0, 0.25),
    ];
    for (a, b, length, expected) in cases {
        let mut engine = CalibrationEngine::default();
        let ratio = calibrate(&mut engine, a, b, Some(length)).unwrap();
        assert!((ratio - expected).abs() < 1e-6, "{a:?} {b:?} -> {ratio}");
    }
}

#[test]
fn test_non_positive_length_keeps_previous_ratio() {
    let mut engine = CalibrationEngine::default();
    calibrate(&mut engine, p(0.0, 0.0), p(10.0, 0.0), Some(30.0)).unwrap();
    assert_eq!(engine.ratio(), 3.0);

    for bad in [Some(0.0), Some(-4.0), Some(f32::NAN), None] {
        assert!(calibrate(&mut engine, p(0.0, 0.0), p(10.0, 0.0), bad).is_err());
        assert_eq!(engine.ratio(), 3.0);
        assert!(!engine.is_active());
        assert!(engine.points().is_empty());
    }
}

// ============================================================================
// View Properties
// ============================================================================

#[test]
fn test_zoom_keeps_cursor_fixed() {
    let widget = WidgetSize::new(640.0, 480.0);
    let mut view = ViewTransform::default();
    let cursor = p(30.0, 70.0);

    for direction in [ZoomDirection::In, ZoomDirection::In, ZoomDirection::Out] {
        let screen = view.canvas_to_screen(cursor, widget);
        view.zoom_at(cursor, direction);
        let after = view.screen_to_canvas(screen, widget).unwrap();
        assert!(after.distance(&cursor) < 1e-3, "{after:?}");
    }
}

#[test]
fn test_zoom_in_then_out_restores_window() {
    let mut view = ViewTransform::default();
    let start = *view.state();
    view.zoom_at(p(12.0, 80.0), ZoomDirection::In);
    assert!(view.state().x_range.width() < start.x_range.width());
    view.zoom_at(p(12.0, 80.0), ZoomDirection::Out);
    assert!((view.state().x_range.min - start.x_range.min).abs() < 1e-3);
    assert!((view.state().y_range.max - start.y_range.max).abs() < 1e-3);
}

// ============================================================================
// Unit Properties
// ============================================================================

#[test]
fn test_feet_meter_round_trip() {
    for feet in [0.0_f32, 1.0, 3.5, 328.084, -120.0, 1.0e6] {
        let back = to_metric(feet) / 0.3048;
        assert!((back - feet).abs() <= feet.abs() * 1e-6 + 1e-6, "{feet} -> {back}");
        let via_unit = LengthUnit::Feet.from_metric(LengthUnit::Feet.to_metric(feet));
        assert!((via_unit - feet).abs() <= feet.abs() * 1e-6 + 1e-6);
    }
    assert_eq!(LengthUnit::Meters.to_metric(42.0), 42.0);
}
