//! Controller Tests - Event Routing and Render Side Effects
//!
//! Drives `InputModeController` with a recording render sink and a scripted
//! length prompt, checking which consumer each event reaches and which draw
//! commands it produces.

use std::collections::VecDeque;

use windfarm_canvas_engine::geometry::{CanvasPoint, ScreenPoint, WidgetSize};
use windfarm_canvas_engine::input::{InputEvent, KeyBindings, KeyCode, LayoutAction, MouseButton, ScrollDirection};
use windfarm_canvas_engine::layout::{
    CalibrationError, EventOutcome, ImageInfo, InputMode, InputModeController, LayoutConfig,
    LengthPrompt,
};
use windfarm_canvas_engine::render::{GlyphId, GlyphStyle, RenderSink};
use windfarm_canvas_engine::view::ViewState;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum DrawCall {
    Point(GlyphId, GlyphStyle),
    Segment(GlyphId, GlyphStyle),
    Remove(GlyphId),
}

#[derive(Default)]
struct RecordingSink {
    calls: Vec<DrawCall>,
    views: Vec<ViewState>,
    next: u64,
}

impl RecordingSink {
    fn next_id(&mut self) -> GlyphId {
        self.next += 1;
        GlyphId(self.next)
    }

    fn last_view(&self) -> ViewState {
        *self.views.last().unwrap()
    }
}

impl RenderSink for RecordingSink {
    fn draw_point(&mut self, _at: CanvasPoint, style: GlyphStyle) -> GlyphId {
        let id = self.next_id();
        self.calls.push(DrawCall::Point(id, style));
        id
    }

    fn draw_segment(&mut self, _from: CanvasPoint, _to: CanvasPoint, style: GlyphStyle) -> GlyphId {
        let id = self.next_id();
        self.calls.push(DrawCall::Segment(id, style));
        id
    }

    fn remove(&mut self, id: GlyphId) {
        self.calls.push(DrawCall::Remove(id));
    }

    fn view_changed(&mut self, view: &ViewState) {
        self.views.push(*view);
    }
}

/// Answers prompts from a queue and remembers what it was asked.
#[derive(Default)]
struct ScriptedPrompt {
    answers: VecDeque<Option<f32>>,
    asked: Vec<(String, String)>,
}

impl LengthPrompt for ScriptedPrompt {
    fn request_length(&mut self, title: &str, message: &str) -> Option<f32> {
        self.asked.push((title.to_string(), message.to_string()));
        self.answers.pop_front().flatten()
    }
}

type TestController = InputModeController<RecordingSink, ScriptedPrompt>;

fn controller_with(config: &LayoutConfig, answers: &[Option<f32>]) -> TestController {
    let prompt = ScriptedPrompt {
        answers: answers.iter().copied().collect(),
        asked: Vec::new(),
    };
    let mut c = InputModeController::new(config, RecordingSink::default(), prompt);
    // 200x200 widget over the default 0..100 window: two pixels per unit.
    c.handle_event(InputEvent::Resize {
        width: 200.0,
        height: 200.0,
    });
    c
}

fn controller(answers: &[Option<f32>]) -> TestController {
    controller_with(&LayoutConfig::default(), answers)
}

/// Primary press at the pixel showing canvas `(x, y)`.
fn click(x: f32, y: f32) -> InputEvent {
    InputEvent::primary_click(x * 2.0, 200.0 - y * 2.0)
}

fn undo() -> InputEvent {
    InputEvent::secondary_click(50.0, 50.0)
}

fn middle(pressed: bool, x: f32, y: f32) -> InputEvent {
    InputEvent::Button {
        button: MouseButton::Tertiary,
        pressed,
        position: Some(ScreenPoint::new(x, y)),
    }
}

// ============================================================================
// Placement Routing
// ============================================================================

#[test]
fn test_placement_draws_one_glyph_per_marker() {
    let mut c = controller(&[]);
    for i in 0..3 {
        assert!(matches!(
            c.handle_event(click(10.0 * i as f32, 5.0)),
            EventOutcome::Placed(_)
        ));
    }
    let points = c
        .renderer()
        .calls
        .iter()
        .filter(|call| matches!(call, DrawCall::Point(_, GlyphStyle::Turbine)))
        .count();
    assert_eq!(points, 3);
    assert_eq!(c.placement().len(), 3);
}

#[test]
fn test_undo_removes_most_recent_glyph() {
    let mut c = controller(&[]);
    c.handle_event(click(10.0, 10.0));
    c.handle_event(click(20.0, 20.0));
    let second = match c.renderer().calls.last() {
        Some(DrawCall::Point(id, _)) => *id,
        other => panic!("unexpected {other:?}"),
    };

    c.handle_event(undo());
    assert_eq!(c.renderer().calls.last(), Some(&DrawCall::Remove(second)));
    assert_eq!(c.placement().len(), 1);
}

#[test]
fn test_rejected_placement_draws_nothing() {
    let mut config = LayoutConfig::default();
    config.placement.default_capacity = 2;
    let mut c = controller_with(&config, &[]);
    c.handle_event(click(1.0, 1.0));
    c.handle_event(click(2.0, 2.0));
    let calls = c.renderer().calls.len();

    assert!(matches!(
        c.handle_event(click(3.0, 3.0)),
        EventOutcome::PlacementRejected(_)
    ));
    assert_eq!(c.renderer().calls.len(), calls);
    assert_eq!(c.placement().len(), 2);
}

// ============================================================================
// Calibration Routing
// ============================================================================

#[test]
fn test_calibration_owns_primary_click() {
    let mut c = controller(&[Some(50.0)]);
    assert_eq!(
        c.handle_event(InputEvent::key_press(KeyCode::Space)),
        EventOutcome::CalibrationStarted
    );
    assert_eq!(c.mode(), InputMode::Calibrating);

    c.handle_event(click(0.0, 0.0));
    assert_eq!(c.handle_event(click(10.0, 0.0)), EventOutcome::Calibrated { ratio: 5.0 });
    assert!(c.placement().is_empty());
    assert_eq!(c.mode(), InputMode::Normal);

    let styles: Vec<_> = c
        .renderer()
        .calls
        .iter()
        .map(|call| match call {
            DrawCall::Point(_, s) | DrawCall::Segment(_, s) => Some(*s),
            DrawCall::Remove(_) => None,
        })
        .collect();
    assert_eq!(
        styles,
        vec![
            Some(GlyphStyle::CalibrationPoint),
            Some(GlyphStyle::CalibrationPoint),
            Some(GlyphStyle::CalibrationLine),
        ]
    );

    // Placement resumes with the new ratio.
    match c.handle_event(click(2.0, 0.0)) {
        EventOutcome::Placed(m) => {
            assert!(m.real_position.distance(&CanvasPoint::new(10.0, 0.0)) < 1e-4);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_prompt_wording() {
    let mut c = controller(&[Some(1.0)]);
    c.start_calibration();
    c.handle_event(click(0.0, 0.0));
    assert!(c.prompt_mut().asked.is_empty());
    c.handle_event(click(0.0, 1.0));

    assert_eq!(
        c.prompt_mut().asked,
        vec![(
            "Scale Bar Length".to_string(),
            "Enter the real-world length of the scale bar (in feet):".to_string()
        )]
    );
}

#[test]
fn test_cancelled_prompt_returns_to_normal() {
    let mut c = controller(&[None]);
    c.start_calibration();
    c.handle_event(click(0.0, 0.0));
    assert_eq!(
        c.handle_event(click(30.0, 40.0)),
        EventOutcome::CalibrationRejected(CalibrationError::Cancelled)
    );
    assert_eq!(c.mode(), InputMode::Normal);
    assert_eq!(c.calibration().ratio(), 1.0);
}

#[test]
fn test_degenerate_selection_rejected() {
    let mut c = controller(&[Some(50.0)]);
    c.start_calibration();
    c.handle_event(click(7.0, 7.0));
    assert_eq!(
        c.handle_event(click(7.0, 7.0)),
        EventOutcome::CalibrationRejected(CalibrationError::DegenerateSelection)
    );
    assert_eq!(c.calibration().ratio(), 1.0);
    assert_eq!(c.mode(), InputMode::Normal);
}

#[test]
fn test_restart_clears_previous_calibration_glyphs() {
    let mut c = controller(&[Some(10.0)]);
    c.start_calibration();
    c.handle_event(click(0.0, 0.0));
    c.handle_event(click(0.0, 10.0));
    c.handle_event(click(50.0, 50.0));

    let before = c.renderer().calls.len();
    c.start_calibration();
    let removed: Vec<_> = c.renderer().calls[before..].to_vec();
    assert_eq!(removed.len(), 3);
    assert!(removed.iter().all(|call| matches!(call, DrawCall::Remove(_))));
    // The turbine glyph is untouched.
    assert_eq!(c.placement().len(), 1);
}

// ============================================================================
// View Routing
// ============================================================================

#[test]
fn test_middle_drag_pans_in_both_modes() {
    let mut c = controller(&[]);
    let start = c.renderer().last_view();

    assert_eq!(c.handle_event(middle(true, 100.0, 100.0)), EventOutcome::PanStarted);
    assert_eq!(
        c.handle_event(InputEvent::CursorMoved {
            position: Some(ScreenPoint::new(120.0, 100.0)),
        }),
        EventOutcome::Panned
    );
    assert_eq!(c.handle_event(middle(false, 120.0, 100.0)), EventOutcome::PanEnded);

    // Dragging right by 20 px moves the window left by 10 canvas units.
    let after = c.renderer().last_view();
    assert!((after.x_range.min - (start.x_range.min - 10.0)).abs() < 1e-4);
    assert_eq!(after.y_range, start.y_range);

    c.start_calibration();
    c.handle_event(middle(true, 0.0, 0.0));
    assert_eq!(
        c.handle_event(InputEvent::CursorMoved {
            position: Some(ScreenPoint::new(0.0, 20.0)),
        }),
        EventOutcome::Panned
    );
    assert_eq!(c.mode(), InputMode::Calibrating);
}

#[test]
fn test_cursor_motion_without_drag_is_ignored() {
    let mut c = controller(&[]);
    assert_eq!(
        c.handle_event(InputEvent::CursorMoved {
            position: Some(ScreenPoint::new(10.0, 10.0)),
        }),
        EventOutcome::Ignored
    );
}

#[test]
fn test_scroll_zooms_about_cursor() {
    let mut c = controller(&[]);
    let screen = ScreenPoint::new(50.0, 150.0);
    let anchor = c.canvas_at(screen).unwrap();

    assert_eq!(
        c.handle_event(InputEvent::Scroll {
            direction: ScrollDirection::Up,
            position: Some(screen),
        }),
        EventOutcome::Zoomed
    );
    assert!(c.view().state().x_range.width() < 100.0);
    assert!(c.canvas_at(screen).unwrap().distance(&anchor) < 1e-3);

    assert_eq!(
        c.handle_event(InputEvent::Scroll {
            direction: ScrollDirection::Down,
            position: None,
        }),
        EventOutcome::Ignored
    );
}

#[test]
fn test_pan_keys_step_window() {
    let mut c = controller(&[]);
    c.handle_event(InputEvent::key_press(KeyCode::D));
    c.handle_event(InputEvent::key_press(KeyCode::ArrowUp));
    let state = c.view().state();
    assert_eq!(state.x_range.min, 5.0);
    assert_eq!(state.y_range.min, 5.0);
}

#[test]
fn test_map_load_corrects_aspect() {
    let mut c = controller(&[]);
    assert!(c.load_map(ImageInfo::new(400, 200)));

    // A 2:1 map in a square widget: the vertical window doubles.
    let state = c.view().state();
    assert!((state.x_range.width() - 100.0).abs() < 1e-3);
    assert!((state.y_range.width() - 200.0).abs() < 1e-3);

    assert_eq!(
        c.handle_event(InputEvent::Resize {
            width: 400.0,
            height: 200.0,
        }),
        EventOutcome::Resized { corrected: true }
    );
    assert_eq!(c.widget_size(), WidgetSize::new(400.0, 200.0));
}

#[test]
fn test_map_reload_starts_from_initial_window() {
    let mut c = controller(&[]);
    c.handle_event(InputEvent::key_press(KeyCode::A));
    c.handle_event(InputEvent::Scroll {
        direction: ScrollDirection::Up,
        position: Some(ScreenPoint::new(20.0, 20.0)),
    });

    c.load_map(ImageInfo::new(100, 100));
    let state = c.view().state();
    assert_eq!(state.x_range.min, 0.0);
    assert_eq!(state.x_range.max, 100.0);
    assert_eq!(c.renderer().last_view(), *state);
}

#[test]
fn test_resize_without_map_only_records_size() {
    let mut c = controller(&[]);
    assert_eq!(
        c.handle_event(InputEvent::Resize {
            width: 300.0,
            height: 100.0,
        }),
        EventOutcome::Resized { corrected: false }
    );
    assert_eq!(
        c.handle_event(InputEvent::Resize {
            width: 0.0,
            height: 100.0,
        }),
        EventOutcome::Ignored
    );
    assert_eq!(c.widget_size(), WidgetSize::new(300.0, 100.0));
}

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_custom_bindings_from_config() {
    let mut config = LayoutConfig::default();
    config.input = KeyBindings::empty();
    config.input.bind(KeyCode::L, LayoutAction::StartCalibration);

    let mut c = controller_with(&config, &[]);
    assert_eq!(
        c.handle_event(InputEvent::key_press(KeyCode::Space)),
        EventOutcome::Ignored
    );
    assert_eq!(
        c.handle_event(InputEvent::key_press(KeyCode::L)),
        EventOutcome::CalibrationStarted
    );
}

#[test]
fn test_host_actions_reach_caller() {
    let mut c = controller(&[]);
    let cases = [
        (KeyCode::M, LayoutAction::ExportMetric),
        (KeyCode::Enter, LayoutAction::Simulate),
        (KeyCode::Tab, LayoutAction::CycleTurbine),
        (KeyCode::Digit2, LayoutAction::SelectWindSpeed(1)),
        (KeyCode::F4, LayoutAction::SelectWindDirection(3)),
        (KeyCode::Digit6, LayoutAction::SelectDiameter(1)),
        (KeyCode::F5, LayoutAction::SelectHubHeight(0)),
    ];
    for (key, action) in cases {
        assert_eq!(
            c.handle_event(InputEvent::key_press(key)),
            EventOutcome::HostAction(action)
        );
    }
}
