//! Input Mode Controller
//!
//! Owns the view, calibration, and placement state for one editing session
//! and routes every input event to exactly one of them. Two top-level modes
//! exist:
//!
//! - `Normal`: primary click places a turbine, secondary click undoes.
//! - `Calibrating`: primary click picks a calibration endpoint; secondary
//!   click does nothing.
//!
//! Panning (middle drag, cardinal keys) and zooming (wheel) work in both.
//! The mode is read from the calibration engine, so only its own transitions
//! enter or leave `Calibrating`.
//!
//! Every state change is pushed to the [`RenderSink`] before `handle_event`
//! returns, which keeps the marker list and the glyph-handle list in step.

use log::{debug, info};

use crate::geometry::{CanvasPoint, ScreenPoint, WidgetSize};
use crate::input::{DragState, InputEvent, KeyBindings, KeyCode, LayoutAction, MouseButton, ScrollDirection};
use crate::render::{GlyphId, GlyphStyle, RenderSink};
use crate::view::{PanDirection, ViewTransform, ZoomDirection};

use super::calibration::{CalibrationEngine, CalibrationError, CalibrationStep, LengthPrompt};
use super::config::{LayoutConfig, PlacementConfig};
use super::export::MetricExport;
use super::map_image::ImageInfo;
use super::placement::{Marker, PlacementError, PlacementStore};

// ============================================================================
// TYPES
// ============================================================================

/// Which consumer owns the primary pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Calibrating,
}

/// What a single event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    /// Nothing changed.
    Ignored,
    Placed(Marker),
    PlacementRejected(PlacementError),
    Undone(Marker),
    NothingToUndo,
    PanStarted,
    Panned,
    PanEnded,
    Zoomed,
    /// The widget size changed; `corrected` when aspect correction ran.
    Resized { corrected: bool },
    CalibrationStarted,
    /// A calibration in progress was abandoned; the ratio is unchanged.
    CalibrationCancelled,
    /// A calibration endpoint was recorded (0 = first).
    CalibrationPointAdded { index: usize },
    Calibrated { ratio: f32 },
    CalibrationRejected(CalibrationError),
    CapacityChanged(usize),
    /// A bound key whose action the host performs (export, simulate, ...).
    HostAction(LayoutAction),
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Single owner of the session's layout state.
pub struct InputModeController<R: RenderSink, P: LengthPrompt> {
    view: ViewTransform,
    calibration: CalibrationEngine,
    placement: PlacementStore,
    capacity_bounds: PlacementConfig,
    bindings: KeyBindings,

    widget: WidgetSize,
    drag: DragState,

    renderer: R,
    prompt: P,
    /// One glyph per marker, same order as `placement.markers()`.
    marker_glyphs: Vec<GlyphId>,
    /// Endpoints and line of the latest calibration attempt.
    calibration_glyphs: Vec<GlyphId>,
}

impl<R: RenderSink, P: LengthPrompt> InputModeController<R, P> {
    pub fn new(config: &LayoutConfig, renderer: R, prompt: P) -> Self {
        let capacity_bounds = config.placement;
        let mut controller = Self {
            view: ViewTransform::new(config.view),
            calibration: CalibrationEngine::new(config.units.physical_unit),
            placement: PlacementStore::new(capacity_bounds.clamp(capacity_bounds.default_capacity)),
            capacity_bounds,
            bindings: config.input.clone(),
            widget: WidgetSize::default(),
            drag: DragState::new(),
            renderer,
            prompt,
            marker_glyphs: Vec::new(),
            calibration_glyphs: Vec::new(),
        };
        controller.refresh_view();
        controller
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn mode(&self) -> InputMode {
        if self.calibration.is_active() {
            InputMode::Calibrating
        } else {
            InputMode::Normal
        }
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn calibration(&self) -> &CalibrationEngine {
        &self.calibration
    }

    pub fn placement(&self) -> &PlacementStore {
        &self.placement
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn widget_size(&self) -> WidgetSize {
        self.widget
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    /// Canvas position under a widget pixel, if it is on the canvas.
    pub fn canvas_at(&self, screen: ScreenPoint) -> Option<CanvasPoint> {
        self.view.screen_to_canvas(screen, self.widget)
    }

    // ========================================================================
    // EVENT DISPATCH
    // ========================================================================

    /// Process one event to completion, including its render side effects.
    pub fn handle_event(&mut self, event: InputEvent) -> EventOutcome {
        match event {
            InputEvent::Button {
                button,
                pressed,
                position,
            } => self.handle_button(button, pressed, position),
            InputEvent::CursorMoved { position } => self.handle_cursor(position),
            InputEvent::Scroll {
                direction,
                position,
            } => self.handle_scroll(direction, position),
            InputEvent::Key { key, pressed } => self.handle_key(key, pressed),
            InputEvent::Resize { width, height } => self.resize(WidgetSize::new(width, height)),
        }
    }

    fn handle_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        position: Option<ScreenPoint>,
    ) -> EventOutcome {
        match (button, pressed) {
            (MouseButton::Primary, true) => {
                let Some(point) = position.and_then(|p| self.canvas_at(p)) else {
                    debug!("Click outside the canvas ignored");
                    return EventOutcome::Ignored;
                };
                match self.mode() {
                    InputMode::Calibrating => self.add_calibration_point(point),
                    InputMode::Normal => self.place(point),
                }
            }
            (MouseButton::Secondary, true) => match self.mode() {
                InputMode::Calibrating => EventOutcome::Ignored,
                InputMode::Normal => self.undo(),
            },
            (MouseButton::Tertiary, true) => match position {
                Some(p) => {
                    self.drag.start(p);
                    EventOutcome::PanStarted
                }
                None => EventOutcome::Ignored,
            },
            (MouseButton::Tertiary, false) => {
                if self.drag.stop() {
                    EventOutcome::PanEnded
                } else {
                    EventOutcome::Ignored
                }
            }
            _ => EventOutcome::Ignored,
        }
    }

    fn handle_cursor(&mut self, position: Option<ScreenPoint>) -> EventOutcome {
        let Some(position) = position else {
            return EventOutcome::Ignored;
        };
        let Some((dx, dy)) = self.drag.advance(position) else {
            return EventOutcome::Ignored;
        };
        if self.view.pan(dx, dy, self.widget) {
            self.refresh_view();
            EventOutcome::Panned
        } else {
            EventOutcome::Ignored
        }
    }

    fn handle_scroll(&mut self, direction: ScrollDirection, position: Option<ScreenPoint>) -> EventOutcome {
        let Some(cursor) = position.and_then(|p| self.canvas_at(p)) else {
            return EventOutcome::Ignored;
        };
        let zoom = match direction {
            ScrollDirection::Up => ZoomDirection::In,
            ScrollDirection::Down => ZoomDirection::Out,
        };
        if self.view.zoom_at(cursor, zoom) {
            self.refresh_view();
            EventOutcome::Zoomed
        } else {
            EventOutcome::Ignored
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> EventOutcome {
        if !pressed {
            return EventOutcome::Ignored;
        }
        let Some(action) = self.bindings.get_action(key) else {
            return EventOutcome::Ignored;
        };

        let pan = match action {
            LayoutAction::PanUp => Some(PanDirection::Up),
            LayoutAction::PanDown => Some(PanDirection::Down),
            LayoutAction::PanLeft => Some(PanDirection::Left),
            LayoutAction::PanRight => Some(PanDirection::Right),
            _ => None,
        };
        if let Some(direction) = pan {
            self.view.pan_step(direction);
            self.refresh_view();
            return EventOutcome::Panned;
        }

        match action {
            LayoutAction::StartCalibration => self.start_calibration(),
            LayoutAction::CancelCalibration => self.cancel_calibration(),
            LayoutAction::IncreaseCapacity => {
                let n = self.set_capacity(self.placement.capacity().saturating_add(1));
                EventOutcome::CapacityChanged(n)
            }
            LayoutAction::DecreaseCapacity => {
                let n = self.set_capacity(self.placement.capacity().saturating_sub(1));
                EventOutcome::CapacityChanged(n)
            }
            other => EventOutcome::HostAction(other),
        }
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    fn place(&mut self, point: CanvasPoint) -> EventOutcome {
        match self.placement.place(point, self.calibration.ratio()) {
            Ok(marker) => {
                let glyph = self.renderer.draw_point(point, GlyphStyle::Turbine);
                self.marker_glyphs.push(glyph);
                debug!("Turbine placed at ({:.2}, {:.2})", point.x, point.y);
                EventOutcome::Placed(marker)
            }
            Err(e) => {
                debug!("Placement refused: {e}");
                EventOutcome::PlacementRejected(e)
            }
        }
    }

    fn undo(&mut self) -> EventOutcome {
        match self.placement.undo_last() {
            Some(marker) => {
                if let Some(glyph) = self.marker_glyphs.pop() {
                    self.renderer.remove(glyph);
                }
                EventOutcome::Undone(marker)
            }
            None => EventOutcome::NothingToUndo,
        }
    }

    /// Set the turbine capacity, clamped to the configured bounds. Returns
    /// the capacity actually applied.
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        let capacity = self.capacity_bounds.clamp(capacity);
        self.placement.set_capacity(capacity);
        info!("Max turbines: {capacity}");
        capacity
    }

    // ========================================================================
    // CALIBRATION
    // ========================================================================

    /// Enter calibration, clearing glyphs from the previous attempt.
    pub fn start_calibration(&mut self) -> EventOutcome {
        self.clear_calibration_glyphs();
        self.calibration.activate();
        info!("Scale bar selection mode activated. Click twice to define the scale bar.");
        EventOutcome::CalibrationStarted
    }

    /// Leave calibration without touching the ratio, removing the glyphs of
    /// the abandoned attempt. Ignored outside calibration.
    pub fn cancel_calibration(&mut self) -> EventOutcome {
        if !self.calibration.is_active() {
            return EventOutcome::Ignored;
        }
        self.clear_calibration_glyphs();
        self.calibration.cancel();
        info!("Scale bar selection cancelled");
        EventOutcome::CalibrationCancelled
    }

    fn clear_calibration_glyphs(&mut self) {
        for glyph in self.calibration_glyphs.drain(..) {
            self.renderer.remove(glyph);
        }
    }

    fn add_calibration_point(&mut self, point: CanvasPoint) -> EventOutcome {
        match self.calibration.add_point(point) {
            Some(CalibrationStep::FirstPoint(p)) => {
                let glyph = self.renderer.draw_point(p, GlyphStyle::CalibrationPoint);
                self.calibration_glyphs.push(glyph);
                EventOutcome::CalibrationPointAdded { index: 0 }
            }
            Some(CalibrationStep::AwaitingLength { first, second, .. }) => {
                let glyph = self.renderer.draw_point(second, GlyphStyle::CalibrationPoint);
                self.calibration_glyphs.push(glyph);
                let glyph = self.renderer.draw_segment(first, second, GlyphStyle::CalibrationLine);
                self.calibration_glyphs.push(glyph);

                // Blocks until the user answers.
                let message = self.calibration.prompt_message();
                let length = self
                    .prompt
                    .request_length(CalibrationEngine::PROMPT_TITLE, &message);

                match self.calibration.finish(length) {
                    Ok(ratio) => EventOutcome::Calibrated { ratio },
                    Err(e) => EventOutcome::CalibrationRejected(e),
                }
            }
            None => EventOutcome::Ignored,
        }
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    /// Record a new widget size and re-run aspect correction.
    pub fn resize(&mut self, widget: WidgetSize) -> EventOutcome {
        if !widget.is_valid() {
            return EventOutcome::Ignored;
        }
        self.widget = widget;
        let corrected = self.view.apply_aspect_correction(widget);
        self.refresh_view();
        EventOutcome::Resized { corrected }
    }

    /// Adopt a newly loaded map: return to the startup window, store the
    /// map's aspect ratio, and correct the view. Returns whether aspect
    /// correction ran.
    pub fn load_map(&mut self, image: ImageInfo) -> bool {
        self.view.reset();
        self.view.set_image_aspect_ratio(image.aspect_ratio());
        let corrected = self.view.apply_aspect_correction(self.widget);
        self.refresh_view();
        info!("Map {}x{} attached to canvas", image.width, image.height);
        corrected
    }

    fn refresh_view(&mut self) {
        self.renderer.view_changed(self.view.state());
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    /// Marker positions converted to meters, in placement order.
    pub fn metric_positions(&self) -> Vec<CanvasPoint> {
        let unit = self.calibration.unit();
        self.placement
            .markers()
            .iter()
            .map(|m| unit.point_to_metric(m.real_position))
            .collect()
    }

    /// Snapshot of all turbines for export or simulation.
    pub fn export(&self) -> MetricExport {
        MetricExport::new(
            self.placement.markers(),
            self.calibration.unit(),
            self.calibration.ratio(),
        )
    }
}
