//! View Transform Module
//!
//! Maps between widget pixels and canvas (world) coordinates for the map
//! canvas, and owns the pan/zoom state of the visible window.
//!
//! The visible window is a pair of axis ranges. Zoom is implicit in the range
//! widths; there is no separate zoom scalar. Screen Y grows downward while
//! canvas Y grows upward, so the top edge of the widget shows `y_range.max`.

pub mod range;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::geometry::{CanvasPoint, ScreenPoint, WidgetSize};
pub use range::AxisRange;

// ============================================================================
// ENUMS
// ============================================================================

/// Direction of a single zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Cardinal direction for discrete keyboard panning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Tunables for the view transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Horizontal window shown at startup.
    pub initial_x_range: AxisRange,
    /// Vertical window shown at startup.
    pub initial_y_range: AxisRange,
    /// Range scale factor per scroll step.
    pub zoom_step: f32,
    /// Canvas units moved per pan keypress.
    pub key_pan_step: f32,
    /// Canvas rectangle the map image is stretched over.
    pub map_extent_x: AxisRange,
    pub map_extent_y: AxisRange,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            initial_x_range: AxisRange::new(0.0, 100.0),
            initial_y_range: AxisRange::new(0.0, 100.0),
            zoom_step: 1.1,
            key_pan_step: 5.0,
            map_extent_x: AxisRange::new(0.0, 100.0),
            map_extent_y: AxisRange::new(0.0, 100.0),
        }
    }
}

// ============================================================================
// VIEW STATE
// ============================================================================

/// The currently visible canvas window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    /// Width over height of the loaded map raster; `None` until a map loads.
    pub image_aspect_ratio: Option<f32>,
}

impl ViewState {
    /// Build an orthographic view-projection matrix (column-major) that maps
    /// the visible window onto NDC, depth 0..1.
    pub fn view_projection(&self) -> [[f32; 4]; 4] {
        Mat4::orthographic_rh(
            self.x_range.min,
            self.x_range.max,
            self.y_range.min,
            self.y_range.max,
            -1.0,
            1.0,
        )
        .to_cols_array_2d()
    }

    /// Convert a canvas point to normalized device coordinates (-1..+1).
    pub fn canvas_to_ndc(&self, point: CanvasPoint) -> [f32; 2] {
        [
            self.x_range.fraction_of(point.x) * 2.0 - 1.0,
            self.y_range.fraction_of(point.y) * 2.0 - 1.0,
        ]
    }

    /// Canvas units covered by one widget pixel along each axis.
    pub fn units_per_pixel(&self, widget: WidgetSize) -> (f32, f32) {
        (
            self.x_range.width() / widget.width,
            self.y_range.width() / widget.height,
        )
    }
}

// ============================================================================
// VIEW TRANSFORM
// ============================================================================

/// Pan/zoom controller over a [`ViewState`].
///
/// Two windows are tracked. The base window is moved only by pan and zoom;
/// the visible window in `state` is the base window after aspect correction
/// for the current widget, recomputed from scratch on every resize.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    state: ViewState,
    base_x_range: AxisRange,
    base_y_range: AxisRange,
    settings: ViewSettings,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(ViewSettings::default())
    }
}

impl ViewTransform {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            state: ViewState {
                x_range: settings.initial_x_range,
                y_range: settings.initial_y_range,
                image_aspect_ratio: None,
            },
            base_x_range: settings.initial_x_range,
            base_y_range: settings.initial_y_range,
            settings,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// The window before aspect correction, as `(x_range, y_range)`.
    pub fn base_window(&self) -> (AxisRange, AxisRange) {
        (self.base_x_range, self.base_y_range)
    }

    /// Return to the startup window, uncorrected. The image aspect ratio is
    /// kept.
    pub fn reset(&mut self) {
        self.base_x_range = self.settings.initial_x_range;
        self.base_y_range = self.settings.initial_y_range;
        self.state.x_range = self.base_x_range;
        self.state.y_range = self.base_y_range;
    }

    /// Record the aspect ratio of a newly loaded map, or clear it. Clearing
    /// drops any correction and shows the base window again.
    pub fn set_image_aspect_ratio(&mut self, aspect: Option<f32>) {
        self.state.image_aspect_ratio = aspect.filter(|a| a.is_finite() && *a > 0.0);
        if self.state.image_aspect_ratio.is_none() {
            self.state.x_range = self.base_x_range;
            self.state.y_range = self.base_y_range;
        }
    }

    // ========================================================================
    // COORDINATE CONVERSION
    // ========================================================================

    /// Convert a widget pixel position to canvas coordinates.
    ///
    /// Returns `None` when the position falls outside the plotted area or the
    /// widget has no usable size; callers treat that as "no coordinate".
    pub fn screen_to_canvas(&self, screen: ScreenPoint, widget: WidgetSize) -> Option<CanvasPoint> {
        if !widget.is_valid() || !screen.x.is_finite() || !screen.y.is_finite() {
            return None;
        }
        if !widget.contains(&screen) {
            return None;
        }
        let x = self.state.x_range.lerp(screen.x / widget.width);
        let y = self.state.y_range.lerp(1.0 - screen.y / widget.height);
        Some(CanvasPoint::new(x, y))
    }

    /// Convert a canvas point to widget pixels. Points outside the visible
    /// window map outside the widget rectangle.
    pub fn canvas_to_screen(&self, point: CanvasPoint, widget: WidgetSize) -> ScreenPoint {
        ScreenPoint::new(
            self.state.x_range.fraction_of(point.x) * widget.width,
            (1.0 - self.state.y_range.fraction_of(point.y)) * widget.height,
        )
    }

    // ========================================================================
    // PAN
    // ========================================================================

    /// Pan by a pointer drag of `(dx, dy)` pixels. The canvas follows the
    /// pointer; zoom level is preserved.
    pub fn pan(&mut self, dx: f32, dy: f32, widget: WidgetSize) -> bool {
        if !widget.is_valid() || !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        let (ux, uy) = self.state.units_per_pixel(widget);
        self.shift(-dx * ux, dy * uy);
        true
    }

    /// Pan one fixed keyboard step in a cardinal direction.
    pub fn pan_step(&mut self, direction: PanDirection) {
        let step = self.settings.key_pan_step;
        match direction {
            PanDirection::Up => self.shift(0.0, step),
            PanDirection::Down => self.shift(0.0, -step),
            PanDirection::Left => self.shift(-step, 0.0),
            PanDirection::Right => self.shift(step, 0.0),
        }
    }

    /// Translate the base and visible windows by the same canvas offset.
    fn shift(&mut self, dx: f32, dy: f32) {
        self.base_x_range = self.base_x_range.shifted(dx);
        self.base_y_range = self.base_y_range.shifted(dy);
        self.state.x_range = self.state.x_range.shifted(dx);
        self.state.y_range = self.state.y_range.shifted(dy);
    }

    // ========================================================================
    // ZOOM
    // ========================================================================

    /// Zoom one step around `cursor`, keeping the cursor's canvas point fixed
    /// under the pointer. No clamping is applied.
    pub fn zoom_at(&mut self, cursor: CanvasPoint, direction: ZoomDirection) -> bool {
        if !cursor.is_finite() {
            return false;
        }
        let factor = match direction {
            ZoomDirection::In => self.settings.zoom_step,
            ZoomDirection::Out => 1.0 / self.settings.zoom_step,
        };
        // Base and visible windows zoom about the same point.
        self.base_x_range = self.base_x_range.zoomed_about(cursor.x, factor);
        self.base_y_range = self.base_y_range.zoomed_about(cursor.y, factor);
        self.state.x_range = self.state.x_range.zoomed_about(cursor.x, factor);
        self.state.y_range = self.state.y_range.zoomed_about(cursor.y, factor);
        true
    }

    // ========================================================================
    // ASPECT CORRECTION
    // ========================================================================

    /// Keep the map undistorted after a resize.
    ///
    /// The map extent is drawn at `image_aspect_ratio` on screen when
    /// `y_width / x_width == aspect * (extent_h / extent_w) * (height / width)`.
    /// Starting from the base window, whichever axis range is too narrow for
    /// that is widened about its center; the image itself is never rescaled.
    /// The result depends only on the base window, the widget, and the image
    /// aspect, so repeated resizes never accumulate. Returns `false` (and
    /// changes nothing) when no map is loaded or the widget has no usable size.
    pub fn apply_aspect_correction(&mut self, widget: WidgetSize) -> bool {
        let Some(image_aspect) = self.state.image_aspect_ratio else {
            return false;
        };
        if !widget.is_valid() {
            return false;
        }

        let extent_ratio = self.settings.map_extent_y.width() / self.settings.map_extent_x.width();
        let target = image_aspect * extent_ratio / widget.aspect();
        let x_width = self.base_x_range.width();
        let y_width = self.base_y_range.width();

        if y_width / x_width < target {
            self.state.x_range = self.base_x_range;
            self.state.y_range = self.base_y_range.with_width(x_width * target);
        } else {
            self.state.x_range = self.base_x_range.with_width(y_width / target);
            self.state.y_range = self.base_y_range;
        }
        true
    }
}
