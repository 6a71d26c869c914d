//! Geometry Value Types
//!
//! Plain 2D values shared by the view transform, calibration, and placement.
//! Canvas points live in the fixed logical coordinate system the map image is
//! anchored to; screen points are widget pixels with a top-left origin.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A point in canvas (world) space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    /// Create a new canvas point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another canvas point.
    pub fn distance(&self, other: &CanvasPoint) -> f32 {
        self.to_vec2().distance(other.to_vec2())
    }

    /// Componentwise scale, used to derive physical positions from a ratio.
    pub fn scaled(&self, factor: f32) -> CanvasPoint {
        Self::from(self.to_vec2() * factor)
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for CanvasPoint {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<(f32, f32)> for CanvasPoint {
    fn from(tuple: (f32, f32)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<CanvasPoint> for (f32, f32) {
    fn from(p: CanvasPoint) -> (f32, f32) {
        (p.x, p.y)
    }
}

/// A position in widget pixels. Origin top-left, Y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Delta from `origin` to `self`.
    pub fn delta_from(&self, origin: &ScreenPoint) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Pixel dimensions of the canvas widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetSize {
    pub width: f32,
    pub height: f32,
}

impl WidgetSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A widget with a non-positive dimension cannot map pointer positions.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Whether `point` lies inside the widget rectangle (edges inclusive).
    pub fn contains(&self, point: &ScreenPoint) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

impl Default for WidgetSize {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}
