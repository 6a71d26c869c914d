//! Axis Ranges
//!
//! One visible interval of the canvas along a single axis.

use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]` on one canvas axis. Valid ranges have `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    pub fn center(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }

    /// Translate both edges by `delta`; the width is unchanged.
    pub fn shifted(&self, delta: f32) -> Self {
        Self::new(self.min + delta, self.max + delta)
    }

    /// Rescale around `anchor` so that `anchor` keeps its relative position.
    ///
    /// A `factor` above 1 narrows the range (zoom in).
    pub fn zoomed_about(&self, anchor: f32, factor: f32) -> Self {
        Self::new(
            anchor - (anchor - self.min) / factor,
            anchor + (self.max - anchor) / factor,
        )
    }

    /// Resize to `width` keeping the current center.
    pub fn with_width(&self, width: f32) -> Self {
        let half = width * 0.5;
        let c = self.center();
        Self::new(c - half, c + half)
    }

    /// Fraction of the way from `min` to `max` at which `value` sits.
    pub fn fraction_of(&self, value: f32) -> f32 {
        (value - self.min) / self.width()
    }

    /// Value at `t` along the range (0 = min, 1 = max).
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + t * self.width()
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::new(0.0, 100.0)
    }
}
