//! Mouse Input Module
//!
//! Pointer buttons, scroll direction, and drag tracking for the map canvas.
//! Decoupled from winit to use generic types.

use crate::geometry::ScreenPoint;

/// Mouse button identifiers, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button: place a turbine or pick a calibration point.
    Primary,
    /// Right button: undo the last turbine.
    Secondary,
    /// Middle button: drag to pan.
    Tertiary,
    /// Additional mouse buttons (button 4, 5, etc.)
    Other(u16),
}

/// Scroll wheel direction for a single zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Classify a vertical wheel delta. Zero deltas carry no direction.
    pub fn from_delta(dy: f32) -> Option<Self> {
        if dy > 0.0 {
            Some(ScrollDirection::Up)
        } else if dy < 0.0 {
            Some(ScrollDirection::Down)
        } else {
            None
        }
    }

    /// Create from pixel delta (common for trackpads).
    pub fn from_pixels(dy: f64) -> Option<Self> {
        Self::from_delta((dy / 100.0) as f32)
    }
}

/// Tracks a tertiary-button drag between press and release.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    /// Last pointer position seen while the drag button is held.
    last: Option<ScreenPoint>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag at `position`.
    pub fn start(&mut self, position: ScreenPoint) {
        self.last = Some(position);
    }

    /// Advance the drag to `position`, returning the pixel delta since the last
    /// update. Returns `None` when no drag is active.
    pub fn advance(&mut self, position: ScreenPoint) -> Option<(f32, f32)> {
        let last = self.last?;
        self.last = Some(position);
        Some(position.delta_from(&last))
    }

    /// End the drag. Returns whether a drag was active.
    pub fn stop(&mut self) -> bool {
        self.last.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }
}
