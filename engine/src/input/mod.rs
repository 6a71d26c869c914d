//! Input Module
//!
//! Windowing-independent input records for the layout editor. The binary
//! translates winit events into [`InputEvent`]s; the controller consumes them.
//!
//! # Example
//!
//! ```rust,ignore
//! use windfarm_canvas_engine::input::{InputEvent, MouseButton};
//! use windfarm_canvas_engine::geometry::ScreenPoint;
//!
//! let click = InputEvent::Button {
//!     button: MouseButton::Primary,
//!     pressed: true,
//!     position: Some(ScreenPoint::new(120.0, 48.0)),
//! };
//! let outcome = controller.handle_event(click);
//! ```

pub mod bindings;
pub mod keyboard;
pub mod mouse;

// Re-export commonly used types at module level
pub use bindings::{Binding, KeyBindings, LayoutAction};
pub use keyboard::KeyCode;
pub use mouse::{DragState, MouseButton, ScrollDirection};

use crate::geometry::{ScreenPoint, WidgetSize};

/// One discrete input event.
///
/// Pointer positions are `None` when the pointer is outside the canvas
/// widget or its position is unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A mouse button changed state.
    Button {
        button: MouseButton,
        pressed: bool,
        position: Option<ScreenPoint>,
    },
    /// The pointer moved.
    CursorMoved { position: Option<ScreenPoint> },
    /// One wheel step.
    Scroll {
        direction: ScrollDirection,
        position: Option<ScreenPoint>,
    },
    /// A key changed state.
    Key { key: KeyCode, pressed: bool },
    /// The canvas widget was resized.
    Resize { width: f32, height: f32 },
}

impl InputEvent {
    /// Convenience constructor for a left-button press at `(x, y)`.
    pub fn primary_click(x: f32, y: f32) -> Self {
        InputEvent::Button {
            button: MouseButton::Primary,
            pressed: true,
            position: Some(ScreenPoint::new(x, y)),
        }
    }

    /// Convenience constructor for a right-button press at `(x, y)`.
    pub fn secondary_click(x: f32, y: f32) -> Self {
        InputEvent::Button {
            button: MouseButton::Secondary,
            pressed: true,
            position: Some(ScreenPoint::new(x, y)),
        }
    }

    /// Convenience constructor for a key press.
    pub fn key_press(key: KeyCode) -> Self {
        InputEvent::Key { key, pressed: true }
    }

    /// The widget size carried by a resize event.
    pub fn widget_size(&self) -> Option<WidgetSize> {
        match *self {
            InputEvent::Resize { width, height } => Some(WidgetSize::new(width, height)),
            _ => None,
        }
    }
}
