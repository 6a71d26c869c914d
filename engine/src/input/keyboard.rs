//! Keyboard Input Module
//!
//! Generic key codes for the layout editor, independent of windowing system.

use serde::{Deserialize, Serialize};

/// Keys the layout editor can bind.
///
/// These map to standard keyboard keys but are not tied to winit::keyboard::KeyCode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    // Panning
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Actions
    Space,
    Enter,
    Tab,
    Escape,
    L,
    M,
    BracketLeft,
    BracketRight,

    // Form selection
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,

    /// Catch-all for unhandled keys
    Unknown,
}
