//! Wind Farm Canvas Engine
//!
//! Interactive map canvas for wind-farm layout design: a pan/zoom view over a
//! site map, a two-point scale calibration, and a bounded, undoable turbine
//! placement tool, plus the unit conversion that feeds an external wake
//! simulator.
//!
//! # Modules
//!
//! - [`geometry`] - Canvas/screen points and widget sizes
//! - [`view`] - Screen-to-canvas mapping, pan, zoom, and aspect correction
//! - [`input`] - Windowing-independent input events and key bindings
//! - [`render`] - Glyph sink trait, CPU overlay mesh, GPU map layer
//! - [`layout`] - Calibration, placement, units, the input-mode controller,
//!   configuration, metric export, and the simulation handoff
//!
//! # Example
//!
//! ```ignore
//! use windfarm_canvas_engine::layout::{InputModeController, LayoutConfig};
//! use windfarm_canvas_engine::input::InputEvent;
//! use windfarm_canvas_engine::render::OverlayScene;
//!
//! let config = LayoutConfig::load_or_default(std::path::Path::new("layout.json"));
//! let mut controller = InputModeController::new(&config, OverlayScene::new(), StdinPrompt);
//!
//! controller.handle_event(InputEvent::Resize { width: 1280.0, height: 800.0 });
//! let outcome = controller.handle_event(InputEvent::primary_click(640.0, 400.0));
//! ```

pub mod geometry;
pub mod input;
pub mod render;
pub mod view;

// Layout-domain modules (located in src/layout/ directory)
#[path = "../../src/layout/mod.rs"]
pub mod layout;

// Re-export commonly used types at crate level
pub use geometry::{CanvasPoint, ScreenPoint, WidgetSize};
pub use input::{InputEvent, KeyBindings, KeyCode, LayoutAction, MouseButton, ScrollDirection};
pub use render::{GlyphId, GlyphStyle, OverlayScene, RenderSink};
pub use view::{AxisRange, PanDirection, ViewSettings, ViewState, ViewTransform, ZoomDirection};
