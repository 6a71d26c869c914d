//! Rendering Module
//!
//! The rendering side of the map canvas:
//!
//! - [`RenderSink`] - the collaborator the layout controller draws through
//! - [`overlay`] - CPU-side glyph list that builds an NDC triangle mesh
//! - [`map_layer`] - GPU textured quad for the site map image
//!
//! The controller never talks to wgpu directly. It issues glyph commands to a
//! `RenderSink` and the host turns the sink's state into draw calls.

pub mod map_layer;
pub mod overlay;

pub use map_layer::MapLayer;
pub use overlay::{OverlayScene, OverlayVertex};

use crate::geometry::CanvasPoint;
use crate::view::ViewState;

/// Visual style of an overlay glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphStyle {
    /// A placed turbine marker (red dot).
    Turbine,
    /// A calibration endpoint (green dot).
    CalibrationPoint,
    /// The line joining the two calibration endpoints (green).
    CalibrationLine,
}

impl GlyphStyle {
    /// RGBA color for this style.
    pub fn color(&self) -> [f32; 4] {
        match self {
            GlyphStyle::Turbine => [0.9, 0.1, 0.1, 1.0],
            GlyphStyle::CalibrationPoint | GlyphStyle::CalibrationLine => [0.1, 0.8, 0.2, 1.0],
        }
    }
}

/// Opaque handle to a drawn glyph, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphId(pub u64);

/// Receiver of draw commands from the layout controller.
///
/// All calls are synchronous; a glyph is considered drawn once the call
/// returns.
pub trait RenderSink {
    /// Draw a point glyph at a canvas position.
    fn draw_point(&mut self, at: CanvasPoint, style: GlyphStyle) -> GlyphId;

    /// Draw a line segment between two canvas positions.
    fn draw_segment(&mut self, from: CanvasPoint, to: CanvasPoint, style: GlyphStyle) -> GlyphId;

    /// Remove a previously drawn glyph. Unknown handles are ignored.
    fn remove(&mut self, id: GlyphId);

    /// The visible window changed (pan, zoom, resize, map load).
    fn view_changed(&mut self, view: &ViewState);
}
