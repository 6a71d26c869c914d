//! Overlay Scene
//!
//! CPU-side glyph list for turbine and calibration markers. Implements
//! [`RenderSink`] and turns its glyphs into vertex-colored triangles in NDC
//! space, ready for upload into the overlay pipeline.
//!
//! Point glyphs are fixed-size squares in screen pixels, so markers keep the
//! same on-screen size at every zoom level. Segments are thick quads whose
//! width is also measured in pixels.

use crate::geometry::{CanvasPoint, WidgetSize};
use crate::view::ViewState;

use super::{GlyphId, GlyphStyle, RenderSink};

// ============================================================================
// VERTEX
// ============================================================================

/// Overlay vertex: NDC position plus RGBA color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(OverlayVertex, [u8; 24]);

impl OverlayVertex {
    /// Vertex buffer layout matching `shaders/overlay.wgsl`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
            // position: Float32x2 @ offset 0
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            },
            // color: Float32x4 @ offset 8
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: 8,
                shader_location: 1,
            },
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

// ============================================================================
// GLYPHS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Point(CanvasPoint),
    Segment(CanvasPoint, CanvasPoint),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Glyph {
    id: GlyphId,
    shape: Shape,
    style: GlyphStyle,
}

// ============================================================================
// OVERLAY SCENE
// ============================================================================

/// Retained list of overlay glyphs plus the view they are drawn under.
#[derive(Debug, Clone)]
pub struct OverlayScene {
    glyphs: Vec<Glyph>,
    next_id: u64,
    view: Option<ViewState>,
    viewport: WidgetSize,
}

impl Default for OverlayScene {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayScene {
    /// Half side length of a point glyph, in pixels.
    const POINT_HALF_SIZE: f32 = 5.0;
    /// Half thickness of a segment glyph, in pixels.
    const LINE_HALF_WIDTH: f32 = 1.5;

    pub fn new() -> Self {
        Self {
            glyphs: Vec::new(),
            next_id: 0,
            view: None,
            viewport: WidgetSize::default(),
        }
    }

    /// Update the pixel size of the surface the overlay is drawn onto.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport = WidgetSize::new(width, height);
    }

    /// Number of live glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Number of live glyphs with the given style.
    pub fn count(&self, style: GlyphStyle) -> usize {
        self.glyphs.iter().filter(|g| g.style == style).count()
    }

    /// The most recent view reported through [`RenderSink::view_changed`].
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    fn push(&mut self, shape: Shape, style: GlyphStyle) -> GlyphId {
        let id = GlyphId(self.next_id);
        self.next_id += 1;
        self.glyphs.push(Glyph { id, shape, style });
        id
    }

    // ========================================================================
    // MESH BUILD
    // ========================================================================

    /// Generate vertex and index data for every glyph.
    ///
    /// All coordinates are in NDC (-1..+1). Nothing is emitted before the
    /// first view update or while the viewport has no area.
    pub fn build_mesh(&self, vertices: &mut Vec<OverlayVertex>, indices: &mut Vec<u32>) {
        let Some(view) = self.view.as_ref() else {
            return;
        };
        if !self.viewport.is_valid() {
            return;
        }

        // NDC units per pixel along each axis.
        let sx = 2.0 / self.viewport.width;
        let sy = 2.0 / self.viewport.height;

        // Segments first so endpoint squares draw on top of the line.
        for glyph in self.glyphs.iter().filter(|g| matches!(g.shape, Shape::Segment(..))) {
            if let Shape::Segment(a, b) = glyph.shape {
                let a = view.canvas_to_ndc(a);
                let b = view.canvas_to_ndc(b);
                render_segment(a, b, sx, sy, glyph.style.color(), vertices, indices);
            }
        }

        for glyph in &self.glyphs {
            if let Shape::Point(p) = glyph.shape {
                let [x, y] = view.canvas_to_ndc(p);
                let hx = Self::POINT_HALF_SIZE * sx;
                let hy = Self::POINT_HALF_SIZE * sy;
                add_quad(
                    vertices,
                    indices,
                    [x - hx, y + hy],
                    [x + hx, y + hy],
                    [x + hx, y - hy],
                    [x - hx, y - hy],
                    glyph.style.color(),
                );
            }
        }
    }
}

impl RenderSink for OverlayScene {
    fn draw_point(&mut self, at: CanvasPoint, style: GlyphStyle) -> GlyphId {
        self.push(Shape::Point(at), style)
    }

    fn draw_segment(&mut self, from: CanvasPoint, to: CanvasPoint, style: GlyphStyle) -> GlyphId {
        self.push(Shape::Segment(from, to), style)
    }

    fn remove(&mut self, id: GlyphId) {
        self.glyphs.retain(|g| g.id != id);
    }

    fn view_changed(&mut self, view: &ViewState) {
        self.view = Some(*view);
    }
}

// ============================================================================
// QUAD HELPERS
// ============================================================================

/// Render a segment between two NDC points as a quad `LINE_HALF_WIDTH`
/// pixels thick on either side.
fn render_segment(
    a: [f32; 2],
    b: [f32; 2],
    sx: f32,
    sy: f32,
    color: [f32; 4],
    vertices: &mut Vec<OverlayVertex>,
    indices: &mut Vec<u32>,
) {
    // Work out the perpendicular in pixel space so the width is isotropic.
    let dx = (b[0] - a[0]) / sx;
    let dy = (b[1] - a[1]) / sy;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-6 {
        return;
    }

    let px = -dy / len * OverlayScene::LINE_HALF_WIDTH * sx;
    let py = dx / len * OverlayScene::LINE_HALF_WIDTH * sy;

    add_quad(
        vertices,
        indices,
        [a[0] + px, a[1] + py],
        [a[0] - px, a[1] - py],
        [b[0] - px, b[1] - py],
        [b[0] + px, b[1] + py],
        color,
    );
}

fn add_quad(
    vertices: &mut Vec<OverlayVertex>,
    indices: &mut Vec<u32>,
    tl: [f32; 2],
    tr: [f32; 2],
    br: [f32; 2],
    bl: [f32; 2],
    color: [f32; 4],
) {
    let base = vertices.len() as u32;
    for position in [tl, tr, br, bl] {
        vertices.push(OverlayVertex { position, color });
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}
