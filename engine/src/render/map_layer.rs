//! Map Image Layer
//!
//! Renders the decoded site map as a textured quad stretched over the map
//! extent in canvas space. The quad is fixed in canvas coordinates; panning
//! and zooming only change the view-projection uniform.
//!
//! GPU resources are created on construction and released on drop.

use std::borrow::Cow;

use image::imageops::FilterType;
use wgpu::util::DeviceExt;

use crate::view::{AxisRange, ViewState};

// ============================================================================
// VERTEX & UNIFORM TYPES
// ============================================================================

/// Vertex for the textured quad (canvas position + UV).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct MapVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

impl MapVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MapVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Uniform buffer layout for the map shader (16-byte aligned).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MapUniforms {
    view_projection: [[f32; 4]; 4], // 64 bytes
    opacity: f32,                   // 4 bytes
    _pad: [f32; 3],                 // 12 bytes, total 80
}

static_assertions::assert_eq_size!(MapUniforms, [u8; 80]);

// ============================================================================
// MAP LAYER
// ============================================================================

/// GPU-resident site map.
pub struct MapLayer {
    _texture: wgpu::Texture,
    _texture_view: wgpu::TextureView,
    _sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,

    /// Opacity of the map (0.0 = invisible, 1.0 = fully opaque).
    pub opacity: f32,
}

impl MapLayer {
    const DEFAULT_OPACITY: f32 = 1.0;

    /// Upload `rgba` and build the pipeline.
    ///
    /// The quad covers `extent_x` × `extent_y` in canvas units, with the top
    /// row of the image at `extent_y.max`. Images larger than the device's
    /// 2D texture limit are downscaled first.
    pub fn new(
        rgba: &image::RgbaImage,
        extent_x: AxisRange,
        extent_y: AxisRange,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let rgba = fit_to_texture_limit(rgba, device.limits().max_texture_dimension_2d);
        let (width, height) = (rgba.width(), rgba.height());

        let texture_size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MapLayer Texture"),
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            texture_size,
        );

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MapLayer Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MapLayer Uniform Buffer"),
            size: std::mem::size_of::<MapUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The quad never moves in canvas space; only the uniform changes.
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MapLayer Vertex Buffer"),
            contents: bytemuck::cast_slice(&quad_vertices(extent_x, extent_y)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MapLayer Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MapLayer Bind Group Layout"),
            entries: &[
                // @binding(0): uniform buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // @binding(1): texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // @binding(2): sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MapLayer Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("MapLayer Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("MapLayer Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/map_layer.wgsl").into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("MapLayer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vs_main"),
                buffers: &[MapVertex::layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        log::debug!("MapLayer: uploaded {width}x{height} texture");

        Self {
            _texture: texture,
            _texture_view: texture_view,
            _sampler: sampler,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            pipeline,
            opacity: Self::DEFAULT_OPACITY,
        }
    }

    /// Draw the map onto `target` under the given view.
    ///
    /// Uses `LoadOp::Load`, so call it after the clear pass and before the
    /// overlay pass.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        queue: &wgpu::Queue,
        view: &ViewState,
    ) {
        let uniforms = MapUniforms {
            view_projection: view.view_projection(),
            opacity: self.opacity,
            _pad: [0.0; 3],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("MapLayer Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

/// Shrink `rgba` so neither side exceeds `max_dimension`, keeping its aspect.
fn fit_to_texture_limit(rgba: &image::RgbaImage, max_dimension: u32) -> Cow<'_, image::RgbaImage> {
    let (width, height) = rgba.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension {
        return Cow::Borrowed(rgba);
    }
    let scale = max_dimension as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);
    log::warn!(
        "MapLayer: {width}x{height} exceeds texture limit {max_dimension}, downscaling to {new_width}x{new_height}"
    );
    Cow::Owned(image::imageops::resize(rgba, new_width, new_height, FilterType::Triangle))
}

/// Quad corners over the map extent. Image row 0 (v = 0) sits at the top.
fn quad_vertices(extent_x: AxisRange, extent_y: AxisRange) -> [MapVertex; 4] {
    let (l, r) = (extent_x.min, extent_x.max);
    let (b, t) = (extent_y.min, extent_y.max);
    [
        MapVertex { position: [l, b], uv: [0.0, 1.0] }, // bottom-left
        MapVertex { position: [r, b], uv: [1.0, 1.0] }, // bottom-right
        MapVertex { position: [r, t], uv: [1.0, 0.0] }, // top-right
        MapVertex { position: [l, t], uv: [0.0, 0.0] }, // top-left
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_covers_extent() {
        let quad = quad_vertices(AxisRange::new(0.0, 100.0), AxisRange::new(-10.0, 50.0));
        assert_eq!(quad[0].position, [0.0, -10.0]);
        assert_eq!(quad[2].position, [100.0, 50.0]);
        // Top edge samples the first image row.
        assert_eq!(quad[3].uv, [0.0, 0.0]);
    }

    #[test]
    fn test_oversized_map_is_downscaled() {
        let wide = image::RgbaImage::new(20, 10);
        let fitted = fit_to_texture_limit(&wide, 8);
        assert_eq!(fitted.dimensions(), (8, 4));
        assert!(matches!(fitted, Cow::Owned(_)));

        let tall = image::RgbaImage::new(3, 30);
        assert_eq!(fit_to_texture_limit(&tall, 10).dimensions(), (1, 10));
    }

    #[test]
    fn test_map_within_limit_is_uploaded_as_is() {
        let map = image::RgbaImage::new(8, 8);
        assert!(matches!(fit_to_texture_limit(&map, 8), Cow::Borrowed(_)));
    }
}
