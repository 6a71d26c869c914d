//! Layout Editor - Wind Farm Turbine Placement Tool
//!
//! Interactive map canvas for laying out a wind farm: load a site map,
//! calibrate its scale, place turbines, and hand the layout to a wake model.
//!
//! Run with: `cargo run --bin layout_editor -- site_map.png`
//!
//! Controls:
//! - Left mouse: Place turbine (or pick a scale bar endpoint while calibrating)
//! - Right mouse: Undo last turbine
//! - Middle mouse drag: Pan
//! - Scroll wheel: Zoom around the cursor
//! - W/A/S/D, arrows: Pan one step
//! - Space: Scale bar calibration (then click both ends, then type the length)
//! - [ / ]: Lower/raise max turbines
//! - M: Export turbine locations in meters
//! - Enter: Write simulation request
//! - Tab: Cycle turbine model
//! - 1-4: Wind speed 5/10/15/20 m/s
//! - F1-F4: Wind direction North/East/South/West
//! - 5-8: Generic rotor diameter, F5-F8: Generic hub height
//! - L: Reload map
//! - ESC: Cancel scale bar selection, otherwise exit
//!
//! Environment:
//! - `LAYOUT_MAP`: map image when no argument is given
//! - `LAYOUT_CONFIG`: JSON config file
//! - `LAYOUT_EXPORT`: export path (default `layout_export.json`)
//! - `LAYOUT_REQUEST`: simulation request path (default `simulation_request.json`)

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton as WinitButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use wgpu::util::DeviceExt;

use windfarm_canvas_engine::geometry::ScreenPoint;
use windfarm_canvas_engine::input::{InputEvent, KeyCode, LayoutAction, MouseButton, ScrollDirection};
use windfarm_canvas_engine::layout::{
    EventOutcome, InputMode, InputModeController, LayoutConfig, LengthPrompt, MapImage, RequestFileHandoff,
    SimulationForm, WakeSimulator, parse_length,
};
use windfarm_canvas_engine::render::{MapLayer, OverlayScene, OverlayVertex};

// ============================================================================
// TERMINAL PROMPT
// ============================================================================

/// Blocking length prompt on the terminal the editor was started from.
struct StdinPrompt;

impl LengthPrompt for StdinPrompt {
    fn request_length(&mut self, title: &str, message: &str) -> Option<f32> {
        println!();
        println!("== {title} ==");
        print!("{message} ");
        std::io::stdout().flush().ok()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        parse_length(&line)
    }
}

// ============================================================================
// GPU RESOURCES
// ============================================================================

/// GPU state for the editor window.
struct EditorGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    /// Render pipeline for turbine/calibration glyphs (vertex-colored triangles).
    overlay_pipeline: wgpu::RenderPipeline,
}

impl EditorGpu {
    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
        }
    }
}

// ============================================================================
// APPLICATION
// ============================================================================

struct LayoutEditorApp {
    window: Option<Arc<Window>>,
    gpu: Option<EditorGpu>,
    config: LayoutConfig,
    controller: InputModeController<OverlayScene, StdinPrompt>,
    form: SimulationForm,
    map_path: Option<PathBuf>,
    map_layer: Option<MapLayer>,
    export_path: PathBuf,
    simulator: RequestFileHandoff,

    /// Last pointer position inside the window
    cursor: Option<ScreenPoint>,
}

impl LayoutEditorApp {
    fn new(config: LayoutConfig, map_path: Option<PathBuf>) -> Self {
        let export_path = std::env::var("LAYOUT_EXPORT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("layout_export.json"));
        let request_path = std::env::var("LAYOUT_REQUEST")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("simulation_request.json"));

        Self {
            window: None,
            gpu: None,
            controller: InputModeController::new(&config, OverlayScene::new(), StdinPrompt),
            form: SimulationForm::new(config.simulation.clone()),
            config,
            map_path,
            map_layer: None,
            export_path,
            simulator: RequestFileHandoff::new(request_path),
            cursor: None,
        }
    }

    /// Initialize wgpu device, surface, and the overlay pipeline.
    fn initialize(&mut self, window: Arc<Window>) {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Layout Editor Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        }))
        .expect("Failed to create GPU device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let present_mode = if surface_caps
            .present_modes
            .contains(&wgpu::PresentMode::AutoVsync)
        {
            wgpu::PresentMode::AutoVsync
        } else {
            surface_caps.present_modes[0]
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let overlay_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/overlay.wgsl").into()),
        });

        let overlay_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Overlay Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let overlay_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&overlay_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &overlay_shader,
                entry_point: Some("vs_main"),
                buffers: &[OverlayVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &overlay_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
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
            multiview: None,
            cache: None,
        });

        self.gpu = Some(EditorGpu {
            device,
            queue,
            surface,
            surface_config,
            overlay_pipeline,
        });

        info!("GPU initialized: format {surface_format:?}, present mode {present_mode:?}");

        self.window = Some(window);
        self.resize(size);
        self.load_map();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(size);
        }
        let (w, h) = (size.width as f32, size.height as f32);
        self.controller.renderer_mut().set_viewport_size(w, h);
        self.controller.handle_event(InputEvent::Resize {
            width: w,
            height: h,
        });
        self.request_redraw();
    }

    /// (Re)load the site map from `map_path`.
    fn load_map(&mut self) {
        let Some(path) = self.map_path.clone() else {
            info!("No map image: pass a path or set LAYOUT_MAP");
            return;
        };
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };

        match MapImage::open(&path) {
            Ok(map) => {
                let view = &self.config.view;
                self.map_layer = Some(MapLayer::new(
                    &map.rgba,
                    view.map_extent_x,
                    view.map_extent_y,
                    &gpu.device,
                    &gpu.queue,
                    gpu.surface_config.format,
                ));
                self.controller.load_map(map.info);
            }
            Err(e) => warn!("Map not loaded: {e}"),
        }
        self.update_title();
        self.request_redraw();
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn update_title(&self) {
        if let Some(window) = &self.window {
            let placement = self.controller.placement();
            window.set_title(&format!(
                "Wind Farm Layout - {}/{} turbines - {:.3} {}/unit - {}",
                placement.len(),
                placement.capacity(),
                self.controller.calibration().ratio(),
                self.controller.calibration().unit().abbreviation(),
                self.form.summary()
            ));
        }
    }

    /// Feed one event to the controller and act on host-owned outcomes.
    ///
    /// Redraws only when the event did something.
    fn dispatch(&mut self, event: InputEvent) {
        match self.controller.handle_event(event) {
            EventOutcome::Ignored => return,
            EventOutcome::HostAction(action) => self.handle_action(action),
            EventOutcome::PlacementRejected(e) => info!("{e}"),
            EventOutcome::Placed(_)
            | EventOutcome::Undone(_)
            | EventOutcome::Calibrated { .. }
            | EventOutcome::CalibrationRejected(_)
            | EventOutcome::CalibrationCancelled
            | EventOutcome::CapacityChanged(_) => self.update_title(),
            _ => {}
        }
        self.request_redraw();
    }

    fn handle_action(&mut self, action: LayoutAction) {
        match action {
            LayoutAction::ExportMetric => {
                let export = self.controller.export();
                info!("Turbine locations in meters: {:?}", export.metric_coordinates());
                if let Err(e) = export.save(&self.export_path) {
                    error!("Export failed: {e}");
                }
            }
            LayoutAction::Simulate => {
                let coords = self.controller.export().metric_coordinates();
                let result = self
                    .form
                    .request(coords)
                    .and_then(|request| self.simulator.simulate(&request));
                match result {
                    Ok(report) => match report.aep_gwh {
                        Some(aep) => info!("Simulation: AEP = {aep:.2} GWh"),
                        None => info!(
                            "Simulation request handed off ({})",
                            self.simulator.path().display()
                        ),
                    },
                    Err(e) => warn!("Simulation not started: {e}"),
                }
            }
            LayoutAction::ReloadMap => self.load_map(),
            LayoutAction::CycleTurbine => {
                let model = self.form.cycle_turbine();
                info!("Turbine type: {}", model.label());
            }
            LayoutAction::SelectWindSpeed(i) => {
                if self.form.select_speed(i as usize) {
                    info!("Wind speed: {} m/s", self.form.wind_speed().unwrap_or(0.0));
                }
            }
            LayoutAction::SelectWindDirection(i) => {
                if self.form.select_direction(i as usize) {
                    info!("Wind direction: {:?}", self.form.direction().unwrap_or_default());
                }
            }
            LayoutAction::SelectDiameter(i) => {
                if self.form.select_diameter(i as usize) {
                    let diameter = self.form.options().rotor_diameters_m[i as usize];
                    info!("Generic rotor diameter: {diameter} m");
                }
            }
            LayoutAction::SelectHubHeight(i) => {
                if self.form.select_hub_height(i as usize) {
                    let hub = self.form.options().hub_heights_m[i as usize];
                    info!("Generic hub height: {hub} m");
                }
            }
            // Handled inside the controller
            LayoutAction::PanUp
            | LayoutAction::PanDown
            | LayoutAction::PanLeft
            | LayoutAction::PanRight
            | LayoutAction::StartCalibration
            | LayoutAction::CancelCalibration
            | LayoutAction::IncreaseCapacity
            | LayoutAction::DecreaseCapacity => {}
        }
        self.update_title();
    }

    /// Render a frame: clear, map, then overlay glyphs.
    fn render(&mut self) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Out of GPU memory!");
                return;
            }
            Err(e) => {
                error!("Surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Layout Render Encoder"),
            });

        // Clear to white, like an empty plot
        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Layout Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        if let Some(map) = &self.map_layer {
            map.render(&mut encoder, &view, &gpu.queue, self.controller.view().state());
        }

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        self.controller.renderer().build_mesh(&mut vertices, &mut indices);

        if !indices.is_empty() {
            let vertex_buffer = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Overlay Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Overlay Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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

            pass.set_pipeline(&gpu.overlay_pipeline);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

// ============================================================================
// WINIT TRANSLATION
// ============================================================================

fn map_key(key: WinitKey) -> KeyCode {
    match key {
        WinitKey::KeyW => KeyCode::W,
        WinitKey::KeyA => KeyCode::A,
        WinitKey::KeyS => KeyCode::S,
        WinitKey::KeyD => KeyCode::D,
        WinitKey::ArrowUp => KeyCode::ArrowUp,
        WinitKey::ArrowDown => KeyCode::ArrowDown,
        WinitKey::ArrowLeft => KeyCode::ArrowLeft,
        WinitKey::ArrowRight => KeyCode::ArrowRight,
        WinitKey::Space => KeyCode::Space,
        WinitKey::Enter | WinitKey::NumpadEnter => KeyCode::Enter,
        WinitKey::Tab => KeyCode::Tab,
        WinitKey::Escape => KeyCode::Escape,
        WinitKey::KeyL => KeyCode::L,
        WinitKey::KeyM => KeyCode::M,
        WinitKey::BracketLeft => KeyCode::BracketLeft,
        WinitKey::BracketRight => KeyCode::BracketRight,
        WinitKey::Digit1 => KeyCode::Digit1,
        WinitKey::Digit2 => KeyCode::Digit2,
        WinitKey::Digit3 => KeyCode::Digit3,
        WinitKey::Digit4 => KeyCode::Digit4,
        WinitKey::Digit5 => KeyCode::Digit5,
        WinitKey::Digit6 => KeyCode::Digit6,
        WinitKey::Digit7 => KeyCode::Digit7,
        WinitKey::Digit8 => KeyCode::Digit8,
        WinitKey::F1 => KeyCode::F1,
        WinitKey::F2 => KeyCode::F2,
        WinitKey::F3 => KeyCode::F3,
        WinitKey::F4 => KeyCode::F4,
        WinitKey::F5 => KeyCode::F5,
        WinitKey::F6 => KeyCode::F6,
        WinitKey::F7 => KeyCode::F7,
        WinitKey::F8 => KeyCode::F8,
        _ => KeyCode::Unknown,
    }
}

fn is_pan_key(controller: &InputModeController<OverlayScene, StdinPrompt>, key: KeyCode) -> bool {
    matches!(
        controller.bindings().get_action(key),
        Some(LayoutAction::PanUp | LayoutAction::PanDown | LayoutAction::PanLeft | LayoutAction::PanRight)
    )
}

fn map_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Primary,
        WinitButton::Right => MouseButton::Secondary,
        WinitButton::Middle => MouseButton::Tertiary,
        WinitButton::Back => MouseButton::Other(3),
        WinitButton::Forward => MouseButton::Other(4),
        WinitButton::Other(n) => MouseButton::Other(n),
    }
}

// ============================================================================
// APPLICATION HANDLER
// ============================================================================

impl ApplicationHandler for LayoutEditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = WindowAttributes::default()
                .with_title("Wind Farm Layout")
                .with_inner_size(PhysicalSize::new(1280, 800));
            let window = Arc::new(
                event_loop
                    .create_window(attrs)
                    .expect("Failed to create window"),
            );
            self.initialize(window);
            self.update_title();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    // Escape cancels a scale bar selection before it quits
                    if key == WinitKey::Escape
                        && pressed
                        && self.controller.mode() == InputMode::Normal
                    {
                        event_loop.exit();
                        return;
                    }
                    let key = map_key(key);
                    // Only panning auto-repeats
                    if event.repeat && !is_pan_key(&self.controller, key) {
                        return;
                    }
                    self.dispatch(InputEvent::Key { key, pressed });
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.dispatch(InputEvent::Button {
                    button: map_button(button),
                    pressed: state == ElementState::Pressed,
                    position: self.cursor,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let point = ScreenPoint::new(position.x as f32, position.y as f32);
                self.cursor = Some(point);
                self.dispatch(InputEvent::CursorMoved {
                    position: Some(point),
                });
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }

            WindowEvent::ScaleFactorChanged { .. } | WindowEvent::Occluded(false) => {
                self.request_redraw();
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let direction = match delta {
                    MouseScrollDelta::LineDelta(_, y) => ScrollDirection::from_delta(y),
                    MouseScrollDelta::PixelDelta(pos) => ScrollDirection::from_pixels(pos.y),
                };
                if let Some(direction) = direction {
                    self.dispatch(InputEvent::Scroll {
                        direction,
                        position: self.cursor,
                    });
                }
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::RedrawRequested => self.render(),

            _ => {}
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("===========================================");
    println!("   Wind Farm Layout Editor");
    println!("===========================================");
    println!();
    println!("Controls:");
    println!("  Left mouse: Place turbine");
    println!("  Right mouse: Undo last turbine");
    println!("  Middle drag: Pan");
    println!("  Scroll wheel: Zoom at cursor");
    println!("  W/A/S/D, arrows: Pan");
    println!("  Space: Scale bar selection (2 clicks, then enter length)");
    println!("  [/]: Lower/raise max turbines");
    println!("  M: Export turbine locations in meters");
    println!("  Enter: Submit simulation request");
    println!("  Tab: Cycle turbine type");
    println!("  1-4: Wind speed, F1-F4: Wind direction");
    println!("  5-8: Rotor diameter, F5-F8: Hub height");
    println!("  L: Reload map");
    println!("  ESC: Cancel scale bar selection / Exit");
    println!();

    let config = match std::env::var("LAYOUT_CONFIG") {
        Ok(path) => LayoutConfig::load_or_default(&PathBuf::from(path)),
        Err(_) => LayoutConfig::default(),
    };
    let map_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LAYOUT_MAP").ok())
        .map(PathBuf::from);

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = LayoutEditorApp::new(config, map_path);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop error: {e}");
    }
}
