//! Shader Tests - WGSL Validation and Vertex Layout
//!
//! Parses and validates the WGSL shaders with naga so shader mistakes fail in
//! `cargo test` instead of at pipeline creation, and checks that the Rust
//! vertex struct matches what the overlay shader reads.

use windfarm_canvas_engine::render::OverlayVertex;

fn validate(name: &str, source: &str) -> naga::Module {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{name} failed to parse:\n{}", e.emit_to_string(source)));
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .unwrap_or_else(|e| panic!("{name} failed validation: {e:?}"));
    module
}

fn entry_points(module: &naga::Module) -> Vec<&str> {
    module.entry_points.iter().map(|e| e.name.as_str()).collect()
}

// ============================================================================
// WGSL Validation
// ============================================================================

#[test]
fn test_overlay_shader_is_valid() {
    let module = validate("overlay.wgsl", include_str!("../../shaders/overlay.wgsl"));
    assert_eq!(entry_points(&module), vec!["vs_main", "fs_main"]);
}

#[test]
fn test_map_layer_shader_is_valid() {
    let module = validate("map_layer.wgsl", include_str!("../../shaders/map_layer.wgsl"));
    assert_eq!(entry_points(&module), vec!["vs_main", "fs_main"]);
    // uniforms, texture, sampler
    assert_eq!(module.global_variables.len(), 3);
}

// ============================================================================
// Vertex Layout
// ============================================================================

#[test]
fn test_overlay_vertex_layout_matches_shader() {
    let layout = OverlayVertex::layout();
    assert_eq!(layout.array_stride, 24);
    assert_eq!(layout.attributes.len(), 2);
    assert_eq!(layout.attributes[0].shader_location, 0);
    assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x2);
    assert_eq!(layout.attributes[1].shader_location, 1);
    assert_eq!(layout.attributes[1].offset, 8);
    assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x4);
}
