//! Rendering Engine Tests
//!
//! Tests for:
//! - Ambient draws precede every additive light draw
//! - Blend state per phase and restoration after the frame, also on error
//! - Pass selection by light type
//! - Frame statistics and texture unit binding
//! - Settings loading and validation

use std::path::PathBuf;

use glam::Vec3;

use myth_forward::errors::ForwardError;
use myth_forward::renderer::device::BlendMode;
use myth_forward::renderer::headless::{HeadlessDevice, HeadlessMesh};
use myth_forward::renderer::context::FrameLights;
use myth_forward::renderer::pipeline::{PassKind, ShaderPass};
use myth_forward::{
    Camera, DirectionalLight, FrameStats, Light, Material, PointLight, RenderObject,
    RendererSettings, RenderingEngine, SpotLight, TextureRef, Transform,
};

fn settings() -> RendererSettings {
    RendererSettings {
        shader_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res/shaders"),
        ..RendererSettings::default()
    }
}

fn camera() -> Camera {
    let mut camera = Camera::new_perspective(Vec3::new(0.0, 3.0, 6.0), 60.0, 1.5, 0.1, 100.0);
    camera.look_at(Vec3::ZERO);
    camera
}

fn object<'a>(
    transform: &'a Transform,
    material: &'a Material,
    mesh: &'a HeadlessMesh,
) -> RenderObject<'a, HeadlessDevice> {
    RenderObject::new(transform, material, mesh)
}

fn lights() -> [Light; 3] {
    [
        DirectionalLight::new(Vec3::ONE, 0.8, Vec3::new(-1.0, -1.0, 0.0)).into(),
        PointLight::new(Vec3::new(1.0, 0.5, 0.0), 4.0, Vec3::new(2.0, 1.0, 0.0)).into(),
        SpotLight::new(Vec3::ONE, 6.0)
            .with_position(Vec3::new(0.0, 4.0, 0.0))
            .with_direction(Vec3::NEG_Y)
            .into(),
    ]
}

// ============================================================================
// Frame Ordering
// ============================================================================

#[test]
fn ambient_precedes_additive_passes() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();
    engine.check().unwrap();

    let crate_mesh = HeadlessMesh::new("crate");
    let floor_mesh = HeadlessMesh::new("floor");
    let crate_transform = Transform::from_position(Vec3::new(0.0, 0.5, 0.0));
    let floor_transform = Transform::new();
    let material = Material::new();
    let objects = [
        object(&crate_transform, &material, &crate_mesh),
        object(&floor_transform, &material, &floor_mesh),
    ];
    let lights = lights();
    let light_refs: Vec<&Light> = lights.iter().collect();

    let stats = engine
        .render(&mut device, &camera(), &objects, &light_refs)
        .unwrap();

    let draws = device.draws();
    assert_eq!(draws.len(), 2 + 3 * 2);

    let ambient = engine.pass(PassKind::Ambient).program().handle();
    for draw in &draws[..2] {
        assert_eq!(draw.program, Some(ambient));
        assert_eq!(draw.blend, BlendMode::Replace);
    }
    for draw in &draws[2..] {
        assert_ne!(draw.program, Some(ambient));
        assert_eq!(draw.blend, BlendMode::Additive);
    }

    let labels: Vec<&str> = draws.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(
        labels,
        ["crate", "floor", "crate", "floor", "crate", "floor", "crate", "floor"]
    );

    assert_eq!(
        stats,
        FrameStats {
            objects: 2,
            lights: 3,
            ambient_draws: 2,
            light_draws: 6,
        }
    );
    assert_eq!(stats.total_draws(), 8);
    assert_eq!(device.blend_mode(), BlendMode::Replace);
}

#[test]
fn each_light_draws_through_its_pass() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();

    let mesh = HeadlessMesh::new("mesh");
    let transform = Transform::new();
    let material = Material::new();
    let objects = [object(&transform, &material, &mesh)];
    let lights = lights();
    let light_refs: Vec<&Light> = lights.iter().collect();

    engine
        .render(&mut device, &camera(), &objects, &light_refs)
        .unwrap();

    let programs: Vec<_> = device.draws().iter().map(|d| d.program).collect();
    let expected: Vec<_> = PassKind::ALL
        .iter()
        .map(|&kind| Some(engine.pass(kind).program().handle()))
        .collect();
    assert_eq!(programs, expected);
}

#[test]
fn frame_without_lights_draws_ambient_only() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();

    let mesh = HeadlessMesh::new("mesh");
    let transform = Transform::new();
    let material = Material::new();
    let objects = [object(&transform, &material, &mesh)];

    let stats = engine.render(&mut device, &camera(), &objects, &[]).unwrap();

    assert_eq!(stats.ambient_draws, 1);
    assert_eq!(stats.light_draws, 0);
    assert!(device.draws().iter().all(|d| d.blend == BlendMode::Replace));
}

#[test]
fn material_textures_bound_to_slot_units() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();

    let mesh = HeadlessMesh::new("bricks");
    let transform = Transform::new();
    let mut material = Material::new().with_displacement(0.04, 0.5);
    material.add_texture("diffuse", TextureRef::new("bricks.jpg"));
    material.add_texture("normalMap", TextureRef::new("bricks_normal.jpg"));
    material.add_texture("dispMap", TextureRef::new("bricks_disp.png"));
    let objects = [object(&transform, &material, &mesh)];

    engine.render(&mut device, &camera(), &objects, &[]).unwrap();

    assert_eq!(device.bound_texture(0).map(TextureRef::path), Some("bricks.jpg"));
    assert_eq!(
        device.bound_texture(1).map(TextureRef::path),
        Some("bricks_normal.jpg")
    );
    assert_eq!(
        device.bound_texture(2).map(TextureRef::path),
        Some("bricks_disp.png")
    );
}

#[test]
fn update_does_not_resolve_uniforms_per_frame() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();
    let lookups = device.lookup_count();

    let mesh = HeadlessMesh::new("mesh");
    let transform = Transform::new();
    let material = Material::new();
    let objects = [object(&transform, &material, &mesh)];
    let lights = lights();
    let light_refs: Vec<&Light> = lights.iter().collect();

    for _ in 0..5 {
        engine
            .render(&mut device, &camera(), &objects, &light_refs)
            .unwrap();
    }

    assert_eq!(device.lookup_count(), lookups);
}

#[test]
fn light_pass_error_restores_replace_blend() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();

    let mesh = HeadlessMesh::new("mesh");
    let transform = Transform::new();
    let material = Material::new();
    let objects = [object(&transform, &material, &mesh)];
    // A point light is active, but the spot pass is asked to draw.
    let light = Light::from(PointLight::new(Vec3::ONE, 1.0, Vec3::Y));

    let result = engine.render_light(
        &mut device,
        &camera(),
        &objects,
        PassKind::Spot,
        &FrameLights::for_light(&light),
    );

    assert!(matches!(
        result,
        Err(ForwardError::MissingActiveLight {
            pass: PassKind::Spot
        })
    ));
    assert_eq!(device.blend_mode(), BlendMode::Replace);
    assert!(device.draws().is_empty());
}

#[test]
fn render_light_draws_every_object_additively() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();

    let mesh = HeadlessMesh::new("mesh");
    let transform = Transform::new();
    let material = Material::new();
    let objects = [
        object(&transform, &material, &mesh),
        object(&transform, &material, &mesh),
    ];
    let light = Light::from(PointLight::new(Vec3::ONE, 1.0, Vec3::Y));

    let drawn = engine
        .render_light(
            &mut device,
            &camera(),
            &objects,
            PassKind::Point,
            &FrameLights::for_light(&light),
        )
        .unwrap();

    assert_eq!(drawn, 2);
    let point = engine.pass(PassKind::Point).program().handle();
    assert!(
        device
            .draws()
            .iter()
            .all(|d| d.blend == BlendMode::Additive && d.program == Some(point))
    );
    assert_eq!(device.blend_mode(), BlendMode::Replace);
}

// ============================================================================
// Broken Shaders & Teardown
// ============================================================================

#[test]
fn missing_shader_dir_still_renders() {
    let mut device = HeadlessDevice::new();
    let settings = RendererSettings {
        shader_dir: PathBuf::from("/nonexistent/shaders"),
        ..RendererSettings::default()
    };
    let engine = RenderingEngine::from_settings(&mut device, settings).unwrap();

    assert!(matches!(
        engine.check(),
        Err(ForwardError::ProgramUnavailable { .. })
    ));

    let mesh = HeadlessMesh::new("mesh");
    let transform = Transform::new();
    let material = Material::new();
    let objects = [object(&transform, &material, &mesh)];
    let lights = lights();
    let light_refs: Vec<&Light> = lights.iter().collect();

    let stats = engine
        .render(&mut device, &camera(), &objects, &light_refs)
        .unwrap();
    assert_eq!(stats.total_draws(), 4);
    assert!(device.writes().is_empty());
}

#[test]
fn destroy_releases_all_programs() {
    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings()).unwrap();
    assert_eq!(device.live_programs(), 4);

    engine.destroy(&mut device);

    assert_eq!(device.live_programs(), 0);
    assert_eq!(device.live_stages(), 0);
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn invalid_settings_rejected_before_loading() {
    let mut device = HeadlessDevice::new();
    let settings = RendererSettings {
        max_point_lights: 0,
        ..settings()
    };

    let result = RenderingEngine::from_settings(&mut device, settings);

    assert!(matches!(result, Err(ForwardError::InvalidSettings(_))));
    assert_eq!(device.live_programs(), 0);
}

#[test]
fn settings_from_file() {
    let path = std::env::temp_dir().join(format!(
        "myth-forward-settings-{}.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        r#"{ "ambient_shader": "custom-ambient", "vertex_extension": ".vert" }"#,
    )
    .unwrap();

    let settings = RendererSettings::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(settings.shader_name(PassKind::Ambient), "custom-ambient");
    assert_eq!(settings.shader_name(PassKind::Point), "forward-point");
    assert_eq!(settings.vertex_extension, ".vert");
    assert_eq!(settings.max_point_lights, 4);
}

#[test]
fn settings_errors() {
    assert!(matches!(
        RendererSettings::from_json_str(r#"{ "fragment_extension": "" }"#),
        Err(ForwardError::InvalidSettings(_))
    ));
    assert!(matches!(
        RendererSettings::from_json_str("{ not json"),
        Err(ForwardError::Settings(_))
    ));
    assert!(matches!(
        RendererSettings::from_file("/nonexistent/settings.json"),
        Err(ForwardError::Io(_))
    ));
}
