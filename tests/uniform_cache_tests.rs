//! Uniform Cache Tests
//!
//! Tests for:
//! - Single resolution pass per program (lookup-count instrumentation)
//! - Absent-slot writes are silent no-ops
//! - `pointLights[i].*` name synthesis for N array entries
//! - Base update defaults and demonstration point lights

use std::path::PathBuf;

use glam::{Vec3, Vec4};

use myth_forward::renderer::context::{FrameLights, PassContext};
use myth_forward::renderer::device::UniformValue;
use myth_forward::renderer::headless::HeadlessDevice;
use myth_forward::renderer::pipeline::{
    FileSystemLoader, ForwardAmbient, MemoryLoader, PassKind, PointField, ShaderPass,
    ShaderProgram, Uniform, UniformDeclarations, UniformSlot,
};
use myth_forward::{Camera, Material, Transform};

fn shader_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res/shaders")
}

fn camera() -> Camera {
    Camera::new_perspective(Vec3::new(0.0, 2.0, 5.0), 60.0, 16.0 / 9.0, 0.1, 100.0)
}

const FIELD_SUFFIXES: [&str; 7] = [
    "base.color",
    "base.intensity",
    "position",
    "atten.constant",
    "atten.linear",
    "atten.exponent",
    "range",
];

// ============================================================================
// Resolution Happens Once
// ============================================================================

#[test]
fn load_resolves_each_declared_key_once() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());

    let pass = ForwardAmbient::new(&mut device, &loader, "forward-ambient", 4);

    assert!(pass.program().is_ready());
    assert_eq!(
        device.lookup_count(),
        PassKind::Ambient.declarations(4).len()
    );
}

#[test]
fn repeated_updates_do_not_resolve_again() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());
    let pass = ForwardAmbient::new(&mut device, &loader, "forward-ambient", 4);
    let lookups = device.lookup_count();

    let camera = camera();
    let material = Material::new();
    let lights = FrameLights::none();
    let mut transform = Transform::new();

    for frame in 0..16 {
        transform.set_position(Vec3::new(frame as f32, 0.0, 0.0));
        let ctx = PassContext::new(&transform, &camera, &material, &lights);
        pass.bind(&mut device);
        pass.update(&mut device, &ctx).unwrap();
    }

    assert!(!device.writes().is_empty());
    assert_eq!(device.lookup_count(), lookups);
}

// ============================================================================
// Absent Slots
// ============================================================================

#[test]
fn undeclared_uniform_resolves_to_absent_slot() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());
    let pass = ForwardAmbient::new(&mut device, &loader, "forward-ambient", 4);
    let cache = pass.program().uniforms();

    // The ambient shader declares neither specular terms nor point lights.
    assert_eq!(cache.slot(Uniform::SpecularPower), Some(UniformSlot::Absent));
    assert_eq!(
        cache.slot(Uniform::PointLights {
            index: 0,
            field: PointField::Color
        }),
        Some(UniformSlot::Absent)
    );
    assert!(cache.is_resolved(Uniform::Mvp));
    assert!(cache.is_resolved(Uniform::MaterialAmbientColor));
}

#[test]
fn write_through_absent_slot_is_noop() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());
    let pass = ForwardAmbient::new(&mut device, &loader, "forward-ambient", 4);
    let program = pass.program();
    device.clear_logs();

    program.set(&mut device, Uniform::SpecularPower, 3.0);
    program.set(&mut device, Uniform::SpecularIntensity, 1.5);

    assert!(device.writes().is_empty());
    assert_eq!(device.uniform_value(program.handle(), "specularPower"), None);
}

#[test]
fn write_through_undeclared_key_is_noop() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());
    let pass = ForwardAmbient::new(&mut device, &loader, "forward-ambient", 2);
    device.clear_logs();

    // Index 9 was never declared with max_point_lights = 2.
    pass.program().set(
        &mut device,
        Uniform::PointLights {
            index: 9,
            field: PointField::Range,
        },
        10.0,
    );

    assert!(device.writes().is_empty());
}

// ============================================================================
// Point Light Array Names
// ============================================================================

#[test]
fn base_declarations_synthesize_point_light_array_names() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());
    let program: ShaderProgram<HeadlessDevice> =
        ShaderProgram::load(&mut device, &loader, "basic", &UniformDeclarations::base(4));
    let cache = program.uniforms();

    for i in 0..4 {
        for suffix in FIELD_SUFFIXES {
            let name = format!("pointLights[{i}].{suffix}");
            assert!(cache.contains_name(&name), "missing {name}");
        }
    }
    let array_names = cache
        .names()
        .filter(|name| name.starts_with("pointLights["))
        .count();
    assert_eq!(array_names, 4 * 7);
    assert!(!cache.contains_name("pointLights[4].range"));
}

#[test]
fn array_entries_beyond_shader_length_are_absent() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());
    // basic.fs declares four entries; ask for six.
    let program: ShaderProgram<HeadlessDevice> =
        ShaderProgram::load(&mut device, &loader, "basic", &UniformDeclarations::base(6));
    let cache = program.uniforms();

    let declared = cache
        .names()
        .filter(|name| name.starts_with("pointLights["))
        .count();
    assert_eq!(declared, 6 * 7);

    let key = |index| Uniform::PointLights {
        index,
        field: PointField::Position,
    };
    assert!(cache.is_resolved(key(3)));
    assert_eq!(cache.slot(key(4)), Some(UniformSlot::Absent));
    assert_eq!(cache.slot(key(5)), Some(UniformSlot::Absent));
}

// ============================================================================
// Base Update
// ============================================================================

#[test]
fn base_update_writes_defaults_and_demo_lights() {
    let mut device = HeadlessDevice::new();
    let loader = FileSystemLoader::new(shader_dir());
    let program: ShaderProgram<HeadlessDevice> =
        ShaderProgram::load(&mut device, &loader, "basic", &UniformDeclarations::base(4));

    let camera = camera();
    let material = Material::new().with_specular(32.0, 2.0);
    let transform = Transform::from_position(Vec3::new(1.0, 0.0, -2.0));
    let lights = FrameLights::none();
    let ctx = PassContext::new(&transform, &camera, &material, &lights);

    program.bind(&mut device);
    program.update(&mut device, &ctx);

    let handle = program.handle();
    let value = |name: &str| device.uniform_value(handle, name);

    assert_eq!(value("MVP"), Some(UniformValue::Mat4(transform.mvp(&camera))));
    assert_eq!(value("Normal"), Some(UniformValue::Mat4(transform.model())));
    // Base defaults, not the material's values.
    assert_eq!(value("specularPower"), Some(UniformValue::Float(5.0)));
    assert_eq!(value("specularIntensity"), Some(UniformValue::Float(8.0)));
    assert_eq!(
        value("MaterialAmbientColor"),
        Some(UniformValue::Vec4(Vec4::new(0.1, 0.1, 0.1, 1.0)))
    );

    assert_eq!(
        value("pointLights[0].base.color"),
        Some(UniformValue::Vec3(Vec3::new(1.0, 0.0, 0.0)))
    );
    assert_eq!(
        value("pointLights[1].base.color"),
        Some(UniformValue::Vec3(Vec3::new(0.0, 1.0, 0.0)))
    );
    for i in 0..2 {
        assert_eq!(
            value(&format!("pointLights[{i}].base.intensity")),
            Some(UniformValue::Float(5.0))
        );
        assert_eq!(
            value(&format!("pointLights[{i}].position")),
            Some(UniformValue::Vec3(Vec3::new(0.0, 6.0, 2.0)))
        );
        assert_eq!(
            value(&format!("pointLights[{i}].atten.exponent")),
            Some(UniformValue::Float(1.0))
        );
    }
    assert_eq!(value("pointLights[2].base.color"), None);
}

#[test]
fn memory_loader_program_resolves_declared_subset() {
    let vertex = "uniform mat4 MVP;\nvoid main() {}";
    let fragment = "uniform vec3 eyePos;\nuniform float unrelated;\nvoid main() {}";
    let loader = MemoryLoader::new().with_program("tiny", vertex, fragment);
    let mut device = HeadlessDevice::new();

    let program: ShaderProgram<HeadlessDevice> =
        ShaderProgram::load(&mut device, &loader, "tiny", &UniformDeclarations::base(1));

    assert!(program.is_ready());
    assert_eq!(program.uniforms().resolved_count(), 2);
    assert_eq!(program.uniforms().len(), 6 + 7);
}
