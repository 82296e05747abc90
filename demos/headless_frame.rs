//! Headless forward frame
//!
//! Loads the shipped forward shaders into the headless device, renders one
//! frame of two objects under three lights, and prints what each draw did.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example headless_frame
//! ```

use glam::Vec3;

use myth_forward::renderer::headless::{HeadlessDevice, HeadlessMesh};
use myth_forward::{
    Camera, DirectionalLight, Light, Material, PointLight, RenderObject, RendererSettings,
    RenderingEngine, SpotLight, TextureRef, Transform,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = RendererSettings {
        shader_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders").into(),
        ..RendererSettings::default()
    };

    let mut device = HeadlessDevice::new();
    let engine = RenderingEngine::from_settings(&mut device, settings)?;
    engine.check()?;

    let mut camera = Camera::new_perspective(Vec3::new(0.0, 4.0, 8.0), 70.0, 16.0 / 9.0, 0.1, 1000.0);
    camera.look_at(Vec3::ZERO);

    // Scene
    let floor_mesh = HeadlessMesh::new("floor");
    let floor_transform = Transform::new();
    let mut floor_material = Material::new().with_specular(8.0, 1.0).with_displacement(0.03, 0.5);
    floor_material.add_texture("diffuse", TextureRef::new("bricks.jpg"));
    floor_material.add_texture("normalMap", TextureRef::new("bricks_normal.jpg"));
    floor_material.add_texture("dispMap", TextureRef::new("bricks_disp.jpg"));

    let monkey_mesh = HeadlessMesh::new("monkey");
    let mut monkey_transform = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
    monkey_transform.set_rotation_euler(0.0, 0.6, 0.0);
    let mut monkey_material = Material::new().with_specular(32.0, 2.0);
    monkey_material.add_texture("diffuse", TextureRef::new("test.png"));

    let objects: [RenderObject<'_, HeadlessDevice>; 2] = [
        RenderObject::new(&floor_transform, &floor_material, &floor_mesh),
        RenderObject::new(&monkey_transform, &monkey_material, &monkey_mesh),
    ];

    let lights: [Light; 3] = [
        DirectionalLight::new(Vec3::new(1.0, 0.95, 0.9), 0.4, Vec3::new(1.0, -1.0, -1.0)).into(),
        PointLight::new(Vec3::new(0.0, 0.5, 1.0), 4.0, Vec3::new(-3.0, 2.0, 1.0)).into(),
        SpotLight::new(Vec3::ONE, 8.0)
            .with_position(Vec3::new(2.0, 5.0, 0.0))
            .with_direction(Vec3::new(-0.3, -1.0, 0.0))
            .into(),
    ];
    let light_refs: Vec<&Light> = lights.iter().collect();

    let stats = engine.render(&mut device, &camera, &objects, &light_refs)?;

    for draw in device.draws() {
        println!("{:<8} {:?} {:?}", draw.label, draw.blend, draw.program);
    }
    println!(
        "{} draws ({} ambient, {} additive), {} uniform writes",
        stats.total_draws(),
        stats.ambient_draws,
        stats.light_draws,
        device.writes().len()
    );

    engine.destroy(&mut device);
    Ok(())
}
