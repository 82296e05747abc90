//! Forward renderer
//!
//! [`RenderingEngine`] owns one program per forward pass and drives a frame:
//!
//! 1. **Ambient**: blend `Replace`, every object drawn once. This lays down
//!    depth and the base lit colour.
//! 2. **Lights**: blend `Additive`, one draw per (light, object) pair through
//!    the pass matching the light's type, with that light as the only active
//!    one.
//!
//! Ambient for every object is complete before any additive draw is issued.
//! Blend state is back to `Replace` when a frame returns, including on error.

pub mod context;
pub mod device;
#[cfg(all(feature = "glow", not(target_arch = "wasm32")))]
pub mod gl;
pub mod headless;
pub mod pipeline;

use log::{info, trace};

use self::context::{FrameLights, LightingContext, PassContext};
use self::device::{BlendMode, Drawable, GraphicsDevice};
use self::pipeline::{FileSystemLoader, ForwardShader, PassKind, ShaderPass, ShaderSourceLoader};
use crate::errors::Result;
use crate::resources::Material;
use crate::scene::{Camera, Light, Transform};
use crate::settings::RendererSettings;

/// One drawable object for a frame. Everything is borrowed from the scene.
pub struct RenderObject<'a, D: GraphicsDevice> {
    pub transform: &'a Transform,
    pub material: &'a Material,
    pub mesh: &'a dyn Drawable<D>,
}

impl<'a, D: GraphicsDevice> RenderObject<'a, D> {
    pub fn new(transform: &'a Transform, material: &'a Material, mesh: &'a dyn Drawable<D>) -> Self {
        Self {
            transform,
            material,
            mesh,
        }
    }
}

impl<D: GraphicsDevice> Clone for RenderObject<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: GraphicsDevice> Copy for RenderObject<'_, D> {}

/// Draw counts for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub objects: usize,
    pub lights: usize,
    pub ambient_draws: usize,
    pub light_draws: usize,
}

impl FrameStats {
    #[must_use]
    pub fn total_draws(&self) -> usize {
        self.ambient_draws + self.light_draws
    }
}

pub struct RenderingEngine<D: GraphicsDevice> {
    settings: RendererSettings,
    /// Indexed by `PassKind as usize`.
    passes: [ForwardShader<D>; 4],
}

impl<D: GraphicsDevice> RenderingEngine<D> {
    /// Loads every pass program through `loader`.
    ///
    /// Programs that fail to build do not fail construction; see
    /// [`RenderingEngine::check`].
    pub fn new(
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
        settings: RendererSettings,
    ) -> Result<Self> {
        settings.validate()?;

        let passes = PassKind::ALL.map(|kind| {
            ForwardShader::load(
                kind,
                device,
                loader,
                settings.shader_name(kind),
                settings.max_point_lights,
            )
        });

        let ready = passes
            .iter()
            .filter(|pass| pass.program().is_ready())
            .count();
        info!("Forward renderer initialized: {ready}/{} passes ready", passes.len());

        Ok(Self { settings, passes })
    }

    /// Loads pass programs from `settings.shader_dir`.
    pub fn from_settings(device: &mut D, settings: RendererSettings) -> Result<Self> {
        let loader = FileSystemLoader::from_settings(&settings);
        Self::new(device, &loader, settings)
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[must_use]
    pub fn pass(&self, kind: PassKind) -> &ForwardShader<D> {
        &self.passes[kind as usize]
    }

    /// `Err` for the first pass whose program failed to build.
    pub fn check(&self) -> Result<()> {
        self.passes
            .iter()
            .try_for_each(|pass| pass.program().check())
    }

    /// Renders one frame: ambient for all objects, then one additive draw per
    /// (light, object).
    pub fn render(
        &self,
        device: &mut D,
        camera: &Camera,
        objects: &[RenderObject<'_, D>],
        lights: &[&Light],
    ) -> Result<FrameStats> {
        let mut stats = FrameStats {
            objects: objects.len(),
            lights: lights.len(),
            ..FrameStats::default()
        };

        let ambient = self.pass(PassKind::Ambient);
        let no_lights = FrameLights::none();
        device.set_blend_mode(PassKind::Ambient.blend_mode());
        ambient.bind(device);
        for object in objects {
            Self::draw(device, ambient, camera, object, &no_lights)?;
            stats.ambient_draws += 1;
        }

        if !lights.is_empty() {
            device.set_blend_mode(BlendMode::Additive);
            let result: Result<()> = lights.iter().try_for_each(|light| {
                let kind = PassKind::for_light(light.light_type());
                stats.light_draws +=
                    self.draw_light(device, camera, objects, kind, &FrameLights::for_light(light))?;
                Ok(())
            });
            device.set_blend_mode(BlendMode::Replace);
            result?;
        }

        trace!("Frame rendered: {stats:?}");
        Ok(stats)
    }

    /// One additive light pass: every object drawn through `kind`'s program
    /// under `lights`. Returns the number of draws.
    ///
    /// `render` issues these per light; this entry point lets a caller supply
    /// its own lighting context.
    pub fn render_light(
        &self,
        device: &mut D,
        camera: &Camera,
        objects: &[RenderObject<'_, D>],
        kind: PassKind,
        lights: &dyn LightingContext,
    ) -> Result<usize> {
        device.set_blend_mode(BlendMode::Additive);
        let result = self.draw_light(device, camera, objects, kind, lights);
        device.set_blend_mode(BlendMode::Replace);
        result
    }

    fn draw_light(
        &self,
        device: &mut D,
        camera: &Camera,
        objects: &[RenderObject<'_, D>],
        kind: PassKind,
        lights: &dyn LightingContext,
    ) -> Result<usize> {
        let pass = self.pass(kind);
        pass.bind(device);
        for object in objects {
            Self::draw(device, pass, camera, object, lights)?;
        }
        Ok(objects.len())
    }

    fn draw(
        device: &mut D,
        pass: &ForwardShader<D>,
        camera: &Camera,
        object: &RenderObject<'_, D>,
        lights: &dyn LightingContext,
    ) -> Result<()> {
        for (slot, texture) in object.material.slot_textures() {
            device.bind_texture(slot.unit(), texture);
        }
        let ctx = PassContext::new(object.transform, camera, object.material, lights);
        pass.update(device, &ctx)?;
        object.mesh.draw(device);
        Ok(())
    }

    /// Releases every pass program.
    pub fn destroy(self, device: &mut D) {
        for pass in self.passes {
            pass.destroy(device);
        }
    }
}
