//! Forward Lighting Passes
//!
//! One program per lighting component. Every pass runs the base program
//! update first, so transforms are always current, then writes its own
//! subset:
//!
//! | Pass        | Own writes                                                        |
//! |-------------|-------------------------------------------------------------------|
//! | Ambient     | ambient colour, samplers, displacement, eye position              |
//! | Directional | samplers, displacement, `directionalLight.*`, specular, eye       |
//! | Point       | samplers, displacement, `pointLight.*`, specular, eye             |
//! | Spot        | samplers, displacement, `spotLight.*`, specular, eye              |
//!
//! Blend state is not touched here; the caller selects [`PassKind::blend_mode`]
//! before drawing.

use log::debug;

use super::program::ShaderProgram;
use super::source::ShaderSourceLoader;
use super::uniforms::{DirectionalField, PointField, SpotField, Uniform, UniformDeclarations};
use crate::errors::{ForwardError, Result};
use crate::renderer::context::PassContext;
use crate::renderer::device::{BlendMode, GraphicsDevice, UniformValue};
use crate::resources::{Material, TextureSlot};
use crate::scene::{Camera, LightType};

/// Lighting component a pass contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

impl PassKind {
    pub const ALL: [PassKind; 4] = [
        PassKind::Ambient,
        PassKind::Directional,
        PassKind::Point,
        PassKind::Spot,
    ];

    #[must_use]
    pub const fn for_light(light_type: LightType) -> Self {
        match light_type {
            LightType::Directional => PassKind::Directional,
            LightType::Point => PassKind::Point,
            LightType::Spot => PassKind::Spot,
        }
    }

    /// Ambient lays down the base colour; every light pass adds onto it.
    #[must_use]
    pub const fn blend_mode(self) -> BlendMode {
        match self {
            PassKind::Ambient => BlendMode::Replace,
            PassKind::Directional | PassKind::Point | PassKind::Spot => BlendMode::Additive,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PassKind::Ambient => "ambient",
            PassKind::Directional => "directional",
            PassKind::Point => "point",
            PassKind::Spot => "spot",
        }
    }

    /// Uniforms a program of this kind declares, on top of `max_point_lights`
    /// base array entries.
    #[must_use]
    pub fn declarations(self, max_point_lights: usize) -> UniformDeclarations {
        let mut declarations =
            UniformDeclarations::base(max_point_lights).with(&UniformDeclarations::surface());
        match self {
            PassKind::Ambient => {}
            PassKind::Directional => {
                declarations.extend(DirectionalField::ALL.into_iter().map(Uniform::DirectionalLight));
            }
            PassKind::Point => {
                declarations.extend(PointField::ALL.into_iter().map(Uniform::PointLight));
            }
            PassKind::Spot => {
                declarations.extend(SpotField::all().map(Uniform::SpotLight));
            }
        }
        declarations
    }
}

/// Capability shared by every program that can shade a draw.
pub trait ShaderPass<D: GraphicsDevice> {
    fn program(&self) -> &ShaderProgram<D>;

    fn bind(&self, device: &mut D) {
        self.program().bind(device);
    }

    /// Writes this frame's uniforms for one draw.
    fn update(&self, device: &mut D, ctx: &PassContext<'_>) -> Result<()>;
}

impl<D: GraphicsDevice> ShaderPass<D> for ShaderProgram<D> {
    fn program(&self) -> &ShaderProgram<D> {
        self
    }

    fn update(&self, device: &mut D, ctx: &PassContext<'_>) -> Result<()> {
        ShaderProgram::update(self, device, ctx);
        Ok(())
    }
}

// ============================================================================
// Shared writes
// ============================================================================

/// Samplers on their fixed units, displacement scale/bias and eye position.
#[allow(clippy::cast_possible_wrap)]
fn write_surface<D: GraphicsDevice>(
    program: &ShaderProgram<D>,
    device: &mut D,
    material: &Material,
    camera: &Camera,
) {
    for slot in TextureSlot::ALL {
        program.set(device, Uniform::Sampler(slot), UniformValue::Int(slot.unit() as i32));
    }
    program.set(device, Uniform::DispMapScale, material.disp_map_scale);
    program.set(device, Uniform::DispMapBias, material.disp_map_bias());
    program.set(device, Uniform::EyePos, camera.position());
}

fn write_specular<D: GraphicsDevice>(program: &ShaderProgram<D>, device: &mut D, material: &Material) {
    program.set(device, Uniform::SpecularPower, material.specular_power);
    program.set(device, Uniform::SpecularIntensity, material.specular_intensity);
}

// ============================================================================
// Ambient
// ============================================================================

pub struct ForwardAmbient<D: GraphicsDevice> {
    program: ShaderProgram<D>,
}

impl<D: GraphicsDevice> ForwardAmbient<D> {
    pub fn new(
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
        name: &str,
        max_point_lights: usize,
    ) -> Self {
        let declarations = PassKind::Ambient.declarations(max_point_lights);
        Self {
            program: ShaderProgram::load(device, loader, name, &declarations),
        }
    }

    pub fn destroy(self, device: &mut D) {
        self.program.destroy(device);
    }
}

impl<D: GraphicsDevice> ShaderPass<D> for ForwardAmbient<D> {
    fn program(&self) -> &ShaderProgram<D> {
        &self.program
    }

    fn update(&self, device: &mut D, ctx: &PassContext<'_>) -> Result<()> {
        self.program.update(device, ctx);

        self.program
            .set(device, Uniform::MaterialAmbientColor, ctx.material.ambient_color);
        write_surface(&self.program, device, ctx.material, ctx.camera);
        Ok(())
    }
}

// ============================================================================
// Directional
// ============================================================================

pub struct ForwardDirectional<D: GraphicsDevice> {
    program: ShaderProgram<D>,
}

impl<D: GraphicsDevice> ForwardDirectional<D> {
    pub fn new(
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
        name: &str,
        max_point_lights: usize,
    ) -> Self {
        let declarations = PassKind::Directional.declarations(max_point_lights);
        Self {
            program: ShaderProgram::load(device, loader, name, &declarations),
        }
    }

    pub fn destroy(self, device: &mut D) {
        self.program.destroy(device);
    }
}

impl<D: GraphicsDevice> ShaderPass<D> for ForwardDirectional<D> {
    fn program(&self) -> &ShaderProgram<D> {
        &self.program
    }

    fn update(&self, device: &mut D, ctx: &PassContext<'_>) -> Result<()> {
        self.program.update(device, ctx);

        let light = ctx
            .lights
            .active_directional_light()
            .ok_or(ForwardError::MissingActiveLight {
                pass: PassKind::Directional,
            })?;

        let program = &self.program;
        write_surface(program, device, ctx.material, ctx.camera);
        program.set(
            device,
            Uniform::DirectionalLight(DirectionalField::Color),
            light.base.color,
        );
        program.set(
            device,
            Uniform::DirectionalLight(DirectionalField::Intensity),
            light.base.intensity,
        );
        program.set(
            device,
            Uniform::DirectionalLight(DirectionalField::Direction),
            light.direction,
        );
        write_specular(program, device, ctx.material);
        Ok(())
    }
}

// ============================================================================
// Point
// ============================================================================

pub struct ForwardPoint<D: GraphicsDevice> {
    program: ShaderProgram<D>,
}

impl<D: GraphicsDevice> ForwardPoint<D> {
    pub fn new(
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
        name: &str,
        max_point_lights: usize,
    ) -> Self {
        let declarations = PassKind::Point.declarations(max_point_lights);
        Self {
            program: ShaderProgram::load(device, loader, name, &declarations),
        }
    }

    pub fn destroy(self, device: &mut D) {
        self.program.destroy(device);
    }
}

impl<D: GraphicsDevice> ShaderPass<D> for ForwardPoint<D> {
    fn program(&self) -> &ShaderProgram<D> {
        &self.program
    }

    fn update(&self, device: &mut D, ctx: &PassContext<'_>) -> Result<()> {
        self.program.update(device, ctx);

        let light = ctx
            .lights
            .active_point_light()
            .ok_or(ForwardError::MissingActiveLight {
                pass: PassKind::Point,
            })?;

        write_surface(&self.program, device, ctx.material, ctx.camera);
        self.program.set_point_light(device, light, Uniform::PointLight);
        write_specular(&self.program, device, ctx.material);
        Ok(())
    }
}

// ============================================================================
// Spot
// ============================================================================

pub struct ForwardSpot<D: GraphicsDevice> {
    program: ShaderProgram<D>,
}

impl<D: GraphicsDevice> ForwardSpot<D> {
    pub fn new(
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
        name: &str,
        max_point_lights: usize,
    ) -> Self {
        let declarations = PassKind::Spot.declarations(max_point_lights);
        Self {
            program: ShaderProgram::load(device, loader, name, &declarations),
        }
    }

    pub fn destroy(self, device: &mut D) {
        self.program.destroy(device);
    }
}

impl<D: GraphicsDevice> ShaderPass<D> for ForwardSpot<D> {
    fn program(&self) -> &ShaderProgram<D> {
        &self.program
    }

    fn update(&self, device: &mut D, ctx: &PassContext<'_>) -> Result<()> {
        self.program.update(device, ctx);

        let light = ctx
            .lights
            .active_spot_light()
            .ok_or(ForwardError::MissingActiveLight {
                pass: PassKind::Spot,
            })?;

        let program = &self.program;
        write_surface(program, device, ctx.material, ctx.camera);
        program.set_point_light(device, &light.point, |field| {
            Uniform::SpotLight(SpotField::Point(field))
        });
        program.set(device, Uniform::SpotLight(SpotField::Direction), light.direction);
        program.set(device, Uniform::SpotLight(SpotField::Cutoff), light.cutoff);
        write_specular(program, device, ctx.material);
        Ok(())
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Closed set of forward passes, selected per draw by the rendering engine.
pub enum ForwardShader<D: GraphicsDevice> {
    Ambient(ForwardAmbient<D>),
    Directional(ForwardDirectional<D>),
    Point(ForwardPoint<D>),
    Spot(ForwardSpot<D>),
}

impl<D: GraphicsDevice> ForwardShader<D> {
    /// Builds the pass of `kind` from the program `name`.
    pub fn load(
        kind: PassKind,
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
        name: &str,
        max_point_lights: usize,
    ) -> Self {
        debug!("Loading {} pass from '{name}'", kind.label());
        match kind {
            PassKind::Ambient => {
                ForwardShader::Ambient(ForwardAmbient::new(device, loader, name, max_point_lights))
            }
            PassKind::Directional => ForwardShader::Directional(ForwardDirectional::new(
                device,
                loader,
                name,
                max_point_lights,
            )),
            PassKind::Point => {
                ForwardShader::Point(ForwardPoint::new(device, loader, name, max_point_lights))
            }
            PassKind::Spot => {
                ForwardShader::Spot(ForwardSpot::new(device, loader, name, max_point_lights))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> PassKind {
        match self {
            ForwardShader::Ambient(_) => PassKind::Ambient,
            ForwardShader::Directional(_) => PassKind::Directional,
            ForwardShader::Point(_) => PassKind::Point,
            ForwardShader::Spot(_) => PassKind::Spot,
        }
    }

    pub fn destroy(self, device: &mut D) {
        match self {
            ForwardShader::Ambient(pass) => pass.destroy(device),
            ForwardShader::Directional(pass) => pass.destroy(device),
            ForwardShader::Point(pass) => pass.destroy(device),
            ForwardShader::Spot(pass) => pass.destroy(device),
        }
    }
}

impl<D: GraphicsDevice> ShaderPass<D> for ForwardShader<D> {
    fn program(&self) -> &ShaderProgram<D> {
        match self {
            ForwardShader::Ambient(pass) => pass.program(),
            ForwardShader::Directional(pass) => pass.program(),
            ForwardShader::Point(pass) => pass.program(),
            ForwardShader::Spot(pass) => pass.program(),
        }
    }

    fn update(&self, device: &mut D, ctx: &PassContext<'_>) -> Result<()> {
        match self {
            ForwardShader::Ambient(pass) => pass.update(device, ctx),
            ForwardShader::Directional(pass) => pass.update(device, ctx),
            ForwardShader::Point(pass) => pass.update(device, ctx),
            ForwardShader::Spot(pass) => pass.update(device, ctx),
        }
    }
}
