//! Shader program lifecycle
//!
//! ```text
//! Uninitialized ─► Compiling ─► Linked ─► Validated ─► Ready
//!                      │           │          │
//!                      └───────────┴──────────┴─────► Failed
//! ```
//!
//! A program that fails to compile, link or validate is not an error for the
//! caller: the driver diagnostic is logged, the object stays alive in the
//! `Failed` state, and its uniform cache is entirely absent so every write
//! through it is a no-op. [`ShaderProgram::check`] is available for callers
//! that want to treat a failed program as fatal.

use std::fmt;

use glam::{Vec3, Vec4};
use log::{error, info, trace};
use smallvec::SmallVec;
use thiserror::Error;

use super::source::ShaderSourceLoader;
use super::uniforms::{PointField, Uniform, UniformCache, UniformDeclarations};
use crate::errors::{ForwardError, Result};
use crate::renderer::context::PassContext;
use crate::renderer::device::{GraphicsDevice, StageKind, UniformValue};
use crate::scene::PointLight;

/// Vertex attribute slots bound before linking.
pub const VERTEX_ATTRIBUTES: [(u32, &str); 3] = [(0, "position"), (1, "texCoord"), (2, "normal")];

pub const DEFAULT_SPECULAR_POWER: f32 = 5.0;
pub const DEFAULT_SPECULAR_INTENSITY: f32 = 8.0;
pub const DEFAULT_AMBIENT_COLOR: Vec4 = Vec4::new(0.1, 0.1, 0.1, 1.0);

/// Fixed pair of point lights the base update shades with when a program is
/// used on its own, outside the forward passes.
#[must_use]
pub fn demo_point_lights() -> [PointLight; 2] {
    let position = Vec3::new(0.0, 6.0, 2.0);
    [
        PointLight::new(Vec3::new(1.0, 0.0, 0.0), 5.0, position),
        PointLight::new(Vec3::new(0.0, 1.0, 0.0), 5.0, position),
    ]
}

// ============================================================================
// State
// ============================================================================

/// Step of program construction that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Compile(StageKind),
    Link,
    Validate,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Compile(kind) => write!(f, "{} shader compilation", kind.label()),
            FailureStage::Link => f.write_str("program linking"),
            FailureStage::Validate => f.write_str("program validation"),
        }
    }
}

/// Where construction failed, with the driver-supplied log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} failed: '{log}'")]
pub struct ProgramFailure {
    pub stage: FailureStage,
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProgramState {
    #[default]
    Uninitialized,
    Compiling,
    Linked,
    Validated,
    Ready,
    Failed(ProgramFailure),
}

// ============================================================================
// ShaderProgram
// ============================================================================

/// A linked GPU program, the stages it owns, and its uniform cache.
pub struct ShaderProgram<D: GraphicsDevice> {
    name: String,
    handle: D::Program,
    stages: SmallVec<[D::Stage; 2]>,
    state: ProgramState,
    uniforms: UniformCache<D::Location>,
}

impl<D: GraphicsDevice> fmt::Debug for ShaderProgram<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("stages", &self.stages)
            .field("state", &self.state)
            .field("uniforms", &self.uniforms.len())
            .finish()
    }
}

impl<D: GraphicsDevice> ShaderProgram<D> {
    /// Builds the program `name` and resolves `declarations` once it is ready.
    ///
    /// Never fails: build errors are logged and leave the program `Failed`.
    pub fn load(
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
        name: &str,
        declarations: &UniformDeclarations,
    ) -> Self {
        let handle = device.create_program();
        let mut program = Self {
            name: name.to_string(),
            handle,
            stages: SmallVec::new(),
            state: ProgramState::Uninitialized,
            uniforms: UniformCache::unresolved(&UniformDeclarations::new()),
        };

        match program.build(device, loader) {
            Ok(()) => {
                program.uniforms = UniformCache::resolve(device, handle, declarations);
                program.transition(ProgramState::Ready);
                info!(
                    "Shader program '{name}' ready ({} uniforms resolved)",
                    program.uniforms.resolved_count()
                );
            }
            Err(failure) => {
                error!("Shader program '{name}': {failure}");
                program.uniforms = UniformCache::unresolved(declarations);
                program.transition(ProgramState::Failed(failure));
            }
        }

        program
    }

    fn build(
        &mut self,
        device: &mut D,
        loader: &dyn ShaderSourceLoader,
    ) -> std::result::Result<(), ProgramFailure> {
        self.transition(ProgramState::Compiling);

        let mut compile_failure = None;
        for kind in StageKind::ALL {
            let source = loader.load(&self.name, kind);
            let stage = device.create_stage(kind);
            if let Err(log) = device.compile_stage(stage, &source) {
                error!("Error compiling shader '{}' ({}): '{log}'", self.name, kind.label());
                compile_failure.get_or_insert(ProgramFailure {
                    stage: FailureStage::Compile(kind),
                    log,
                });
            }
            self.stages.push(stage);
        }

        // Stages are attached even after a compile error so teardown always detaches them.
        for &stage in &self.stages {
            device.attach_stage(self.handle, stage);
        }
        if let Some(failure) = compile_failure {
            return Err(failure);
        }

        for (slot, attribute) in VERTEX_ATTRIBUTES {
            device.bind_attribute_location(self.handle, slot, attribute);
        }

        device
            .link_program(self.handle)
            .map_err(|log| ProgramFailure {
                stage: FailureStage::Link,
                log,
            })?;
        self.transition(ProgramState::Linked);

        device
            .validate_program(self.handle)
            .map_err(|log| ProgramFailure {
                stage: FailureStage::Validate,
                log,
            })?;
        self.transition(ProgramState::Validated);

        Ok(())
    }

    fn transition(&mut self, state: ProgramState) {
        trace!("Shader program '{}': {:?} -> {:?}", self.name, self.state, state);
        self.state = state;
    }

    /// Detaches and deletes every stage, then deletes the program.
    pub fn destroy(self, device: &mut D) {
        for &stage in &self.stages {
            device.detach_stage(self.handle, stage);
            device.delete_stage(stage);
        }
        device.delete_program(self.handle);
    }

    /// Makes this program current on the device.
    pub fn bind(&self, device: &mut D) {
        device.use_program(self.handle);
    }

    /// Writes `value` through a cached handle; absent or undeclared keys are no-ops.
    #[inline]
    pub fn set(&self, device: &mut D, key: Uniform, value: impl Into<UniformValue>) {
        if let Some(location) = self.uniforms.location(key) {
            device.set_uniform(self.handle, location, value.into());
        }
    }

    /// Writes one point light through the struct keys produced by `key`.
    pub fn set_point_light(
        &self,
        device: &mut D,
        light: &PointLight,
        key: impl Fn(PointField) -> Uniform,
    ) {
        self.set(device, key(PointField::Color), light.base.color);
        self.set(device, key(PointField::Intensity), light.base.intensity);
        self.set(device, key(PointField::Range), light.range);
        self.set(device, key(PointField::AttenConstant), light.attenuation.constant);
        self.set(device, key(PointField::AttenLinear), light.attenuation.linear);
        self.set(device, key(PointField::AttenExponent), light.attenuation.exponent);
        self.set(device, key(PointField::Position), light.position);
    }

    /// Writes `lights` into the `pointLights[i]` array entries.
    ///
    /// Entries beyond the declared array length are skipped.
    pub fn set_point_lights(&self, device: &mut D, lights: &[PointLight]) {
        for (index, light) in lights.iter().enumerate() {
            let Ok(index) = u8::try_from(index) else {
                break;
            };
            self.set_point_light(device, light, |field| Uniform::PointLights { index, field });
        }
    }

    /// Base update contract: transforms, specular defaults, the demonstration
    /// point lights and the default ambient colour.
    ///
    /// Pass variants run this first and then overwrite what they own.
    pub fn update(&self, device: &mut D, ctx: &PassContext<'_>) {
        self.set(device, Uniform::Mvp, ctx.transform.mvp(ctx.camera));
        self.set(device, Uniform::Normal, ctx.transform.model());

        self.set(device, Uniform::SpecularPower, DEFAULT_SPECULAR_POWER);
        self.set(device, Uniform::SpecularIntensity, DEFAULT_SPECULAR_INTENSITY);

        self.set_point_lights(device, &demo_point_lights());

        self.set(device, Uniform::MaterialAmbientColor, DEFAULT_AMBIENT_COLOR);
    }

    /// `Err` when the program failed to build.
    pub fn check(&self) -> Result<()> {
        match &self.state {
            ProgramState::Failed(failure) => Err(ForwardError::ProgramUnavailable {
                name: self.name.clone(),
                failure: failure.clone(),
            }),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn handle(&self) -> D::Program {
        self.handle
    }

    #[must_use]
    pub fn stages(&self) -> &[D::Stage] {
        &self.stages
    }

    #[must_use]
    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ProgramState::Ready
    }

    #[must_use]
    pub fn uniforms(&self) -> &UniformCache<D::Location> {
        &self.uniforms
    }
}
