//! Graphics Device Abstraction
//!
//! The forward renderer talks to the graphics API through [`GraphicsDevice`],
//! a program/stage/location style interface shaped after classic GL. Handle
//! types are associated types so a backend can use its native ids.
//!
//! Two rules hold for every implementation:
//! - [`GraphicsDevice::uniform_location`] returns `None` for names the linked
//!   program does not declare. Callers treat that as an absent handle.
//! - Failures of `compile_stage`, `link_program` and `validate_program` carry
//!   the driver's diagnostic text and are reported, never panicked on.

use std::fmt::Debug;

use glam::{Mat4, Vec3, Vec4};

use crate::resources::TextureRef;

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub const ALL: [StageKind; 2] = [StageKind::Vertex, StageKind::Fragment];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StageKind::Vertex => "vertex",
            StageKind::Fragment => "fragment",
        }
    }
}

/// Value written to a uniform.
///
/// Samplers are written as `Int` texture units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

/// Output merge state for the forward passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Opaque writes with depth writes enabled. Used by the ambient pass.
    #[default]
    Replace,
    /// `ONE + ONE` blending, depth writes off, depth test `EQUAL`.
    /// Used by every per-light pass after ambient has laid down depth.
    Additive,
}

/// Graphics-layer entry points used by shader programs and the rendering engine.
pub trait GraphicsDevice {
    type Program: Copy + Eq + Debug;
    type Stage: Copy + Eq + Debug;
    type Location: Copy + Eq + Debug;

    // ========================================================================
    // Program & Stage Lifecycle
    // ========================================================================

    fn create_program(&mut self) -> Self::Program;

    fn create_stage(&mut self, kind: StageKind) -> Self::Stage;

    /// Uploads `source` and compiles it. `Err` carries the compiler log.
    fn compile_stage(&mut self, stage: Self::Stage, source: &str) -> Result<(), String>;

    fn attach_stage(&mut self, program: Self::Program, stage: Self::Stage);

    fn detach_stage(&mut self, program: Self::Program, stage: Self::Stage);

    fn delete_stage(&mut self, stage: Self::Stage);

    /// Binds a vertex attribute name to a fixed slot. Only effective before linking.
    fn bind_attribute_location(&mut self, program: Self::Program, slot: u32, name: &str);

    /// `Err` carries the linker log.
    fn link_program(&mut self, program: Self::Program) -> Result<(), String>;

    /// `Err` carries the validation log.
    fn validate_program(&mut self, program: Self::Program) -> Result<(), String>;

    fn delete_program(&mut self, program: Self::Program);

    // ========================================================================
    // Uniforms
    // ========================================================================

    /// Resolves a uniform name in a linked program.
    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::Location>;

    fn set_uniform(&mut self, program: Self::Program, location: Self::Location, value: UniformValue);

    // ========================================================================
    // Pipeline State
    // ========================================================================

    /// Makes `program` the one used by subsequent draws.
    fn use_program(&mut self, program: Self::Program);

    fn set_blend_mode(&mut self, mode: BlendMode);

    fn bind_texture(&mut self, unit: u32, texture: &TextureRef);
}

/// Geometry that can issue its own draw call on a device.
///
/// Mesh upload and vertex layout are owned by the caller; the forward
/// renderer only decides when to draw and with which program bound.
pub trait Drawable<D: GraphicsDevice> {
    fn draw(&self, device: &mut D);
}
