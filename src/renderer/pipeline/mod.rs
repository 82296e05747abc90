//! Shader pipeline
//!
//! - `source`: stage source loading by base name + suffix
//! - `uniforms`: enum-keyed uniform registry with an explicit absent slot
//! - `program`: program lifecycle and the base update contract
//! - `passes`: ambient / directional / point / spot forward passes

pub mod passes;
pub mod program;
pub mod source;
pub mod uniforms;

pub use passes::{
    ForwardAmbient, ForwardDirectional, ForwardPoint, ForwardShader, ForwardSpot, PassKind,
    ShaderPass,
};
pub use program::{FailureStage, ProgramFailure, ProgramState, ShaderProgram, VERTEX_ATTRIBUTES};
pub use source::{FileSystemLoader, MemoryLoader, ShaderSourceLoader};
pub use uniforms::{
    DirectionalField, PointField, SpotField, Uniform, UniformCache, UniformDeclarations,
    UniformSlot,
};
