#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

//! # Myth Forward
//!
//! Shader program management and multi-pass forward lighting.
//!
//! - [`ShaderProgram`]: compile / link / validate lifecycle with a uniform
//!   cache resolved once per program
//! - Forward passes: ambient, directional, point and spot, each writing only
//!   the uniforms its lighting model needs
//! - [`RenderingEngine`]: ambient-then-additive frame orchestration
//!
//! The graphics API is reached through the [`GraphicsDevice`] trait.
//! [`HeadlessDevice`] implements it without a GPU; with the `glow` feature,
//! `renderer::gl::GlowDevice` implements it on an OpenGL context.
//!
//! [`HeadlessDevice`]: renderer::headless::HeadlessDevice

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod settings;

pub use errors::{ForwardError, Result};
pub use renderer::context::{FrameLights, LightingContext, PassContext};
pub use renderer::device::{BlendMode, Drawable, GraphicsDevice, StageKind, UniformValue};
pub use renderer::pipeline::{
    ForwardAmbient, ForwardDirectional, ForwardPoint, ForwardShader, ForwardSpot, PassKind,
    ShaderPass, ShaderProgram, Uniform,
};
pub use renderer::{FrameStats, RenderObject, RenderingEngine};
pub use resources::{Material, TextureRef, TextureSlot};
pub use scene::{
    Attenuation, BaseLight, Camera, DirectionalLight, Light, LightType, PointLight, SpotLight,
    Transform,
};
pub use settings::RendererSettings;
