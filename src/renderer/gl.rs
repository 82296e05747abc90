//! OpenGL backend
//!
//! [`GlowDevice`] drives the [`GraphicsDevice`] seam through a `glow`
//! context: stages are GL shader objects, programs are GL program objects and
//! uniform locations come straight from `glGetUniformLocation`, so a name the
//! driver optimized away resolves to `None` like any other absent uniform.
//!
//! Object creation cannot fail through the seam. When the driver refuses to
//! create an object the handle carries `None`, the failure is logged, and
//! compiling or linking that handle fails through the normal program
//! lifecycle.
//!
//! Textures are decoded and uploaded elsewhere; register the resulting GL
//! texture under its [`TextureRef`] with [`GlowDevice::register_texture`].

use std::fmt;

use glow::HasContext;
use log::{error, warn};
use rustc_hash::FxHashMap;

use crate::renderer::device::{BlendMode, Drawable, GraphicsDevice, StageKind, UniformValue};
use crate::resources::TextureRef;

/// GL program object. `None` when creation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlProgram(Option<glow::Program>);

impl GlProgram {
    #[must_use]
    pub fn raw(self) -> Option<glow::Program> {
        self.0
    }
}

/// GL shader object. `None` when creation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlStage(Option<glow::Shader>);

impl GlStage {
    #[must_use]
    pub fn raw(self) -> Option<glow::Shader> {
        self.0
    }
}

#[must_use]
pub const fn shader_type(kind: StageKind) -> u32 {
    match kind {
        StageKind::Vertex => glow::VERTEX_SHADER,
        StageKind::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// Fixed-function state applied for a [`BlendMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    /// `(src, dst)` factors, or `None` with blending disabled.
    pub blend_func: Option<(u32, u32)>,
    pub depth_write: bool,
    pub depth_func: u32,
}

impl BlendState {
    #[must_use]
    pub const fn for_mode(mode: BlendMode) -> Self {
        match mode {
            BlendMode::Replace => Self {
                blend_func: None,
                depth_write: true,
                depth_func: glow::LESS,
            },
            BlendMode::Additive => Self {
                blend_func: Some((glow::ONE, glow::ONE)),
                depth_write: false,
                depth_func: glow::EQUAL,
            },
        }
    }
}

pub struct GlowDevice {
    gl: glow::Context,
    bound: Option<glow::Program>,
    textures: FxHashMap<TextureRef, glow::Texture>,
}

impl fmt::Debug for GlowDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowDevice")
            .field("bound", &self.bound)
            .field("textures", &self.textures.len())
            .finish_non_exhaustive()
    }
}

impl GlowDevice {
    /// Wraps `gl` and enables depth testing.
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread whenever the device is used.
    #[must_use]
    pub unsafe fn new(gl: glow::Context) -> Self {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
        }
        Self {
            gl,
            bound: None,
            textures: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }

    /// Associates an uploaded GL texture with the reference materials use.
    pub fn register_texture(&mut self, texture: TextureRef, handle: glow::Texture) {
        self.textures.insert(texture, handle);
    }

    /// Forgets a texture. Deleting the GL object is up to the caller.
    pub fn unregister_texture(&mut self, texture: &TextureRef) -> Option<glow::Texture> {
        self.textures.remove(texture)
    }

    fn make_current(&mut self, program: glow::Program) {
        if self.bound != Some(program) {
            unsafe { self.gl.use_program(Some(program)) };
            self.bound = Some(program);
        }
    }
}

impl GraphicsDevice for GlowDevice {
    type Program = GlProgram;
    type Stage = GlStage;
    type Location = glow::UniformLocation;

    // ========================================================================
    // Program & Stage Lifecycle
    // ========================================================================

    fn create_program(&mut self) -> GlProgram {
        match unsafe { self.gl.create_program() } {
            Ok(program) => GlProgram(Some(program)),
            Err(e) => {
                error!("glCreateProgram failed: {e}");
                GlProgram(None)
            }
        }
    }

    fn create_stage(&mut self, kind: StageKind) -> GlStage {
        match unsafe { self.gl.create_shader(shader_type(kind)) } {
            Ok(shader) => GlStage(Some(shader)),
            Err(e) => {
                error!("glCreateShader({}) failed: {e}", kind.label());
                GlStage(None)
            }
        }
    }

    fn compile_stage(&mut self, stage: GlStage, source: &str) -> Result<(), String> {
        let Some(shader) = stage.0 else {
            return Err("shader object was never created".to_string());
        };
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if self.gl.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(shader))
            }
        }
    }

    fn attach_stage(&mut self, program: GlProgram, stage: GlStage) {
        if let (Some(program), Some(shader)) = (program.0, stage.0) {
            unsafe { self.gl.attach_shader(program, shader) };
        }
    }

    fn detach_stage(&mut self, program: GlProgram, stage: GlStage) {
        if let (Some(program), Some(shader)) = (program.0, stage.0) {
            unsafe { self.gl.detach_shader(program, shader) };
        }
    }

    fn delete_stage(&mut self, stage: GlStage) {
        if let Some(shader) = stage.0 {
            unsafe { self.gl.delete_shader(shader) };
        }
    }

    fn bind_attribute_location(&mut self, program: GlProgram, slot: u32, name: &str) {
        if let Some(program) = program.0 {
            unsafe { self.gl.bind_attrib_location(program, slot, name) };
        }
    }

    fn link_program(&mut self, program: GlProgram) -> Result<(), String> {
        let Some(program) = program.0 else {
            return Err("program object was never created".to_string());
        };
        unsafe {
            self.gl.link_program(program);
            if self.gl.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program))
            }
        }
    }

    fn validate_program(&mut self, program: GlProgram) -> Result<(), String> {
        let Some(program) = program.0 else {
            return Err("program object was never created".to_string());
        };
        unsafe {
            self.gl.validate_program(program);
            if self.gl.get_program_validate_status(program) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program))
            }
        }
    }

    fn delete_program(&mut self, program: GlProgram) {
        let Some(program) = program.0 else {
            return;
        };
        if self.bound == Some(program) {
            unsafe { self.gl.use_program(None) };
            self.bound = None;
        }
        unsafe { self.gl.delete_program(program) };
    }

    // ========================================================================
    // Uniforms
    // ========================================================================

    fn uniform_location(&mut self, program: GlProgram, name: &str) -> Option<glow::UniformLocation> {
        let program = program.0?;
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    /// `glUniform*` targets the program in use, so `program` is made current first.
    fn set_uniform(&mut self, program: GlProgram, location: glow::UniformLocation, value: UniformValue) {
        let Some(program) = program.0 else {
            warn!("set_uniform: program object was never created");
            return;
        };
        self.make_current(program);

        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(location, false, &m.to_cols_array());
                }
            }
        }
    }

    // ========================================================================
    // Pipeline State
    // ========================================================================

    fn use_program(&mut self, program: GlProgram) {
        match program.0 {
            Some(program) => self.make_current(program),
            None => warn!("use_program: program object was never created"),
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        let state = BlendState::for_mode(mode);
        unsafe {
            match state.blend_func {
                Some((src, dst)) => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func(src, dst);
                }
                None => self.gl.disable(glow::BLEND),
            }
            self.gl.depth_mask(state.depth_write);
            self.gl.depth_func(state.depth_func);
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: &TextureRef) {
        let handle = self.textures.get(texture).copied();
        if handle.is_none() {
            warn!("bind_texture: '{}' is not registered", texture.path());
        }
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, handle);
        }
    }
}

/// Indexed triangle mesh already uploaded into a vertex array object.
#[derive(Debug, Clone, Copy)]
pub struct GlMesh {
    pub vertex_array: glow::VertexArray,
    /// Number of `u32` indices.
    pub index_count: i32,
}

impl Drawable<GlowDevice> for GlMesh {
    fn draw(&self, device: &mut GlowDevice) {
        let gl = device.context();
        unsafe {
            gl.bind_vertex_array(Some(self.vertex_array));
            gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
        }
    }
}
