//! Headless Graphics Device
//!
//! An in-memory [`GraphicsDevice`] that needs no GPU context. Stages are
//! "compiled" by scanning their GLSL interface, programs link the union of
//! their stage uniforms, and every uniform write, lifecycle call and draw is
//! recorded so tooling and tests can inspect exactly what a pass did.
//!
//! Unlike a real driver, unused uniforms are never optimized away: every
//! declared uniform stays active. Uniform-block members are active too, but
//! like on a driver they have no location; see
//! [`HeadlessDevice::block_uniforms`].

mod glsl;

use self::glsl::StageInterface;

use log::warn;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::renderer::device::{BlendMode, Drawable, GraphicsDevice, StageKind, UniformValue};
use crate::resources::TextureRef;

new_key_type! {
    pub struct HeadlessProgram;
    pub struct HeadlessStage;
}

/// Uniform location inside one headless program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessLocation(u32);

impl HeadlessLocation {
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Lifecycle call recorded in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    CreateProgram(HeadlessProgram),
    CreateStage(HeadlessStage, StageKind),
    AttachStage(HeadlessProgram, HeadlessStage),
    DetachStage(HeadlessProgram, HeadlessStage),
    DeleteStage(HeadlessStage),
    LinkProgram(HeadlessProgram),
    ValidateProgram(HeadlessProgram),
    UseProgram(HeadlessProgram),
    DeleteProgram(HeadlessProgram),
}

/// One accepted uniform write.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformWrite {
    pub program: HeadlessProgram,
    pub name: String,
    pub value: UniformValue,
}

/// One draw call with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub label: String,
    pub program: Option<HeadlessProgram>,
    pub blend: BlendMode,
}

#[derive(Debug)]
struct StageRecord {
    kind: StageKind,
    compiled: bool,
    interface: StageInterface,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    attached: SmallVec<[HeadlessStage; 2]>,
    attributes: FxHashMap<String, u32>,
    linked: bool,
    validated: bool,
    /// Location index → uniform name.
    names: Vec<String>,
    block_names: Vec<String>,
    locations: FxHashMap<String, HeadlessLocation>,
    values: FxHashMap<HeadlessLocation, UniformValue>,
}

#[derive(Debug, Default)]
pub struct HeadlessDevice {
    programs: SlotMap<HeadlessProgram, ProgramRecord>,
    stages: SlotMap<HeadlessStage, StageRecord>,
    bound: Option<HeadlessProgram>,
    blend: BlendMode,
    textures: FxHashMap<u32, TextureRef>,

    lookups: usize,
    writes: Vec<UniformWrite>,
    events: Vec<DeviceEvent>,
    draws: Vec<DrawRecord>,
}

impl HeadlessDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Instrumentation
    // ========================================================================

    /// Number of `uniform_location` calls served so far.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups
    }

    #[must_use]
    pub fn writes(&self) -> &[UniformWrite] {
        &self.writes
    }

    /// Drains the write log.
    pub fn take_writes(&mut self) -> Vec<UniformWrite> {
        std::mem::take(&mut self.writes)
    }

    #[must_use]
    pub fn events(&self) -> &[DeviceEvent] {
        &self.events
    }

    #[must_use]
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Clears write, event and draw logs. Device objects are untouched.
    pub fn clear_logs(&mut self) {
        self.writes.clear();
        self.events.clear();
        self.draws.clear();
    }

    /// Current value of a uniform, by its GLSL name.
    #[must_use]
    pub fn uniform_value(&self, program: HeadlessProgram, name: &str) -> Option<UniformValue> {
        let record = self.programs.get(program)?;
        let location = record.locations.get(name)?;
        record.values.get(location).copied()
    }

    /// Active uniforms of a linked program in location order.
    #[must_use]
    pub fn active_uniforms(&self, program: HeadlessProgram) -> &[String] {
        self.programs
            .get(program)
            .map_or(&[], |record| record.names.as_slice())
    }

    /// Active uniform-block members of a linked program. These never resolve
    /// through `uniform_location`.
    #[must_use]
    pub fn block_uniforms(&self, program: HeadlessProgram) -> &[String] {
        self.programs
            .get(program)
            .map_or(&[], |record| record.block_names.as_slice())
    }

    #[must_use]
    pub fn attribute_slot(&self, program: HeadlessProgram, name: &str) -> Option<u32> {
        self.programs.get(program)?.attributes.get(name).copied()
    }

    #[must_use]
    pub fn is_linked(&self, program: HeadlessProgram) -> bool {
        self.programs.get(program).is_some_and(|record| record.linked)
    }

    #[must_use]
    pub fn is_validated(&self, program: HeadlessProgram) -> bool {
        self.programs
            .get(program)
            .is_some_and(|record| record.validated)
    }

    #[must_use]
    pub fn program_alive(&self, program: HeadlessProgram) -> bool {
        self.programs.contains_key(program)
    }

    #[must_use]
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn live_stages(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn bound_program(&self) -> Option<HeadlessProgram> {
        self.bound
    }

    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    #[must_use]
    pub fn bound_texture(&self, unit: u32) -> Option<&TextureRef> {
        self.textures.get(&unit)
    }

    /// Records a draw with the currently bound program and blend state.
    pub fn record_draw(&mut self, label: impl Into<String>) {
        self.draws.push(DrawRecord {
            label: label.into(),
            program: self.bound,
            blend: self.blend,
        });
    }
}

impl GraphicsDevice for HeadlessDevice {
    type Program = HeadlessProgram;
    type Stage = HeadlessStage;
    type Location = HeadlessLocation;

    fn create_program(&mut self) -> HeadlessProgram {
        let program = self.programs.insert(ProgramRecord::default());
        self.events.push(DeviceEvent::CreateProgram(program));
        program
    }

    fn create_stage(&mut self, kind: StageKind) -> HeadlessStage {
        let stage = self.stages.insert(StageRecord {
            kind,
            compiled: false,
            interface: StageInterface::default(),
        });
        self.events.push(DeviceEvent::CreateStage(stage, kind));
        stage
    }

    fn compile_stage(&mut self, stage: HeadlessStage, source: &str) -> Result<(), String> {
        let Some(record) = self.stages.get_mut(stage) else {
            return Err(format!("ERROR: invalid stage handle {stage:?}"));
        };

        match glsl::scan_interface(source) {
            Ok(interface) => {
                record.compiled = true;
                record.interface = interface;
                Ok(())
            }
            Err(log) => {
                record.compiled = false;
                record.interface = StageInterface::default();
                Err(log)
            }
        }
    }

    fn attach_stage(&mut self, program: HeadlessProgram, stage: HeadlessStage) {
        if !self.stages.contains_key(stage) {
            warn!("attach_stage: unknown stage {stage:?}");
            return;
        }
        let Some(record) = self.programs.get_mut(program) else {
            warn!("attach_stage: unknown program {program:?}");
            return;
        };
        if !record.attached.contains(&stage) {
            record.attached.push(stage);
        }
        self.events.push(DeviceEvent::AttachStage(program, stage));
    }

    fn detach_stage(&mut self, program: HeadlessProgram, stage: HeadlessStage) {
        let Some(record) = self.programs.get_mut(program) else {
            warn!("detach_stage: unknown program {program:?}");
            return;
        };
        record.attached.retain(|attached| *attached != stage);
        self.events.push(DeviceEvent::DetachStage(program, stage));
    }

    fn delete_stage(&mut self, stage: HeadlessStage) {
        if self.stages.remove(stage).is_none() {
            warn!("delete_stage: unknown stage {stage:?}");
            return;
        }
        self.events.push(DeviceEvent::DeleteStage(stage));
    }

    fn bind_attribute_location(&mut self, program: HeadlessProgram, slot: u32, name: &str) {
        match self.programs.get_mut(program) {
            Some(record) => {
                record.attributes.insert(name.to_string(), slot);
            }
            None => warn!("bind_attribute_location: unknown program {program:?}"),
        }
    }

    fn link_program(&mut self, program: HeadlessProgram) -> Result<(), String> {
        let Some(record) = self.programs.get_mut(program) else {
            return Err(format!("ERROR: invalid program handle {program:?}"));
        };
        self.events.push(DeviceEvent::LinkProgram(program));

        record.linked = false;
        record.validated = false;
        record.names.clear();
        record.block_names.clear();
        record.locations.clear();
        record.values.clear();

        let mut has_vertex = false;
        let mut has_fragment = false;
        let mut names: Vec<String> = Vec::new();
        let mut block_names: Vec<String> = Vec::new();

        for stage in &record.attached {
            let Some(stage_record) = self.stages.get(*stage) else {
                return Err("ERROR: Linking with a deleted shader object".to_string());
            };
            if !stage_record.compiled {
                return Err(format!(
                    "ERROR: Linking with uncompiled/unspecialized {} shader",
                    stage_record.kind.label()
                ));
            }
            match stage_record.kind {
                StageKind::Vertex => has_vertex = true,
                StageKind::Fragment => has_fragment = true,
            }
            for name in &stage_record.interface.uniforms {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            for name in &stage_record.interface.block_members {
                if !block_names.contains(name) {
                    block_names.push(name.clone());
                }
            }
        }

        if !has_vertex || !has_fragment {
            return Err("ERROR: program requires both a vertex and a fragment shader".to_string());
        }

        record.locations = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), HeadlessLocation(i as u32)))
            .collect();
        record.names = names;
        record.block_names = block_names;
        record.linked = true;
        Ok(())
    }

    fn validate_program(&mut self, program: HeadlessProgram) -> Result<(), String> {
        let Some(record) = self.programs.get_mut(program) else {
            return Err(format!("ERROR: invalid program handle {program:?}"));
        };
        self.events.push(DeviceEvent::ValidateProgram(program));

        if record.linked {
            record.validated = true;
            Ok(())
        } else {
            record.validated = false;
            Err("Validation Failed: Program is not successfully linked.".to_string())
        }
    }

    fn delete_program(&mut self, program: HeadlessProgram) {
        let Some(record) = self.programs.remove(program) else {
            warn!("delete_program: unknown program {program:?}");
            return;
        };
        if !record.attached.is_empty() {
            warn!(
                "delete_program: {program:?} deleted with {} stage(s) still attached",
                record.attached.len()
            );
        }
        if self.bound == Some(program) {
            self.bound = None;
        }
        self.events.push(DeviceEvent::DeleteProgram(program));
    }

    fn uniform_location(
        &mut self,
        program: HeadlessProgram,
        name: &str,
    ) -> Option<HeadlessLocation> {
        self.lookups += 1;
        let record = self.programs.get(program)?;
        if !record.linked {
            return None;
        }
        record.locations.get(name).copied()
    }

    fn set_uniform(
        &mut self,
        program: HeadlessProgram,
        location: HeadlessLocation,
        value: UniformValue,
    ) {
        let Some(record) = self.programs.get_mut(program) else {
            warn!("set_uniform: unknown program {program:?}");
            return;
        };
        let Some(name) = record.names.get(location.0 as usize) else {
            warn!("set_uniform: location {} out of range for {program:?}", location.0);
            return;
        };

        self.writes.push(UniformWrite {
            program,
            name: name.clone(),
            value,
        });
        record.values.insert(location, value);
    }

    fn use_program(&mut self, program: HeadlessProgram) {
        if !self.programs.contains_key(program) {
            warn!("use_program: unknown program {program:?}");
            return;
        }
        self.bound = Some(program);
        self.events.push(DeviceEvent::UseProgram(program));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn bind_texture(&mut self, unit: u32, texture: &TextureRef) {
        self.textures.insert(unit, texture.clone());
    }
}

/// Named stand-in geometry for the headless device.
#[derive(Debug, Clone)]
pub struct HeadlessMesh {
    pub label: String,
}

impl HeadlessMesh {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Drawable<HeadlessDevice> for HeadlessMesh {
    fn draw(&self, device: &mut HeadlessDevice) {
        device.record_draw(self.label.clone());
    }
}
