use std::borrow::Cow;

use glam::Vec4;
use rustc_hash::FxHashMap;

/// Reference to an already-decoded texture owned by the texture system.
///
/// The forward renderer never decodes images; it only hands these references
/// to the device when binding texture units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureRef {
    path: Cow<'static, str>,
}

impl TextureRef {
    #[must_use]
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Texture roles sampled by the forward shaders, each on a fixed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse,
    NormalMap,
    DispMap,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [
        TextureSlot::Diffuse,
        TextureSlot::NormalMap,
        TextureSlot::DispMap,
    ];

    /// Texture unit the slot's sampler is bound to.
    #[must_use]
    pub const fn unit(self) -> u32 {
        match self {
            TextureSlot::Diffuse => 0,
            TextureSlot::NormalMap => 1,
            TextureSlot::DispMap => 2,
        }
    }

    /// Key under which materials store this texture, also the sampler name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TextureSlot::Diffuse => "diffuse",
            TextureSlot::NormalMap => "normalMap",
            TextureSlot::DispMap => "dispMap",
        }
    }
}

/// `dispMapBias` for a displacement scale and offset.
///
/// Centres the displacement range on zero, then lets `offset` in `[0, 1]`
/// slide it from fully negative to fully positive.
#[must_use]
pub fn displacement_bias(scale: f32, offset: f32) -> f32 {
    let base_bias = scale / 2.0;
    -base_bias + base_bias * offset
}

/// Surface parameters of a renderable object.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub ambient_color: Vec4,
    pub specular_power: f32,
    pub specular_intensity: f32,
    pub disp_map_scale: f32,
    pub disp_map_offset: f32,

    textures: FxHashMap<Cow<'static, str>, TextureRef>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

impl Material {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ambient_color: Vec4::new(0.1, 0.1, 0.1, 1.0),
            specular_power: 8.0,
            specular_intensity: 1.0,
            disp_map_scale: 0.0,
            disp_map_offset: 0.0,
            textures: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_ambient_color(mut self, color: Vec4) -> Self {
        self.ambient_color = color;
        self
    }

    #[must_use]
    pub fn with_specular(mut self, power: f32, intensity: f32) -> Self {
        self.specular_power = power;
        self.specular_intensity = intensity;
        self
    }

    #[must_use]
    pub fn with_displacement(mut self, scale: f32, offset: f32) -> Self {
        self.disp_map_scale = scale;
        self.disp_map_offset = offset;
        self
    }

    /// Registers a texture under a name such as `"diffuse"` or `"normalMap"`.
    pub fn add_texture(&mut self, name: impl Into<Cow<'static, str>>, texture: TextureRef) {
        self.textures.insert(name.into(), texture);
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<&TextureRef> {
        self.textures.get(name)
    }

    /// Textures for the fixed forward slots, paired with their units.
    pub fn slot_textures(&self) -> impl Iterator<Item = (TextureSlot, &TextureRef)> {
        TextureSlot::ALL
            .into_iter()
            .filter_map(|slot| self.texture(slot.name()).map(|texture| (slot, texture)))
    }

    #[must_use]
    pub fn disp_map_bias(&self) -> f32 {
        displacement_bias(self.disp_map_scale, self.disp_map_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_bias() {
        assert_eq!(displacement_bias(1.0, 1.0), 0.0);
        assert_eq!(displacement_bias(2.0, 0.0), -1.0);
        assert_eq!(displacement_bias(0.0, 0.37), 0.0);
        assert_eq!(displacement_bias(2.0, 0.5), -0.5);
    }

    #[test]
    fn test_slot_textures_skip_unknown_names() {
        let mut material = Material::new();
        material.add_texture("diffuse", TextureRef::new("atlas.png"));
        material.add_texture("specularMap", TextureRef::new("shine.png"));

        let slots: Vec<_> = material.slot_textures().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![TextureSlot::Diffuse]);
    }
}
