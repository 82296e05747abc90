//! Uniform Registry
//!
//! Uniforms are addressed by the [`Uniform`] key enum rather than by string.
//! Each program resolves its declared keys exactly once, when it becomes
//! ready, into a [`UniformCache`]. Names are synthesized during that single
//! resolution pass (including the `pointLights[i].field` array entries), so
//! the per-frame write path never formats or hashes a string.
//!
//! A key the program does not expose resolves to [`UniformSlot::Absent`].
//! Writing through an absent key is a silent no-op: a shader variant only has
//! to declare the uniforms it actually uses.

use std::borrow::Cow;

use log::debug;
use rustc_hash::FxHashMap;

use crate::renderer::device::GraphicsDevice;
use crate::resources::TextureSlot;

// ============================================================================
// Keys
// ============================================================================

/// Fields of the `directionalLight` struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionalField {
    Color,
    Intensity,
    Direction,
}

impl DirectionalField {
    pub const ALL: [DirectionalField; 3] = [
        DirectionalField::Color,
        DirectionalField::Intensity,
        DirectionalField::Direction,
    ];

    const fn suffix(self) -> &'static str {
        match self {
            DirectionalField::Color => "base.color",
            DirectionalField::Intensity => "base.intensity",
            DirectionalField::Direction => "direction",
        }
    }
}

/// Fields of a point light struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointField {
    Color,
    Intensity,
    Position,
    AttenConstant,
    AttenLinear,
    AttenExponent,
    Range,
}

impl PointField {
    pub const ALL: [PointField; 7] = [
        PointField::Color,
        PointField::Intensity,
        PointField::Position,
        PointField::AttenConstant,
        PointField::AttenLinear,
        PointField::AttenExponent,
        PointField::Range,
    ];

    const fn suffix(self) -> &'static str {
        match self {
            PointField::Color => "base.color",
            PointField::Intensity => "base.intensity",
            PointField::Position => "position",
            PointField::AttenConstant => "atten.constant",
            PointField::AttenLinear => "atten.linear",
            PointField::AttenExponent => "atten.exponent",
            PointField::Range => "range",
        }
    }
}

/// Fields of the `spotLight` struct, which embeds a point light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpotField {
    Point(PointField),
    Direction,
    Cutoff,
}

impl SpotField {
    /// All spot fields: the embedded point light first, then the cone.
    pub fn all() -> impl Iterator<Item = SpotField> {
        PointField::ALL
            .into_iter()
            .map(SpotField::Point)
            .chain([SpotField::Direction, SpotField::Cutoff])
    }
}

/// Semantic uniform key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    Mvp,
    Normal,
    MaterialAmbientColor,
    EyePos,
    SpecularPower,
    SpecularIntensity,
    DispMapScale,
    DispMapBias,
    Sampler(TextureSlot),
    DirectionalLight(DirectionalField),
    /// Single point light of the point pass (`pointLight.*`).
    PointLight(PointField),
    /// Entry of the base shader's point light array (`pointLights[i].*`).
    PointLights { index: u8, field: PointField },
    SpotLight(SpotField),
}

impl Uniform {
    /// Exact GLSL name the key resolves against.
    #[must_use]
    pub fn name(self) -> Cow<'static, str> {
        match self {
            Uniform::Mvp => "MVP".into(),
            Uniform::Normal => "Normal".into(),
            Uniform::MaterialAmbientColor => "MaterialAmbientColor".into(),
            Uniform::EyePos => "eyePos".into(),
            Uniform::SpecularPower => "specularPower".into(),
            Uniform::SpecularIntensity => "specularIntensity".into(),
            Uniform::DispMapScale => "dispMapScale".into(),
            Uniform::DispMapBias => "dispMapBias".into(),
            Uniform::Sampler(slot) => slot.name().into(),
            Uniform::DirectionalLight(field) => {
                format!("directionalLight.{}", field.suffix()).into()
            }
            Uniform::PointLight(field) => format!("pointLight.{}", field.suffix()).into(),
            Uniform::PointLights { index, field } => {
                format!("pointLights[{index}].{}", field.suffix()).into()
            }
            Uniform::SpotLight(SpotField::Point(field)) => {
                format!("spotLight.pointLight.{}", field.suffix()).into()
            }
            Uniform::SpotLight(SpotField::Direction) => "spotLight.direction".into(),
            Uniform::SpotLight(SpotField::Cutoff) => "spotLight.cutoff".into(),
        }
    }
}

// ============================================================================
// Declaration lists
// ============================================================================

/// Ordered, duplicate-free list of uniform keys a program expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformDeclarations {
    keys: Vec<Uniform>,
}

impl UniformDeclarations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys known to every program: transforms, specular defaults, ambient
    /// colour, eye position and `max_point_lights` point light array entries.
    #[must_use]
    pub fn base(max_point_lights: usize) -> Self {
        let mut declarations = Self::new();
        declarations.extend([
            Uniform::Mvp,
            Uniform::Normal,
            Uniform::MaterialAmbientColor,
            Uniform::EyePos,
            Uniform::SpecularPower,
            Uniform::SpecularIntensity,
        ]);
        for index in 0..max_point_lights.min(usize::from(u8::MAX) + 1) {
            let index = index as u8;
            declarations.extend(
                PointField::ALL
                    .into_iter()
                    .map(|field| Uniform::PointLights { index, field }),
            );
        }
        declarations
    }

    /// Samplers plus displacement scale/bias, shared by every forward pass.
    #[must_use]
    pub fn surface() -> Self {
        let mut declarations = Self::new();
        declarations.extend(TextureSlot::ALL.into_iter().map(Uniform::Sampler));
        declarations.extend([Uniform::DispMapScale, Uniform::DispMapBias]);
        declarations
    }

    pub fn push(&mut self, key: Uniform) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn extend(&mut self, keys: impl IntoIterator<Item = Uniform>) {
        for key in keys {
            self.push(key);
        }
    }

    #[must_use]
    pub fn with(mut self, other: &UniformDeclarations) -> Self {
        self.extend(other.keys.iter().copied());
        self
    }

    #[must_use]
    pub fn keys(&self) -> &[Uniform] {
        &self.keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Resolved handle for one uniform, or the explicit absent sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformSlot<L> {
    Resolved(L),
    Absent,
}

impl<L: Copy> UniformSlot<L> {
    #[must_use]
    pub fn location(self) -> Option<L> {
        match self {
            UniformSlot::Resolved(location) => Some(location),
            UniformSlot::Absent => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedUniform<L> {
    name: Cow<'static, str>,
    slot: UniformSlot<L>,
}

/// Per-program map from uniform key to resolved handle.
#[derive(Debug, Clone)]
pub struct UniformCache<L> {
    entries: FxHashMap<Uniform, CachedUniform<L>>,
}

impl<L: Copy> UniformCache<L> {
    /// Resolves every declared key against a linked program, one device lookup per key.
    pub fn resolve<D>(device: &mut D, program: D::Program, declarations: &UniformDeclarations) -> Self
    where
        D: GraphicsDevice<Location = L>,
    {
        let mut entries =
            FxHashMap::with_capacity_and_hasher(declarations.len(), Default::default());

        for &key in declarations.keys() {
            let name = key.name();
            let slot = match device.uniform_location(program, &name) {
                Some(location) => UniformSlot::Resolved(location),
                None => UniformSlot::Absent,
            };
            entries.insert(key, CachedUniform { name, slot });
        }

        let cache = Self { entries };
        debug!(
            "Uniform cache populated: {} of {} declared uniforms resolved",
            cache.resolved_count(),
            cache.len()
        );
        cache
    }

    /// Every declared key marked absent, without touching a device.
    #[must_use]
    pub fn unresolved(declarations: &UniformDeclarations) -> Self {
        let entries = declarations
            .keys()
            .iter()
            .map(|&key| {
                (
                    key,
                    CachedUniform {
                        name: key.name(),
                        slot: UniformSlot::Absent,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Handle for a key; `None` for absent or undeclared keys.
    #[inline]
    #[must_use]
    pub fn location(&self, key: Uniform) -> Option<L> {
        self.entries.get(&key).and_then(|entry| entry.slot.location())
    }

    /// Slot for a declared key, `None` if the key was never declared.
    #[must_use]
    pub fn slot(&self, key: Uniform) -> Option<UniformSlot<L>> {
        self.entries.get(&key).map(|entry| entry.slot)
    }

    #[must_use]
    pub fn is_resolved(&self, key: Uniform) -> bool {
        self.location(key).is_some()
    }

    #[must_use]
    pub fn contains_key(&self, key: Uniform) -> bool {
        self.entries.contains_key(&key)
    }

    /// Whether a declared key carries this synthesized name.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.values().any(|entry| entry.name == name)
    }

    /// Synthesized names of all declared keys, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|entry| entry.name.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry.slot, UniformSlot::Resolved(_)))
            .count()
    }
}
