//! Per-pass inputs
//!
//! [`PassContext`] bundles everything a pass `update` reads: the object's
//! transform and material, the camera, and a [`LightingContext`] answering
//! "which light is this pass drawing?". All references are borrowed for the
//! duration of one update call; nothing here owns scene data.

use crate::resources::Material;
use crate::scene::{Camera, DirectionalLight, Light, PointLight, SpotLight, Transform};

/// Source of the light each lighting pass invocation shades with.
pub trait LightingContext {
    fn active_directional_light(&self) -> Option<&DirectionalLight>;

    fn active_point_light(&self) -> Option<&PointLight>;

    fn active_spot_light(&self) -> Option<&SpotLight>;
}

/// Non-owning view of the lights active for one pass invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameLights<'a> {
    pub directional: Option<&'a DirectionalLight>,
    pub point: Option<&'a PointLight>,
    pub spot: Option<&'a SpotLight>,
}

impl<'a> FrameLights<'a> {
    /// No active lights. Used by the ambient pass.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Exactly `light` active, in the slot matching its type.
    #[must_use]
    pub fn for_light(light: &'a Light) -> Self {
        match light {
            Light::Directional(light) => Self {
                directional: Some(light),
                ..Self::default()
            },
            Light::Point(light) => Self {
                point: Some(light),
                ..Self::default()
            },
            Light::Spot(light) => Self {
                spot: Some(light),
                ..Self::default()
            },
        }
    }
}

impl LightingContext for FrameLights<'_> {
    fn active_directional_light(&self) -> Option<&DirectionalLight> {
        self.directional
    }

    fn active_point_light(&self) -> Option<&PointLight> {
        self.point
    }

    fn active_spot_light(&self) -> Option<&SpotLight> {
        self.spot
    }
}

/// Everything a pass update reads for one draw.
#[derive(Clone, Copy)]
pub struct PassContext<'a> {
    pub transform: &'a Transform,
    pub camera: &'a Camera,
    pub material: &'a Material,
    pub lights: &'a dyn LightingContext,
}

impl<'a> PassContext<'a> {
    #[must_use]
    pub fn new(
        transform: &'a Transform,
        camera: &'a Camera,
        material: &'a Material,
        lights: &'a dyn LightingContext,
    ) -> Self {
        Self {
            transform,
            camera,
            material,
            lights,
        }
    }
}
