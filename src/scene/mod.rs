//! Scene-side value types consumed by the forward passes
//!
//! - Transform: object placement (model / MVP matrices)
//! - Camera: projection and eye position
//! - Light: directional, point and spot light values

pub mod camera;
pub mod light;
pub mod transform;

pub use camera::Camera;
pub use light::{
    Attenuation, BaseLight, DirectionalLight, Light, LightType, PointLight, SpotLight,
};
pub use transform::Transform;
