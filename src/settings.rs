//! Renderer Settings
//!
//! Configuration consumed once when the [`RenderingEngine`] loads its pass
//! programs. Every field has a default, so a settings file only needs to name
//! what it overrides.
//!
//! # Example
//!
//! ```rust,ignore
//! use myth_forward::RendererSettings;
//!
//! let settings = RendererSettings::from_json_str(r#"{ "max_point_lights": 8 }"#)?;
//! assert_eq!(settings.vertex_extension, ".vs");
//! ```
//!
//! [`RenderingEngine`]: crate::renderer::RenderingEngine

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ForwardError, Result};
use crate::renderer::pipeline::PassKind;

/// Upper bound on `max_point_lights`.
pub const MAX_POINT_LIGHTS_LIMIT: usize = 64;

/// Global configuration for the forward renderer.
///
/// | Field                | Description                               | Default               |
/// |----------------------|-------------------------------------------|-----------------------|
/// | `shader_dir`         | Directory holding stage sources           | `res/shaders`         |
/// | `vertex_extension`   | Vertex stage suffix                       | `.vs`                 |
/// | `fragment_extension` | Fragment stage suffix                     | `.fs`                 |
/// | `ambient_shader`     | Ambient pass program                      | `forward-ambient`     |
/// | `directional_shader` | Directional pass program                  | `forward-directional` |
/// | `point_shader`       | Point pass program                        | `forward-point`       |
/// | `spot_shader`        | Spot pass program                         | `forward-spot`        |
/// | `max_point_lights`   | `pointLights[i]` entries resolved per program | `4`               |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub shader_dir: PathBuf,
    pub vertex_extension: String,
    pub fragment_extension: String,

    pub ambient_shader: String,
    pub directional_shader: String,
    pub point_shader: String,
    pub spot_shader: String,

    pub max_point_lights: usize,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("res/shaders"),
            vertex_extension: ".vs".to_string(),
            fragment_extension: ".fs".to_string(),
            ambient_shader: "forward-ambient".to_string(),
            directional_shader: "forward-directional".to_string(),
            point_shader: "forward-point".to_string(),
            spot_shader: "forward-spot".to_string(),
            max_point_lights: 4,
        }
    }
}

impl RendererSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_POINT_LIGHTS_LIMIT).contains(&self.max_point_lights) {
            return Err(ForwardError::InvalidSettings(format!(
                "max_point_lights must be in 1..={MAX_POINT_LIGHTS_LIMIT}, got {}",
                self.max_point_lights
            )));
        }
        if self.vertex_extension.is_empty() || self.fragment_extension.is_empty() {
            return Err(ForwardError::InvalidSettings(
                "shader stage extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Program base name used for a pass.
    #[must_use]
    pub fn shader_name(&self, kind: PassKind) -> &str {
        match kind {
            PassKind::Ambient => &self.ambient_shader,
            PassKind::Directional => &self.directional_shader,
            PassKind::Point => &self.point_shader,
            PassKind::Spot => &self.spot_shader,
        }
    }
}
