use glam::Vec3;

/// Number of representable steps per colour channel. A point light's range is
/// the distance at which its contribution drops below one step.
const COLOR_DEPTH: f32 = 256.0;

/// Default cosine of a spot light's half-angle.
pub const DEFAULT_SPOT_CUTOFF: f32 = 0.7;

/// Constant / linear / exponential falloff of a point-like light.
///
/// Intensity at distance `d` is `intensity / (constant + linear * d + exponent * d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 0.0,
            linear: 0.0,
            exponent: 1.0,
        }
    }
}

impl Attenuation {
    #[must_use]
    pub const fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self {
            constant,
            linear,
            exponent,
        }
    }

    /// Distance at which a light of the given peak channel value stops
    /// contributing a visible colour step.
    ///
    /// Solves `exponent·d² + linear·d + (constant - 256·peak) = 0` for the
    /// positive root. Degenerate models (no distance terms) yield `0`.
    #[must_use]
    pub fn range_for(&self, peak: f32) -> f32 {
        let a = self.exponent;
        let b = self.linear;
        let c = self.constant - COLOR_DEPTH * peak;

        if a.abs() > f32::EPSILON {
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return 0.0;
            }
            ((-b + discriminant.sqrt()) / (2.0 * a)).max(0.0)
        } else if b.abs() > f32::EPSILON {
            (-c / b).max(0.0)
        } else {
            0.0
        }
    }
}

/// Colour and scalar intensity shared by every light type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl BaseLight {
    #[must_use]
    pub const fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Brightest channel scaled by intensity.
    #[must_use]
    pub fn peak(&self) -> f32 {
        self.intensity * self.color.max_element()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub base: BaseLight,
    /// Normalized direction the light travels in.
    pub direction: Vec3,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32, direction: Vec3) -> Self {
        Self {
            base: BaseLight::new(color, intensity),
            direction: direction.normalize_or_zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub base: BaseLight,
    pub position: Vec3,
    pub range: f32,
    pub attenuation: Attenuation,
}

impl PointLight {
    /// Point light with default attenuation and a range derived from it.
    #[must_use]
    pub fn new(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self::with_attenuation(color, intensity, position, Attenuation::default())
    }

    #[must_use]
    pub fn with_attenuation(
        color: Vec3,
        intensity: f32,
        position: Vec3,
        attenuation: Attenuation,
    ) -> Self {
        let base = BaseLight::new(color, intensity);
        Self {
            base,
            position,
            range: attenuation.range_for(base.peak()),
            attenuation,
        }
    }

    /// Replaces the falloff model and recomputes the range.
    pub fn set_attenuation(&mut self, attenuation: Attenuation) {
        self.attenuation = attenuation;
        self.range = attenuation.range_for(self.base.peak());
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub point: PointLight,
    /// Normalized cone axis.
    pub direction: Vec3,
    /// Cosine of the cone half-angle; fragments with a smaller cosine are unlit.
    pub cutoff: f32,
}

impl SpotLight {
    /// Spot light at the origin pointing down -Z with the default cutoff.
    #[must_use]
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            point: PointLight::new(color, intensity, Vec3::ZERO),
            direction: Vec3::NEG_Z,
            cutoff: DEFAULT_SPOT_CUTOFF,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.point.position = position;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction.normalize_or_zero();
        self
    }

    #[must_use]
    pub fn with_cutoff(mut self, cutoff: f32) -> Self {
        self.cutoff = cutoff;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

/// A light component as owned by a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    #[must_use]
    pub fn light_type(&self) -> LightType {
        match self {
            Light::Directional(_) => LightType::Directional,
            Light::Point(_) => LightType::Point,
            Light::Spot(_) => LightType::Spot,
        }
    }

    #[must_use]
    pub fn base(&self) -> &BaseLight {
        match self {
            Light::Directional(light) => &light.base,
            Light::Point(light) => &light.base,
            Light::Spot(light) => &light.point.base,
        }
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Light::Spot(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attenuation_range() {
        // exponent-only falloff: d² = 256 * peak
        let light = PointLight::new(Vec3::ONE, 4.0, Vec3::ZERO);
        assert!((light.range - 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_linear_only_range() {
        let att = Attenuation::new(0.0, 2.0, 0.0);
        assert!((att.range_for(1.0) - 128.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_range_is_zero() {
        let att = Attenuation::new(1.0, 0.0, 0.0);
        assert_eq!(att.range_for(1.0), 0.0);
    }

    #[test]
    fn test_directional_direction_is_normalized() {
        let light = DirectionalLight::new(Vec3::ONE, 1.0, Vec3::new(0.0, -4.0, 0.0));
        assert_eq!(light.direction, Vec3::NEG_Y);
    }
}
