use glam::{Mat4, Vec3};

/// Perspective camera.
///
/// Uses the OpenGL clip-space convention (depth in `[-1, 1]`), matching the
/// programs driven by the forward passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,

    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// `fov` is given in degrees.
    #[must_use]
    pub fn new_perspective(position: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: fov.to_radians(),
            aspect,
            near,
            far,
        }
    }

    /// World-space eye position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward != Vec3::ZERO {
            self.forward = forward;
        }
    }

    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }

    /// View matrix. When `forward` is parallel to `up` (looking straight up or
    /// down), an arbitrary up vector orthogonal to `forward` is used instead.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        let forward = self.forward.normalize_or(Vec3::NEG_Z);
        let up = if forward.cross(self.up).length_squared() <= f32::EPSILON {
            forward.any_orthonormal_vector()
        } else {
            self.up
        };
        Mat4::look_to_rh(self.position, forward, up)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
