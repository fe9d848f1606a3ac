use glam::{Mat4, Vec3};

/// Orbital camera circling a point above the map plane.
pub struct OrbitCamera {
    /// Distance from target
    pub distance: f32,
    /// Horizontal rotation (radians)
    pub azimuth: f32,
    /// Vertical rotation (radians), clamped by the input controller
    pub elevation: f32,
    /// Look-at target point
    pub target: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    /// Camera framed on a square map of the given extent, targeting its
    /// center from far enough to see the whole wireframe.
    pub fn framing(extent: f32) -> Self {
        let extent = if extent > 0.0 { extent } else { 10.0 };
        Self {
            distance: extent * 1.8,
            azimuth: std::f32::consts::FRAC_PI_4,
            elevation: std::f32::consts::FRAC_PI_6,
            target: Vec3::new(extent / 2.0, 0.0, extent / 2.0),
            fov: 55.0,
            near: 0.1,
            far: extent * 40.0,
        }
    }

    /// World-space position derived from the orbital parameters.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.elevation.cos() * self.azimuth.sin();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.elevation.cos() * self.azimuth.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Combined view-projection matrix for the given aspect ratio.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position(), self.target, Vec3::Y);
        proj * view
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::framing(10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_targets_map_center() {
        let camera = OrbitCamera::framing(10.0);
        assert_eq!(camera.target, Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(camera.distance, 18.0);
    }

    #[test]
    fn test_framing_nonpositive_extent_falls_back() {
        let camera = OrbitCamera::framing(0.0);
        assert!(camera.distance > 0.0);
    }

    #[test]
    fn test_position_on_positive_z_at_zero_angles() {
        let mut camera = OrbitCamera::framing(10.0);
        camera.target = Vec3::ZERO;
        camera.distance = 10.0;
        camera.azimuth = 0.0;
        camera.elevation = 0.0;

        let pos = camera.position();
        assert!(pos.x.abs() < 0.001);
        assert!(pos.y.abs() < 0.001);
        assert!((pos.z - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_view_projection_is_invertible() {
        let camera = OrbitCamera::default();
        let vp = camera.view_projection(16.0 / 9.0);
        assert!(vp.determinant().abs() > 0.0001);
    }
}
