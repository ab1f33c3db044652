//! # Editor Camera
//!
//! Camera abstraction for the editor viewport: view and projection matrices,
//! the culling frustum, screen-to-world rays for picking and depth
//! linearization for the color picker's depth read-back.
//!
//! ## Design Principles
//! - **Library-agnostic**: No graphics API dependencies in camera math
//! - **Immutable operation**: Query methods never modify camera state
//! - **OpenGL clip convention**: Clip-space depth in [-1, 1], camera looks down -Z

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, Vec4};
use crate::physics::collision::Ray;
use crate::scene::Frustum;

/// 3D perspective camera
///
/// # Coordinate System
/// Right-handed Y-up view space:
/// - X+ = Right
/// - Y+ = Up
/// - Z- = Forward (into the screen)
///
/// # Performance Notes
/// Matrices are computed on demand. Callers that cull and pick in the same
/// frame should compute [`Camera::view_projection_matrix`] once and reuse it.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    ///
    /// # Example
    /// ```rust
    /// use editor_spatial::foundation::math::Vec3;
    /// use editor_spatial::render::primitives::Camera;
    ///
    /// let camera = Camera::perspective(Vec3::new(0.0, 2.0, 5.0), 60.0, 16.0 / 9.0, 0.1, 100.0);
    /// assert!(camera.frustum(true).contains_point(Vec3::zeros()));
    /// ```
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update camera target (look-at point)
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        log::trace!("Camera target updated to: {:?}", target);
    }

    /// Look at `target` with a custom up vector
    ///
    /// The up vector doesn't need to be perpendicular to the view direction;
    /// the view matrix orthonormalizes it.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Update the aspect ratio after a viewport resize
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        // Avoid log spam during interactive resizes
        if (self.aspect - aspect).abs() > 0.01 {
            log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// Unit vector from the camera towards its target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0))
    }

    /// World-to-camera transformation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Perspective projection with clip-space depth in [-1, 1]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined `P × V`
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Culling frustum for the current view
    pub fn frustum(&self, normalize: bool) -> Frustum {
        Frustum::from_matrix(&self.view_projection_matrix(), normalize)
    }

    /// Convert normalized device coordinates to a world-space ray
    ///
    /// Unprojects the NDC point on the near and far planes and returns a ray
    /// from the camera position through the far point. `None` when the
    /// view-projection matrix cannot be inverted or produces non-finite
    /// points (zero aspect, `near == far`, target on top of the camera).
    ///
    /// # Arguments
    /// * `ndc_x` - X in [-1, 1], left to right
    /// * `ndc_y` - Y in [-1, 1], bottom to top
    pub fn screen_to_world_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let Some(inverse) = self.view_projection_matrix().try_inverse() else {
            log::warn!("View-projection matrix is singular, no picking ray for ({ndc_x}, {ndc_y})");
            return None;
        };

        let unproject = |z: f32| -> Option<Vec3> {
            let h = inverse * Vec4::new(ndc_x, ndc_y, z, 1.0);
            let point = h.xyz() / h.w;
            (h.w.abs() > f32::EPSILON && point.iter().all(|c| c.is_finite())).then_some(point)
        };
        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;

        let ray = Ray::new(self.position, far - near);
        ray.is_valid().then_some(ray)
    }

    /// Convert a depth-buffer value in [0, 1] to camera-space distance
    ///
    /// Inverse of the perspective depth mapping: `0` maps to `near` and `1`
    /// maps to `far`.
    pub fn linearize_depth(&self, depth: f32) -> f32 {
        let (n, f) = (self.near, self.far);
        let ndc = 2.0 * depth - 1.0;
        2.0 * n * f / (f + n - ndc * (f - n))
    }
}

impl Default for Camera {
    /// Above and behind the origin looking at it, 45 degree field of view,
    /// widescreen aspect, near 0.1 and far 1000
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn looking_down_z() -> Camera {
        let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 1.0, 1.0, 100.0);
        camera.set_target(Vec3::new(0.0, 0.0, -1.0));
        camera
    }

    #[test]
    fn test_center_ray_follows_view_direction() {
        let camera = looking_down_z();
        let ray = camera.screen_to_world_ray(0.0, 0.0).unwrap();
        assert_relative_eq!(ray.origin, Vec3::zeros());
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_corner_ray_spans_field_of_view() {
        let camera = looking_down_z();
        let ray = camera.screen_to_world_ray(0.0, 1.0).unwrap();
        // Top edge of a 60 degree vertical field of view
        let angle = ray.direction.y.atan2(-ray.direction.z);
        assert_relative_eq!(angle, utils::deg_to_rad(30.0), epsilon = 1e-4);
        assert!(camera.screen_to_world_ray(-1.0, 0.0).unwrap().direction.x < 0.0);
    }

    #[test]
    fn test_degenerate_camera_has_no_ray() {
        let mut camera = looking_down_z();
        camera.set_target(camera.position);
        assert!(camera.screen_to_world_ray(0.0, 0.0).is_none());

        let mut camera = looking_down_z();
        camera.aspect = 0.0;
        assert!(camera.screen_to_world_ray(0.0, 0.0).is_none());
    }

    #[test]
    fn test_linearize_depth_endpoints() {
        let camera = looking_down_z();
        assert_relative_eq!(camera.linearize_depth(0.0), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.linearize_depth(1.0), 100.0, epsilon = 1e-2);
    }

    #[test]
    fn test_linearize_depth_inverts_projection() {
        let camera = looking_down_z();
        let proj = camera.projection_matrix();
        for distance in [2.0_f32, 10.0, 50.0, 90.0] {
            let clip = proj * Vec4::new(0.0, 0.0, -distance, 1.0);
            let depth = (clip.z / clip.w) * 0.5 + 0.5;
            assert_relative_eq!(camera.linearize_depth(depth), distance, max_relative = 1e-3);
        }
    }

    #[test]
    fn test_frustum_matches_camera() {
        let camera = looking_down_z();
        let frustum = camera.frustum(true);
        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -50.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -150.0)));
        assert_relative_eq!(camera.forward(), Vec3::new(0.0, 0.0, -1.0));
    }
}
