//! Math utilities and types
//!
//! Provides the fundamental math types shared by every spatial query in the
//! crate. All geometry is single precision, in the same world units as the
//! editor camera and scene.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder-style scale override
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder-style rotation override
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Convert to a transformation matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Matrix with the scale dropped.
    ///
    /// Picking candidates that opt out of scaled bounds use this one, so their
    /// bounding volume keeps its authored size regardless of the object scale.
    pub fn to_unscaled_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * self.rotation.to_homogeneous()
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Math constants
pub mod constants {
    use super::Vec3;

    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// World up axis. Ground snapping and wall rejection are measured against it.
    pub const WORLD_UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
}

/// Math utility functions
pub mod utils {
    use super::{constants, Quat, Unit, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Rotation of `angle` radians around `axis`.
    ///
    /// A zero-length or non-finite axis yields the identity rotation instead
    /// of a NaN quaternion.
    pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
        if !axis.iter().all(|c| c.is_finite()) || !angle.is_finite() {
            return Quat::identity();
        }
        Unit::try_new(axis, f32::EPSILON)
            .map_or_else(Quat::identity, |axis| Quat::from_axis_angle(&axis, angle))
    }
}

/// Extension trait for Mat4 with the camera matrices used by the editor
pub trait Mat4Ext {
    /// Create an OpenGL-convention perspective projection.
    ///
    /// Right-handed, camera looking down -Z, clip depth in [-1, 1].
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        // Built by hand: nalgebra's constructor asserts on a zero aspect or
        // equal clip planes, which a minimized viewport can produce
        let f = 1.0 / (fov_y * 0.5).tan();
        let depth = near - far;
        Mat4::new(
            f / aspect, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (far + near) / depth, 2.0 * far * near / depth,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}
