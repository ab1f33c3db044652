//! Bounding volumes
//!
//! [`AABB`] is the axis-aligned box every query shares. [`BoundingVolume`]
//! pairs a model-space box with an independent sphere radius; transforming it
//! yields [`WorldBounds`], a re-axis-aligned box around the transformed
//! corners plus a world-space sphere. This is not a tight oriented box.

use thiserror::Error;

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Errors raised by bounding volume accessors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsError {
    /// A face index outside `0..6` was passed to a face accessor
    #[error("Invalid box face index {0} (expected 0..6)")]
    InvalidFace(u8),
}

/// One of the six faces of an axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxFace {
    /// -X
    Left,
    /// +X
    Right,
    /// -Y
    Bottom,
    /// +Y
    Top,
    /// +Z
    Near,
    /// -Z
    Far,
}

impl BoxFace {
    /// All faces in index order
    pub const ALL: [BoxFace; 6] = [
        BoxFace::Left,
        BoxFace::Right,
        BoxFace::Bottom,
        BoxFace::Top,
        BoxFace::Near,
        BoxFace::Far,
    ];

    /// Outward unit normal of the face
    pub fn normal(self) -> Vec3 {
        match self {
            BoxFace::Left => Vec3::new(-1.0, 0.0, 0.0),
            BoxFace::Right => Vec3::new(1.0, 0.0, 0.0),
            BoxFace::Bottom => Vec3::new(0.0, -1.0, 0.0),
            BoxFace::Top => Vec3::new(0.0, 1.0, 0.0),
            BoxFace::Near => Vec3::new(0.0, 0.0, 1.0),
            BoxFace::Far => Vec3::new(0.0, 0.0, -1.0),
        }
    }
}

impl TryFrom<u8> for BoxFace {
    type Error = BoundsError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(BoundsError::InvalidFace(index))
    }
}

/// Parametric interval of a ray inside a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySpan {
    /// Entry parameter (negative when the origin is inside the box)
    pub t_near: f32,
    /// Exit parameter
    pub t_far: f32,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for p in rest {
            aabb.include_point(*p);
        }
        Some(aabb)
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow the box to include `point`
    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Union of two boxes
    #[must_use]
    pub fn merged(&self, other: &AABB) -> AABB {
        AABB::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Box grown by `pad` on every side
    #[must_use]
    pub fn expanded(&self, pad: f32) -> AABB {
        let pad = Vec3::repeat(pad);
        AABB::new(self.min - pad, self.max + pad)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB (touching counts)
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// The eight corners, bit 0 selecting max X, bit 1 max Y and bit 2 max Z
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    /// Corners of one face, counter-clockwise seen from outside
    pub fn face_corners(&self, face: BoxFace) -> [Vec3; 4] {
        let c = self.corners();
        let idx = match face {
            BoxFace::Left => [0, 4, 6, 2],
            BoxFace::Right => [1, 3, 7, 5],
            BoxFace::Bottom => [0, 1, 5, 4],
            BoxFace::Top => [2, 6, 7, 3],
            BoxFace::Near => [4, 5, 7, 6],
            BoxFace::Far => [0, 2, 3, 1],
        };
        idx.map(|i| c[i])
    }

    /// Corners of the face at `index`, for callers holding a raw face id
    pub fn face_corners_by_index(&self, index: u8) -> Result<[Vec3; 4], BoundsError> {
        BoxFace::try_from(index).map(|face| self.face_corners(face))
    }

    /// Axis-aligned box around the eight transformed corners
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let corners = self.corners().map(|c| {
            matrix.transform_point(&Point3::from(c)).coords
        });
        let mut aabb = AABB::new(corners[0], corners[0]);
        for c in &corners[1..] {
            aabb.include_point(*c);
        }
        aabb
    }

    /// Slab test
    ///
    /// Intersects the running `[t_near, t_far]` interval against each axis
    /// pair of planes. An axis the ray is parallel to only passes when the
    /// origin already lies within that slab. A ray that can only touch the
    /// box at or behind its origin (`t_far <= 0`) does not intersect, so an
    /// origin on a face aimed outward misses while aimed inward it hits with
    /// `t_near` of zero.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<RaySpan> {
        const PARALLEL_EPSILON: f32 = 1e-12;

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < PARALLEL_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);

            if t_near > t_far || t_far <= 0.0 {
                return None;
            }
        }

        // A zero direction inside the box leaves the interval unbounded
        Some(RaySpan { t_near, t_far })
    }
}

/// Model-space bounding volume: an axis-aligned box plus a sphere radius
///
/// The radius is independent of the box so authored assets can supply a
/// tighter sphere than the box's half diagonal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    /// Model-space box
    pub aabb: AABB,
    /// Sphere radius around the box center
    pub radius: f32,
}

impl BoundingVolume {
    /// Volume from box corners; the radius is the half diagonal
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self::from_aabb(AABB::new(min, max))
    }

    /// Volume from an existing box
    pub fn from_aabb(aabb: AABB) -> Self {
        Self {
            aabb,
            radius: aabb.extents().magnitude(),
        }
    }

    /// Volume enclosing a point set
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        AABB::from_points(points).map(Self::from_aabb)
    }

    /// Override the sphere radius
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Sphere center in model space
    pub fn center(&self) -> Vec3 {
        self.aabb.center()
    }

    /// The eight model-space corners
    pub fn corners(&self) -> [Vec3; 8] {
        self.aabb.corners()
    }

    /// World-space bounds under `matrix`
    ///
    /// The sphere radius grows with the largest axis scale so it keeps
    /// enclosing what it enclosed in model space.
    pub fn transformed(&self, matrix: &Mat4) -> WorldBounds {
        let center = matrix.transform_point(&Point3::from(self.center())).coords;
        let max_scale = (0..3)
            .map(|i| matrix.fixed_view::<3, 1>(0, i).magnitude())
            .fold(0.0_f32, f32::max);

        WorldBounds {
            aabb: self.aabb.transformed(matrix),
            center,
            radius: self.radius * max_scale,
        }
    }
}

/// World-space bounds derived from a [`BoundingVolume`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Re-axis-aligned box around the transformed corners
    pub aabb: AABB,
    /// Sphere center
    pub center: Vec3,
    /// Sphere radius
    pub radius: f32,
}

impl WorldBounds {
    /// Bounds of a world-space box with its half-diagonal sphere
    pub fn from_aabb(aabb: AABB) -> Self {
        Self {
            aabb,
            center: aabb.center(),
            radius: aabb.extents().magnitude(),
        }
    }

    /// Union of two world bounds; the sphere encloses the merged box
    #[must_use]
    pub fn merged(&self, other: &WorldBounds) -> WorldBounds {
        let aabb = self.aabb.merged(&other.aabb);
        let center = aabb.center();
        // Keep both spheres inside the merged one, not just the box
        let radius = [self, other]
            .iter()
            .map(|b| (b.center - center).magnitude() + b.radius)
            .fold(aabb.extents().magnitude(), f32::max);
        WorldBounds { aabb, center, radius }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> AABB {
        AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_intersects() {
        let aabb1 = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        let aabb2 = AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let aabb3 = AABB::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(7.0, 7.0, 7.0));

        assert!(aabb1.intersects(&aabb2));
        assert!(!aabb1.intersects(&aabb3));
    }

    #[test]
    fn test_slab_origin_on_face_aimed_outward_misses() {
        let origin = Vec3::new(1.0, 0.5, 0.5);
        assert!(unit_box().intersect_ray(origin, Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_slab_origin_on_face_aimed_inward_hits_at_zero() {
        let origin = Vec3::new(1.0, 0.5, 0.5);
        let span = unit_box().intersect_ray(origin, Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(span.t_near, 0.0, epsilon = 1e-6);
        assert_relative_eq!(span.t_far, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_slab_parallel_ray_outside_slab_misses() {
        let origin = Vec3::new(-1.0, 2.0, 0.5);
        assert!(unit_box().intersect_ray(origin, Vec3::new(1.0, 0.0, 0.0)).is_none());

        let origin = Vec3::new(-1.0, 0.5, 0.5);
        let span = unit_box().intersect_ray(origin, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(span.t_near, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_slab_box_behind_ray_misses() {
        let origin = Vec3::new(3.0, 0.5, 0.5);
        assert!(unit_box().intersect_ray(origin, Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_face_index_out_of_range() {
        assert_eq!(BoxFace::try_from(3), Ok(BoxFace::Top));
        assert_eq!(BoxFace::try_from(6), Err(BoundsError::InvalidFace(6)));
        assert!(unit_box().face_corners_by_index(9).is_err());
    }

    #[test]
    fn test_face_corners_lie_on_face() {
        let aabb = unit_box();
        for face in BoxFace::ALL {
            let n = face.normal();
            let corners = aabb.face_corners(face);
            let plane_d = corners[0].dot(&n);
            for c in corners {
                assert_relative_eq!(c.dot(&n), plane_d, epsilon = 1e-6);
            }
            // Counter-clockwise from outside means the winding normal points out
            let winding = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
            assert!(winding.dot(&n) > 0.0, "{face:?} wound inward");
        }
    }

    #[test]
    fn test_transformed_rotation_re_axis_aligns() {
        let rotation = crate::foundation::math::utils::axis_angle(
            Vec3::y(),
            crate::foundation::math::constants::PI * 0.25,
        );
        let matrix = rotation.to_homogeneous();
        let aabb = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let rotated = aabb.transformed(&matrix);
        let half_diag = 2.0_f32.sqrt();
        assert_relative_eq!(rotated.max.x, half_diag, epsilon = 1e-5);
        assert_relative_eq!(rotated.max.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.min.z, -half_diag, epsilon = 1e-5);
    }

    #[test]
    fn test_volume_radius_scales_with_largest_axis() {
        let volume = BoundingVolume::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
            .with_radius(1.0);
        let matrix = Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0))
            * Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 3.0, 2.0));
        let world = volume.transformed(&matrix);
        assert_relative_eq!(world.radius, 3.0, epsilon = 1e-5);
        assert_relative_eq!(world.center, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(world.aabb.max, Vec3::new(6.0, 3.0, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_world_bounds_merge_encloses_spheres() {
        let a = WorldBounds { aabb: unit_box(), center: Vec3::new(0.5, 0.5, 0.5), radius: 3.0 };
        let b = WorldBounds::from_aabb(AABB::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(5.0, 1.0, 1.0)));
        let merged = a.merged(&b);
        assert!((a.center - merged.center).magnitude() + a.radius <= merged.radius + 1e-5);
        assert!((b.center - merged.center).magnitude() + b.radius <= merged.radius + 1e-5);
    }
}
