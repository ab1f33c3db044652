//! View frustum culling
//!
//! Six planes extracted from the camera's combined view-projection matrix,
//! tested against spheres, boxes and whole bounding hierarchies.

use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::bounds::AABB;
use super::hierarchy::BoundingNode;

/// Result of classifying a volume against the frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Entirely outside at least one plane
    None,
    /// Straddles at least one plane
    Partial,
    /// Inside every plane
    Full,
}

/// Plane defined by normal and distance from origin
///
/// Points with a non-negative signed distance are on the inner side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (unit length unless normalization was disabled)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane from `(a, b, c, d)` coefficients of `ax + by + cz + d = 0`
    pub fn from_coefficients(coefficients: Vec4, normalize: bool) -> Self {
        let plane = Self::new(coefficients.xyz(), coefficients.w);
        if normalize { plane.normalized() } else { plane }
    }

    /// Same plane with a unit normal; a zero normal is left untouched
    #[must_use]
    pub fn normalized(&self) -> Self {
        let len = self.normal.magnitude();
        if len > 0.0 {
            Self::new(self.normal / len, self.distance / len)
        } else {
            *self
        }
    }

    /// Calculate signed distance from plane to point
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for OpenGL clip space (depth in [-1, 1]):
    /// each plane is the last row of the matrix plus or minus one of the
    /// other rows. Normals point into the frustum.
    pub fn from_matrix(view_projection: &Mat4, normalize: bool) -> Self {
        let row = |i: usize| -> Vec4 { view_projection.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ]
        .map(|coefficients| Plane::from_coefficients(coefficients, normalize));

        Self { planes }
    }

    /// Check if a point lies inside every plane
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Classify a sphere against the six planes
    pub fn classify_sphere(&self, center: Vec3, radius: f32) -> Containment {
        let mut straddles = false;
        for plane in &self.planes {
            let distance = plane.signed_distance(center);
            if distance < -radius {
                return Containment::None;
            }
            if distance < radius {
                straddles = true;
            }
        }
        if straddles { Containment::Partial } else { Containment::Full }
    }

    /// Classify a box by projecting its extents onto each plane normal
    pub fn classify_aabb(&self, aabb: &AABB) -> Containment {
        let center = aabb.center();
        let extents = aabb.extents();
        let mut straddles = false;

        for plane in &self.planes {
            let distance = plane.signed_distance(center);
            let reach = plane.normal.abs().dot(&extents);
            if distance + reach < 0.0 {
                return Containment::None;
            }
            if distance - reach < 0.0 {
                straddles = true;
            }
        }
        if straddles { Containment::Partial } else { Containment::Full }
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.classify_aabb(aabb) != Containment::None
    }

    /// Conservative visibility of a bounding hierarchy
    ///
    /// Reads the node's refreshed world bounds and never mutates. A sphere
    /// outside any plane culls the whole subtree; a sphere inside every
    /// plane accepts it. A straddling sphere falls through to the box test,
    /// which accepts on an inside or straddling result. A box outside is
    /// inconclusive at this level and the children decide.
    pub fn intersects(&self, node: &BoundingNode) -> bool {
        let Some(bounds) = node.world_bounds() else {
            return false;
        };

        match self.classify_sphere(bounds.center, bounds.radius) {
            Containment::None => return false,
            Containment::Full => return true,
            Containment::Partial => {}
        }

        if self.classify_aabb(&bounds.aabb) != Containment::None {
            return true;
        }

        node.children().iter().any(|child| self.intersects(child))
    }
}
