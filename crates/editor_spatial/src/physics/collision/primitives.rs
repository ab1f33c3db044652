//! Primitive collision shapes and intersection algorithms
//!
//! Provides rays, bounding spheres and the edge-relative triangle used by
//! the collision mesh, with their intersection tests.

use crate::foundation::math::Vec3;
use crate::scene::AABB;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    ///
    /// A zero-length direction is kept as zero rather than normalized to NaN;
    /// such a ray hits nothing.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros),
        }
    }

    /// Ray starting at `from` and pointing at `to`
    pub fn from_points(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Whether the direction is usable
    pub fn is_valid(&self) -> bool {
        self.direction.magnitude_squared() > 0.0
    }
}

/// A bounding sphere for ray picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

/// Outcome of a ray/sphere test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereHit {
    /// Distance along the ray to the entry point (zero when the origin is inside)
    pub distance: f32,
    /// Discriminant of the ray/sphere quadratic; larger means a more central hit
    pub discriminant: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Test ray intersection with this sphere
    ///
    /// Solves `a t^2 + b t + c = 0` with `a = dir.dir`, `b = 2 oc.dir` and
    /// `c = oc.oc - r^2`. The ray intersects when the discriminant is
    /// positive and the sphere is not entirely behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<SphereHit> {
        let oc = ray.origin - self.center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= 0.0 || a == 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t_far = (-b + sqrt_discriminant) / (2.0 * a);
        if t_far < 0.0 {
            return None;
        }
        let t_near = (-b - sqrt_discriminant) / (2.0 * a);

        Some(SphereHit {
            distance: t_near.max(0.0),
            discriminant,
        })
    }
}

/// Result of a ray/triangle test, in the unnormalized edge-relative form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Distance along the ray
    pub distance: f32,
    /// First barycentric coordinate, scaled by `det`
    pub u: f32,
    /// Second barycentric coordinate, scaled by `det`
    pub v: f32,
    /// Determinant of the system; `u`, `v` and `u + v` lie in `[0, det]`
    pub det: f32,
}

/// A world-space triangle stored relative to its first vertex
///
/// Keeps `origin = v1` and the edges `v2 - v1`, `v3 - v1` rather than the
/// raw vertices, plus a unit normal and its bounding box. Immutable once
/// built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub origin: Vec3,
    /// Second vertex minus the first
    pub edge1: Vec3,
    /// Third vertex minus the first
    pub edge2: Vec3,
    /// Unit normal, `normalize(edge1 x edge2)`; zero for a degenerate triangle
    pub normal: Vec3,
    /// Bounding box of the three vertices
    pub bounds: AABB,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        let edge1 = v2 - v1;
        let edge2 = v3 - v1;
        let normal = edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::zeros);

        let mut bounds = AABB::new(v1, v1);
        bounds.include_point(v2);
        bounds.include_point(v3);

        Self { origin: v1, edge1, edge2, normal, bounds }
    }

    /// The three vertices in world space
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.origin, self.origin + self.edge1, self.origin + self.edge2]
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        self.origin + (self.edge1 + self.edge2) / 3.0
    }

    /// Zero-area triangles have no normal and are never hit
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::zeros()
    }

    /// Whether the face is steep enough to count as a wall
    ///
    /// `wall_cos_threshold` is the cosine of the largest angle between the
    /// normal and `up` that still counts as ground.
    pub fn is_wall(&self, up: &Vec3, wall_cos_threshold: f32) -> bool {
        self.normal.dot(up).abs() < wall_cos_threshold
    }

    /// Möller-Trumbore ray-triangle intersection, single-sided
    ///
    /// Works on the edge-relative form without dividing early: a hit needs
    /// `det >= epsilon` (back faces and near-parallel rays are rejected),
    /// `0 <= u <= det` and `v >= 0`, `u + v <= det`. Hits behind the origin
    /// are rejected.
    pub fn intersect_ray(&self, ray: &Ray, epsilon: f32) -> Option<TriangleHit> {
        let cross_p = ray.direction.cross(&self.edge2);
        let det = cross_p.dot(&self.edge1);
        if det < epsilon {
            return None;
        }

        let to_origin = ray.origin - self.origin;
        let u = to_origin.dot(&cross_p);
        if u < 0.0 || u > det {
            return None;
        }

        let cross_q = to_origin.cross(&self.edge1);
        let v = ray.direction.dot(&cross_q);
        if v < 0.0 || u + v > det {
            return None;
        }

        let distance = self.edge2.dot(&cross_q) / det;
        if distance < 0.0 {
            return None;
        }

        Some(TriangleHit { distance, u, v, det })
    }
}
