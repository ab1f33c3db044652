//! CPU ray picking against candidate bounding volumes
//!
//! Each candidate's volume is moved into world space with its own transform
//! and tested with the cheap sphere test first, then the box slab test.
//! Hits are ordered by distance along the ray with a stable sort, so equal
//! distances keep candidate order.

use crate::physics::collision::{BoundingSphere, Ray};

use super::candidate::PickCandidate;

/// Which volume accepted the ray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitVolume {
    /// Bounding sphere
    Sphere,
    /// Axis-aligned box
    Box,
}

/// A candidate hit by the picking ray
#[derive(Debug, Clone, PartialEq)]
pub struct RayPickHit<K> {
    /// Candidate key
    pub key: K,
    /// Distance along the ray to the volume entry, zero from inside
    pub distance: f32,
    /// Sphere discriminant when the sphere accepted the ray
    pub discriminant: Option<f32>,
    /// Volume that accepted the ray
    pub volume: HitVolume,
}

/// Sphere-then-box ray picker
#[derive(Debug, Clone, Copy, Default)]
pub struct RayPicker;

impl RayPicker {
    /// Create a picker
    pub fn new() -> Self {
        Self
    }

    /// Test one candidate
    ///
    /// `None` for candidates without the ray capability or a volume.
    pub fn test<K: Clone>(&self, ray: &Ray, candidate: &PickCandidate<K>) -> Option<RayPickHit<K>> {
        if !candidate.is_ray_pickable() || !ray.is_valid() {
            return None;
        }
        let bounds = candidate.world_bounds()?;

        if let Some(hit) = BoundingSphere::new(bounds.center, bounds.radius).intersect_ray(ray) {
            return Some(RayPickHit {
                key: candidate.key.clone(),
                distance: hit.distance,
                discriminant: Some(hit.discriminant),
                volume: HitVolume::Sphere,
            });
        }

        let span = bounds.aabb.intersect_ray(ray.origin, ray.direction)?;
        Some(RayPickHit {
            key: candidate.key.clone(),
            distance: span.t_near.max(0.0),
            discriminant: None,
            volume: HitVolume::Box,
        })
    }

    /// Every hit candidate, nearest first
    pub fn find_all<K: Clone>(&self, ray: &Ray, candidates: &[PickCandidate<K>]) -> Vec<RayPickHit<K>> {
        let mut hits: Vec<_> = candidates
            .iter()
            .filter_map(|candidate| self.test(ray, candidate))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        log::trace!("Ray picker: {} of {} candidates hit", hits.len(), candidates.len());
        hits
    }

    /// Nearest hit candidate
    pub fn find_nearest<K: Clone>(&self, ray: &Ray, candidates: &[PickCandidate<K>]) -> Option<RayPickHit<K>> {
        self.find_all(ray, candidates).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};
    use crate::picking::PickCapabilities;
    use crate::scene::BoundingVolume;
    use approx::assert_relative_eq;

    fn cube_at(key: u32, center: Vec3) -> PickCandidate<u32> {
        PickCandidate::new(
            key,
            Some(BoundingVolume::new(Vec3::repeat(-1.0), Vec3::repeat(1.0))),
            Transform::from_position(center),
        )
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_nearest_of_two() {
        let candidates = vec![cube_at(1, Vec3::new(0.0, 0.0, -20.0)), cube_at(2, Vec3::new(0.0, 0.0, -5.0))];
        let hit = RayPicker::new().find_nearest(&forward_ray(), &candidates).unwrap();
        assert_eq!(hit.key, 2);
        assert_eq!(hit.volume, HitVolume::Sphere);
        assert_relative_eq!(hit.distance, 5.0 - 3.0_f32.sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn test_no_candidates_no_hit() {
        let candidates: Vec<PickCandidate<u32>> = Vec::new();
        assert!(RayPicker::new().find_nearest(&forward_ray(), &candidates).is_none());
    }

    #[test]
    fn test_miss_and_behind() {
        let candidates = vec![cube_at(1, Vec3::new(10.0, 0.0, -5.0)), cube_at(2, Vec3::new(0.0, 0.0, 5.0))];
        assert!(RayPicker::new().find_all(&forward_ray(), &candidates).is_empty());
    }

    #[test]
    fn test_box_accepts_when_sphere_is_shrunk() {
        let volume = BoundingVolume::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)).with_radius(0.1);
        let candidate = PickCandidate::new(7, Some(volume), Transform::from_position(Vec3::new(0.8, 0.0, -4.0)));
        let hit = RayPicker::new().find_nearest(&forward_ray(), &[candidate]).unwrap();
        assert_eq!(hit.volume, HitVolume::Box);
        assert_eq!(hit.discriminant, None);
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sorted_ascending_and_ties_keep_order() {
        let candidates = vec![
            cube_at(1, Vec3::new(0.0, 0.0, -30.0)),
            cube_at(2, Vec3::new(0.0, 0.0, -10.0)),
            cube_at(3, Vec3::new(0.0, 0.0, -10.0)),
            cube_at(4, Vec3::new(0.0, 0.0, -20.0)),
        ];
        let keys: Vec<u32> = RayPicker::new()
            .find_all(&forward_ray(), &candidates)
            .into_iter()
            .map(|hit| hit.key)
            .collect();
        assert_eq!(keys, vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_inside_volume_hits_at_zero() {
        let candidates = vec![cube_at(1, Vec3::zeros())];
        let hit = RayPicker::new().find_nearest(&forward_ray(), &candidates).unwrap();
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_capabilities_exclude_candidates() {
        let candidates = vec![
            cube_at(1, Vec3::new(0.0, 0.0, -5.0)).with_capabilities(PickCapabilities::COLOR),
            cube_at(2, Vec3::new(0.0, 0.0, -9.0)),
        ];
        let hit = RayPicker::new().find_nearest(&forward_ray(), &candidates).unwrap();
        assert_eq!(hit.key, 2);
    }

    #[test]
    fn test_scaled_bounds_are_larger() {
        let transform = Transform::from_position(Vec3::new(3.0, 0.0, -10.0)).with_scale(Vec3::repeat(4.0));
        let volume = Some(BoundingVolume::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)));
        let scaled = PickCandidate::new(1, volume, transform);
        let unscaled = scaled.clone().with_capabilities(PickCapabilities::RAY);

        let picker = RayPicker::new();
        assert!(picker.find_nearest(&forward_ray(), &[scaled]).is_some());
        assert!(picker.find_nearest(&forward_ray(), &[unscaled]).is_none());
    }
}
