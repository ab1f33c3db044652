//! Picking candidates and the registry that hands them out

use slotmap::{new_key_type, SlotMap};

use crate::config::PickingConfig;
use crate::foundation::math::{Mat4, Transform};
use crate::scene::{BoundingVolume, WorldBounds};

bitflags::bitflags! {
    /// Which picking paths a candidate takes part in
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PickCapabilities: u8 {
        /// Tested by the CPU ray picker (needs a bounding volume)
        const RAY           = 0b0000_0001;
        /// Drawn into the color-picking pass
        const COLOR         = 0b0000_0010;
        /// Bounding volume follows the transform's scale
        const SCALED_BOUNDS = 0b0000_0100;
    }
}

impl Default for PickCapabilities {
    fn default() -> Self {
        Self::RAY | Self::COLOR | Self::SCALED_BOUNDS
    }
}

/// One object offered to the pickers
///
/// `K` is whatever the caller uses to refer to the object; the pickers only
/// clone it into their results.
#[derive(Debug, Clone, PartialEq)]
pub struct PickCandidate<K> {
    /// Caller's reference to the object
    pub key: K,
    /// Model-space bounds, `None` when the object has no volume
    pub bounds: Option<BoundingVolume>,
    /// Model transform
    pub transform: Transform,
    /// Picking paths the object takes part in
    pub capabilities: PickCapabilities,
}

impl<K> PickCandidate<K> {
    /// Candidate with the default capabilities
    pub fn new(key: K, bounds: Option<BoundingVolume>, transform: Transform) -> Self {
        Self {
            key,
            bounds,
            transform,
            capabilities: PickCapabilities::default(),
        }
    }

    /// Replace the capability set
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: PickCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Ray picking needs both the flag and a volume
    pub fn is_ray_pickable(&self) -> bool {
        self.capabilities.contains(PickCapabilities::RAY) && self.bounds.is_some()
    }

    /// Whether the object is drawn into a color pass
    pub fn is_color_pickable(&self) -> bool {
        self.capabilities.contains(PickCapabilities::COLOR)
    }

    /// Model matrix used for the bounds, scaled or not per capability
    pub fn bounds_matrix(&self) -> Mat4 {
        if self.capabilities.contains(PickCapabilities::SCALED_BOUNDS) {
            self.transform.to_matrix()
        } else {
            self.transform.to_unscaled_matrix()
        }
    }

    /// World-space bounds, `None` without a volume
    pub fn world_bounds(&self) -> Option<WorldBounds> {
        self.bounds.map(|volume| volume.transformed(&self.bounds_matrix()))
    }
}

new_key_type! {
    /// Stable handle to an object in a [`PickableSet`]
    ///
    /// Keys stay valid when other objects are removed; a key becomes invalid
    /// only when its own object is removed.
    pub struct ObjectKey;
}

/// Registered pickable object
#[derive(Debug, Clone, PartialEq)]
pub struct Pickable {
    /// Model-space bounds
    pub bounds: Option<BoundingVolume>,
    /// Model transform
    pub transform: Transform,
    /// Picking paths
    pub capabilities: PickCapabilities,
}

/// Registry of pickable objects for callers without their own handles
#[derive(Debug, Clone)]
pub struct PickableSet {
    objects: SlotMap<ObjectKey, Pickable>,
    default_capabilities: PickCapabilities,
}

impl PickableSet {
    /// Empty set with default capabilities
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
            default_capabilities: PickCapabilities::default(),
        }
    }

    /// Empty set whose new objects follow `config`
    pub fn with_config(config: &PickingConfig) -> Self {
        let mut default_capabilities = PickCapabilities::RAY | PickCapabilities::COLOR;
        default_capabilities.set(PickCapabilities::SCALED_BOUNDS, config.use_scaled_bounds);
        Self {
            objects: SlotMap::with_key(),
            default_capabilities,
        }
    }

    /// Register an object with the set's default capabilities
    pub fn insert(&mut self, bounds: Option<BoundingVolume>, transform: Transform) -> ObjectKey {
        let capabilities = self.default_capabilities;
        self.objects.insert(Pickable {
            bounds,
            transform,
            capabilities,
        })
    }

    /// Register a fully specified object
    pub fn insert_pickable(&mut self, pickable: Pickable) -> ObjectKey {
        self.objects.insert(pickable)
    }

    /// Unregister an object
    pub fn remove(&mut self, key: ObjectKey) -> Option<Pickable> {
        self.objects.remove(key)
    }

    /// Look up an object
    pub fn get(&self, key: ObjectKey) -> Option<&Pickable> {
        self.objects.get(key)
    }

    /// Mutable lookup
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut Pickable> {
        self.objects.get_mut(key)
    }

    /// Move an object; false for a stale key
    pub fn set_transform(&mut self, key: ObjectKey, transform: Transform) -> bool {
        let Some(object) = self.objects.get_mut(key) else {
            return false;
        };
        object.transform = transform;
        true
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Snapshot of every object as a candidate, in slot order
    pub fn candidates(&self) -> Vec<PickCandidate<ObjectKey>> {
        self.objects
            .iter()
            .map(|(key, object)| PickCandidate {
                key,
                bounds: object.bounds,
                transform: object.transform,
                capabilities: object.capabilities,
            })
            .collect()
    }
}

impl Default for PickableSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn unit_volume() -> BoundingVolume {
        BoundingVolume::new(Vec3::repeat(-1.0), Vec3::repeat(1.0))
    }

    #[test]
    fn test_scaled_bounds_follow_capability() {
        let transform = Transform::from_position(Vec3::new(0.0, 0.0, -5.0)).with_scale(Vec3::repeat(3.0));
        let scaled = PickCandidate::new(0, Some(unit_volume()), transform);
        let unscaled = scaled
            .clone()
            .with_capabilities(PickCapabilities::RAY | PickCapabilities::COLOR);

        assert_relative_eq!(scaled.world_bounds().unwrap().aabb.max.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(unscaled.world_bounds().unwrap().aabb.max.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(unscaled.world_bounds().unwrap().center.z, -5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_pickable_needs_volume() {
        let candidate = PickCandidate::new("mesh", None, Transform::identity());
        assert!(!candidate.is_ray_pickable());
        assert!(candidate.is_color_pickable());
        assert!(candidate.world_bounds().is_none());
    }

    #[test]
    fn test_set_keys_survive_removal() {
        let mut set = PickableSet::new();
        let a = set.insert(Some(unit_volume()), Transform::identity());
        let b = set.insert(None, Transform::identity());
        assert_eq!(set.len(), 2);

        assert!(set.remove(a).is_some());
        assert!(set.get(a).is_none());
        assert!(set.get(b).is_some());
        assert!(!set.set_transform(a, Transform::identity()));
        assert!(set.set_transform(b, Transform::from_position(Vec3::x())));

        let candidates = set.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].key, b);
        assert_relative_eq!(candidates[0].transform.position, Vec3::x());
    }

    #[test]
    fn test_set_config_controls_scaling() {
        let config = PickingConfig {
            use_scaled_bounds: false,
            ..Default::default()
        };
        let mut set = PickableSet::with_config(&config);
        let key = set.insert(Some(unit_volume()), Transform::identity());
        let caps = set.get(key).unwrap().capabilities;
        assert!(!caps.contains(PickCapabilities::SCALED_BOUNDS));
        assert!(caps.contains(PickCapabilities::RAY));
    }
}
