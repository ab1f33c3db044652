//! Bounding volume hierarchy used by frustum culling
//!
//! World-space bounds are precomputed by an explicit refresh pass so that
//! culling stays a pure read. Each node carries a generation counter that
//! advances whenever its world bounds are recomputed.

use crate::foundation::math::Mat4;

use super::bounds::{BoundingVolume, WorldBounds};
use super::frustum::{Containment, Frustum};

/// Path of child indices from a root node
pub type NodePath = Vec<usize>;

/// Node of a bounding hierarchy
///
/// A node either wraps a model-space [`BoundingVolume`] or is a pure group.
/// Its world bounds enclose its own volume and every descendant.
#[derive(Debug, Clone)]
pub struct BoundingNode {
    volume: Option<BoundingVolume>,
    local_transform: Mat4,
    children: Vec<BoundingNode>,
    world: Option<WorldBounds>,
    dirty: bool,
    generation: u64,
}

impl BoundingNode {
    /// Node wrapping a volume with an identity local transform
    pub fn new(volume: BoundingVolume) -> Self {
        Self {
            volume: Some(volume),
            local_transform: Mat4::identity(),
            children: Vec::new(),
            world: None,
            dirty: true,
            generation: 0,
        }
    }

    /// Node with no volume of its own
    pub fn group() -> Self {
        Self {
            volume: None,
            local_transform: Mat4::identity(),
            children: Vec::new(),
            world: None,
            dirty: true,
            generation: 0,
        }
    }

    /// Builder form of [`Self::set_transform`]
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.set_transform(transform);
        self
    }

    /// Append a child and return its index
    pub fn add_child(&mut self, child: BoundingNode) -> usize {
        self.children.push(child);
        self.dirty = true;
        self.children.len() - 1
    }

    /// Remove a child, shifting later indices down
    pub fn remove_child(&mut self, index: usize) -> Option<BoundingNode> {
        if index >= self.children.len() {
            return None;
        }
        self.dirty = true;
        Some(self.children.remove(index))
    }

    /// Replace the transform relative to the parent
    pub fn set_transform(&mut self, transform: Mat4) {
        self.local_transform = transform;
        self.dirty = true;
    }

    /// Replace the model-space volume
    pub fn set_volume(&mut self, volume: Option<BoundingVolume>) {
        self.volume = volume;
        self.dirty = true;
    }

    /// Flag the node for recomputation on the next refresh
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// True when this node has changed since its last refresh
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Transform relative to the parent
    pub fn local_transform(&self) -> &Mat4 {
        &self.local_transform
    }

    /// Own model-space volume
    pub fn volume(&self) -> Option<&BoundingVolume> {
        self.volume.as_ref()
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[BoundingNode] {
        &self.children
    }

    /// Mutable access to one child
    pub fn child_mut(&mut self, index: usize) -> Option<&mut BoundingNode> {
        self.children.get_mut(index)
    }

    /// World bounds from the last refresh, `None` for an empty subtree
    pub fn world_bounds(&self) -> Option<&WorldBounds> {
        self.world.as_ref()
    }

    /// Number of times the world bounds have been recomputed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recompute world bounds wherever something changed
    ///
    /// A dirty node recomputes itself and its whole subtree; a clean node is
    /// recomputed only when a descendant changed. Returns whether this
    /// node's bounds were recomputed.
    pub fn refresh_world_bounds(&mut self, parent: &Mat4) -> bool {
        self.refresh(parent, false)
    }

    fn refresh(&mut self, parent: &Mat4, parent_changed: bool) -> bool {
        let changed = self.dirty || parent_changed;
        let world_matrix = parent * self.local_transform;

        let mut child_changed = false;
        for child in &mut self.children {
            child_changed |= child.refresh(&world_matrix, changed);
        }

        if !changed && !child_changed {
            return false;
        }

        let own = self.volume.map(|volume| volume.transformed(&world_matrix));
        self.world = self
            .children
            .iter()
            .filter_map(|child| child.world)
            .fold(own, |acc, child| Some(acc.map_or(child, |bounds| bounds.merged(&child))));

        self.dirty = false;
        self.generation += 1;
        true
    }

    /// Paths of the leaves the frustum may see
    ///
    /// Subtrees whose sphere is fully inside skip further plane tests.
    pub fn collect_visible(&self, frustum: &Frustum) -> Vec<NodePath> {
        let mut visible = Vec::new();
        let mut path = Vec::new();
        self.collect(frustum, false, &mut path, &mut visible);
        visible
    }

    fn collect(&self, frustum: &Frustum, inside: bool, path: &mut NodePath, out: &mut Vec<NodePath>) {
        let Some(bounds) = self.world else {
            return;
        };

        let inside = inside
            || match frustum.classify_sphere(bounds.center, bounds.radius) {
                Containment::None => return,
                Containment::Full => true,
                Containment::Partial => false,
            };

        if self.children.is_empty() {
            if inside || frustum.intersects_aabb(&bounds.aabb) {
                out.push(path.clone());
            }
            return;
        }

        for (index, child) in self.children.iter().enumerate() {
            path.push(index);
            child.collect(frustum, inside, path, out);
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{utils, Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    fn unit_volume() -> BoundingVolume {
        BoundingVolume::new(Vec3::repeat(-1.0), Vec3::repeat(1.0))
    }

    fn translated(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, y, z))
    }

    #[test]
    fn test_refresh_applies_parent_transform() {
        let mut root = BoundingNode::group().with_transform(translated(10.0, 0.0, 0.0));
        root.add_child(BoundingNode::new(unit_volume()).with_transform(translated(0.0, 5.0, 0.0)));
        assert!(root.refresh_world_bounds(&Mat4::identity()));

        let child = root.children()[0].world_bounds().unwrap();
        assert_relative_eq!(child.center, Vec3::new(10.0, 5.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(child.radius, 3.0_f32.sqrt(), epsilon = 1e-6);

        let rootb = root.world_bounds().unwrap();
        assert_relative_eq!(rootb.aabb.min, Vec3::new(9.0, 4.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_union_encloses_children() {
        let mut root = BoundingNode::new(unit_volume());
        root.add_child(BoundingNode::new(unit_volume()).with_transform(translated(8.0, 0.0, 0.0)));
        root.add_child(BoundingNode::new(unit_volume()).with_transform(translated(0.0, 0.0, -6.0)));
        root.refresh_world_bounds(&Mat4::identity());

        let bounds = *root.world_bounds().unwrap();
        for child in root.children() {
            let cb = child.world_bounds().unwrap();
            assert!((cb.center - bounds.center).magnitude() + cb.radius <= bounds.radius + 1e-5);
            assert!(bounds.aabb.contains_point(cb.aabb.min));
            assert!(bounds.aabb.contains_point(cb.aabb.max));
        }
    }

    #[test]
    fn test_generation_tracks_recomputation() {
        let mut root = BoundingNode::group();
        root.add_child(BoundingNode::new(unit_volume()));
        root.add_child(BoundingNode::new(unit_volume()));
        root.refresh_world_bounds(&Mat4::identity());
        assert_eq!(root.generation(), 1);

        // Nothing changed
        assert!(!root.refresh_world_bounds(&Mat4::identity()));
        assert_eq!(root.generation(), 1);

        root.child_mut(1).unwrap().set_transform(translated(3.0, 0.0, 0.0));
        assert!(root.refresh_world_bounds(&Mat4::identity()));
        assert_eq!(root.generation(), 2);
        assert_eq!(root.children()[0].generation(), 1);
        assert_eq!(root.children()[1].generation(), 2);
        assert!(!root.children()[1].is_dirty());
    }

    #[test]
    fn test_dirty_parent_refreshes_subtree() {
        let mut root = BoundingNode::group();
        root.add_child(BoundingNode::new(unit_volume()));
        root.refresh_world_bounds(&Mat4::identity());

        root.set_transform(translated(0.0, 0.0, 4.0));
        root.refresh_world_bounds(&Mat4::identity());
        let child = root.children()[0].world_bounds().unwrap();
        assert_relative_eq!(child.center.z, 4.0, epsilon = 1e-6);
        assert_eq!(root.children()[0].generation(), 2);
    }

    #[test]
    fn test_scaled_radius() {
        let mut node = BoundingNode::new(unit_volume())
            .with_transform(Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 4.0, 1.0)));
        node.refresh_world_bounds(&Mat4::identity());
        assert_relative_eq!(node.world_bounds().unwrap().radius, 4.0 * 3.0_f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_collect_visible_leaves() {
        let proj = Mat4::perspective(utils::deg_to_rad(60.0), 1.0, 1.0, 100.0);
        let view = Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), Vec3::y());
        let frustum = Frustum::from_matrix(&(proj * view), true);

        let mut root = BoundingNode::group();
        let mut near_group = BoundingNode::group().with_transform(translated(0.0, 0.0, -10.0));
        near_group.add_child(BoundingNode::new(unit_volume()));
        near_group.add_child(BoundingNode::new(unit_volume()).with_transform(translated(0.0, 0.0, 30.0)));
        root.add_child(near_group);
        root.add_child(BoundingNode::new(unit_volume()).with_transform(translated(0.0, 0.0, -50.0)));
        root.add_child(BoundingNode::group());
        root.refresh_world_bounds(&Mat4::identity());

        let visible = root.collect_visible(&frustum);
        assert_eq!(visible, vec![vec![0, 0], vec![1]]);
    }
}
