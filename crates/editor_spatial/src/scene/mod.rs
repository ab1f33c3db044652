//! Scene-side spatial structures
//!
//! Bounding volumes, the bounding hierarchy and view frustum culling.
//!
//! ## Flow
//!
//! ```text
//! BoundingNode tree (model space + local transforms)
//!      ↓ refresh_world_bounds
//! WorldBounds per node (sphere + box)
//!      ↓ Frustum::intersects / collect_visible
//! Visible subtrees
//! ```

mod bounds;
mod frustum;
mod hierarchy;

pub use bounds::{BoundingVolume, BoundsError, BoxFace, RaySpan, WorldBounds, AABB};
pub use frustum::{Containment, Frustum, Plane};
pub use hierarchy::{BoundingNode, NodePath};
