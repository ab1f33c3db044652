//! Ray casts against static collision geometry
//!
//! Used to drop and drag objects onto terrain and collision meshes. The
//! mesh keeps its triangles in world space, so queries run without any
//! per-call transformation.
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays, bounding spheres and the edge-relative triangle
//! - [`grid`] - Uniform spatial grid over a mesh's bounds
//! - [`mesh`] - The collision mesh and its ray cast entry points

pub mod primitives;
pub mod grid;
pub mod mesh;

// Re-export commonly used types
pub use primitives::{Ray, BoundingSphere, SphereHit, Triangle, TriangleHit};
pub use grid::{SpatialGrid, CellCoord};
pub use mesh::{CollisionMesh, CollisionError, RayCastHit, RayCastOptions};
