//! # Editor Spatial
//!
//! Spatial queries for a 3D scene editor.
//!
//! ## Features
//!
//! - **Collision Mesh**: Ray casts against static triangle soup, accelerated
//!   by a lazily rebuilt uniform grid, with ground snapping for placement
//! - **Frustum Culling**: Conservative visibility over a bounding hierarchy
//!   with precomputed world bounds
//! - **Ray Picking**: Nearest object under the cursor by sphere and box tests
//! - **Color Picking**: Per-pass color IDs, point, marquee and depth picks
//!
//! ## Quick Start
//!
//! ```rust
//! use editor_spatial::prelude::*;
//!
//! let mut terrain = CollisionMesh::new();
//! terrain.add_triangle(
//!     Vec3::new(-10.0, 0.0, -10.0),
//!     Vec3::new(-10.0, 0.0, 10.0),
//!     Vec3::new(10.0, 0.0, -10.0),
//! );
//!
//! let ray = Ray::new(Vec3::new(-2.0, 5.0, -2.0), Vec3::new(0.0, -1.0, 0.0));
//! let hit = terrain.ray_cast(&ray).expect("ray hits the ground");
//! assert!((hit.distance - 5.0).abs() < 1e-4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod picking;
pub mod render;
pub mod scene;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, QueryConfig},
        foundation::math::{Mat4, Transform, Vec3},
        input::{MouseState, PickRegion, PixelRect},
        physics::collision::{CollisionMesh, Ray, RayCastHit},
        picking::{
            ColorPicker, CpuPickBuffer, PickBuffer, PickCandidate, PickCapabilities, PickingSystem, RayPicker,
        },
        render::Camera,
        scene::{BoundingNode, BoundingVolume, Containment, Frustum, AABB},
    };
}
