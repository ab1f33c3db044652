//! Physics module for collision queries
//!
//! Only geometric queries live here: the editor does not simulate forces
//! or velocities.

pub mod collision;

pub use collision::{
    CollisionMesh,
    CollisionError,
    BoundingSphere,
    Ray,
    RayCastHit,
    RayCastOptions,
    Triangle,
};
