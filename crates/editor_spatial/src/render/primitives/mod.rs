//! Core primitive types for rendering
//!
//! Only the camera lives here: the spatial queries need its matrices, its
//! frustum and its screen-to-world rays, never any GPU resources.

pub mod camera;

pub use camera::Camera;
