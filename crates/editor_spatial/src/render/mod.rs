//! Rendering-side math used by the spatial queries

pub mod primitives;

pub use primitives::Camera;
