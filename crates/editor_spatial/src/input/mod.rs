//! Input state consumed by the picking queries

pub mod picking;

pub use picking::{MouseState, PickRegion, PixelRect, DRAG_THRESHOLD};
