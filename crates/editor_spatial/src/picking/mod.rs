//! Object picking
//!
//! Two paths find the object under the cursor:
//!
//! ```text
//! MouseState ──► Camera ray ──► RayPicker (sphere, then box)
//!                                   │ miss
//!                                   ▼
//!                ColorPicker pass: assign color → caller draws → read back
//! ```
//!
//! The ray path is cheap and CPU-only; the color path needs the caller to
//! draw every candidate with its assigned color, so it also finds objects
//! without a bounding volume and supports marquee regions.

mod candidate;
pub mod color;
mod color_picker;
mod cpu_buffer;
mod ray_picker;
mod system;

pub use candidate::{ObjectKey, PickCandidate, PickCapabilities, Pickable, PickableSet};
pub use color::{decode_rgba8_readback, pack_rgba8, unpack_rgba8, PickColor};
pub use color_picker::{ColorPicker, DepthPick, PickBuffer, PickPass, PickingError};
pub use cpu_buffer::CpuPickBuffer;
pub use ray_picker::{HitVolume, RayPickHit, RayPicker};
pub use system::{PickMethod, PickResult, PickingSystem};
