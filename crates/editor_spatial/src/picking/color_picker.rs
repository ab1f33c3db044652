//! Color picking through an off-screen ID buffer
//!
//! A pass starts with [`ColorPicker::begin_pass`], which sizes and clears the
//! buffer and hands out a [`PickPass`]. The caller asks the pass for one
//! color per candidate, draws the candidate with it into
//! [`PickPass::buffer_mut`], then consumes the pass with one of the read
//! methods. The pass borrows the picker mutably, so only one pass can be
//! open at a time, and its ID table dies with it.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::input::{PickRegion, PixelRect};
use crate::render::Camera;

use super::color::{decode_rgba8_readback, index_to_rgba8, pack_rgba8, PickColor, BACKGROUND_PACKED};

/// Picking errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PickingError {
    /// A pass was requested for an empty viewport
    #[error("Pick buffer must be non-empty, got {width}x{height}")]
    ZeroSizedBuffer {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// The buffer implementation failed
    #[error("Pick buffer backend error: {0}")]
    Backend(String),

    /// Read outside the buffer
    #[error("Pick read at ({x}, {y}) is outside the {width}x{height} buffer")]
    ReadOutOfBounds {
        /// Column
        x: u32,
        /// Row
        y: u32,
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
    },

    /// A color read-back was not made of whole RGBA8 pixels
    #[error("Pick read-back of {0} bytes is not a whole number of RGBA8 pixels")]
    MisalignedReadback(usize),
}

/// Off-screen render target the color pass draws into
///
/// Rows are numbered from the top. A GPU implementation owns the
/// framebuffer and performs the read-back; [`super::CpuPickBuffer`] keeps
/// everything in memory.
pub trait PickBuffer {
    /// Current size, `(0, 0)` before the first allocation
    fn size(&self) -> (u32, u32);

    /// (Re)allocate storage for `width x height` pixels
    fn resize(&mut self, width: u32, height: u32) -> Result<(), PickingError>;

    /// Fill every pixel with `color` and `depth`
    fn clear(&mut self, color: [u8; 4], depth: f32) -> Result<(), PickingError>;

    /// Tightly packed RGBA8 bytes of `rect`, row by row
    fn read_rgba8(&self, rect: PixelRect) -> Result<Vec<u8>, PickingError>;

    /// Depth-buffer value in `[0, 1]` at one pixel
    fn read_depth(&self, x: u32, y: u32) -> Result<f32, PickingError>;
}

/// Object under a pixel together with its depth
#[derive(Debug, Clone, PartialEq)]
pub struct DepthPick<K> {
    /// Object drawn at the pixel
    pub key: K,
    /// Raw depth-buffer value
    pub depth: f32,
    /// Camera-space distance recovered from `depth`
    pub linear_depth: f32,
}

/// Owner of the pick buffer
#[derive(Debug)]
pub struct ColorPicker<B: PickBuffer> {
    buffer: B,
    passes: u64,
}

impl<B: PickBuffer> ColorPicker<B> {
    /// Wrap a buffer
    pub fn new(buffer: B) -> Self {
        Self { buffer, passes: 0 }
    }

    /// The underlying buffer
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Number of passes started so far
    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    /// Start a pass over a `width x height` viewport
    ///
    /// Resizes the buffer when the viewport changed, clears it to the
    /// background and starts a fresh ID table whose first index is 1.
    pub fn begin_pass<K>(&mut self, width: u32, height: u32) -> Result<PickPass<'_, B, K>, PickingError> {
        if width == 0 || height == 0 {
            return Err(PickingError::ZeroSizedBuffer { width, height });
        }
        if self.buffer.size() != (width, height) {
            log::debug!("Resizing pick buffer to {width}x{height}");
            self.buffer.resize(width, height)?;
        }
        self.buffer.clear(index_to_rgba8(0), 1.0)?;
        self.passes += 1;
        log::trace!("Color pick pass {} started", self.passes);

        Ok(PickPass {
            buffer: &mut self.buffer,
            table: HashMap::new(),
            next_index: 1,
        })
    }

    /// Release the buffer
    pub fn into_buffer(self) -> B {
        self.buffer
    }
}

/// One open color-picking pass
///
/// Consumed by reading its result.
#[derive(Debug)]
pub struct PickPass<'a, B: PickBuffer, K> {
    buffer: &'a mut B,
    table: HashMap<u32, K>,
    next_index: u32,
}

impl<B: PickBuffer, K: Clone> PickPass<'_, B, K> {
    /// Reserve the next color for `key`
    pub fn assign_color(&mut self, key: K) -> PickColor {
        let rgba = index_to_rgba8(self.next_index);
        self.table.insert(pack_rgba8(rgba), key);
        // Index 0 is the background
        self.next_index = self.next_index.wrapping_add(1).max(1);
        PickColor::from_rgba8(rgba)
    }

    /// Number of colors handed out
    pub fn assigned_count(&self) -> usize {
        self.table.len()
    }

    /// Object for a packed read-back value
    pub fn resolve(&self, packed: u32) -> Option<&K> {
        if packed == BACKGROUND_PACKED {
            return None;
        }
        self.table.get(&packed)
    }

    /// Render target for drawing the candidates
    pub fn buffer_mut(&mut self) -> &mut B {
        self.buffer
    }

    /// Object drawn at one pixel
    pub fn read_point(self, x: u32, y: u32) -> Result<Option<K>, PickingError> {
        self.check_point(x, y)?;
        let packed = decode_rgba8_readback(&self.buffer.read_rgba8(PixelRect::point(x, y))?)?;
        Ok(packed.first().and_then(|p| self.resolve(*p)).cloned())
    }

    /// Distinct objects inside a rectangle, in row-major order of first
    /// appearance
    ///
    /// The rectangle is clipped to the buffer; one entirely outside is an
    /// error.
    pub fn read_rect(self, rect: PixelRect) -> Result<Vec<K>, PickingError> {
        self.read_region(PickRegion::Rect(rect))
    }

    /// Distinct objects inside any region shape
    pub fn read_region(self, region: PickRegion) -> Result<Vec<K>, PickingError> {
        let (width, height) = self.buffer.size();
        let bounds = region.bounding_rect();
        let Some(rect) = bounds.clipped(width, height) else {
            return Err(PickingError::ReadOutOfBounds { x: bounds.x, y: bounds.y, width, height });
        };

        let packed = decode_rgba8_readback(&self.buffer.read_rgba8(rect)?)?;
        let mut seen = HashSet::new();
        let keys: Vec<K> = rect
            .pixels()
            .zip(packed)
            .filter(|((x, y), _)| region.contains(*x, *y))
            .filter_map(|(_, value)| {
                let key = self.resolve(value)?;
                seen.insert(value).then(|| key.clone())
            })
            .collect();

        log::trace!("Color pick region {:?}: {} objects over {} pixels", region, keys.len(), rect.area());
        Ok(keys)
    }

    /// Object drawn at one pixel with its depth
    pub fn read_point_with_depth(self, x: u32, y: u32, camera: &Camera) -> Result<Option<DepthPick<K>>, PickingError> {
        self.check_point(x, y)?;
        let depth = self.buffer.read_depth(x, y)?;
        let packed = decode_rgba8_readback(&self.buffer.read_rgba8(PixelRect::point(x, y))?)?;

        Ok(packed.first().and_then(|p| self.resolve(*p)).map(|key| DepthPick {
            key: key.clone(),
            depth,
            linear_depth: camera.linearize_depth(depth),
        }))
    }

    fn check_point(&self, x: u32, y: u32) -> Result<(), PickingError> {
        let (width, height) = self.buffer.size();
        if x >= width || y >= height {
            return Err(PickingError::ReadOutOfBounds { x, y, width, height });
        }
        Ok(())
    }
}
