//! In-memory pick buffer for headless tools and tests

use crate::input::PixelRect;

use super::color::PickColor;
use super::color_picker::{PickBuffer, PickingError};

/// RGBA8 color plus depth, kept in CPU memory
///
/// Drawing is limited to filling pixel rectangles with a depth test, which
/// is enough to stand in for rasterized bounding boxes or sprites.
#[derive(Debug, Clone, Default)]
pub struct CpuPickBuffer {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl CpuPickBuffer {
    /// Unallocated buffer; the first pass sizes it
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the part of `rect` inside the buffer where `depth` passes a
    /// less-or-equal test
    ///
    /// Returns the number of pixels written.
    pub fn fill_rect(&mut self, rect: PixelRect, color: PickColor, depth: f32) -> usize {
        let Some(rect) = rect.clipped(self.width, self.height) else {
            return 0;
        };
        let rgba = color.to_rgba8();
        let mut written = 0;
        for (x, y) in rect.pixels() {
            let index = self.index(x, y);
            if depth <= self.depth[index] {
                self.depth[index] = depth;
                self.color[index] = rgba;
                written += 1;
            }
        }
        written
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl PickBuffer for CpuPickBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), PickingError> {
        let len = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|e| PickingError::Backend(e.to_string()))?;
        self.width = width;
        self.height = height;
        self.color = vec![[0; 4]; len];
        self.depth = vec![1.0; len];
        Ok(())
    }

    fn clear(&mut self, color: [u8; 4], depth: f32) -> Result<(), PickingError> {
        self.color.fill(color);
        self.depth.fill(depth);
        Ok(())
    }

    fn read_rgba8(&self, rect: PixelRect) -> Result<Vec<u8>, PickingError> {
        if rect.x.saturating_add(rect.width) > self.width || rect.y.saturating_add(rect.height) > self.height {
            return Err(PickingError::ReadOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(rect
            .pixels()
            .flat_map(|(x, y)| self.color[self.index(x, y)])
            .collect())
    }

    fn read_depth(&self, x: u32, y: u32) -> Result<f32, PickingError> {
        if x >= self.width || y >= self.height {
            return Err(PickingError::ReadOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.depth[self.index(x, y)])
    }
}
