//! Color-ID encoding for the color-picking pass
//!
//! A pass-local index `idx` is spread over the four RGBA8 channels as
//! `R = bits 16..24`, `G = bits 8..16`, `B = bits 0..8` and `A = bits 24..32`.
//! Read-back pixels are compared as packed 32-bit values: the four channel
//! bytes in memory order, reinterpreted as a native-endian `u32`.
//!
//! Index 0 encodes as all zero bytes, the background clear color, and is
//! never assigned to an object. Below 2^24 the alpha byte stays zero, so
//! roughly 16.7 million objects fit in one pass before the alpha channel
//! has to carry index bits.

use bytemuck::{Pod, Zeroable};

use super::PickingError;

/// Packed value of the background, never mapped to an object
pub const BACKGROUND_PACKED: u32 = 0;

/// Color handed to the shader for one candidate
///
/// Channels are normalized to `[0, 1]`; converting back with
/// [`PickColor::to_rgba8`] is exact.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PickColor {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl PickColor {
    /// Normalize RGBA8 channels
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba.map(|c| f32::from(c) / 255.0);
        Self { r, g, b, a }
    }

    /// Color for a pass-local index
    pub fn from_index(index: u32) -> Self {
        Self::from_rgba8(index_to_rgba8(index))
    }

    /// Quantize back to RGBA8 the way an 8-bit render target stores it
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Channels as an array for uniform upload
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Spread an index over RGBA8 channels
pub fn index_to_rgba8(index: u32) -> [u8; 4] {
    [
        ((index >> 16) & 0xFF) as u8,
        ((index >> 8) & 0xFF) as u8,
        (index & 0xFF) as u8,
        ((index >> 24) & 0xFF) as u8,
    ]
}

/// Inverse of [`index_to_rgba8`]
pub fn rgba8_to_index(rgba: [u8; 4]) -> u32 {
    let [r, g, b, a] = rgba.map(u32::from);
    (a << 24) | (r << 16) | (g << 8) | b
}

/// Pack channel bytes, in memory order, into the table key
pub fn pack_rgba8(rgba: [u8; 4]) -> u32 {
    u32::from_ne_bytes(rgba)
}

/// Inverse of [`pack_rgba8`]
pub fn unpack_rgba8(packed: u32) -> [u8; 4] {
    packed.to_ne_bytes()
}

/// Packed values of a tightly packed RGBA8 read-back
pub fn decode_rgba8_readback(bytes: &[u8]) -> Result<Vec<u32>, PickingError> {
    let pixels: &[[u8; 4]] =
        bytemuck::try_cast_slice(bytes).map_err(|_| PickingError::MisalignedReadback(bytes.len()))?;
    Ok(pixels.iter().map(|pixel| pack_rgba8(*pixel)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_layout() {
        assert_eq!(index_to_rgba8(1), [0, 0, 1, 0]);
        assert_eq!(index_to_rgba8(0x0001_0203), [1, 2, 3, 0]);
        assert_eq!(index_to_rgba8(0x8000_0000), [0, 0, 0, 0x80]);
        assert_eq!(rgba8_to_index([1, 2, 3, 4]), 0x0401_0203);
    }

    #[test]
    fn test_background_is_index_zero() {
        assert_eq!(pack_rgba8(index_to_rgba8(0)), BACKGROUND_PACKED);
        assert_eq!(PickColor::from_index(0), PickColor::zeroed());
    }

    #[test]
    fn test_normalized_color_quantizes_back() {
        for index in [1_u32, 255, 256, 65_535, 0x00AB_CDEF, 0x00FF_FFFF] {
            let color = PickColor::from_index(index);
            assert!(color.to_array().iter().all(|c| (0.0..=1.0).contains(c)));
            assert_eq!(rgba8_to_index(color.to_rgba8()), index);
        }
    }

    #[test]
    fn test_readback_decoding() {
        let bytes = [0, 0, 1, 0, 0, 0, 0, 0, 1, 2, 3, 0];
        let packed = decode_rgba8_readback(&bytes).unwrap();
        assert_eq!(packed.len(), 3);
        assert_eq!(unpack_rgba8(packed[0]), [0, 0, 1, 0]);
        assert_eq!(packed[1], BACKGROUND_PACKED);
        assert_eq!(rgba8_to_index(unpack_rgba8(packed[2])), 0x0001_0203);

        assert_eq!(
            decode_rgba8_readback(&bytes[..5]),
            Err(PickingError::MisalignedReadback(5))
        );
    }

    #[test]
    fn test_pick_color_is_plain_data() {
        let colors = [PickColor::from_index(1), PickColor::from_index(2)];
        let bytes: &[u8] = bytemuck::cast_slice(&colors);
        assert_eq!(bytes.len(), 32);
    }
}
