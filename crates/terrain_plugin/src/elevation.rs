//! Elevation codec and DEM tile pixel storage.
//!
//! DEM texels pack elevation as a 3-digit base-256 unsigned integer in the
//! R, G, B channels, biased by 65536:
//!
//! ```text
//! meters = R + G·256 + B·65536 - 65536
//! ```
//!
//! The encoding is owned by the elevation tile source. The vertex shader
//! decodes the same way, so any change here needs a matching change in
//! [`crate::shader`] and in the source.

use crate::constants::{ELEVATION_BIAS, MAX_ENCODED_VALUE};
use crate::error::{Result, TerrainError};

/// Decode one texel's channels to signed meters.
///
/// Exact for every channel combination (the result fits in 25 bits).
#[inline(always)]
pub fn decode(r: u8, g: u8, b: u8) -> f64 {
  f64::from(r) + f64::from(g) * 256.0 + f64::from(b) * 65536.0 - ELEVATION_BIAS
}

/// Decode an RGBA texel; alpha is ignored.
#[inline(always)]
pub fn decode_pixel(pixel: [u8; 4]) -> f64 {
  decode(pixel[0], pixel[1], pixel[2])
}

/// Encode whole meters back to `[r, g, b]`.
///
/// Returns None for non-integral values or values outside
/// `[-65536, 16_711_679]`.
pub fn encode(meters: f64) -> Option<[u8; 3]> {
  if !meters.is_finite() || meters.fract() != 0.0 {
    return None;
  }
  let value = meters + ELEVATION_BIAS;
  if value < 0.0 || value > f64::from(MAX_ENCODED_VALUE) {
    return None;
  }
  let value = value as u32;
  Some([
    (value & 0xFF) as u8,
    ((value >> 8) & 0xFF) as u8,
    ((value >> 16) & 0xFF) as u8,
  ])
}

/// Raw RGBA8 elevation pixels of one DEM tile.
///
/// Square, `stride × stride` texels, row-major, tightly packed.
#[derive(Clone, PartialEq, Eq)]
pub struct DemData {
  stride: u32,
  pixels: Vec<u8>,
}

impl std::fmt::Debug for DemData {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "DemData({0}×{0})", self.stride)
  }
}

impl DemData {
  /// Wrap an RGBA8 buffer, validating its size against `stride`.
  pub fn new(stride: u32, pixels: Vec<u8>) -> Result<Self> {
    let expected = stride as usize * stride as usize * 4;
    if stride == 0 || pixels.len() != expected {
      return Err(TerrainError::InvalidDemData {
        stride,
        expected,
        actual: pixels.len(),
      });
    }
    Ok(Self { stride, pixels })
  }

  /// Build a tile by encoding `f(x, y)` meters per texel.
  ///
  /// Values are rounded to whole meters and clamped to the encodable range.
  pub fn from_fn(stride: u32, mut f: impl FnMut(u32, u32) -> f64) -> Result<Self> {
    let mut pixels = Vec::with_capacity(stride as usize * stride as usize * 4);
    for y in 0..stride {
      for x in 0..stride {
        let meters = f(x, y)
          .round()
          .clamp(-ELEVATION_BIAS, f64::from(MAX_ENCODED_VALUE) - ELEVATION_BIAS);
        let [r, g, b] = encode(meters).unwrap_or([0, 0, 1]);
        pixels.extend_from_slice(&[r, g, b, 255]);
      }
    }
    Self::new(stride, pixels)
  }

  /// Texels per side.
  pub fn stride(&self) -> u32 {
    self.stride
  }

  /// Tightly packed RGBA8 bytes for texture upload.
  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }

  /// Decoded elevation at a texel, None outside the tile.
  pub fn elevation_at(&self, x: u32, y: u32) -> Option<f64> {
    if x >= self.stride || y >= self.stride {
      return None;
    }
    let i = (y as usize * self.stride as usize + x as usize) * 4;
    Some(decode(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
  }

  /// Minimum and maximum decoded elevation over the tile.
  pub fn min_max(&self) -> (f64, f64) {
    self
      .pixels
      .chunks_exact(4)
      .map(|px| decode(px[0], px[1], px[2]))
      .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
        (lo.min(e), hi.max(e))
      })
  }
}

#[cfg(test)]
#[path = "elevation_test.rs"]
mod elevation_test;
