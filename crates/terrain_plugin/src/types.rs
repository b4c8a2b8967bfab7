//! Core value types: tile coordinates and per-frame render pairs.

use glam::Vec2;

/// Quadtree address of a tile in the host's tiling scheme.
///
/// `wrap` counts whole-world copies east (+) or west (-) of the primary world
/// for hosts that render repeated worlds. Which tiles are *loaded* is always
/// answered by the owning cache; this type only does coordinate math.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TileCoordinate {
  /// Zoom level (0 = whole world in one tile).
  pub zoom: u8,
  /// Column at this zoom level.
  pub x: u32,
  /// Row at this zoom level.
  pub y: u32,
  /// World copy index.
  pub wrap: i32,
}

impl TileCoordinate {
  /// Create a coordinate in the primary world copy.
  pub fn new(zoom: u8, x: u32, y: u32) -> Self {
    Self { zoom, x, y, wrap: 0 }
  }

  pub fn with_wrap(mut self, wrap: i32) -> Self {
    self.wrap = wrap;
    self
  }

  /// Tiles per axis at this zoom level (2^zoom).
  #[inline]
  pub fn tiles_per_axis(&self) -> f64 {
    2f64.powi(i32::from(self.zoom))
  }

  /// Ancestor (or self) at a coarser zoom level.
  ///
  /// Returns None when `zoom` is finer than this coordinate.
  pub fn scaled_to(&self, zoom: u8) -> Option<Self> {
    if zoom > self.zoom {
      return None;
    }
    let shift = u32::from(self.zoom - zoom);
    Some(Self {
      zoom,
      x: self.x.checked_shr(shift).unwrap_or(0),
      y: self.y.checked_shr(shift).unwrap_or(0),
      wrap: self.wrap,
    })
  }

  /// Immediate parent, None at zoom 0.
  pub fn parent(&self) -> Option<Self> {
    self.zoom.checked_sub(1).and_then(|z| self.scaled_to(z))
  }

  /// True when `self` is a strict ancestor of `other`.
  pub fn is_ancestor_of(&self, other: &TileCoordinate) -> bool {
    self.zoom < other.zoom && other.scaled_to(self.zoom) == Some(*self)
  }
}

impl std::fmt::Display for TileCoordinate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}/{}", self.zoom, self.x, self.y)?;
    if self.wrap != 0 {
      write!(f, "@{}", self.wrap)?;
    }
    Ok(())
  }
}

/// One raster tile matched to the elevation tile that displaces its mesh.
///
/// Ephemeral: built by the matcher each frame, borrowed from both caches.
pub struct RenderPair<'a, R, D> {
  /// Most detailed raster tile available for this footprint.
  pub raster: &'a R,
  /// Covering elevation tile (same zoom or an ancestor).
  pub dem: &'a D,
  /// `2^-(raster_zoom - dem_zoom)`, in `(0, 1]`.
  pub scale: f32,
  /// Selects the raster footprint's sub-rectangle of the DEM tile.
  pub offset: Vec2,
}

impl<R, D> Clone for RenderPair<'_, R, D> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<R, D> Copy for RenderPair<'_, R, D> {}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
