//! Contracts for the host-owned collaborators: tile caches, tiles and the
//! camera transform.
//!
//! The layer never owns tile lifetime. It borrows the host's caches for the
//! duration of one call and only observes tiles that are already loaded.

use crate::elevation::DemData;
use crate::gpu::TextureId;
use crate::types::TileCoordinate;

/// A tile owned by a [`TileCache`].
pub trait Tile {
  fn coordinate(&self) -> TileCoordinate;

  /// True once the tile's payload is available for drawing.
  fn is_loaded(&self) -> bool;
}

/// Color imagery tile; the host uploads its texture.
pub trait RasterTile: Tile {
  /// GPU texture, None until the host has uploaded the image.
  fn texture(&self) -> Option<TextureId>;
}

/// Elevation tile carrying encoded DEM pixels.
pub trait DemTile: Tile {
  fn dem(&self) -> &DemData;

  /// Set by the host when `dem()` changed and the GPU copy is stale.
  fn needs_texture_upload(&self) -> bool;
}

/// Camera state read by the update cycle.
///
/// Angles are radians, distances in the host's pixel units.
pub trait ViewTransform: Clone {
  fn height(&self) -> f64;
  fn set_height(&mut self, height: f64);
  /// Tilt away from straight down.
  fn pitch(&self) -> f64;
  fn camera_to_center_distance(&self) -> f64;
}

/// Host tile cache.
///
/// Pause state is changed only through [`pause`](Self::pause) and
/// [`resume`](Self::resume); a paused cache ignores host-driven updates so the
/// layer alone decides when the visible set changes.
pub trait TileCache {
  type Tile: Tile;

  fn pause(&mut self);
  fn resume(&mut self);
  fn is_paused(&self) -> bool;
  fn set_used(&mut self, used: bool);

  /// Recompute the visible set (and request loads) for `transform`.
  fn update<T: ViewTransform>(&mut self, transform: &T);

  /// Currently visible coordinates, ordered far to near.
  fn visible_coordinates(&self) -> Vec<TileCoordinate>;

  /// The tile stored at exactly `coord`, loaded or not.
  fn get_tile(&self, coord: &TileCoordinate) -> Option<&Self::Tile>;

  /// Nearest loaded strict ancestor of `coord` with zoom `>= min_zoom`.
  fn find_loaded_parent(&self, coord: &TileCoordinate, min_zoom: u8) -> Option<&Self::Tile>;

  /// `coord` itself when loaded, else its nearest loaded ancestor.
  fn find_covering_tile(&self, coord: &TileCoordinate, min_zoom: u8) -> Option<&Self::Tile> {
    self
      .get_tile(coord)
      .filter(|tile| tile.is_loaded())
      .or_else(|| self.find_loaded_parent(coord, min_zoom))
  }
}

/// Elevation cache: lets the renderer clear a tile's upload flag once the
/// pixels reached the GPU.
pub trait DemTileCache: TileCache
where
  Self::Tile: DemTile,
{
  fn acknowledge_texture_upload(&mut self, coord: &TileCoordinate);
}

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;
