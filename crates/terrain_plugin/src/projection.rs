//! Per-tile matrices for hosts on a Web-Mercator pixel grid.
//!
//! The layer draws with whatever matrix the host hands to
//! [`TerrainLayer::render_frame`](crate::TerrainLayer::render_frame); these
//! helpers build one for the common `x + wrap·2^z`, y-down layout.
//!
//! Tile-local positions `[0, EXTENT]²` are placed into world pixel space
//! (`[0, world_size]²` for the primary world copy), then multiplied by the
//! host's view-projection. Composition happens in f64 and is narrowed to f32
//! only for upload, so distant wraps and deep zooms keep their precision.

use glam::{DMat4, DVec3, Mat4};

use crate::constants::EXTENT;
use crate::types::TileCoordinate;

/// Tile space to world pixel space. Elevation (z) passes through unscaled.
pub fn tile_model_matrix(coord: &TileCoordinate, world_size: f64) -> DMat4 {
  let tiles = coord.tiles_per_axis();
  let tile_size = world_size / tiles;
  let origin = DVec3::new(
    (f64::from(coord.x) + f64::from(coord.wrap) * tiles) * tile_size,
    f64::from(coord.y) * tile_size,
    0.0,
  );
  let texel = tile_size / f64::from(EXTENT);
  DMat4::from_translation(origin) * DMat4::from_scale(DVec3::new(texel, texel, 1.0))
}

/// Full `u_matrix` for one tile.
pub fn tile_matrix(view_projection: &DMat4, coord: &TileCoordinate, world_size: f64) -> Mat4 {
  (*view_projection * tile_model_matrix(coord, world_size)).as_mat4()
}

#[cfg(test)]
#[path = "projection_test.rs"]
mod projection_test;
