//! Pairs visible raster tiles with the elevation tiles that displace them.
//!
//! A raster tile at zoom `rz` is drawn with the DEM tile covering it at zoom
//! `dz <= rz`. The DEM texture is sampled through a window selected by
//!
//! ```text
//! scale  = 2^-(rz - dz)
//! offset = (rx - dx / scale, ry - dy / scale)
//! ```
//!
//! so that `(uv + offset) * scale` spans exactly the raster footprint inside
//! the DEM tile's `[0, 1]²`. The vertex stage then maps that through
//! `* 0.5 + 0.25`, so the texels actually read are the centered half of the
//! DEM texture (see [`crate::constants::DEM_SAMPLE_SCALE`]).

use glam::Vec2;
use tracing::trace;

use crate::source::{DemTile, RasterTile, Tile, TileCache};
use crate::types::{RenderPair, TileCoordinate};

/// DEM window for a raster coordinate, None when the DEM tile is finer.
pub fn dem_sampling(raster: &TileCoordinate, dem: &TileCoordinate) -> Option<(f32, Vec2)> {
  let delta = raster.zoom.checked_sub(dem.zoom)?;
  let scale = 0.5f64.powi(i32::from(delta));
  let offset = Vec2::new(
    (f64::from(raster.x) - f64::from(dem.x) / scale) as f32,
    (f64::from(raster.y) - f64::from(dem.y) / scale) as f32,
  );
  Some((scale as f32, offset))
}

/// Builds the ordered [`RenderPair`] list for one frame.
///
/// Matching only reads the caches; calling it twice without an intervening
/// update yields the same pairs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TileMatcher {
  /// Coarsest zoom at which a covering DEM ancestor is accepted.
  pub min_covering_zoom: u8,
}

impl TileMatcher {
  pub fn new(min_covering_zoom: u8) -> Self {
    Self { min_covering_zoom }
  }

  /// Match visible raster coordinates, keeping the cache's far-to-near order.
  ///
  /// A coordinate is dropped when the raster cache holds a loaded ancestor
  /// for it, or when no covering DEM tile is loaded.
  pub fn match_tiles<'a, R, D>(
    &self,
    raster: &'a R,
    dem: &'a D,
  ) -> Vec<RenderPair<'a, R::Tile, D::Tile>>
  where
    R: TileCache,
    R::Tile: RasterTile,
    D: TileCache,
    D::Tile: DemTile,
  {
    let visible = raster.visible_coordinates();
    let mut pairs = Vec::with_capacity(visible.len());

    for coord in visible {
      if let Some(parent) = raster.find_loaded_parent(&coord, 0) {
        trace!(%coord, parent = %parent.coordinate(), "raster ancestor loaded, skipping");
        continue;
      }
      let Some(dem_tile) = dem.find_covering_tile(&coord, self.min_covering_zoom) else {
        trace!(%coord, "no covering dem tile");
        continue;
      };
      let Some(raster_tile) = raster.get_tile(&coord) else {
        trace!(%coord, "visible coordinate has no raster tile");
        continue;
      };
      let Some((scale, offset)) = dem_sampling(&coord, &dem_tile.coordinate()) else {
        trace!(%coord, dem = %dem_tile.coordinate(), "dem tile finer than raster tile");
        continue;
      };
      pairs.push(RenderPair {
        raster: raster_tile,
        dem: dem_tile,
        scale,
        offset,
      });
    }

    pairs
  }
}

/// [`TileMatcher::match_tiles`] accepting DEM ancestors down to zoom 0.
pub fn match_tiles<'a, R, D>(raster: &'a R, dem: &'a D) -> Vec<RenderPair<'a, R::Tile, D::Tile>>
where
  R: TileCache,
  R::Tile: RasterTile,
  D: TileCache,
  D::Tile: DemTile,
{
  TileMatcher::default().match_tiles(raster, dem)
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod matcher_test;
