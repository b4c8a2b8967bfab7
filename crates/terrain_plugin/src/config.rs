//! Layer configuration.
//!
//! Every field has a default matching the reference behavior, so a host can
//! deserialize a partial table (with the `serde` feature) or start from
//! `TerrainConfig::default()` and override with the `with_*` builders.

use crate::constants::{
  DEFAULT_BASELINE_ELEVATION, DEFAULT_DEM_TEXTURE_RETENTION_FRAMES, DEFAULT_MAX_PITCH,
};
use crate::gpu::TextureFilter;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TerrainConfig {
  /// Meters subtracted from decoded elevation before displacement.
  pub baseline_elevation: f32,

  /// Upper pitch bound (radians) used for the update-height compensation.
  pub max_pitch: f64,

  /// Skip pairs whose raster tile has no texture yet. When false the draw
  /// is issued with no texture bound on the raster unit.
  pub skip_incomplete_tiles: bool,

  /// Frames a DEM texture may go unused before it is released.
  /// 0 keeps textures until detach.
  pub dem_texture_retention_frames: u64,

  /// Sampling filter for DEM textures.
  pub dem_filter: TextureFilter,

  /// Coarsest zoom accepted for a covering DEM tile.
  pub min_covering_zoom: u8,
}

impl Default for TerrainConfig {
  fn default() -> Self {
    Self {
      baseline_elevation: DEFAULT_BASELINE_ELEVATION,
      max_pitch: DEFAULT_MAX_PITCH,
      skip_incomplete_tiles: true,
      dem_texture_retention_frames: DEFAULT_DEM_TEXTURE_RETENTION_FRAMES,
      dem_filter: TextureFilter::Linear,
      min_covering_zoom: 0,
    }
  }
}

impl TerrainConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_baseline_elevation(mut self, meters: f32) -> Self {
    self.baseline_elevation = meters;
    self
  }

  pub fn with_max_pitch(mut self, radians: f64) -> Self {
    self.max_pitch = radians;
    self
  }

  pub fn with_max_pitch_degrees(self, degrees: f64) -> Self {
    self.with_max_pitch(degrees.to_radians())
  }

  pub fn with_skip_incomplete_tiles(mut self, skip: bool) -> Self {
    self.skip_incomplete_tiles = skip;
    self
  }

  pub fn with_dem_texture_retention_frames(mut self, frames: u64) -> Self {
    self.dem_texture_retention_frames = frames;
    self
  }

  pub fn with_dem_filter(mut self, filter: TextureFilter) -> Self {
    self.dem_filter = filter;
    self
  }

  pub fn with_min_covering_zoom(mut self, zoom: u8) -> Self {
    self.min_covering_zoom = zoom;
    self
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
