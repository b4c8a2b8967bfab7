//! In-memory collaborators for unit tests.

use std::collections::HashMap;

use crate::elevation::DemData;
use crate::gpu::TextureId;
use crate::source::{DemTile, DemTileCache, RasterTile, Tile, TileCache, ViewTransform};
use crate::types::TileCoordinate;

#[derive(Clone, Debug)]
pub struct MockRasterTile {
  pub coord: TileCoordinate,
  pub loaded: bool,
  pub texture: Option<TextureId>,
}

impl MockRasterTile {
  pub fn loaded(coord: TileCoordinate, texture: u32) -> Self {
    Self {
      coord,
      loaded: true,
      texture: Some(TextureId(texture)),
    }
  }
}

impl Tile for MockRasterTile {
  fn coordinate(&self) -> TileCoordinate {
    self.coord
  }

  fn is_loaded(&self) -> bool {
    self.loaded
  }
}

impl RasterTile for MockRasterTile {
  fn texture(&self) -> Option<TextureId> {
    self.texture
  }
}

#[derive(Clone, Debug)]
pub struct MockDemTile {
  pub coord: TileCoordinate,
  pub loaded: bool,
  pub dem: DemData,
  pub needs_upload: bool,
}

impl MockDemTile {
  /// Loaded 4×4 tile at a flat 2200 m, flagged for upload.
  pub fn loaded(coord: TileCoordinate) -> Self {
    Self {
      coord,
      loaded: true,
      dem: DemData::from_fn(4, |_, _| 2200.0).unwrap(),
      needs_upload: true,
    }
  }
}

impl Tile for MockDemTile {
  fn coordinate(&self) -> TileCoordinate {
    self.coord
  }

  fn is_loaded(&self) -> bool {
    self.loaded
  }
}

impl DemTile for MockDemTile {
  fn dem(&self) -> &DemData {
    &self.dem
  }

  fn needs_texture_upload(&self) -> bool {
    self.needs_upload
  }
}

/// Cache over a coordinate map that records every lifecycle call.
#[derive(Debug)]
pub struct MockCache<T> {
  pub tiles: HashMap<TileCoordinate, T>,
  pub visible: Vec<TileCoordinate>,
  pub paused: bool,
  pub used: bool,
  /// `(paused, height)` observed by each `update` call.
  pub updates: Vec<(bool, f64)>,
  pub acknowledged: Vec<TileCoordinate>,
}

impl<T> Default for MockCache<T> {
  fn default() -> Self {
    Self {
      tiles: HashMap::new(),
      visible: Vec::new(),
      paused: false,
      used: false,
      updates: Vec::new(),
      acknowledged: Vec::new(),
    }
  }
}

impl<T: Tile> MockCache<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store a tile without making it visible.
  pub fn insert(&mut self, tile: T) -> &mut Self {
    self.tiles.insert(tile.coordinate(), tile);
    self
  }

  /// Store a tile and append it to the visible list.
  pub fn insert_visible(&mut self, tile: T) -> &mut Self {
    self.visible.push(tile.coordinate());
    self.insert(tile)
  }
}

impl<T: Tile> TileCache for MockCache<T> {
  type Tile = T;

  fn pause(&mut self) {
    self.paused = true;
  }

  fn resume(&mut self) {
    self.paused = false;
  }

  fn is_paused(&self) -> bool {
    self.paused
  }

  fn set_used(&mut self, used: bool) {
    self.used = used;
  }

  fn update<V: ViewTransform>(&mut self, transform: &V) {
    self.updates.push((self.paused, transform.height()));
  }

  fn visible_coordinates(&self) -> Vec<TileCoordinate> {
    self.visible.clone()
  }

  fn get_tile(&self, coord: &TileCoordinate) -> Option<&T> {
    self.tiles.get(coord)
  }

  fn find_loaded_parent(&self, coord: &TileCoordinate, min_zoom: u8) -> Option<&T> {
    let mut current = coord.parent();
    while let Some(parent) = current.filter(|p| p.zoom >= min_zoom) {
      if let Some(tile) = self.tiles.get(&parent).filter(|t| t.is_loaded()) {
        return Some(tile);
      }
      current = parent.parent();
    }
    None
  }
}

impl DemTileCache for MockCache<MockDemTile> {
  fn acknowledge_texture_upload(&mut self, coord: &TileCoordinate) {
    if let Some(tile) = self.tiles.get_mut(coord) {
      tile.needs_upload = false;
    }
    self.acknowledged.push(*coord);
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MockTransform {
  pub height: f64,
  pub pitch: f64,
  pub distance: f64,
}

impl Default for MockTransform {
  fn default() -> Self {
    Self {
      height: 1000.0,
      pitch: 0.0,
      distance: 500.0,
    }
  }
}

impl ViewTransform for MockTransform {
  fn height(&self) -> f64 {
    self.height
  }

  fn set_height(&mut self, height: f64) {
    self.height = height;
  }

  fn pitch(&self) -> f64 {
    self.pitch
  }

  fn camera_to_center_distance(&self) -> f64 {
    self.distance
  }
}
