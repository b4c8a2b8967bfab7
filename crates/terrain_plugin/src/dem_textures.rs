//! GPU textures for elevation tiles, keyed by tile coordinate.
//!
//! The renderer owns every DEM texture it creates. A tile keeps the same
//! texture for as long as its entry lives; the pixels are re-uploaded only
//! when the tile reports a pending change, and at most once per frame.

use std::collections::hash_map::{Entry, HashMap};

use tracing::{debug, trace};

use crate::gpu::{GpuContext, GpuError, TextureFilter, TextureId};
use crate::source::DemTile;
use crate::types::TileCoordinate;

#[derive(Clone, Copy, Debug)]
struct Slot {
  texture: TextureId,
  uploaded_frame: Option<u64>,
  last_used_frame: u64,
}

/// Texture bound for one draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreparedTexture {
  pub texture: TextureId,
  /// True when pixels were uploaded by this call.
  pub uploaded: bool,
}

#[derive(Debug)]
pub struct DemTextureCache {
  entries: HashMap<TileCoordinate, Slot>,
  filter: TextureFilter,
  retention_frames: u64,
}

impl DemTextureCache {
  /// `retention_frames == 0` disables eviction.
  pub fn new(filter: TextureFilter, retention_frames: u64) -> Self {
    Self {
      entries: HashMap::new(),
      filter,
      retention_frames,
    }
  }

  /// Texture for `tile`, creating and uploading it as needed.
  ///
  /// A tile seen for the first time is always uploaded, even when
  /// `needs_texture_upload()` is false, so a freshly created texture never
  /// draws empty. After that the flag drives re-uploads, at most once per
  /// frame.
  pub fn prepare<C, T>(
    &mut self,
    ctx: &mut C,
    tile: &T,
    frame: u64,
  ) -> Result<PreparedTexture, GpuError>
  where
    C: GpuContext + ?Sized,
    T: DemTile + ?Sized,
  {
    let coord = tile.coordinate();
    let entry = match self.entries.entry(coord) {
      Entry::Occupied(slot) => slot.into_mut(),
      Entry::Vacant(slot) => {
        let texture = ctx.create_texture()?;
        trace!(%coord, ?texture, "created dem texture");
        slot.insert(Slot {
          texture,
          uploaded_frame: None,
          last_used_frame: frame,
        })
      }
    };
    entry.last_used_frame = frame;

    let stale = entry.uploaded_frame.is_none()
      || (tile.needs_texture_upload() && entry.uploaded_frame != Some(frame));
    if stale {
      let dem = tile.dem();
      let side = dem.stride();
      ctx.upload_texture_rgba8(entry.texture, side, side, dem.pixels(), self.filter)?;
      entry.uploaded_frame = Some(frame);
    }

    Ok(PreparedTexture {
      texture: entry.texture,
      uploaded: stale,
    })
  }

  /// Release textures unused for more than the retention window.
  pub fn evict_stale<C: GpuContext + ?Sized>(&mut self, ctx: &mut C, frame: u64) -> usize {
    if self.retention_frames == 0 {
      return 0;
    }
    let retention = self.retention_frames;
    let before = self.entries.len();
    self.entries.retain(|coord, entry| {
      let keep = frame.saturating_sub(entry.last_used_frame) <= retention;
      if !keep {
        trace!(%coord, "releasing stale dem texture");
        ctx.delete_texture(entry.texture);
      }
      keep
    });
    before - self.entries.len()
  }

  /// Release the texture of one tile. Returns false when none existed.
  pub fn remove<C: GpuContext + ?Sized>(&mut self, ctx: &mut C, coord: &TileCoordinate) -> bool {
    match self.entries.remove(coord) {
      Some(entry) => {
        ctx.delete_texture(entry.texture);
        true
      }
      None => false,
    }
  }

  /// Release every texture.
  pub fn release_all<C: GpuContext + ?Sized>(&mut self, ctx: &mut C) -> usize {
    let count = self.entries.len();
    for (_, entry) in self.entries.drain() {
      ctx.delete_texture(entry.texture);
    }
    if count > 0 {
      debug!(count, "released dem textures");
    }
    count
  }

  pub fn texture(&self, coord: &TileCoordinate) -> Option<TextureId> {
    self.entries.get(coord).map(|entry| entry.texture)
  }

  pub fn contains(&self, coord: &TileCoordinate) -> bool {
    self.entries.contains_key(coord)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
#[path = "dem_textures_test.rs"]
mod dem_textures_test;
