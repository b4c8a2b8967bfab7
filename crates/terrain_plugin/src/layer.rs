//! TerrainLayer - host-facing orchestrator.
//!
//! Lifecycle:
//!
//! ```text
//! new ──► attach ──► render_frame* ──► detach
//!           │            │
//!           │            ├─ UpdateScheduler::advance   (resume, update, pause)
//!           │            ├─ TileMatcher::match_tiles   (pairs, far to near)
//!           │            ├─ FrameRenderer::render      (draws, host u_matrix)
//!           │            └─ acknowledge DEM uploads
//!           └─ build pipeline, pause both caches
//! ```
//!
//! The host keeps ownership of the caches, the camera, the GPU context and
//! the tile placement; each call borrows them for its duration only. Hosts on
//! a Web-Mercator pixel grid can build their per-tile matrices with
//! [`crate::projection::tile_matrix`].

use glam::{Mat4, Vec2};
use tracing::{debug, warn};
use web_time::Instant;

use crate::config::TerrainConfig;
use crate::error::{Result, TerrainError};
use crate::gpu::GpuContext;
use crate::matcher::{dem_sampling, TileMatcher};
use crate::mesh::TerrainMesh;
use crate::metrics::TerrainMetrics;
use crate::renderer::{FrameRenderer, FrameStats};
use crate::scheduler::UpdateScheduler;
use crate::shader::reference::{dem_coord_at, sample_nearest};
use crate::source::{DemTile, DemTileCache, RasterTile, Tile, TileCache, ViewTransform};
use crate::types::TileCoordinate;

/// Layer id reported to the host.
pub const LAYER_ID: &str = "terrain";

pub struct TerrainLayer {
  raster_source: String,
  dem_source: String,
  config: TerrainConfig,
  mesh: TerrainMesh,
  scheduler: UpdateScheduler,
  matcher: TileMatcher,
  renderer: Option<FrameRenderer>,
  metrics: TerrainMetrics,
  last_frame: Option<FrameStats>,
}

impl TerrainLayer {
  /// Layer over the host sources named `raster_source` and `dem_source`.
  pub fn new(raster_source: impl Into<String>, dem_source: impl Into<String>) -> Self {
    Self::with_config(raster_source, dem_source, TerrainConfig::default())
  }

  pub fn with_config(
    raster_source: impl Into<String>,
    dem_source: impl Into<String>,
    config: TerrainConfig,
  ) -> Self {
    Self {
      raster_source: raster_source.into(),
      dem_source: dem_source.into(),
      mesh: TerrainMesh::grid(),
      scheduler: UpdateScheduler::new(config.max_pitch),
      matcher: TileMatcher::new(config.min_covering_zoom),
      config,
      renderer: None,
      metrics: TerrainMetrics::new(),
      last_frame: None,
    }
  }

  pub fn id(&self) -> &'static str {
    LAYER_ID
  }

  pub fn raster_source(&self) -> &str {
    &self.raster_source
  }

  pub fn dem_source(&self) -> &str {
    &self.dem_source
  }

  pub fn config(&self) -> &TerrainConfig {
    &self.config
  }

  pub fn mesh(&self) -> &TerrainMesh {
    &self.mesh
  }

  pub fn is_attached(&self) -> bool {
    self.renderer.is_some()
  }

  pub fn metrics(&self) -> &TerrainMetrics {
    &self.metrics
  }

  /// Stats of the last frame that completed.
  pub fn last_frame(&self) -> Option<FrameStats> {
    self.last_frame
  }

  /// Build the GPU pipeline and take control of both caches' updates.
  ///
  /// The caches are paused only once the pipeline exists, so a failed
  /// attach leaves the host's state as it was.
  #[tracing::instrument(skip_all, name = "terrain::attach")]
  pub fn attach<C, R, D>(&mut self, ctx: &mut C, raster: &mut R, dem: &mut D) -> Result<()>
  where
    C: GpuContext + ?Sized,
    R: TileCache,
    D: TileCache,
  {
    if self.renderer.is_some() {
      return Err(TerrainError::AlreadyAttached);
    }
    let renderer = FrameRenderer::new(ctx, &self.mesh, &self.config)?;

    raster.pause();
    dem.pause();
    self.renderer = Some(renderer);

    debug!(
      raster = %self.raster_source,
      dem = %self.dem_source,
      "terrain layer attached"
    );
    Ok(())
  }

  /// Update the caches, match tiles and draw them.
  ///
  /// `tile_matrix` returns the host's model-view-projection for a raster
  /// coordinate; it is uploaded to `u_matrix` as is.
  ///
  /// DEM uploads performed by the pass are acknowledged on `dem` even when
  /// the pass fails part way.
  #[tracing::instrument(skip_all, name = "terrain::render_frame")]
  pub fn render_frame<C, R, D, T, M>(
    &mut self,
    ctx: &mut C,
    raster: &mut R,
    dem: &mut D,
    camera: &T,
    tile_matrix: M,
  ) -> Result<FrameStats>
  where
    C: GpuContext + ?Sized,
    R: TileCache,
    R::Tile: RasterTile,
    D: DemTileCache,
    D::Tile: DemTile,
    T: ViewTransform,
    M: FnMut(&TileCoordinate) -> Mat4,
  {
    let renderer = self.renderer.as_mut().ok_or(TerrainError::NotAttached)?;
    let frame_start = Instant::now();

    let update_start = Instant::now();
    self.scheduler.advance(camera, raster, dem);
    self
      .metrics
      .record_update_timing(update_start.elapsed().as_micros() as u64);

    let result = {
      let pairs = self.matcher.match_tiles(&*raster, &*dem);
      renderer.render(ctx, &pairs, tile_matrix)
    };

    for coord in renderer.take_uploaded() {
      dem.acknowledge_texture_upload(&coord);
    }

    match result {
      Ok(stats) => {
        self
          .metrics
          .record_frame(&stats, frame_start.elapsed().as_micros() as u64);
        self.last_frame = Some(stats);
        Ok(stats)
      }
      Err(err) => {
        warn!(%err, "terrain frame aborted");
        self.metrics.record_failed_frame();
        Err(err)
      }
    }
  }

  /// Displaced height at `uv` (`[0, 1]²`) inside tile `coord`.
  ///
  /// Samples the covering DEM tile through the same window the vertex stage
  /// uses and subtracts the baseline. None when no covering tile is loaded.
  pub fn elevation_at<D>(&self, dem: &D, coord: &TileCoordinate, uv: Vec2) -> Option<f64>
  where
    D: TileCache,
    D::Tile: DemTile,
  {
    let tile = dem.find_covering_tile(coord, self.matcher.min_covering_zoom)?;
    let (scale, offset) = dem_sampling(coord, &tile.coordinate())?;
    let elevation = sample_nearest(tile.dem(), dem_coord_at(uv, scale, offset));
    Some(elevation - f64::from(self.config.baseline_elevation))
  }

  /// Release the DEM texture of a tile the host has evicted.
  pub fn release_dem_tile<C: GpuContext + ?Sized>(
    &mut self,
    ctx: &mut C,
    coord: &TileCoordinate,
  ) -> bool {
    match self.renderer.as_mut() {
      Some(renderer) => renderer.release_dem_texture(ctx, coord),
      None => false,
    }
  }

  /// Delete every GPU resource the layer created.
  #[tracing::instrument(skip_all, name = "terrain::detach")]
  pub fn detach<C: GpuContext + ?Sized>(&mut self, ctx: &mut C) -> Result<()> {
    let renderer = self.renderer.take().ok_or(TerrainError::NotAttached)?;
    renderer.destroy(ctx);
    debug!("terrain layer detached");
    Ok(())
  }
}

impl Drop for TerrainLayer {
  fn drop(&mut self) {
    if self.renderer.is_some() {
      warn!("terrain layer dropped while attached, GPU resources leaked");
    }
  }
}

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;
