//! Per-frame terrain draw pass.
//!
//! The renderer owns the linked program, the static grid buffers and the DEM
//! texture side-table. One frame is:
//!
//! 1. Program, depth (`LessEqual`, writes on) and culling (back faces,
//!    clockwise front) set once.
//! 2. Grid vertex/index buffers bound once.
//! 3. Per pair, in matcher order: raster texture on unit 0, DEM texture on
//!    unit 1 (uploaded when flagged), matrix/scale/offset uniforms, one
//!    indexed draw of the whole grid.
//! 4. DEM textures outside the retention window released.
//!
//! GPU failures abort the pass; textures already uploaded in the frame stay
//! valid and are reported through [`FrameRenderer::take_uploaded`].

use glam::Mat4;
use tracing::{debug, trace};

use crate::config::TerrainConfig;
use crate::constants::{DEM_TEXTURE_UNIT, RASTER_TEXTURE_UNIT};
use crate::dem_textures::DemTextureCache;
use crate::error::{Result, TerrainError};
use crate::gpu::{
  AttributeFormat, BufferId, BufferTarget, CompareFunction, CullState, DepthState, Face,
  FrontFace, GpuContext, GpuError, IndexFormat, ProgramId, ShaderId, ShaderStage, Uniform,
  UniformLocation, VertexAttribute,
};
use crate::mesh::TerrainMesh;
use crate::shader;
use crate::source::{DemTile, RasterTile};
use crate::types::{RenderPair, TileCoordinate};

const DEPTH_STATE: DepthState = DepthState {
  test_enabled: true,
  write_enabled: true,
  compare: CompareFunction::LessEqual,
};

const CULL_STATE: CullState = CullState {
  enabled: true,
  cull_face: Face::Back,
  front_face: FrontFace::Clockwise,
};

/// Outcome of one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
  /// Pairs handed to the pass.
  pub pairs: usize,
  pub draw_calls: usize,
  /// Pairs skipped because the raster texture was missing.
  pub skipped: usize,
  pub dem_uploads: usize,
  /// DEM textures released after the pass.
  pub released: usize,
}

/// Uniform slots. A slot the driver optimized away is None and its value is
/// simply not set.
#[derive(Clone, Copy, Debug)]
struct Uniforms {
  matrix: Option<UniformLocation>,
  raster: Option<UniformLocation>,
  dem: Option<UniformLocation>,
  scale: Option<UniformLocation>,
  offset: Option<UniformLocation>,
  baseline: Option<UniformLocation>,
}

impl Uniforms {
  fn locate<C: GpuContext + ?Sized>(ctx: &mut C, program: ProgramId) -> Self {
    Self {
      matrix: ctx.uniform_location(program, shader::UNIFORM_MATRIX),
      raster: ctx.uniform_location(program, shader::UNIFORM_RASTER),
      dem: ctx.uniform_location(program, shader::UNIFORM_DEM),
      scale: ctx.uniform_location(program, shader::UNIFORM_SCALE),
      offset: ctx.uniform_location(program, shader::UNIFORM_OFFSET),
      baseline: ctx.uniform_location(program, shader::UNIFORM_BASELINE),
    }
  }
}

#[inline]
fn set<C: GpuContext + ?Sized>(ctx: &mut C, location: Option<UniformLocation>, value: Uniform) {
  if let Some(location) = location {
    ctx.set_uniform(location, value);
  }
}

pub struct FrameRenderer {
  program: ProgramId,
  position: VertexAttribute,
  uniforms: Uniforms,
  vertex_buffer: BufferId,
  index_buffer: BufferId,
  index_count: u32,
  dem_textures: DemTextureCache,
  baseline: f32,
  skip_incomplete: bool,
  frame: u64,
  uploaded: Vec<TileCoordinate>,
}

impl FrameRenderer {
  /// Compile and link the terrain program and upload the grid.
  ///
  /// On failure every resource created so far is deleted again.
  pub fn new<C: GpuContext + ?Sized>(
    ctx: &mut C,
    mesh: &TerrainMesh,
    config: &TerrainConfig,
  ) -> Result<Self> {
    let program = link_program(ctx)?;

    let Some(location) = ctx.attribute_location(program, shader::ATTR_POSITION) else {
      ctx.delete_program(program);
      return Err(TerrainError::MissingAttribute(shader::ATTR_POSITION));
    };
    let uniforms = Uniforms::locate(ctx, program);

    let vertex_buffer = match ctx.create_buffer(BufferTarget::Vertex, mesh.vertex_bytes()) {
      Ok(buffer) => buffer,
      Err(err) => {
        ctx.delete_program(program);
        return Err(err.into());
      }
    };
    let index_buffer = match ctx.create_buffer(BufferTarget::Index, mesh.index_bytes()) {
      Ok(buffer) => buffer,
      Err(err) => {
        ctx.delete_buffer(vertex_buffer);
        ctx.delete_program(program);
        return Err(err.into());
      }
    };

    debug!(
      vertices = mesh.vertex_count(),
      indices = mesh.index_count(),
      "terrain pipeline ready"
    );

    Ok(Self {
      program,
      position: VertexAttribute {
        location,
        components: 2,
        format: AttributeFormat::I16,
        normalized: false,
        stride: 0,
        offset: 0,
      },
      uniforms,
      vertex_buffer,
      index_buffer,
      index_count: mesh.index_count() as u32,
      dem_textures: DemTextureCache::new(config.dem_filter, config.dem_texture_retention_frames),
      baseline: config.baseline_elevation,
      skip_incomplete: config.skip_incomplete_tiles,
      frame: 0,
      uploaded: Vec::new(),
    })
  }

  /// Draw every pair. `tile_matrix` supplies `u_matrix` per raster
  /// coordinate.
  #[tracing::instrument(skip_all, name = "terrain::render", fields(pairs = pairs.len()))]
  pub fn render<C, R, D, F>(
    &mut self,
    ctx: &mut C,
    pairs: &[RenderPair<'_, R, D>],
    mut tile_matrix: F,
  ) -> Result<FrameStats>
  where
    C: GpuContext + ?Sized,
    R: RasterTile,
    D: DemTile,
    F: FnMut(&TileCoordinate) -> Mat4,
  {
    self.frame += 1;
    let frame = self.frame;
    let mut stats = FrameStats {
      pairs: pairs.len(),
      ..Default::default()
    };

    ctx.use_program(self.program);
    ctx.set_depth_state(DEPTH_STATE);
    ctx.set_cull_state(CULL_STATE);
    ctx.bind_vertex_buffer(self.vertex_buffer, self.position);
    ctx.bind_index_buffer(self.index_buffer);

    set(ctx, self.uniforms.raster, Uniform::Int(RASTER_TEXTURE_UNIT as i32));
    set(ctx, self.uniforms.dem, Uniform::Int(DEM_TEXTURE_UNIT as i32));
    set(ctx, self.uniforms.baseline, Uniform::Float(self.baseline));

    for pair in pairs {
      let coord = pair.raster.coordinate();
      let raster_texture = pair.raster.texture();
      if raster_texture.is_none() && self.skip_incomplete {
        trace!(%coord, "raster texture missing, skipping");
        stats.skipped += 1;
        continue;
      }

      let dem = self.dem_textures.prepare(ctx, pair.dem, frame)?;
      if dem.uploaded {
        self.uploaded.push(pair.dem.coordinate());
        stats.dem_uploads += 1;
      }

      ctx.bind_texture(RASTER_TEXTURE_UNIT, raster_texture);
      ctx.bind_texture(DEM_TEXTURE_UNIT, Some(dem.texture));

      set(ctx, self.uniforms.matrix, Uniform::Mat4(tile_matrix(&coord)));
      set(ctx, self.uniforms.scale, Uniform::Float(pair.scale));
      set(ctx, self.uniforms.offset, Uniform::Vec2(pair.offset));

      ctx.draw_indexed(self.index_count, IndexFormat::U16, 0)?;
      stats.draw_calls += 1;
    }

    stats.released = self.dem_textures.evict_stale(ctx, frame);
    Ok(stats)
  }

  /// DEM coordinates uploaded since the last call, in upload order.
  pub fn take_uploaded(&mut self) -> Vec<TileCoordinate> {
    std::mem::take(&mut self.uploaded)
  }

  /// Drop the DEM texture of one tile, e.g. when the host evicts it.
  pub fn release_dem_texture<C: GpuContext + ?Sized>(
    &mut self,
    ctx: &mut C,
    coord: &TileCoordinate,
  ) -> bool {
    self.dem_textures.remove(ctx, coord)
  }

  pub fn dem_textures(&self) -> &DemTextureCache {
    &self.dem_textures
  }

  /// Frames rendered so far.
  pub fn frame(&self) -> u64 {
    self.frame
  }

  pub fn program(&self) -> ProgramId {
    self.program
  }

  /// Release every GPU resource owned by the renderer.
  pub fn destroy<C: GpuContext + ?Sized>(mut self, ctx: &mut C) {
    let textures = self.dem_textures.release_all(ctx);
    ctx.delete_buffer(self.vertex_buffer);
    ctx.delete_buffer(self.index_buffer);
    ctx.delete_program(self.program);
    debug!(textures, "terrain pipeline destroyed");
  }
}

fn compile<C: GpuContext + ?Sized>(
  ctx: &mut C,
  stage: ShaderStage,
  source: &str,
) -> Result<ShaderId> {
  ctx.compile_shader(stage, source).map_err(|err| match err {
    GpuError::Compile(log) => TerrainError::ShaderCompile { stage, log },
    other => other.into(),
  })
}

/// Compile both stages and link them. Shader objects are deleted once the
/// program exists, or on failure.
fn link_program<C: GpuContext + ?Sized>(ctx: &mut C) -> Result<ProgramId> {
  let vertex = compile(ctx, ShaderStage::Vertex, shader::VERTEX_SOURCE)?;
  let fragment = match compile(ctx, ShaderStage::Fragment, shader::FRAGMENT_SOURCE) {
    Ok(fragment) => fragment,
    Err(err) => {
      ctx.delete_shader(vertex);
      return Err(err);
    }
  };

  let linked = ctx.link_program(vertex, fragment);
  ctx.delete_shader(vertex);
  ctx.delete_shader(fragment);

  linked.map_err(|err| match err {
    GpuError::Link(log) => TerrainError::ProgramLink { log },
    other => other.into(),
  })
}

#[cfg(test)]
#[path = "renderer_test.rs"]
mod renderer_test;
