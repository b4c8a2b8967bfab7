use glam::Vec2;

use super::*;
use crate::gpu::{GpuCommand, HeadlessContext, TextureId};
use crate::matcher::match_tiles;
use crate::source::DemTileCache;
use crate::test_utils::{MockCache, MockDemTile, MockRasterTile};

fn identity(_: &TileCoordinate) -> Mat4 {
  Mat4::IDENTITY
}

fn renderer(ctx: &mut HeadlessContext, config: &TerrainConfig) -> FrameRenderer {
  FrameRenderer::new(ctx, &TerrainMesh::grid(), config).unwrap()
}

/// One visible raster tile drawn over a DEM tile at the same coordinate.
fn single_tile_scene() -> (MockCache<MockRasterTile>, MockCache<MockDemTile>) {
  let coord = TileCoordinate::new(5, 3, 4);
  let mut raster = MockCache::new();
  raster.insert_visible(MockRasterTile::loaded(coord, 7));
  let mut dem = MockCache::new();
  dem.insert(MockDemTile::loaded(coord));
  (raster, dem)
}

#[test]
fn test_new_builds_pipeline() {
  let mut ctx = HeadlessContext::new();
  let renderer = renderer(&mut ctx, &TerrainConfig::default());

  assert_eq!(ctx.live_programs(), 1);
  assert_eq!(ctx.live_shaders(), 0, "shader objects are released after link");
  assert_eq!(ctx.live_buffers(), 2);
  assert!(ctx.commands().contains(&GpuCommand::CreateBuffer {
    buffer: renderer.vertex_buffer,
    target: BufferTarget::Vertex,
    len: 4096 * 4,
  }));
  assert!(ctx.commands().contains(&GpuCommand::CreateBuffer {
    buffer: renderer.index_buffer,
    target: BufferTarget::Index,
    len: 23814 * 2,
  }));
}

#[test]
fn test_compile_failure_names_stage_and_cleans_up() {
  for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
    let mut ctx = HeadlessContext::new().with_failing_stage(stage);
    let result = FrameRenderer::new(&mut ctx, &TerrainMesh::grid(), &TerrainConfig::default());

    match result {
      Err(TerrainError::ShaderCompile { stage: failed, log }) => {
        assert_eq!(failed, stage);
        assert!(log.contains(&stage.to_string()));
      }
      other => panic!("expected compile error, got {:?}", other.err()),
    }
    assert!(ctx.is_clean());
  }
}

#[test]
fn test_link_failure_cleans_up() {
  let mut ctx = HeadlessContext::new().with_failing_link();
  let result = FrameRenderer::new(&mut ctx, &TerrainMesh::grid(), &TerrainConfig::default());

  assert!(matches!(result, Err(TerrainError::ProgramLink { .. })));
  assert!(ctx.is_clean());
}

#[test]
fn test_single_pair_end_to_end() {
  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &TerrainConfig::default());
  let (raster, dem) = single_tile_scene();
  let pairs = match_tiles(&raster, &dem);

  let stats = renderer.render(&mut ctx, &pairs, identity).unwrap();

  assert_eq!(
    stats,
    FrameStats {
      pairs: 1,
      draw_calls: 1,
      skipped: 0,
      dem_uploads: 1,
      released: 0,
    }
  );
  assert_eq!(ctx.draw_calls(), vec![23814]);
  assert_eq!(ctx.uniform_values("u_scale"), vec![Uniform::Float(1.0)]);
  assert_eq!(ctx.uniform_values("u_offset"), vec![Uniform::Vec2(Vec2::ZERO)]);
  assert_eq!(ctx.uniform_values("u_matrix"), vec![Uniform::Mat4(Mat4::IDENTITY)]);
  assert_eq!(ctx.uniform_values("u_baseline"), vec![Uniform::Float(2200.0)]);
  assert_eq!(ctx.uniform_values("u_raster"), vec![Uniform::Int(0)]);
  assert_eq!(ctx.uniform_values("u_dem"), vec![Uniform::Int(1)]);
  assert_eq!(ctx.texture_bindings(0), vec![Some(TextureId(7))]);
  assert_eq!(ctx.texture_bindings(1).len(), 1);
  assert_eq!(ctx.texture_uploads().len(), 1);
}

#[test]
fn test_frame_state_set_before_draws() {
  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &TerrainConfig::default());
  let (raster, dem) = single_tile_scene();
  ctx.take_commands();

  renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();

  let commands = ctx.commands();
  assert_eq!(commands[0], GpuCommand::UseProgram(renderer.program()));
  assert_eq!(commands[1], GpuCommand::SetDepthState(DEPTH_STATE));
  assert_eq!(commands[2], GpuCommand::SetCullState(CULL_STATE));
  match commands[3] {
    GpuCommand::BindVertexBuffer { attribute, .. } => {
      assert_eq!(attribute.components, 2);
      assert_eq!(attribute.format, AttributeFormat::I16);
      assert!(!attribute.normalized);
    }
    ref other => panic!("expected vertex buffer binding, got {other:?}"),
  }
  assert!(matches!(commands[4], GpuCommand::BindIndexBuffer(_)));
  assert!(matches!(
    commands.last(),
    Some(GpuCommand::DrawIndexed {
      format: IndexFormat::U16,
      offset: 0,
      ..
    })
  ));
}

#[test]
fn test_empty_frame() {
  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &TerrainConfig::default());
  let pairs: Vec<RenderPair<'_, MockRasterTile, MockDemTile>> = Vec::new();

  let stats = renderer.render(&mut ctx, &pairs, identity).unwrap();

  assert_eq!(stats, FrameStats::default());
  assert!(ctx.draw_calls().is_empty());
}

#[test]
fn test_missing_raster_texture_policy() {
  let coord = TileCoordinate::new(5, 3, 4);
  let mut raster = MockCache::new();
  raster.insert_visible(MockRasterTile {
    coord,
    loaded: true,
    texture: None,
  });
  let mut dem = MockCache::new();
  dem.insert(MockDemTile::loaded(coord));
  let pairs = match_tiles(&raster, &dem);

  let mut ctx = HeadlessContext::new();
  let mut skipping = renderer(&mut ctx, &TerrainConfig::default());
  let stats = skipping.render(&mut ctx, &pairs, identity).unwrap();
  assert_eq!((stats.skipped, stats.draw_calls, stats.dem_uploads), (1, 0, 0));
  assert!(ctx.draw_calls().is_empty());

  let mut ctx = HeadlessContext::new();
  let config = TerrainConfig::default().with_skip_incomplete_tiles(false);
  let mut legacy = renderer(&mut ctx, &config);
  let stats = legacy.render(&mut ctx, &pairs, identity).unwrap();
  assert_eq!((stats.skipped, stats.draw_calls), (0, 1));
  assert_eq!(ctx.texture_bindings(0), vec![None]);
}

#[test]
fn test_dem_upload_follows_flag() {
  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &TerrainConfig::default());
  let (raster, mut dem) = single_tile_scene();
  let coord = TileCoordinate::new(5, 3, 4);

  let stats = renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();
  assert_eq!(stats.dem_uploads, 1);
  assert_eq!(renderer.take_uploaded(), vec![coord]);
  assert!(renderer.take_uploaded().is_empty());

  dem.acknowledge_texture_upload(&coord);
  let stats = renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();
  assert_eq!(stats.dem_uploads, 0);

  dem.tiles.get_mut(&coord).unwrap().needs_upload = true;
  let stats = renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();
  assert_eq!(stats.dem_uploads, 1);

  let bound: Vec<_> = ctx.texture_bindings(1);
  assert_eq!(bound.len(), 3);
  assert!(bound.iter().all(|t| *t == bound[0]), "dem texture identity is stable");
  assert_eq!(renderer.dem_textures().len(), 1);
}

#[test]
fn test_shared_dem_ancestor_uploads_once() {
  let mut raster = MockCache::new();
  raster
    .insert_visible(MockRasterTile::loaded(TileCoordinate::new(4, 2, 2), 1))
    .insert_visible(MockRasterTile::loaded(TileCoordinate::new(4, 3, 2), 2));
  let mut dem = MockCache::new();
  dem.insert(MockDemTile::loaded(TileCoordinate::new(3, 1, 1)));

  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &TerrainConfig::default());
  let stats = renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();

  assert_eq!((stats.draw_calls, stats.dem_uploads), (2, 1));
  assert_eq!(
    ctx.uniform_values("u_offset"),
    vec![
      Uniform::Vec2(Vec2::new(0.0, 0.0)),
      Uniform::Vec2(Vec2::new(1.0, 0.0))
    ]
  );
  assert_eq!(ctx.uniform_values("u_scale"), vec![Uniform::Float(0.5); 2]);
}

#[test]
fn test_draw_failure_aborts_pass() {
  let mut raster = MockCache::new();
  raster
    .insert_visible(MockRasterTile::loaded(TileCoordinate::new(2, 0, 0), 1))
    .insert_visible(MockRasterTile::loaded(TileCoordinate::new(2, 1, 0), 2))
    .insert_visible(MockRasterTile::loaded(TileCoordinate::new(2, 2, 0), 3));
  let mut dem = MockCache::new();
  dem
    .insert(MockDemTile::loaded(TileCoordinate::new(2, 0, 0)))
    .insert(MockDemTile::loaded(TileCoordinate::new(2, 1, 0)))
    .insert(MockDemTile::loaded(TileCoordinate::new(2, 2, 0)));

  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &TerrainConfig::default());
  ctx.fail_draw_at(1);

  let result = renderer.render(&mut ctx, &match_tiles(&raster, &dem), identity);

  assert!(matches!(result, Err(TerrainError::Gpu(GpuError::Driver(_)))));
  assert_eq!(ctx.draw_calls().len(), 1);
  assert_eq!(renderer.take_uploaded().len(), 2);

  let stats = renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();
  assert_eq!(stats.draw_calls, 3);
}

#[test]
fn test_retention_releases_unused_dem_textures() {
  let config = TerrainConfig::default().with_dem_texture_retention_frames(1);
  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &config);
  let (raster, dem) = single_tile_scene();
  let empty: Vec<RenderPair<'_, MockRasterTile, MockDemTile>> = Vec::new();

  renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();
  assert_eq!(renderer.render(&mut ctx, &empty, identity).unwrap().released, 0);
  assert_eq!(renderer.render(&mut ctx, &empty, identity).unwrap().released, 1);
  assert_eq!(ctx.live_textures(), 0);
}

#[test]
fn test_destroy_releases_everything() {
  let mut ctx = HeadlessContext::new();
  let mut renderer = renderer(&mut ctx, &TerrainConfig::default());
  let (raster, dem) = single_tile_scene();
  renderer
    .render(&mut ctx, &match_tiles(&raster, &dem), identity)
    .unwrap();
  assert_eq!(ctx.live_textures(), 1);

  renderer.destroy(&mut ctx);
  assert!(ctx.is_clean());
}
