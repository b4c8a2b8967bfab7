//! terrain_plugin - Engine independent DEM-draped terrain layer
//!
//! Drapes raster imagery over a height field decoded from elevation (DEM)
//! tiles. The host map renderer owns tile loading, caching, the camera and
//! the GPU context; this crate picks which tiles to draw each frame and
//! issues the draws through a narrow [`GpuContext`] contract.
//!
//! # Features
//!
//! - **Static grid mesh**: one 64×64 vertex grid shared by every tile,
//!   displaced in the vertex stage
//! - **Tile matching**: each visible raster tile is paired with the nearest
//!   loaded DEM tile at or above its zoom
//! - **Pitch-aware updates**: caches are updated against a camera raised to
//!   cover tilted views
//! - **Elevation queries**: [`TerrainLayer::elevation_at`] reads the height the
//!   vertex stage would produce at any point of a tile
//! - **Headless context**: a recording [`HeadlessContext`] for tests and
//!   GPU-less hosts
//!
//! # Example
//!
//! ```ignore
//! use terrain_plugin::projection::tile_matrix;
//! use terrain_plugin::{TerrainConfig, TerrainLayer};
//!
//! let mut layer = TerrainLayer::with_config("satellite", "terrain-rgb", TerrainConfig::default());
//! layer.attach(&mut gl, &mut raster_cache, &mut dem_cache)?;
//!
//! // every frame
//! let stats = layer.render_frame(&mut gl, &mut raster_cache, &mut dem_cache, &camera, |coord| {
//!   tile_matrix(&view_proj, coord, world_size)
//! })?;
//!
//! layer.detach(&mut gl)?;
//! ```

pub mod config;
pub mod constants;
pub mod dem_textures;
pub mod elevation;
pub mod error;
pub mod gpu;
pub mod layer;
pub mod matcher;
pub mod mesh;
pub mod metrics;
pub mod projection;
pub mod renderer;
pub mod scheduler;
pub mod shader;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used items
pub use config::TerrainConfig;
pub use constants::{EXTENT, GRID_RESOLUTION};
pub use dem_textures::DemTextureCache;
pub use elevation::{decode, encode, DemData};
pub use error::{Result, TerrainError};
pub use gpu::{GpuContext, GpuError, HeadlessContext, TextureId};
pub use layer::TerrainLayer;
pub use matcher::{dem_sampling, match_tiles, TileMatcher};
pub use mesh::TerrainMesh;
pub use metrics::TerrainMetrics;
pub use renderer::{FrameRenderer, FrameStats};
pub use scheduler::UpdateScheduler;
pub use source::{DemTile, DemTileCache, RasterTile, Tile, TileCache, ViewTransform};
pub use types::{RenderPair, TileCoordinate};
