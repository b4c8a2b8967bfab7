//! Tile-space and encoding constants for the terrain layer.
//!
//! # Tile Local Space
//!
//! ```text
//! (0,0) ───────────────────────────► +X (8192)
//!   │  ┌─────┬─────┬─────┬── ─ ─┐
//!   │  │ ╲   │ ╲   │ ╲   │      │   64 × 64 vertices
//!   │  │   ╲ │   ╲ │   ╲ │      │   63 × 63 cells
//!   │  ├─────┼─────┼─────┼── ─ ─┤   2 triangles per cell
//!   │  │ ╲   │ ╲   │ ╲   │      │
//!   ▼  │   ╲ │   ╲ │   ╲ │      │   vertex step = 8192 / 63
//!  +Y  └─────┴─────┴─────┴── ─ ─┘
//! ```
//!
//! Every tile, regardless of zoom, is drawn with the same grid in the same
//! local space. The per-tile matrix maps `[0, EXTENT]²` onto the tile's
//! footprint in world space.
//!
//! # DEM Sampling Window
//!
//! The elevation texture is sampled at
//!
//! ```text
//! demCoord = (localPos / EXTENT + offset) * scale * DEM_SAMPLE_SCALE + DEM_SAMPLE_BIAS
//! ```
//!
//! which maps a tile onto the centered half of the DEM texture (`[0.25, 0.75]`).

/// Local tile extent in mesh units per axis.
pub const EXTENT: i32 = 8192;

/// `EXTENT` as a float for shader-equivalent math.
pub const EXTENT_F32: f32 = EXTENT as f32;

/// Vertices per grid axis. Fixed for the lifetime of the renderer.
pub const GRID_RESOLUTION: usize = 64;

/// Total vertices in the grid mesh (64² = 4096).
pub const GRID_VERTEX_COUNT: usize = GRID_RESOLUTION * GRID_RESOLUTION;

/// Total indices in the grid mesh (63² × 6 = 23814).
pub const GRID_INDEX_COUNT: usize = (GRID_RESOLUTION - 1) * (GRID_RESOLUTION - 1) * 6;

/// Largest grid resolution whose vertex indices still fit in `u16`.
pub const MAX_GRID_RESOLUTION: usize = 256;

/// Bias subtracted from the base-256 channel value to recover signed meters.
pub const ELEVATION_BIAS: f64 = 65536.0;

/// Largest encodable channel value (`255 + 255·256 + 255·65536`).
pub const MAX_ENCODED_VALUE: u32 = 0xFF_FFFF;

/// Default baseline elevation (meters) subtracted when displacing vertices.
pub const DEFAULT_BASELINE_ELEVATION: f32 = 2200.0;

/// Scale applied to the DEM sampling coordinate.
pub const DEM_SAMPLE_SCALE: f32 = 0.5;

/// Bias applied to the DEM sampling coordinate after scaling.
pub const DEM_SAMPLE_BIAS: f32 = 0.25;

/// Texture unit sampled as `u_raster`.
pub const RASTER_TEXTURE_UNIT: u32 = 0;

/// Texture unit sampled as `u_dem`.
pub const DEM_TEXTURE_UNIT: u32 = 1;

/// Default pitch clamp (85°) for the height compensation.
pub const DEFAULT_MAX_PITCH: f64 = 85.0 * std::f64::consts::PI / 180.0;

/// Default number of frames an unused DEM texture is kept alive.
pub const DEFAULT_DEM_TEXTURE_RETENTION_FRAMES: u64 = 60;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
