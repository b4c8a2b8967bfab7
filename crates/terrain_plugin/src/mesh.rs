//! Static terrain grid mesh.
//!
//! One `n × n` vertex grid spanning a tile's local space `[0, EXTENT]²` is
//! shared by every drawn tile; per-tile variation comes entirely from the
//! matrix and DEM uniforms.
//!
//! ```text
//!  idx ─── idx+1        triangles per cell:
//!   │ ╲      │            (idx,   idx+1, idx+n)
//!   │   ╲    │            (idx+n, idx+1, idx+n+1)
//!  idx+n ─ idx+n+1
//! ```
//!
//! With y pointing down in tile space both triangles wind clockwise, which is
//! the front face the renderer culls against.

use crate::constants::{EXTENT, GRID_RESOLUTION, MAX_GRID_RESOLUTION};
use crate::error::{Result, TerrainError};

/// Immutable grid vertices and u16 triangle indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainMesh {
  resolution: usize,
  vertices: Vec<[i16; 2]>,
  indices: Vec<u16>,
}

impl TerrainMesh {
  /// The fixed `GRID_RESOLUTION` grid used by the renderer.
  pub fn grid() -> Self {
    generate(GRID_RESOLUTION)
  }

  /// Build an `n × n` grid; `n` must be in `2..=256` so indices fit u16.
  pub fn build(resolution: usize) -> Result<Self> {
    if !(2..=MAX_GRID_RESOLUTION).contains(&resolution) {
      return Err(TerrainError::InvalidGridResolution(resolution));
    }
    Ok(generate(resolution))
  }

  /// Vertices per side.
  pub fn resolution(&self) -> usize {
    self.resolution
  }

  /// Tile-space positions, row-major.
  pub fn vertices(&self) -> &[[i16; 2]] {
    &self.vertices
  }

  pub fn indices(&self) -> &[u16] {
    &self.indices
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn index_count(&self) -> usize {
    self.indices.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Vertex data as raw bytes for buffer upload.
  pub fn vertex_bytes(&self) -> &[u8] {
    bytemuck::cast_slice(&self.vertices)
  }

  /// Index data as raw bytes for buffer upload.
  pub fn index_bytes(&self) -> &[u8] {
    bytemuck::cast_slice(&self.indices)
  }
}

fn generate(n: usize) -> TerrainMesh {
  let step = f64::from(EXTENT) / (n - 1) as f64;

  let mut vertices = Vec::with_capacity(n * n);
  for i in 0..n {
    for j in 0..n {
      // Truncation toward zero, matching an Int16 store.
      vertices.push([(j as f64 * step) as i16, (i as f64 * step) as i16]);
    }
  }

  let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
  for i in 0..n - 1 {
    for j in 0..n - 1 {
      let idx = (i * n + j) as u16;
      let below = idx + n as u16;
      indices.extend_from_slice(&[idx, idx + 1, below, below, idx + 1, below + 1]);
    }
  }

  TerrainMesh {
    resolution: n,
    vertices,
    indices,
  }
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
