//! Fixed terrain shader pipeline (GLSL ES 1.00) and a CPU mirror of its
//! vertex stage.
//!
//! The vertex stage maps local tile space to `v_pos ∈ [0, 1]²`, samples the
//! central half of the DEM texture through `u_scale`/`u_offset`, decodes the
//! elevation and displaces z by `elevation - u_baseline`. The fragment stage
//! outputs the raster color at `v_pos` with alpha forced to 1.

/// Attribute holding `[i16; 2]` tile-space positions.
pub const ATTR_POSITION: &str = "a_pos";

pub const UNIFORM_MATRIX: &str = "u_matrix";
pub const UNIFORM_RASTER: &str = "u_raster";
pub const UNIFORM_DEM: &str = "u_dem";
pub const UNIFORM_SCALE: &str = "u_scale";
pub const UNIFORM_OFFSET: &str = "u_offset";
pub const UNIFORM_BASELINE: &str = "u_baseline";

pub const VERTEX_SOURCE: &str = r"precision highp float;

uniform mat4 u_matrix;
uniform sampler2D u_dem;
uniform float u_scale;
uniform vec2 u_offset;
uniform float u_baseline;

attribute vec2 a_pos;
varying vec2 v_pos;

float decode_elevation(vec2 coord) {
  vec4 data = texture2D(u_dem, coord) * 255.0;
  return data.r + data.g * 256.0 + data.b * 65536.0 - 65536.0;
}

void main() {
  v_pos = a_pos / 8192.0;
  vec2 dem_coord = (v_pos + u_offset) * u_scale * 0.5 + 0.25;
  float height = decode_elevation(dem_coord) - u_baseline;
  gl_Position = u_matrix * vec4(a_pos, height, 1.0);
}
";

pub const FRAGMENT_SOURCE: &str = r"precision highp float;

uniform sampler2D u_raster;

varying vec2 v_pos;

void main() {
  gl_FragColor = vec4(texture2D(u_raster, v_pos).rgb, 1.0);
}
";

/// CPU evaluation of the vertex stage, for tests and host-side picking.
pub mod reference {
  use glam::{Mat4, Vec2, Vec4};

  use crate::constants::{DEM_SAMPLE_BIAS, DEM_SAMPLE_SCALE, EXTENT_F32};
  use crate::elevation::DemData;

  /// Normalized tile position `a_pos / EXTENT`.
  pub fn tile_uv(a_pos: [i16; 2]) -> Vec2 {
    Vec2::new(f32::from(a_pos[0]), f32::from(a_pos[1])) / EXTENT_F32
  }

  /// DEM texture coordinate sampled for a vertex.
  pub fn dem_coord(a_pos: [i16; 2], scale: f32, offset: Vec2) -> Vec2 {
    dem_coord_at(tile_uv(a_pos), scale, offset)
  }

  /// DEM texture coordinate for a normalized tile position.
  pub fn dem_coord_at(uv: Vec2, scale: f32, offset: Vec2) -> Vec2 {
    (uv + offset) * scale * DEM_SAMPLE_SCALE + Vec2::splat(DEM_SAMPLE_BIAS)
  }

  /// Nearest-texel elevation at a normalized texture coordinate.
  ///
  /// Coordinates outside `[0, 1]` are clamped to the edge texel.
  pub fn sample_nearest(dem: &DemData, coord: Vec2) -> f64 {
    let max = dem.stride() - 1;
    let texel = |c: f32| ((c * dem.stride() as f32) as i64).clamp(0, i64::from(max)) as u32;
    dem
      .elevation_at(texel(coord.x), texel(coord.y))
      .unwrap_or_default()
  }

  /// Height written to z: decoded elevation minus the baseline.
  pub fn displaced_height(elevation: f64, baseline: f32) -> f32 {
    (elevation - f64::from(baseline)) as f32
  }

  /// Clip-space position for one vertex.
  pub fn clip_position(matrix: &Mat4, a_pos: [i16; 2], height: f32) -> Vec4 {
    *matrix * Vec4::new(f32::from(a_pos[0]), f32::from(a_pos[1]), height, 1.0)
  }
}

#[cfg(test)]
#[path = "shader_test.rs"]
mod shader_test;
