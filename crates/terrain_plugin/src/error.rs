//! Error taxonomy for the terrain layer.
//!
//! Only pipeline construction and GPU/driver failures surface as errors.
//! Missing tile data and an empty tile set are normal frame outcomes.

use crate::gpu::{GpuError, ShaderStage};

/// Errors returned by the terrain layer.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
  /// A shader stage failed to compile. Rendering cannot proceed.
  #[error("{stage} shader failed to compile: {log}")]
  ShaderCompile { stage: ShaderStage, log: String },

  /// The compiled stages failed to link into a program.
  #[error("terrain program failed to link: {log}")]
  ProgramLink { log: String },

  /// The linked program does not expose a required vertex attribute.
  #[error("terrain program has no active attribute `{0}`")]
  MissingAttribute(&'static str),

  /// Grid resolution outside the range addressable with `u16` indices
  /// (see `MAX_GRID_RESOLUTION`).
  #[error("grid resolution {0} is outside 2..=256")]
  InvalidGridResolution(usize),

  /// DEM pixel buffer does not match its declared stride.
  #[error("DEM data with stride {stride} needs {expected} bytes, got {actual}")]
  InvalidDemData {
    stride: u32,
    expected: usize,
    actual: usize,
  },

  /// A frame was requested before `attach` (or after `detach`).
  #[error("terrain layer is not attached")]
  NotAttached,

  /// `attach` was called twice without `detach`.
  #[error("terrain layer is already attached")]
  AlreadyAttached,

  /// GPU/driver failure. Aborts the current frame's pass only.
  #[error(transparent)]
  Gpu(#[from] GpuError),
}

/// Result alias used throughout the crate.
pub type Result<T, E = TerrainError> = std::result::Result<T, E>;
