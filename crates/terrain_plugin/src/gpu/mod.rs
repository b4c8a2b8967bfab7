//! GpuContext - the narrow GPU contract the terrain renderer draws through.
//!
//! The host owns the actual device/surface. The renderer only needs shader
//! compilation, a handful of buffer/texture primitives, fixed-function state,
//! uniforms, and indexed draws. Engine bridges (WebGL, glow, wgpu wrappers)
//! implement [`GpuContext`]; [`headless::HeadlessContext`] records commands for
//! tests and GPU-less hosts.
//!
//! All calls happen on the thread that owns the context. The context is passed
//! explicitly into every renderer call, never stored.

use std::fmt;

use glam::{Mat4, Vec2};

pub mod headless;

pub use headless::{GpuCommand, HeadlessContext};

// =============================================================================
// Handles
// =============================================================================

/// Compiled shader stage handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ShaderId(pub u32);

/// Linked program handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ProgramId(pub u32);

/// Vertex or index buffer handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BufferId(pub u32);

/// 2D texture handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureId(pub u32);

/// Uniform slot within a linked program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct UniformLocation(pub i32);

// =============================================================================
// Pipeline state
// =============================================================================

/// Programmable pipeline stage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShaderStage {
  Vertex,
  Fragment,
}

impl fmt::Display for ShaderStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShaderStage::Vertex => f.write_str("vertex"),
      ShaderStage::Fragment => f.write_str("fragment"),
    }
  }
}

/// Depth comparison function.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompareFunction {
  Never,
  Less,
  Equal,
  LessEqual,
  Greater,
  GreaterEqual,
  Always,
}

/// Depth test/write configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DepthState {
  pub test_enabled: bool,
  pub write_enabled: bool,
  pub compare: CompareFunction,
}

/// Polygon face selector for culling.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Face {
  Front,
  Back,
}

/// Winding order treated as front-facing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrontFace {
  Clockwise,
  CounterClockwise,
}

/// Face culling configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CullState {
  pub enabled: bool,
  pub cull_face: Face,
  pub front_face: FrontFace,
}

/// Buffer binding target.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BufferTarget {
  Vertex,
  Index,
}

/// Component type of a vertex attribute.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttributeFormat {
  I16,
  F32,
}

/// Vertex attribute layout within the bound vertex buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VertexAttribute {
  pub location: u32,
  pub components: u8,
  pub format: AttributeFormat,
  pub normalized: bool,
  pub stride: u32,
  pub offset: u32,
}

/// Index element type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndexFormat {
  U16,
  U32,
}

/// Texture minification/magnification filter.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextureFilter {
  Nearest,
  #[default]
  Linear,
}

/// Uniform value.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Uniform {
  Int(i32),
  Float(f32),
  Vec2(Vec2),
  Mat4(Mat4),
}

// =============================================================================
// Errors
// =============================================================================

/// Failure reported by the GPU context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GpuError {
  /// Shader compilation failed; carries the driver info log.
  #[error("shader compilation failed: {0}")]
  Compile(String),

  /// Program linking failed; carries the driver info log.
  #[error("program link failed: {0}")]
  Link(String),

  /// Resource allocation failed.
  #[error("out of GPU memory")]
  OutOfMemory,

  /// The context was lost; every handle is invalid.
  #[error("GPU context lost")]
  ContextLost,

  /// Any other driver-reported failure.
  #[error("GPU driver error: {0}")]
  Driver(String),
}

// =============================================================================
// GpuContext
// =============================================================================

/// Narrow GPU contract consumed by the terrain renderer.
///
/// Mirrors a WebGL-style immediate API: state set through the context stays
/// bound until changed. Deletion of an unknown handle is a no-op.
pub trait GpuContext {
  /// Compile a single shader stage.
  fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, GpuError>;

  /// Link a vertex and fragment stage into a program.
  fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, GpuError>;

  fn delete_shader(&mut self, shader: ShaderId);

  fn delete_program(&mut self, program: ProgramId);

  /// Location of an active vertex attribute, `None` if inactive or absent.
  fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32>;

  /// Location of an active uniform, `None` if inactive or absent.
  fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

  /// Create a buffer initialized with static data.
  fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<BufferId, GpuError>;

  fn delete_buffer(&mut self, buffer: BufferId);

  /// Create an empty 2D texture.
  fn create_texture(&mut self) -> Result<TextureId, GpuError>;

  /// Upload tightly packed RGBA8 pixels, replacing the texture's contents.
  fn upload_texture_rgba8(
    &mut self,
    texture: TextureId,
    width: u32,
    height: u32,
    pixels: &[u8],
    filter: TextureFilter,
  ) -> Result<(), GpuError>;

  fn delete_texture(&mut self, texture: TextureId);

  fn use_program(&mut self, program: ProgramId);

  fn set_depth_state(&mut self, state: DepthState);

  fn set_cull_state(&mut self, state: CullState);

  fn bind_vertex_buffer(&mut self, buffer: BufferId, attribute: VertexAttribute);

  fn bind_index_buffer(&mut self, buffer: BufferId);

  /// Bind a texture (or nothing) to a sampling unit.
  fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

  fn set_uniform(&mut self, location: UniformLocation, value: Uniform);

  /// Draw indexed triangles from the bound buffers.
  fn draw_indexed(&mut self, index_count: u32, format: IndexFormat, offset: u32)
    -> Result<(), GpuError>;
}
