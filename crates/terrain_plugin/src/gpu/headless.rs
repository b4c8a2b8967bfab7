//! HeadlessContext - recording GPU context for tests and GPU-less hosts.
//!
//! Every call is appended to a command log instead of reaching a driver.
//! Handles are allocated from a monotonically increasing counter and live
//! resources are tracked so teardown can be verified. Individual failures
//! (a shader stage, linking, the n-th draw) can be injected.

use std::collections::{HashMap, HashSet};

use super::{
  BufferId, BufferTarget, CullState, DepthState, GpuContext, GpuError, IndexFormat, ProgramId,
  ShaderId, ShaderStage, TextureFilter, TextureId, Uniform, UniformLocation, VertexAttribute,
};

/// One recorded GPU call.
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCommand {
  CompileShader { shader: ShaderId, stage: ShaderStage },
  LinkProgram { program: ProgramId },
  DeleteShader(ShaderId),
  DeleteProgram(ProgramId),
  CreateBuffer { buffer: BufferId, target: BufferTarget, len: usize },
  DeleteBuffer(BufferId),
  CreateTexture(TextureId),
  UploadTexture { texture: TextureId, width: u32, height: u32, filter: TextureFilter },
  DeleteTexture(TextureId),
  UseProgram(ProgramId),
  SetDepthState(DepthState),
  SetCullState(CullState),
  BindVertexBuffer { buffer: BufferId, attribute: VertexAttribute },
  BindIndexBuffer(BufferId),
  BindTexture { unit: u32, texture: Option<TextureId> },
  SetUniform { location: UniformLocation, value: Uniform },
  DrawIndexed { index_count: u32, format: IndexFormat, offset: u32 },
}

/// Recording implementation of [`GpuContext`].
#[derive(Default)]
pub struct HeadlessContext {
  commands: Vec<GpuCommand>,
  next_handle: u32,
  shader_sources: HashMap<ShaderId, String>,
  program_sources: HashMap<ProgramId, String>,
  attributes: HashMap<(ProgramId, String), u32>,
  uniforms: HashMap<(ProgramId, String), UniformLocation>,
  uniform_names: HashMap<UniformLocation, String>,
  live_shaders: HashSet<ShaderId>,
  live_programs: HashSet<ProgramId>,
  live_buffers: HashSet<BufferId>,
  live_textures: HashSet<TextureId>,
  failing_stage: Option<ShaderStage>,
  failing_link: bool,
  failing_draw: Option<usize>,
  draws_attempted: usize,
}

impl HeadlessContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make compilation of `stage` fail with a synthetic info log.
  pub fn with_failing_stage(mut self, stage: ShaderStage) -> Self {
    self.failing_stage = Some(stage);
    self
  }

  /// Make program linking fail.
  pub fn with_failing_link(mut self) -> Self {
    self.failing_link = true;
    self
  }

  /// Make the `n`-th draw call (0-based, counted over the context lifetime)
  /// fail with a driver error.
  pub fn fail_draw_at(&mut self, n: usize) {
    self.failing_draw = Some(n);
  }

  /// All recorded commands, oldest first.
  pub fn commands(&self) -> &[GpuCommand] {
    &self.commands
  }

  /// Drain the command log, keeping resource tracking intact.
  pub fn take_commands(&mut self) -> Vec<GpuCommand> {
    std::mem::take(&mut self.commands)
  }

  /// Index counts of every recorded draw call.
  pub fn draw_calls(&self) -> Vec<u32> {
    self
      .commands
      .iter()
      .filter_map(|cmd| match cmd {
        GpuCommand::DrawIndexed { index_count, .. } => Some(*index_count),
        _ => None,
      })
      .collect()
  }

  /// Texture uploads recorded, as `(texture, width, height)`.
  pub fn texture_uploads(&self) -> Vec<(TextureId, u32, u32)> {
    self
      .commands
      .iter()
      .filter_map(|cmd| match cmd {
        GpuCommand::UploadTexture {
          texture,
          width,
          height,
          ..
        } => Some((*texture, *width, *height)),
        _ => None,
      })
      .collect()
  }

  /// Values set for the uniform called `name`, in submission order.
  pub fn uniform_values(&self, name: &str) -> Vec<Uniform> {
    self
      .commands
      .iter()
      .filter_map(|cmd| match cmd {
        GpuCommand::SetUniform { location, value }
          if self.uniform_names.get(location).map(String::as_str) == Some(name) =>
        {
          Some(*value)
        }
        _ => None,
      })
      .collect()
  }

  /// Textures bound to `unit`, in submission order.
  pub fn texture_bindings(&self, unit: u32) -> Vec<Option<TextureId>> {
    self
      .commands
      .iter()
      .filter_map(|cmd| match cmd {
        GpuCommand::BindTexture { unit: u, texture } if *u == unit => Some(*texture),
        _ => None,
      })
      .collect()
  }

  pub fn live_textures(&self) -> usize {
    self.live_textures.len()
  }

  pub fn live_buffers(&self) -> usize {
    self.live_buffers.len()
  }

  pub fn live_programs(&self) -> usize {
    self.live_programs.len()
  }

  pub fn live_shaders(&self) -> usize {
    self.live_shaders.len()
  }

  /// True when every created resource has been deleted.
  pub fn is_clean(&self) -> bool {
    self.live_shaders.is_empty()
      && self.live_programs.is_empty()
      && self.live_buffers.is_empty()
      && self.live_textures.is_empty()
  }

  fn next_handle(&mut self) -> u32 {
    self.next_handle += 1;
    self.next_handle
  }

  fn program_declares(&self, program: ProgramId, name: &str) -> bool {
    self
      .program_sources
      .get(&program)
      .is_some_and(|source| source.contains(name))
  }
}

impl GpuContext for HeadlessContext {
  fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, GpuError> {
    if self.failing_stage == Some(stage) {
      return Err(GpuError::Compile(format!(
        "ERROR: 0:1: injected {stage} stage failure"
      )));
    }
    let shader = ShaderId(self.next_handle());
    self.shader_sources.insert(shader, source.to_owned());
    self.live_shaders.insert(shader);
    self.commands.push(GpuCommand::CompileShader { shader, stage });
    Ok(shader)
  }

  fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, GpuError> {
    if self.failing_link {
      return Err(GpuError::Link("injected link failure".to_owned()));
    }
    let (Some(vs), Some(fs)) = (
      self.shader_sources.get(&vertex),
      self.shader_sources.get(&fragment),
    ) else {
      return Err(GpuError::Link("unknown shader handle".to_owned()));
    };
    let source = format!("{vs}\n{fs}");
    let program = ProgramId(self.next_handle());
    self.program_sources.insert(program, source);
    self.live_programs.insert(program);
    self.commands.push(GpuCommand::LinkProgram { program });
    Ok(program)
  }

  fn delete_shader(&mut self, shader: ShaderId) {
    if self.live_shaders.remove(&shader) {
      self.commands.push(GpuCommand::DeleteShader(shader));
    }
  }

  fn delete_program(&mut self, program: ProgramId) {
    if self.live_programs.remove(&program) {
      self.commands.push(GpuCommand::DeleteProgram(program));
    }
  }

  fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
    if !self.program_declares(program, name) {
      return None;
    }
    let next = self
      .attributes
      .keys()
      .filter(|(p, _)| *p == program)
      .count() as u32;
    Some(
      *self
        .attributes
        .entry((program, name.to_owned()))
        .or_insert(next),
    )
  }

  fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
    if !self.program_declares(program, name) {
      return None;
    }
    if let Some(location) = self.uniforms.get(&(program, name.to_owned())) {
      return Some(*location);
    }
    let location = UniformLocation(self.next_handle() as i32);
    self.uniforms.insert((program, name.to_owned()), location);
    self.uniform_names.insert(location, name.to_owned());
    Some(location)
  }

  fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> Result<BufferId, GpuError> {
    let buffer = BufferId(self.next_handle());
    self.live_buffers.insert(buffer);
    self.commands.push(GpuCommand::CreateBuffer {
      buffer,
      target,
      len: data.len(),
    });
    Ok(buffer)
  }

  fn delete_buffer(&mut self, buffer: BufferId) {
    if self.live_buffers.remove(&buffer) {
      self.commands.push(GpuCommand::DeleteBuffer(buffer));
    }
  }

  fn create_texture(&mut self) -> Result<TextureId, GpuError> {
    let texture = TextureId(self.next_handle());
    self.live_textures.insert(texture);
    self.commands.push(GpuCommand::CreateTexture(texture));
    Ok(texture)
  }

  fn upload_texture_rgba8(
    &mut self,
    texture: TextureId,
    width: u32,
    height: u32,
    pixels: &[u8],
    filter: TextureFilter,
  ) -> Result<(), GpuError> {
    if !self.live_textures.contains(&texture) {
      return Err(GpuError::Driver(format!("upload to unknown texture {texture:?}")));
    }
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
      return Err(GpuError::Driver(format!(
        "texture upload expects {expected} bytes, got {}",
        pixels.len()
      )));
    }
    self.commands.push(GpuCommand::UploadTexture {
      texture,
      width,
      height,
      filter,
    });
    Ok(())
  }

  fn delete_texture(&mut self, texture: TextureId) {
    if self.live_textures.remove(&texture) {
      self.commands.push(GpuCommand::DeleteTexture(texture));
    }
  }

  fn use_program(&mut self, program: ProgramId) {
    self.commands.push(GpuCommand::UseProgram(program));
  }

  fn set_depth_state(&mut self, state: DepthState) {
    self.commands.push(GpuCommand::SetDepthState(state));
  }

  fn set_cull_state(&mut self, state: CullState) {
    self.commands.push(GpuCommand::SetCullState(state));
  }

  fn bind_vertex_buffer(&mut self, buffer: BufferId, attribute: VertexAttribute) {
    self
      .commands
      .push(GpuCommand::BindVertexBuffer { buffer, attribute });
  }

  fn bind_index_buffer(&mut self, buffer: BufferId) {
    self.commands.push(GpuCommand::BindIndexBuffer(buffer));
  }

  fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
    self.commands.push(GpuCommand::BindTexture { unit, texture });
  }

  fn set_uniform(&mut self, location: UniformLocation, value: Uniform) {
    self.commands.push(GpuCommand::SetUniform { location, value });
  }

  fn draw_indexed(
    &mut self,
    index_count: u32,
    format: IndexFormat,
    offset: u32,
  ) -> Result<(), GpuError> {
    let attempt = self.draws_attempted;
    self.draws_attempted += 1;
    if self.failing_draw == Some(attempt) {
      return Err(GpuError::Driver(format!("injected failure on draw {attempt}")));
    }
    self.commands.push(GpuCommand::DrawIndexed {
      index_count,
      format,
      offset,
    });
    Ok(())
  }
}

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;
