use std::fmt;

use cubeview_assets::TextureImage;
use cubeview_common::SurfaceDesc;
use cubeview_kernel::DepthRange;
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Compiled shader stage owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderHandle(pub u32);

/// Linked program owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramHandle(pub u32);

/// GPU buffer owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferHandle(pub u32);

/// 2D texture owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Slot of a uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferKind {
    /// Interleaved per-vertex data.
    Vertex,
    /// 16-bit unsigned triangle-list indices.
    Index,
}

/// One float attribute stream inside an interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexAttribute {
    pub location: u32,
    /// Number of f32 components (1..=4).
    pub components: u32,
    pub offset: u64,
}

/// Attribute streams over a single interleaved buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    Linear,
    Nearest,
}

/// Sampling state for a 2D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerDesc {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl SamplerDesc {
    /// Clamp-to-edge on both axes, linear min and mag filtering.
    pub const CLAMP_LINEAR: SamplerDesc = SamplerDesc {
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::ClampToEdge,
        min_filter: FilterMode::Linear,
        mag_filter: FilterMode::Linear,
    };
}

/// Everything one frame needs: clear values and a single indexed draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePass {
    pub program: ProgramHandle,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    pub texture: TextureHandle,
    pub texture_unit: u32,
    pub clear_color: [f64; 4],
    pub clear_depth: f32,
}

/// Errors raised while acquiring a graphics context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("surface creation failed: {0}")]
    Surface(String),
    #[error("no compatible graphics adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(String),
    #[error("graphics context unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while rendering a single frame. None of these stop the loop.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("surface lost or outdated, reconfigured")]
    SurfaceReconfigured,
    #[error("timed out acquiring the next surface texture")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Low-level graphics operations used by the cube scene.
///
/// Failing shader and program operations return the backend's diagnostic
/// log as the error value.
pub trait RenderBackend {
    /// Clip-space depth convention used for the projection matrix.
    fn depth_range(&self) -> DepthRange;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, String>;

    fn validate_program(&mut self, program: ProgramHandle) -> Result<(), String>;

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Upload static data. The buffer is never written again.
    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> BufferHandle;

    /// Point and enable the attribute streams of `buffer` for `program`.
    fn set_vertex_layout(
        &mut self,
        program: ProgramHandle,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<(), String>;

    /// Upload an RGBA8 image. Fails when the device rejects it, for example
    /// when it exceeds the maximum texture size.
    fn create_texture(
        &mut self,
        image: &TextureImage,
        sampler: &SamplerDesc,
    ) -> Result<TextureHandle, String>;

    fn use_program(&mut self, program: ProgramHandle);

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    /// Clear color and depth, bind the texture, issue the indexed draw.
    fn draw_frame(&mut self, pass: &FramePass) -> Result<(), FrameError>;
}

/// Source of a graphics context for a described surface.
pub trait ContextProvider {
    type Backend: RenderBackend;

    fn acquire_context(self, surface: &SurfaceDesc) -> Result<Self::Backend, ContextError>;
}
