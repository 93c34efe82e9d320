//! Headless backend that records every call instead of talking to a GPU.
//!
//! Useful for tests, CLI dry runs, and logging what a frame would do.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use cubeview_assets::TextureImage;
use cubeview_common::SurfaceDesc;
use cubeview_kernel::DepthRange;
use glam::Mat4;

use crate::backend::{
    BufferHandle, BufferKind, ContextError, ContextProvider, FrameError, FramePass, ProgramHandle,
    RenderBackend, SamplerDesc, ShaderHandle, ShaderStage, TextureHandle, UniformLocation,
    VertexLayout,
};
use crate::scene::{ATTR_POSITION, ATTR_TEX_COORD, UNIFORM_PROJ, UNIFORM_VIEW, UNIFORM_WORLD};

/// A single recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CompileShader { stage: ShaderStage, ok: bool },
    LinkProgram { program: Option<ProgramHandle> },
    ValidateProgram { program: ProgramHandle, ok: bool },
    CreateBuffer {
        kind: BufferKind,
        handle: BufferHandle,
        len: usize,
    },
    SetVertexLayout {
        program: ProgramHandle,
        buffer: BufferHandle,
        layout: VertexLayout,
    },
    CreateTexture {
        handle: TextureHandle,
        width: u32,
        height: u32,
        sampler: SamplerDesc,
    },
    UseProgram(ProgramHandle),
    SetUniform {
        location: UniformLocation,
        value: Mat4,
    },
    Clear { color: [f64; 4], depth: f32 },
    BindTexture { unit: u32, texture: TextureHandle },
    DrawIndexed { program: ProgramHandle, count: u32 },
}

/// Shared, cloneable view of the recorded calls.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<Command>>>);

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: Command) {
        self.0.borrow_mut().push(command);
    }

    pub fn commands(&self) -> Vec<Command> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Count of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Human-readable listing, one call per line.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for (i, command) in self.0.borrow().iter().enumerate() {
            let _ = match command {
                Command::SetUniform { location, value } => writeln!(
                    out,
                    "{i:>4}: uniform g{}b{} = {:.3?}",
                    location.group,
                    location.binding,
                    value.to_cols_array()
                ),
                other => writeln!(out, "{i:>4}: {other:?}"),
            };
        }
        out
    }
}

/// Failure to inject into the recording backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    Compile { stage: ShaderStage, log: String },
    Link(String),
    Validate(String),
    VertexLayout(String),
    Texture(String),
}

/// Names a linked program exposes: attributes with their locations, and uniforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInterface {
    pub attributes: BTreeMap<String, u32>,
    pub uniforms: Vec<String>,
}

impl ProgramInterface {
    /// Interface of the cube shaders: two attributes, three matrices.
    pub fn cube() -> Self {
        Self {
            attributes: BTreeMap::from([
                (ATTR_POSITION.to_string(), 0),
                (ATTR_TEX_COORD.to_string(), 1),
            ]),
            uniforms: vec![
                UNIFORM_WORLD.to_string(),
                UNIFORM_VIEW.to_string(),
                UNIFORM_PROJ.to_string(),
            ],
        }
    }
}

/// Backend that records calls into a [`CommandLog`].
#[derive(Debug)]
pub struct RecordingBackend {
    log: CommandLog,
    interface: ProgramInterface,
    depth_range: DepthRange,
    failure: Option<InjectedFailure>,
    shaders: u32,
    programs: u32,
    buffers: u32,
    textures: u32,
    current_program: Option<ProgramHandle>,
    uniforms: BTreeMap<UniformLocation, Mat4>,
}

impl RecordingBackend {
    pub fn new(log: CommandLog) -> Self {
        Self {
            log,
            interface: ProgramInterface::cube(),
            depth_range: DepthRange::NegOneToOne,
            failure: None,
            shaders: 0,
            programs: 0,
            buffers: 0,
            textures: 0,
            current_program: None,
            uniforms: BTreeMap::new(),
        }
    }

    pub fn with_interface(mut self, interface: ProgramInterface) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_depth_range(mut self, depth_range: DepthRange) -> Self {
        self.depth_range = depth_range;
        self
    }

    pub fn with_failure(mut self, failure: InjectedFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Last value written to a uniform slot.
    pub fn uniform(&self, location: UniformLocation) -> Option<Mat4> {
        self.uniforms.get(&location).copied()
    }

    fn uniform_index(&self, name: &str) -> Option<u32> {
        self.interface
            .uniforms
            .iter()
            .position(|u| u == name)
            .map(|i| i as u32)
    }
}

impl RenderBackend for RecordingBackend {
    fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        _source: &str,
    ) -> Result<ShaderHandle, String> {
        if let Some(InjectedFailure::Compile { stage: failing, log }) = &self.failure {
            if *failing == stage {
                self.log.push(Command::CompileShader { stage, ok: false });
                return Err(log.clone());
            }
        }
        self.log.push(Command::CompileShader { stage, ok: true });
        self.shaders += 1;
        Ok(ShaderHandle(self.shaders))
    }

    fn link_program(
        &mut self,
        _vertex: ShaderHandle,
        _fragment: ShaderHandle,
    ) -> Result<ProgramHandle, String> {
        if let Some(InjectedFailure::Link(log)) = &self.failure {
            self.log.push(Command::LinkProgram { program: None });
            return Err(log.clone());
        }
        self.programs += 1;
        let program = ProgramHandle(self.programs);
        self.log.push(Command::LinkProgram {
            program: Some(program),
        });
        Ok(program)
    }

    fn validate_program(&mut self, program: ProgramHandle) -> Result<(), String> {
        if let Some(InjectedFailure::Validate(log)) = &self.failure {
            self.log.push(Command::ValidateProgram { program, ok: false });
            return Err(log.clone());
        }
        self.log.push(Command::ValidateProgram { program, ok: true });
        Ok(())
    }

    fn attrib_location(&self, _program: ProgramHandle, name: &str) -> Option<u32> {
        self.interface.attributes.get(name).copied()
    }

    fn uniform_location(&self, _program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.uniform_index(name).map(|binding| UniformLocation { group: 0, binding })
    }

    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> BufferHandle {
        self.buffers += 1;
        let handle = BufferHandle(self.buffers);
        self.log.push(Command::CreateBuffer {
            kind,
            handle,
            len: contents.len(),
        });
        handle
    }

    fn set_vertex_layout(
        &mut self,
        program: ProgramHandle,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<(), String> {
        if let Some(InjectedFailure::VertexLayout(log)) = &self.failure {
            return Err(log.clone());
        }
        self.log.push(Command::SetVertexLayout {
            program,
            buffer,
            layout: layout.clone(),
        });
        Ok(())
    }

    fn create_texture(
        &mut self,
        image: &TextureImage,
        sampler: &SamplerDesc,
    ) -> Result<TextureHandle, String> {
        if let Some(InjectedFailure::Texture(log)) = &self.failure {
            return Err(log.clone());
        }
        self.textures += 1;
        let handle = TextureHandle(self.textures);
        self.log.push(Command::CreateTexture {
            handle,
            width: image.width,
            height: image.height,
            sampler: *sampler,
        });
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
        self.log.push(Command::UseProgram(program));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.uniforms.insert(location, *value);
        self.log.push(Command::SetUniform {
            location,
            value: *value,
        });
    }

    fn draw_frame(&mut self, pass: &FramePass) -> Result<(), FrameError> {
        if pass.texture.0 == 0 || pass.texture.0 > self.textures {
            return Err(FrameError::UnknownHandle {
                kind: "texture",
                id: pass.texture.0,
            });
        }
        if self.current_program != Some(pass.program) {
            return Err(FrameError::Backend(format!(
                "program {} is not in use",
                pass.program.0
            )));
        }
        self.log.push(Command::Clear {
            color: pass.clear_color,
            depth: pass.clear_depth,
        });
        self.log.push(Command::BindTexture {
            unit: pass.texture_unit,
            texture: pass.texture,
        });
        self.log.push(Command::DrawIndexed {
            program: pass.program,
            count: pass.index_count,
        });
        Ok(())
    }
}

/// Context provider handing out a [`RecordingBackend`], or failing on demand.
#[derive(Debug)]
pub struct RecordingProvider {
    result: Result<RecordingBackend, String>,
}

impl RecordingProvider {
    pub fn new(backend: RecordingBackend) -> Self {
        Self {
            result: Ok(backend),
        }
    }

    /// A provider whose context acquisition always fails.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            result: Err(reason.into()),
        }
    }
}

impl ContextProvider for RecordingProvider {
    type Backend = RecordingBackend;

    fn acquire_context(self, surface: &SurfaceDesc) -> Result<RecordingBackend, ContextError> {
        tracing::debug!(surface = %surface.id, "recording context requested");
        self.result.map_err(ContextError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_call_order() {
        let log = CommandLog::new();
        let mut backend = RecordingBackend::new(log.clone());
        let vs = backend.compile_shader(ShaderStage::Vertex, "").unwrap();
        let fs = backend.compile_shader(ShaderStage::Fragment, "").unwrap();
        let program = backend.link_program(vs, fs).unwrap();
        backend.use_program(program);

        assert_eq!(
            log.commands(),
            vec![
                Command::CompileShader {
                    stage: ShaderStage::Vertex,
                    ok: true
                },
                Command::CompileShader {
                    stage: ShaderStage::Fragment,
                    ok: true
                },
                Command::LinkProgram {
                    program: Some(program)
                },
                Command::UseProgram(program),
            ]
        );
    }

    #[test]
    fn cube_interface_resolves_five_names() {
        let backend = RecordingBackend::new(CommandLog::new());
        let p = ProgramHandle(1);
        assert_eq!(backend.attrib_location(p, "vertexPosition"), Some(0));
        assert_eq!(backend.attrib_location(p, "vertextTextureCoord"), Some(1));
        assert!(backend.uniform_location(p, "mWorld").is_some());
        assert!(backend.uniform_location(p, "mView").is_some());
        assert!(backend.uniform_location(p, "mProj").is_some());
        assert!(backend.attrib_location(p, "vertexTextureCoord").is_none());
    }

    #[test]
    fn draw_with_unknown_texture_fails() {
        let mut backend = RecordingBackend::new(CommandLog::new());
        backend.use_program(ProgramHandle(1));
        let err = backend
            .draw_frame(&FramePass {
                program: ProgramHandle(1),
                vertex_buffer: BufferHandle(1),
                index_buffer: BufferHandle(2),
                index_count: 36,
                texture: TextureHandle(7),
                texture_unit: 0,
                clear_color: [0.0; 4],
                clear_depth: 1.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::UnknownHandle {
                kind: "texture",
                id: 7
            }
        ));
    }

    #[test]
    fn transcript_lists_every_call() {
        let log = CommandLog::new();
        let mut backend = RecordingBackend::new(log.clone());
        backend.create_buffer(BufferKind::Vertex, &[0; 20]);
        let location = UniformLocation {
            group: 0,
            binding: 2,
        };
        backend.set_uniform_mat4(location, &Mat4::IDENTITY);
        let text = log.transcript();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("CreateBuffer"));
        assert!(text.contains("uniform g0b2"));
    }

    #[test]
    fn unavailable_provider_fails() {
        let provider = RecordingProvider::unavailable("no webgl");
        let err = provider.acquire_context(&SurfaceDesc::default()).unwrap_err();
        assert!(err.to_string().contains("no webgl"));
    }
}
