use cubeview_assets::{AssetError, PendingTexture};
use cubeview_common::{CubeMesh, SurfaceDesc, Vertex};
use cubeview_input::InteractionState;
use cubeview_kernel::{CameraSetup, DEFAULT_SPEED, TransformState};

use crate::backend::{
    BufferHandle, BufferKind, ContextError, ContextProvider, FrameError, FramePass, ProgramHandle,
    RenderBackend, SamplerDesc, ShaderStage, TextureHandle, UniformLocation, VertexAttribute,
    VertexLayout,
};

pub const ATTR_POSITION: &str = "vertexPosition";
pub const ATTR_TEX_COORD: &str = "vertextTextureCoord";
pub const UNIFORM_WORLD: &str = "mWorld";
pub const UNIFORM_VIEW: &str = "mView";
pub const UNIFORM_PROJ: &str = "mProj";

/// Errors that abort scene initialization. Nothing renders after one of these.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    ContextUnavailable(#[from] ContextError),
    #[error("ERROR compiling {stage} shader!\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("ERROR linking program!\n{0}")]
    ProgramLink(String),
    #[error("ERROR validating program!\n{0}")]
    ProgramValidate(String),
    #[error("program has no attribute named '{0}'")]
    MissingAttribute(&'static str),
    #[error("program has no uniform named '{0}'")]
    MissingUniform(&'static str),
    #[error("vertex layout rejected: {0}")]
    VertexLayout(String),
    #[error("texture load failed: {0}")]
    Texture(#[from] AssetError),
    #[error("texture upload rejected: {0}")]
    TextureUpload(String),
}

/// Tunables of the cube scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    /// Raw pointer units per radian of rotation.
    pub speed: f32,
    pub clear_color: [f64; 4],
    pub camera: CameraSetup,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            clear_color: [0.75, 0.85, 0.8, 1.0],
            camera: CameraSetup::default(),
        }
    }
}

/// Startup inputs: shader sources as text and the in-flight texture load.
#[derive(Debug)]
pub struct SceneAssets<'a> {
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    pub texture: PendingTexture,
}

/// Resolved attribute and uniform slots of the cube program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramBindings {
    pub position: u32,
    pub tex_coord: u32,
    pub world: UniformLocation,
    pub view: UniformLocation,
    pub projection: UniformLocation,
}

/// A fully initialized textured cube, ready to tick.
#[derive(Debug)]
pub struct CubeScene<B> {
    backend: B,
    program: ProgramHandle,
    bindings: ProgramBindings,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
    texture: TextureHandle,
    transforms: TransformState,
    settings: SceneSettings,
}

impl<B: RenderBackend> CubeScene<B> {
    /// Run the startup sequence: context, shaders, mesh, texture, transforms.
    ///
    /// The first failing step aborts; later steps never run.
    pub fn initialize<P>(
        provider: P,
        surface: &SurfaceDesc,
        assets: SceneAssets<'_>,
        settings: SceneSettings,
    ) -> Result<Self, InitError>
    where
        P: ContextProvider<Backend = B>,
    {
        let _span = tracing::info_span!("scene_init", surface = %surface.id).entered();
        let result = Self::build(provider, surface, assets, settings);
        if let Err(e) = &result {
            tracing::error!("{e}");
        }
        result
    }

    fn build<P>(
        provider: P,
        surface: &SurfaceDesc,
        assets: SceneAssets<'_>,
        settings: SceneSettings,
    ) -> Result<Self, InitError>
    where
        P: ContextProvider<Backend = B>,
    {
        let mut backend = provider.acquire_context(surface)?;
        tracing::info!(
            width = surface.width,
            height = surface.height,
            "graphics context acquired"
        );

        let (program, bindings) =
            build_program(&mut backend, assets.vertex_source, assets.fragment_source)?;

        let mesh = CubeMesh::textured();
        let vertex_buffer = backend.create_buffer(BufferKind::Vertex, mesh.vertex_bytes());
        let index_buffer = backend.create_buffer(BufferKind::Index, mesh.index_bytes());
        backend
            .set_vertex_layout(program, vertex_buffer, &cube_layout(&bindings))
            .map_err(InitError::VertexLayout)?;
        tracing::debug!(
            vertices = mesh.vertices.len(),
            indices = mesh.index_count(),
            "mesh uploaded"
        );

        let image = assets.texture.wait()?;
        let texture = backend
            .create_texture(&image, &SamplerDesc::CLAMP_LINEAR)
            .map_err(InitError::TextureUpload)?;
        tracing::info!(
            id = %image.id,
            width = image.width,
            height = image.height,
            "texture uploaded"
        );

        backend.use_program(program);
        let transforms =
            TransformState::new(&settings.camera, surface.aspect(), backend.depth_range());
        backend.set_uniform_mat4(bindings.world, &transforms.world());
        backend.set_uniform_mat4(bindings.view, &transforms.view());
        backend.set_uniform_mat4(bindings.projection, &transforms.projection());

        Ok(Self {
            backend,
            program,
            bindings,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            texture,
            transforms,
            settings,
        })
    }

    /// One frame: rebuild world from the drag angles, upload it, clear, draw.
    pub fn render_tick(&mut self, interaction: &InteractionState) -> Result<(), FrameError> {
        let world = self.transforms.update_world(
            interaction.angle_x,
            interaction.angle_y,
            self.settings.speed,
        );
        self.backend.set_uniform_mat4(self.bindings.world, &world);
        self.backend.draw_frame(&FramePass {
            program: self.program,
            vertex_buffer: self.vertex_buffer,
            index_buffer: self.index_buffer,
            index_count: self.index_count,
            texture: self.texture,
            texture_unit: 0,
            clear_color: self.settings.clear_color,
            clear_depth: 1.0,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn transforms(&self) -> &TransformState {
        &self.transforms
    }

    pub fn bindings(&self) -> &ProgramBindings {
        &self.bindings
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }
}

/// Compile both stages, link, validate, and resolve the five named slots.
fn build_program<B: RenderBackend>(
    backend: &mut B,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<(ProgramHandle, ProgramBindings), InitError> {
    let compile = |backend: &mut B, stage: ShaderStage, source: &str| {
        backend
            .compile_shader(stage, source)
            .map_err(|log| InitError::ShaderCompile { stage, log })
    };
    let vertex = compile(backend, ShaderStage::Vertex, vertex_source)?;
    let fragment = compile(backend, ShaderStage::Fragment, fragment_source)?;

    let program = backend
        .link_program(vertex, fragment)
        .map_err(InitError::ProgramLink)?;
    backend
        .validate_program(program)
        .map_err(InitError::ProgramValidate)?;
    tracing::info!(program = program.0, "shader program linked");

    let attrib = |name: &'static str| {
        backend
            .attrib_location(program, name)
            .ok_or(InitError::MissingAttribute(name))
    };
    let position = attrib(ATTR_POSITION)?;
    let tex_coord = attrib(ATTR_TEX_COORD)?;

    let uniform = |name: &'static str| {
        backend
            .uniform_location(program, name)
            .ok_or(InitError::MissingUniform(name))
    };
    let bindings = ProgramBindings {
        position,
        tex_coord,
        world: uniform(UNIFORM_WORLD)?,
        view: uniform(UNIFORM_VIEW)?,
        projection: uniform(UNIFORM_PROJ)?,
    };
    Ok((program, bindings))
}

/// Position (3 floats at 0) and texture coordinate (2 floats at 12), stride 20.
fn cube_layout(bindings: &ProgramBindings) -> VertexLayout {
    VertexLayout {
        stride: Vertex::STRIDE,
        attributes: vec![
            VertexAttribute {
                location: bindings.position,
                components: 3,
                offset: 0,
            },
            VertexAttribute {
                location: bindings.tex_coord,
                components: 2,
                offset: Vertex::TEX_COORD_OFFSET,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FilterMode, WrapMode};
    use crate::recording::{
        Command, CommandLog, InjectedFailure, RecordingBackend, RecordingProvider,
    };
    use cubeview_assets::{TextureImage, TextureLoader};
    use cubeview_input::PointerEvent;
    use cubeview_kernel::{DepthRange, FrameLoop, ManualScheduler};
    use glam::Mat4;

    fn assets() -> SceneAssets<'static> {
        SceneAssets {
            vertex_source: "vertex source",
            fragment_source: "fragment source",
            texture: PendingTexture::ready(TextureImage::checkerboard("tex", 4, 2)),
        }
    }

    fn init(backend: RecordingBackend) -> Result<CubeScene<RecordingBackend>, InitError> {
        CubeScene::initialize(
            RecordingProvider::new(backend),
            &SurfaceDesc::default(),
            assets(),
            SceneSettings::default(),
        )
    }

    fn scene() -> (CubeScene<RecordingBackend>, CommandLog) {
        let log = CommandLog::new();
        let scene = init(RecordingBackend::new(log.clone())).unwrap();
        (scene, log)
    }

    fn is_draw(c: &Command) -> bool {
        matches!(c, Command::DrawIndexed { .. })
    }

    fn is_link(c: &Command) -> bool {
        matches!(c, Command::LinkProgram { .. })
    }

    #[test]
    fn startup_runs_steps_in_order() {
        let (scene, log) = scene();
        let commands = log.commands();
        let kinds: Vec<&str> = commands
            .iter()
            .map(|c| match c {
                Command::CompileShader { .. } => "compile",
                Command::LinkProgram { .. } => "link",
                Command::ValidateProgram { .. } => "validate",
                Command::CreateBuffer { .. } => "buffer",
                Command::SetVertexLayout { .. } => "layout",
                Command::CreateTexture { .. } => "texture",
                Command::UseProgram(_) => "use",
                Command::SetUniform { .. } => "uniform",
                _ => "frame",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "compile", "compile", "link", "validate", "buffer", "buffer", "layout", "texture",
                "use", "uniform", "uniform", "uniform"
            ]
        );
        assert_eq!(scene.index_count(), 36);
        assert_eq!(log.count(is_draw), 0);
    }

    #[test]
    fn mesh_upload_uses_interleaved_layout() {
        let (scene, log) = scene();
        let commands = log.commands();
        assert!(commands.contains(&Command::CreateBuffer {
            kind: BufferKind::Vertex,
            handle: BufferHandle(1),
            len: 24 * 20,
        }));
        assert!(commands.contains(&Command::CreateBuffer {
            kind: BufferKind::Index,
            handle: BufferHandle(2),
            len: 36 * 2,
        }));

        let layout = commands
            .iter()
            .find_map(|c| match c {
                Command::SetVertexLayout { layout, .. } => Some(layout.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(layout.stride, 20);
        let b = scene.bindings();
        assert_eq!(
            layout.attributes,
            vec![
                VertexAttribute {
                    location: b.position,
                    components: 3,
                    offset: 0,
                },
                VertexAttribute {
                    location: b.tex_coord,
                    components: 2,
                    offset: 12,
                },
            ]
        );
    }

    #[test]
    fn texture_is_clamped_and_linear() {
        let (_, log) = scene();
        let sampler = log
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::CreateTexture {
                    sampler,
                    width: 4,
                    height: 4,
                    ..
                } => Some(*sampler),
                _ => None,
            })
            .unwrap();
        assert_eq!(sampler.wrap_s, WrapMode::ClampToEdge);
        assert_eq!(sampler.wrap_t, WrapMode::ClampToEdge);
        assert_eq!(sampler.min_filter, FilterMode::Linear);
        assert_eq!(sampler.mag_filter, FilterMode::Linear);
    }

    #[test]
    fn initial_uniforms_match_transform_state() {
        let (scene, _) = scene();
        let b = *scene.bindings();
        let backend = scene.backend();
        let t = scene.transforms();
        assert_eq!(backend.uniform(b.world), Some(Mat4::IDENTITY));
        assert_eq!(backend.uniform(b.view), Some(t.view()));
        assert_eq!(backend.uniform(b.projection), Some(t.projection()));
    }

    #[test]
    fn projection_follows_backend_depth_range() {
        let gl = init(RecordingBackend::new(CommandLog::new())).unwrap();
        let wgpu = init(
            RecordingBackend::new(CommandLog::new()).with_depth_range(DepthRange::ZeroToOne),
        )
        .unwrap();
        assert_ne!(gl.transforms().projection(), wgpu.transforms().projection());
        assert_eq!(gl.transforms().view(), wgpu.transforms().view());
    }

    #[test]
    fn context_failure_creates_nothing() {
        let err = CubeScene::<RecordingBackend>::initialize(
            RecordingProvider::unavailable("webgl not supported"),
            &SurfaceDesc::default(),
            assets(),
            SceneSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InitError::ContextUnavailable(_)));
        assert!(err.to_string().contains("webgl not supported"));
    }

    #[test]
    fn vertex_compile_failure_halts_before_link() {
        let log = CommandLog::new();
        let backend = RecordingBackend::new(log.clone()).with_failure(InjectedFailure::Compile {
            stage: ShaderStage::Vertex,
            log: "0:3: syntax error".into(),
        });
        let err = init(backend).unwrap_err();
        match err {
            InitError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("syntax error"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            log.commands(),
            vec![Command::CompileShader {
                stage: ShaderStage::Vertex,
                ok: false,
            }]
        );
        assert_eq!(log.count(is_link), 0);
        assert_eq!(log.count(is_draw), 0);
    }

    #[test]
    fn fragment_compile_failure_is_also_fatal() {
        let log = CommandLog::new();
        let backend = RecordingBackend::new(log.clone()).with_failure(InjectedFailure::Compile {
            stage: ShaderStage::Fragment,
            log: "undeclared identifier".into(),
        });
        let err = init(backend).unwrap_err();
        match &err {
            InitError::ShaderCompile { stage, .. } => assert_eq!(*stage, ShaderStage::Fragment),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("ERROR compiling fragment shader!"));
        assert_eq!(log.count(is_link), 0);
    }

    #[test]
    fn link_and_validate_failures_abort() {
        let log = CommandLog::new();
        let err = init(
            RecordingBackend::new(log.clone())
                .with_failure(InjectedFailure::Link("varying mismatch".into())),
        )
        .unwrap_err();
        assert!(matches!(err, InitError::ProgramLink(ref l) if l == "varying mismatch"));
        assert_eq!(log.count(|c| matches!(c, Command::CreateBuffer { .. })), 0);

        let log = CommandLog::new();
        let err = init(
            RecordingBackend::new(log.clone())
                .with_failure(InjectedFailure::Validate("bad state".into())),
        )
        .unwrap_err();
        assert!(matches!(err, InitError::ProgramValidate(_)));
        assert_eq!(log.count(|c| matches!(c, Command::CreateBuffer { .. })), 0);
    }

    #[test]
    fn missing_uniform_is_reported_by_name() {
        let mut interface = crate::recording::ProgramInterface::cube();
        interface.uniforms.retain(|u| u != "mProj");
        let err = init(RecordingBackend::new(CommandLog::new()).with_interface(interface))
            .unwrap_err();
        assert!(matches!(err, InitError::MissingUniform("mProj")));
    }

    #[test]
    fn texture_failure_aborts_before_upload() {
        let log = CommandLog::new();
        let missing =
            std::env::temp_dir().join(format!("{}-missing.png", cubeview_common::generate_id()));
        let err = CubeScene::initialize(
            RecordingProvider::new(RecordingBackend::new(log.clone())),
            &SurfaceDesc::default(),
            SceneAssets {
                vertex_source: "vs",
                fragment_source: "fs",
                texture: TextureLoader::new().load(&missing, None),
            },
            SceneSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InitError::Texture(_)));
        assert_eq!(log.count(|c| matches!(c, Command::CreateTexture { .. })), 0);
        assert_eq!(log.count(|c| matches!(c, Command::UseProgram(_))), 0);
    }

    #[test]
    fn texture_upload_failure_aborts() {
        let log = CommandLog::new();
        let failure = InjectedFailure::Texture("exceeds max_texture_dimension_2d".into());
        let err = init(RecordingBackend::new(log.clone()).with_failure(failure)).unwrap_err();
        assert!(matches!(err, InitError::TextureUpload(ref l) if l.contains("max_texture")));
        assert_eq!(log.count(|c| matches!(c, Command::CreateTexture { .. })), 0);
        assert_eq!(log.count(|c| matches!(c, Command::UseProgram(_))), 0);
        assert_eq!(log.count(|c| matches!(c, Command::SetUniform { .. })), 0);
    }

    #[test]
    fn tick_order_is_uniform_clear_bind_draw() {
        let (mut scene, log) = scene();
        log.clear();
        scene.render_tick(&InteractionState::new()).unwrap();

        let world = scene.bindings().world;
        assert_eq!(
            log.commands(),
            vec![
                Command::SetUniform {
                    location: world,
                    value: Mat4::IDENTITY,
                },
                Command::Clear {
                    color: [0.75, 0.85, 0.8, 1.0],
                    depth: 1.0,
                },
                Command::BindTexture {
                    unit: 0,
                    texture: TextureHandle(1),
                },
                Command::DrawIndexed {
                    program: scene.program(),
                    count: 36,
                },
            ]
        );
    }

    #[test]
    fn drag_scenario_sets_expected_world() {
        let (mut scene, _) = scene();
        let mut input = InteractionState::new();
        input.apply(PointerEvent::Move { x: 100.0, y: 100.0 });
        input.apply(PointerEvent::Down);
        input.apply(PointerEvent::Move { x: 150.0, y: 120.0 });
        assert_eq!((input.angle_x, input.angle_y), (150.0, 120.0));

        scene.render_tick(&input).unwrap();
        let expected = Mat4::from_rotation_y(3.0) * Mat4::from_rotation_x(2.4);
        let uploaded = scene.backend().uniform(scene.bindings().world).unwrap();
        assert!(uploaded.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn idle_ticks_are_idempotent() {
        let (mut scene, _) = scene();
        let mut input = InteractionState::new();
        input.apply(PointerEvent::Down);
        input.apply(PointerEvent::Move { x: 42.0, y: -17.0 });
        input.apply(PointerEvent::Up);

        scene.render_tick(&input).unwrap();
        let first = scene.transforms().world();
        for _ in 0..5 {
            input.apply(PointerEvent::Move { x: 999.0, y: 999.0 });
            scene.render_tick(&input).unwrap();
            assert_eq!(scene.transforms().world(), first);
        }
    }

    #[test]
    fn view_and_projection_are_written_once() {
        let (mut scene, log) = scene();
        let b = *scene.bindings();
        let mut input = InteractionState::new();
        input.apply(PointerEvent::Down);
        for i in 0..10 {
            input.apply(PointerEvent::Move {
                x: i as f32 * 13.0,
                y: i as f32 * 7.0,
            });
            scene.render_tick(&input).unwrap();
        }
        let writes = |loc: UniformLocation| {
            log.count(|c| matches!(c, Command::SetUniform { location, .. } if *location == loc))
        };
        assert_eq!(writes(b.view), 1);
        assert_eq!(writes(b.projection), 1);
        assert_eq!(writes(b.world), 11);
    }

    #[test]
    fn frame_loop_drives_bounded_ticks() {
        let (mut scene, log) = scene();
        let input = InteractionState::new();
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        let ran = frames.run_pending(3, || {
            scene.render_tick(&input).unwrap();
        });
        assert_eq!(ran, 3);
        assert_eq!(log.count(is_draw), 3);
    }
}
