use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use cubeview_assets::{PendingTexture, TextureImage, TextureLoader};
use cubeview_common::{CubeMesh, SurfaceDesc};
use cubeview_input::{InteractionState, PointerEvent};
use cubeview_kernel::{CameraSetup, DEFAULT_SPEED, FrameLoop, ManualScheduler};
use cubeview_render::{
    CommandLog, CubeScene, RecordingBackend, RecordingProvider, SceneAssets, SceneSettings,
    ShaderStage,
};
use cubeview_render_wgpu::{CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER, ResourceKind, reflect};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubeview-cli", about = "Headless tooling for the cube viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, defaults and mesh statistics
    Info,
    /// Reflect the bundled WGSL shaders and check that they link
    Shaders {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Replay a scripted drag through the recording backend
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "3")]
        ticks: u64,
        /// Pointer positions while the button is held, one per frame (X,Y)
        #[arg(long = "drag", value_parser = parse_point)]
        drag: Vec<(f32, f32)>,
        /// Pointer pixels per radian of rotation
        #[arg(long, default_value_t = DEFAULT_SPEED)]
        speed: f32,
        /// Texture image to load instead of the checkerboard
        #[arg(long)]
        texture: Option<PathBuf>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also print every recorded backend call
        #[arg(long)]
        transcript: bool,
    },
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("bad coordinate '{v}': {e}"))
    };
    Ok((coord(x)?, coord(y)?))
}

/// One simulated frame as seen by the world uniform.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct FrameRecord {
    tick: u64,
    dragging: bool,
    angle_x: f32,
    angle_y: f32,
    world: [f32; 16],
}

/// Press, visit each drag point on its own frame, then release for the
/// remaining frames.
fn simulate(
    ticks: u64,
    drag: &[(f32, f32)],
    settings: SceneSettings,
    texture: PendingTexture,
) -> Result<(Vec<FrameRecord>, CommandLog)> {
    let log = CommandLog::new();
    let mut scene = CubeScene::initialize(
        RecordingProvider::new(RecordingBackend::new(log.clone())),
        &SurfaceDesc::default(),
        SceneAssets {
            vertex_source: CUBE_VERTEX_SHADER,
            fragment_source: CUBE_FRAGMENT_SHADER,
            texture,
        },
        settings,
    )?;

    let mut input = InteractionState::new();
    if !drag.is_empty() {
        input.apply(PointerEvent::Down);
    }
    let mut points = drag.iter();
    let mut records = Vec::new();
    let mut failure = None;

    let mut frames = FrameLoop::new(ManualScheduler::new());
    frames.start();
    frames.run_pending(ticks, || {
        match points.next() {
            Some(&(x, y)) => input.apply(PointerEvent::Move { x, y }),
            None => input.apply(PointerEvent::Up),
        };
        if let Err(e) = scene.render_tick(&input) {
            failure.get_or_insert(e);
            return;
        }
        records.push(FrameRecord {
            tick: records.len() as u64,
            dragging: input.is_down,
            angle_x: input.angle_x,
            angle_y: input.angle_y,
            world: scene.transforms().world().to_cols_array(),
        });
    });

    if let Some(e) = failure {
        bail!("frame failed: {e}");
    }
    Ok((records, log))
}

#[derive(Serialize)]
struct ShaderReport {
    vertex: cubeview_render_wgpu::ShaderInterface,
    fragment: cubeview_render_wgpu::ShaderInterface,
    linked: bool,
}

fn shaders(json: bool) -> Result<()> {
    let vertex = reflect::reflect_source(ShaderStage::Vertex, CUBE_VERTEX_SHADER)
        .map_err(anyhow::Error::msg)
        .context("vertex shader")?;
    let fragment = reflect::reflect_source(ShaderStage::Fragment, CUBE_FRAGMENT_SHADER)
        .map_err(anyhow::Error::msg)
        .context("fragment shader")?;
    reflect::check_stage_link(&vertex, &fragment).map_err(anyhow::Error::msg)?;
    reflect::merge_resources(&vertex, &fragment).map_err(anyhow::Error::msg)?;

    if json {
        let report = ShaderReport {
            vertex,
            fragment,
            linked: true,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for iface in [&vertex, &fragment] {
        println!("{} stage, entry point {}", iface.stage, iface.entry_point);
        for input in &iface.inputs {
            println!("  in  @location({}) {}", input.location, input.name);
        }
        for output in &iface.outputs {
            println!("  out @location({}) {}", output.location, output.name);
        }
        for res in &iface.resources {
            let kind = match res.kind {
                ResourceKind::Uniform { size } => format!("uniform ({size} bytes)"),
                ResourceKind::Texture => "texture_2d".to_string(),
                ResourceKind::Sampler => "sampler".to_string(),
            };
            println!(
                "  @group({}) @binding({}) {} : {kind}",
                res.group, res.binding, res.name
            );
        }
    }
    println!("program links: yes");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let surface = SurfaceDesc::default();
            let camera = CameraSetup::default();
            let mesh = CubeMesh::textured();
            println!("cubeview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", cubeview_render::crate_info());
            println!(
                "surface: {}x{} (aspect {:.3})",
                surface.width,
                surface.height,
                surface.aspect()
            );
            println!(
                "camera: eye {:?}, fov {}°, near {}, far {}",
                camera.eye.to_array(),
                camera.fov_degrees,
                camera.near,
                camera.far
            );
            println!(
                "mesh: {} vertices, {} indices",
                mesh.vertices.len(),
                mesh.index_count()
            );
        }
        Commands::Shaders { json } => shaders(json)?,
        Commands::Simulate {
            ticks,
            drag,
            speed,
            texture,
            json,
            transcript,
        } => {
            let texture = match texture {
                Some(path) => TextureLoader::new().load(path, None),
                None => PendingTexture::ready(TextureImage::checkerboard("checkerboard", 64, 8)),
            };
            let settings = SceneSettings {
                speed,
                ..SceneSettings::default()
            };
            let (records, log) = simulate(ticks, &drag, settings, texture)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for r in &records {
                    println!(
                        "tick {:>3} drag={:<5} angles=({}, {}) world={:.4?}",
                        r.tick, r.dragging, r.angle_x, r.angle_y, r.world
                    );
                }
            }
            if transcript {
                print!("{}", log.transcript());
            }
        }
    }

    Ok(())
}
