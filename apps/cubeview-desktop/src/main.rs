use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use cubeview_assets::{PendingTexture, TextureImage, TextureLoader};
use cubeview_common::SurfaceDesc;
use cubeview_common::types::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use cubeview_input::{InteractionState, PointerEvent};
use cubeview_kernel::{DEFAULT_SPEED, FrameLoop, FrameScheduler, LoopState};
use cubeview_render::{CubeScene, FrameError, SceneAssets, SceneSettings};
use cubeview_render_wgpu::{CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER, WgpuBackend, WgpuContext};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubeview-desktop", about = "Textured cube viewer, drag to rotate")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Surface width in physical pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Surface height in physical pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Surface identifier, also used as the window title
    #[arg(long)]
    id: Option<String>,

    /// Texture image (PNG, JPEG or BMP); a checkerboard is drawn when omitted
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Pointer pixels per radian of rotation
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    speed: f32,
}

/// Schedules the next frame as a redraw of the window.
struct WinitScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for WinitScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

struct Running {
    scene: CubeScene<WgpuBackend>,
    frames: FrameLoop<WinitScheduler>,
}

struct CubeApp {
    surface: SurfaceDesc,
    settings: SceneSettings,
    texture: Option<PendingTexture>,
    interaction: InteractionState,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl CubeApp {
    fn new(surface: SurfaceDesc, settings: SceneSettings, texture: PendingTexture) -> Self {
        Self {
            surface,
            settings,
            texture: Some(texture),
            interaction: InteractionState::new(),
            running: None,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop, texture: PendingTexture) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title(self.surface.id.clone())
            .with_inner_size(PhysicalSize::new(self.surface.width, self.surface.height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let scene = CubeScene::initialize(
            WgpuContext::new(window.clone()),
            &self.surface,
            SceneAssets {
                vertex_source: CUBE_VERTEX_SHADER,
                fragment_source: CUBE_FRAGMENT_SHADER,
                texture,
            },
            self.settings,
        )
        .context("scene initialization failed")?;

        let mut frames = FrameLoop::new(WinitScheduler { window });
        frames.start();
        Ok(Running { scene, frames })
    }

    fn pointer(&mut self, event: PointerEvent) {
        if self.interaction.apply(event) {
            tracing::trace!(
                x = self.interaction.angle_x,
                y = self.interaction.angle_y,
                "drag"
            );
        }
    }
}

impl ApplicationHandler for CubeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Initialization runs once; the pending texture is consumed by it.
        let Some(texture) = self.texture.take() else {
            return;
        };
        match self.start(event_loop, texture) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(running) = &self.running {
                    running.frames.stop_handle().stop();
                }
                event_loop.exit();
            }
            WindowEvent::MouseInput { state, .. } => self.pointer(button_event(state)),
            WindowEvent::CursorMoved { position, .. } => self.pointer(cursor_event(position)),
            WindowEvent::RedrawRequested => {
                let Some(running) = &mut self.running else {
                    return;
                };
                let scene = &mut running.scene;
                let interaction = &self.interaction;
                let state = running.frames.frame(|| match scene.render_tick(interaction) {
                    Ok(()) => {}
                    Err(FrameError::SurfaceReconfigured) => {
                        tracing::debug!("surface reconfigured, frame skipped")
                    }
                    Err(e) => tracing::error!("frame error: {e}"),
                });
                if state == LoopState::Stopped {
                    tracing::debug!(frames = running.frames.frames(), "frame loop stopped");
                }
            }
            _ => {}
        }
    }
}

/// Any mouse button starts or ends a drag.
fn button_event(state: ElementState) -> PointerEvent {
    match state {
        ElementState::Pressed => PointerEvent::Down,
        ElementState::Released => PointerEvent::Up,
    }
}

fn cursor_event(position: PhysicalPosition<f64>) -> PointerEvent {
    PointerEvent::Move {
        x: position.x as f32,
        y: position.y as f32,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let surface = SurfaceDesc::new(cli.id, Some(cli.width), Some(cli.height));
    tracing::info!(id = %surface.id, "cubeview-desktop starting");

    // Started before the event loop so decoding overlaps with GPU setup.
    let texture = match cli.texture {
        Some(path) => TextureLoader::new().load(path, None),
        None => PendingTexture::ready(TextureImage::checkerboard("checkerboard", 256, 8)),
    };

    let settings = SceneSettings {
        speed: cli.speed,
        ..SceneSettings::default()
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = CubeApp::new(surface, settings, texture);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_map_to_drag_edges() {
        assert_eq!(button_event(ElementState::Pressed), PointerEvent::Down);
        assert_eq!(button_event(ElementState::Released), PointerEvent::Up);
    }

    #[test]
    fn cursor_maps_to_absolute_move() {
        let event = cursor_event(PhysicalPosition::new(150.0, 120.0));
        assert_eq!(event, PointerEvent::Move { x: 150.0, y: 120.0 });
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["cubeview-desktop"]);
        assert_eq!((cli.width, cli.height), (800, 600));
        assert_eq!(cli.speed, 50.0);
        assert!(cli.texture.is_none());
        assert!(cli.id.is_none());
    }
}
