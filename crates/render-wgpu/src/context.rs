use std::sync::Arc;

use cubeview_common::SurfaceDesc;
use cubeview_render::{ContextError, ContextProvider};
use winit::window::Window;

use crate::gpu::WgpuBackend;

/// Acquires a wgpu device and a configured surface for a window.
pub struct WgpuContext {
    window: Arc<Window>,
}

impl WgpuContext {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl ContextProvider for WgpuContext {
    type Backend = WgpuBackend;

    fn acquire_context(self, desc: &SurfaceDesc) -> Result<WgpuBackend, ContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(self.window)
            .map_err(|e| ContextError::Surface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(ContextError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubeview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| ContextError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&caps.formats).ok_or_else(|| {
            ContextError::Surface("surface is not supported by the adapter".into())
        })?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: desc.width.max(1),
            height: desc.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            ?format,
            "GPU initialized"
        );
        Ok(WgpuBackend::new(surface, device, queue, config))
    }
}

/// Prefer a linear format so clear colors and texels reach the screen
/// unencoded. Falls back to whatever the surface offers first.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}
