use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU64;

use cubeview_assets::TextureImage;
use cubeview_kernel::DepthRange;
use cubeview_render::{
    BufferHandle, BufferKind, FilterMode, FrameError, FramePass, ProgramHandle, RenderBackend,
    SamplerDesc, ShaderHandle, ShaderStage, TextureHandle, UniformLocation, VertexLayout, WrapMode,
};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::reflect::{self, MergedBinding, ResourceKind, ShaderInterface};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Texels are stored as given, without sRGB decoding on sample.
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct CompiledShader {
    module: wgpu::ShaderModule,
    interface: ShaderInterface,
}

struct UniformSlot {
    location: UniformLocation,
    size: u64,
    buffer: wgpu::Buffer,
}

/// Group holding the sampled texture and its sampler.
#[derive(Clone, Copy)]
struct TextureGroup {
    group: u32,
    texture: u32,
    sampler: u32,
}

struct LinkedProgram {
    vertex: ShaderHandle,
    fragment: ShaderHandle,
    attributes: BTreeMap<String, u32>,
    uniforms: BTreeMap<String, UniformSlot>,
    groups: BTreeMap<u32, Vec<MergedBinding>>,
    layouts: Vec<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_bind_groups: Vec<(u32, wgpu::BindGroup)>,
    texture_group: Option<TextureGroup>,
    pipeline: Option<(wgpu::RenderPipeline, BufferHandle)>,
}

struct GpuTexture {
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

fn slot<T>(items: &[T], id: u32) -> Option<&T> {
    items.get((id as usize).checked_sub(1)?)
}

fn slot_mut<T>(items: &mut [T], id: u32) -> Option<&mut T> {
    items.get_mut((id as usize).checked_sub(1)?)
}

/// wgpu implementation of the GL-style [`RenderBackend`].
///
/// Linking is deferred: `link_program` builds layouts and uniform buffers,
/// `validate_program` builds the uniform bind groups, and the render pipeline
/// is created once the vertex layout is known.
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    shaders: Vec<CompiledShader>,
    programs: Vec<LinkedProgram>,
    buffers: Vec<wgpu::Buffer>,
    textures: Vec<GpuTexture>,
    current_program: Option<ProgramHandle>,
    texture_bind_groups: HashMap<(ProgramHandle, TextureHandle), wgpu::BindGroup>,
}

impl WgpuBackend {
    pub(crate) fn new(
        surface: wgpu::Surface<'static>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        let depth_view = create_depth_view(&device, config.width, config.height);
        Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            shaders: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            textures: Vec::new(),
            current_program: None,
            texture_bind_groups: HashMap::new(),
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Run `f` inside a validation error scope and surface any error as text.
    fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }

    fn texture_bind_group(
        &mut self,
        program: ProgramHandle,
        texture: TextureHandle,
    ) -> Result<Option<&wgpu::BindGroup>, FrameError> {
        let linked = slot(&self.programs, program.0).ok_or(FrameError::UnknownHandle {
            kind: "program",
            id: program.0,
        })?;
        let Some(group) = linked.texture_group else {
            return Ok(None);
        };
        let key = (program, texture);
        if !self.texture_bind_groups.contains_key(&key) {
            let tex = slot(&self.textures, texture.0).ok_or(FrameError::UnknownHandle {
                kind: "texture",
                id: texture.0,
            })?;
            let layout = &linked.layouts[group.group as usize];
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("texture_bind_group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: group.texture,
                        resource: wgpu::BindingResource::TextureView(&tex.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: group.sampler,
                        resource: wgpu::BindingResource::Sampler(&tex.sampler),
                    },
                ],
            });
            self.texture_bind_groups.insert(key, bind_group);
        }
        Ok(self.texture_bind_groups.get(&key))
    }
}

impl RenderBackend for WgpuBackend {
    fn depth_range(&self) -> DepthRange {
        DepthRange::ZeroToOne
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        let interface = reflect::reflect_source(stage, source)?;
        let label = format!("{stage}_shader");
        let module = self.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;
        tracing::debug!(%stage, entry = %interface.entry_point, "shader compiled");
        self.shaders.push(CompiledShader { module, interface });
        Ok(ShaderHandle(self.shaders.len() as u32))
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, String> {
        let vs = slot(&self.shaders, vertex.0).ok_or("unknown vertex shader handle")?;
        let fs = slot(&self.shaders, fragment.0).ok_or("unknown fragment shader handle")?;
        if vs.interface.stage != ShaderStage::Vertex
            || fs.interface.stage != ShaderStage::Fragment
        {
            return Err("program needs one vertex and one fragment shader".into());
        }
        reflect::check_stage_link(&vs.interface, &fs.interface)?;
        let groups = reflect::merge_resources(&vs.interface, &fs.interface)?;

        let group_count = groups.keys().next_back().map_or(0, |g| g + 1);
        let mut layouts = Vec::with_capacity(group_count as usize);
        for group in 0..group_count {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = groups
                .get(&group)
                .map(|bindings| bindings.iter().map(layout_entry).collect())
                .unwrap_or_default();
            let layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("program_bind_group_layout"),
                entries: &entries,
            });
            layouts.push(layout);
        }
        let layout_refs: Vec<&wgpu::BindGroupLayout> = layouts.iter().collect();
        let pipeline_layout = self.scoped(|device| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("program_pipeline_layout"),
                bind_group_layouts: &layout_refs,
                push_constant_ranges: &[],
            })
        })?;

        let mut uniforms = BTreeMap::new();
        for (&group, bindings) in &groups {
            for b in bindings {
                if let ResourceKind::Uniform { size } = b.kind {
                    let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(&b.name),
                        size: u64::from(size),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    });
                    uniforms.insert(
                        b.name.clone(),
                        UniformSlot {
                            location: UniformLocation {
                                group,
                                binding: b.binding,
                            },
                            size: u64::from(size),
                            buffer,
                        },
                    );
                }
            }
        }

        let attributes = vs
            .interface
            .inputs
            .iter()
            .map(|v| (v.name.clone(), v.location))
            .collect();

        self.programs.push(LinkedProgram {
            vertex,
            fragment,
            attributes,
            uniforms,
            groups,
            layouts,
            pipeline_layout,
            uniform_bind_groups: Vec::new(),
            texture_group: None,
            pipeline: None,
        });
        Ok(ProgramHandle(self.programs.len() as u32))
    }

    fn validate_program(&mut self, program: ProgramHandle) -> Result<(), String> {
        let linked = slot(&self.programs, program.0).ok_or("unknown program handle")?;

        let mut texture_group = None;
        let mut uniform_groups = Vec::new();
        for (&group, bindings) in &linked.groups {
            let uniforms = bindings
                .iter()
                .filter(|b| matches!(b.kind, ResourceKind::Uniform { .. }))
                .count();
            if uniforms == bindings.len() {
                uniform_groups.push(group);
                continue;
            }
            if uniforms > 0 {
                return Err(format!("group {group} mixes uniforms with textures"));
            }
            let find = |kind: ResourceKind| {
                let mut it = bindings.iter().filter(move |b| b.kind == kind);
                match (it.next(), it.next()) {
                    (Some(b), None) => Ok(b.binding),
                    _ => Err(format!(
                        "group {group} needs exactly one texture and one sampler"
                    )),
                }
            };
            if texture_group.is_some() {
                return Err("program samples more than one texture".into());
            }
            texture_group = Some(TextureGroup {
                group,
                texture: find(ResourceKind::Texture)?,
                sampler: find(ResourceKind::Sampler)?,
            });
        }

        let mut bind_groups = Vec::with_capacity(uniform_groups.len());
        for group in uniform_groups {
            let entries: Vec<wgpu::BindGroupEntry> = linked
                .uniforms
                .values()
                .filter(|u| u.location.group == group)
                .map(|u| wgpu::BindGroupEntry {
                    binding: u.location.binding,
                    resource: u.buffer.as_entire_binding(),
                })
                .collect();
            let layout = &linked.layouts[group as usize];
            let bind_group = self.scoped(|device| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("uniform_bind_group"),
                    layout,
                    entries: &entries,
                })
            })?;
            bind_groups.push((group, bind_group));
        }

        let linked = slot_mut(&mut self.programs, program.0).ok_or("unknown program handle")?;
        linked.uniform_bind_groups = bind_groups;
        linked.texture_group = texture_group;
        Ok(())
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        slot(&self.programs, program.0)?
            .attributes
            .get(name)
            .copied()
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        slot(&self.programs, program.0)?
            .uniforms
            .get(name)
            .map(|u| u.location)
    }

    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> BufferHandle {
        let (label, usage) = match kind {
            BufferKind::Vertex => ("vertex_buffer", wgpu::BufferUsages::VERTEX),
            BufferKind::Index => ("index_buffer", wgpu::BufferUsages::INDEX),
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            });
        self.buffers.push(buffer);
        BufferHandle(self.buffers.len() as u32)
    }

    fn set_vertex_layout(
        &mut self,
        program: ProgramHandle,
        buffer: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<(), String> {
        if slot(&self.buffers, buffer.0).is_none() {
            return Err(format!("unknown buffer handle {}", buffer.0));
        }
        let linked = slot(&self.programs, program.0).ok_or("unknown program handle")?;
        for (name, location) in &linked.attributes {
            if !layout.attributes.iter().any(|a| a.location == *location) {
                return Err(format!(
                    "attribute '{name}' at location {location} is not enabled"
                ));
            }
        }
        let attributes = layout
            .attributes
            .iter()
            .map(|a| {
                Ok(wgpu::VertexAttribute {
                    format: vertex_format(a.components)?,
                    offset: a.offset,
                    shader_location: a.location,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        let (vs, fs) = match (
            slot(&self.shaders, linked.vertex.0),
            slot(&self.shaders, linked.fragment.0),
        ) {
            (Some(vs), Some(fs)) => (vs, fs),
            _ => return Err("program shaders are gone".into()),
        };
        let format = self.config.format;
        let pipeline = self.scoped(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("cube_pipeline"),
                layout: Some(&linked.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vs.module,
                    entry_point: Some(&vs.interface.entry_point),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: layout.stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fs.module,
                    entry_point: Some(&fs.interface.entry_point),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        })?;

        let linked = slot_mut(&mut self.programs, program.0).ok_or("unknown program handle")?;
        linked.pipeline = Some((pipeline, buffer));
        Ok(())
    }

    fn create_texture(
        &mut self,
        image: &TextureImage,
        sampler: &SamplerDesc,
    ) -> Result<TextureHandle, String> {
        check_texture_size(
            image.width,
            image.height,
            self.device.limits().max_texture_dimension_2d,
        )?;
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = self.scoped(|device| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&image.id),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &image.rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(image.bytes_per_row()),
                    rows_per_image: Some(image.height),
                },
                size,
            );
            texture
        })?;
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: address_mode(sampler.wrap_s),
            address_mode_v: address_mode(sampler.wrap_t),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter_mode(sampler.mag_filter),
            min_filter: filter_mode(sampler.min_filter),
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        self.textures.push(GpuTexture {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler,
        });
        Ok(TextureHandle(self.textures.len() as u32))
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        let Some(linked) = self
            .current_program
            .and_then(|p| slot(&self.programs, p.0))
        else {
            tracing::warn!(?location, "uniform set with no program in use");
            return;
        };
        let Some(uniform) = linked.uniforms.values().find(|u| u.location == location) else {
            tracing::warn!(?location, "no uniform at location");
            return;
        };
        let bytes = value.to_cols_array();
        if uniform.size != std::mem::size_of_val(&bytes) as u64 {
            tracing::warn!(?location, size = uniform.size, "uniform is not a mat4");
            return;
        }
        self.queue
            .write_buffer(&uniform.buffer, 0, bytemuck::cast_slice(&bytes));
    }

    fn draw_frame(&mut self, pass: &FramePass) -> Result<(), FrameError> {
        if self.current_program != Some(pass.program) {
            return Err(FrameError::Backend(format!(
                "program {} is not in use",
                pass.program.0
            )));
        }
        if pass.texture_unit != 0 {
            return Err(FrameError::Backend(format!(
                "texture unit {} is not bound by any program",
                pass.texture_unit
            )));
        }
        let unknown_buffer = |b: BufferHandle| FrameError::UnknownHandle {
            kind: "buffer",
            id: b.0,
        };
        if slot(&self.buffers, pass.vertex_buffer.0).is_none() {
            return Err(unknown_buffer(pass.vertex_buffer));
        }
        if slot(&self.buffers, pass.index_buffer.0).is_none() {
            return Err(unknown_buffer(pass.index_buffer));
        }
        if slot(&self.textures, pass.texture.0).is_none() {
            return Err(FrameError::UnknownHandle {
                kind: "texture",
                id: pass.texture.0,
            });
        }
        // Built up front so the borrow below only needs shared access.
        self.texture_bind_group(pass.program, pass.texture)?;

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(FrameError::SurfaceReconfigured);
            }
            Err(wgpu::SurfaceError::Timeout) => return Err(FrameError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(FrameError::OutOfMemory),
            Err(e) => return Err(FrameError::Backend(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let linked = slot(&self.programs, pass.program.0).ok_or(FrameError::UnknownHandle {
            kind: "program",
            id: pass.program.0,
        })?;
        let Some((pipeline, _)) = &linked.pipeline else {
            return Err(FrameError::Backend("program has no vertex layout".into()));
        };
        let texture_bind_group = self.texture_bind_groups.get(&(pass.program, pass.texture));
        let (vertex_buffer, index_buffer) = match (
            slot(&self.buffers, pass.vertex_buffer.0),
            slot(&self.buffers, pass.index_buffer.0),
        ) {
            (Some(v), Some(i)) => (v, i),
            _ => return Err(unknown_buffer(pass.vertex_buffer)),
        };

        let [r, g, b, a] = pass.clear_color;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pass.clear_depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            rpass.set_pipeline(pipeline);
            for (group, bind_group) in &linked.uniform_bind_groups {
                rpass.set_bind_group(*group, bind_group, &[]);
            }
            if let (Some(group), Some(bind_group)) = (linked.texture_group, texture_bind_group) {
                rpass.set_bind_group(group.group, bind_group, &[]);
            }
            rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
            rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..pass.index_count, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        tracing::trace!(indices = pass.index_count, "frame presented");
        Ok(())
    }
}

fn layout_entry(b: &MergedBinding) -> wgpu::BindGroupLayoutEntry {
    let mut visibility = wgpu::ShaderStages::NONE;
    if b.vertex {
        visibility |= wgpu::ShaderStages::VERTEX;
    }
    if b.fragment {
        visibility |= wgpu::ShaderStages::FRAGMENT;
    }
    let ty = match b.kind {
        ResourceKind::Uniform { size } => wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(u64::from(size)),
        },
        ResourceKind::Texture => wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        ResourceKind::Sampler => wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
    };
    wgpu::BindGroupLayoutEntry {
        binding: b.binding,
        visibility,
        ty,
        count: None,
    }
}

fn check_texture_size(width: u32, height: u32, max: u32) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("texture is empty ({width}x{height})"));
    }
    if width > max || height > max {
        return Err(format!(
            "texture is {width}x{height}, device limit is {max}x{max}"
        ));
    }
    Ok(())
}

fn vertex_format(components: u32) -> Result<wgpu::VertexFormat, String> {
    match components {
        1 => Ok(wgpu::VertexFormat::Float32),
        2 => Ok(wgpu::VertexFormat::Float32x2),
        3 => Ok(wgpu::VertexFormat::Float32x3),
        4 => Ok(wgpu::VertexFormat::Float32x4),
        n => Err(format!("unsupported attribute size {n}")),
    }
}

fn address_mode(wrap: WrapMode) -> wgpu::AddressMode {
    match wrap {
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
    }
}

fn filter_mode(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Linear => wgpu::FilterMode::Linear,
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_sizes_map_to_float_formats() {
        assert_eq!(vertex_format(3).unwrap(), wgpu::VertexFormat::Float32x3);
        assert_eq!(vertex_format(2).unwrap(), wgpu::VertexFormat::Float32x2);
        assert!(vertex_format(5).is_err());
    }

    #[test]
    fn clamp_linear_maps_to_wgpu() {
        let s = SamplerDesc::CLAMP_LINEAR;
        assert_eq!(address_mode(s.wrap_s), wgpu::AddressMode::ClampToEdge);
        assert_eq!(address_mode(s.wrap_t), wgpu::AddressMode::ClampToEdge);
        assert_eq!(filter_mode(s.min_filter), wgpu::FilterMode::Linear);
        assert_eq!(filter_mode(s.mag_filter), wgpu::FilterMode::Linear);
    }

    #[test]
    fn oversized_texture_is_rejected() {
        let max = wgpu::Limits::default().max_texture_dimension_2d;
        assert!(check_texture_size(256, 256, max).is_ok());
        assert!(check_texture_size(max, max, max).is_ok());
        let err = check_texture_size(10_000, 16, 8192).unwrap_err();
        assert_eq!(err, "texture is 10000x16, device limit is 8192x8192");
        assert!(check_texture_size(0, 4, max).is_err());
    }

    #[test]
    fn handle_slots_are_one_based() {
        let items = [10, 20];
        assert_eq!(slot(&items, 0), None);
        assert_eq!(slot(&items, 1), Some(&10));
        assert_eq!(slot(&items, 2), Some(&20));
        assert_eq!(slot(&items, 3), None);
    }

    #[test]
    fn layout_visibility_follows_stages() {
        let entry = layout_entry(&MergedBinding {
            name: "mWorld".into(),
            binding: 0,
            kind: ResourceKind::Uniform { size: 64 },
            vertex: true,
            fragment: false,
        });
        assert_eq!(entry.visibility, wgpu::ShaderStages::VERTEX);
        assert!(matches!(
            entry.ty,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                ..
            }
        ));
    }
}
