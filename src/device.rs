//! wgpu implementation of [`RenderDevice`].
//!
//! # Binding model
//!
//! Every pipeline uses up to three bind groups:
//! - **Group 0**: vertex stage uniforms (dynamic offset)
//! - **Group 1**: pixel stage uniforms (dynamic offset)
//! - **Group 2**: pixel stage textures, then samplers, in declaration order
//!
//! Each call to [`ShaderStage::copy_all_buffer_data`] appends a snapshot of
//! the stage's uniforms to a staging buffer, so draws within a frame never
//! overwrite each other. Draws are recorded per pass and encoded in one
//! command buffer at [`present`](RenderDevice::present), after the staged
//! uniforms have been written to the GPU.
//!
//! Pipelines are created on first use and cached per vertex stage, pixel
//! stage and pass type.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::path::Path;

use glam::Vec4;

use crate::error::{GlintError, Result};
use crate::gpu::GpuContext;
use crate::handles::{MeshId, SamplerId, ShaderId, TextureId};
use crate::mesh::{Mesh, MeshData, Vertex3d};
use crate::renderer::{PassKind, RenderDevice};
use crate::shader::{
    SamplerKind, ShaderDesc, ShaderStage, StageKind, StageState, TextureKind, UNIFORM_SLOT_ALIGN,
};
use crate::texture::{self, ColorSpace, DEPTH_FORMAT, Texture, TextureData};

/// Initial uniform capacity per stage, in snapshots.
const INITIAL_SLOTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum PassTarget {
    Shadow,
    Main,
    Sky,
}

impl From<PassKind> for PassTarget {
    fn from(kind: PassKind) -> Self {
        match kind {
            PassKind::Shadow { .. } => Self::Shadow,
            PassKind::Main { .. } => Self::Main,
            PassKind::Sky => Self::Sky,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PipelineKey {
    vertex: ShaderId,
    pixel: Option<ShaderId>,
    target: PassTarget,
}

struct GpuShader {
    state: StageState,
    module: wgpu::ShaderModule,
    /// Group 2 layout; vertex stages have none.
    resource_layout: Option<wgpu::BindGroupLayout>,
    buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

struct DrawRecord {
    mesh: MeshId,
    pipeline: PipelineKey,
    vertex_offset: u32,
    pixel: Option<(u32, wgpu::BindGroup)>,
}

struct PassRecord {
    kind: PassKind,
    draws: Vec<DrawRecord>,
}

/// Handles to the built-in shader stages.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinShaders {
    pub main_vertex: ShaderId,
    pub main_pixel: ShaderId,
    pub shadow_vertex: ShaderId,
    pub sky_vertex: ShaderId,
    pub sky_pixel: ShaderId,
}

impl BuiltinShaders {
    pub fn load(device: &mut WgpuDevice) -> Self {
        Self {
            main_vertex: device.add_shader(ShaderDesc::main_vertex()),
            main_pixel: device.add_shader(ShaderDesc::main_pixel()),
            shadow_vertex: device.add_shader(ShaderDesc::shadow_vertex()),
            sky_vertex: device.add_shader(ShaderDesc::sky_vertex()),
            sky_pixel: device.add_shader(ShaderDesc::sky_pixel()),
        }
    }
}

/// Owns the GPU context and every resource the renderer refers to by handle.
pub struct WgpuDevice {
    gpu: GpuContext,
    meshes: Vec<Mesh>,
    textures: Vec<Texture>,
    samplers: Vec<wgpu::Sampler>,
    shaders: Vec<GpuShader>,
    vertex_uniform_layout: wgpu::BindGroupLayout,
    pixel_uniform_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    depth: Texture,
    shadow_texture: TextureId,
    shadow_sampler: SamplerId,
    clear_color: Vec4,
    passes: Vec<PassRecord>,
    bound_vertex: Option<ShaderId>,
    bound_pixel: Option<ShaderId>,
}

impl WgpuDevice {
    pub fn new(gpu: GpuContext, shadow_resolution: u32) -> Self {
        let vertex_uniform_layout =
            uniform_layout(&gpu.device, wgpu::ShaderStages::VERTEX, "Vertex Uniform Layout");
        let pixel_uniform_layout =
            uniform_layout(&gpu.device, wgpu::ShaderStages::FRAGMENT, "Pixel Uniform Layout");
        let depth = Texture::depth(&gpu.device, gpu.width(), gpu.height(), "Main Depth");

        let mut device = Self {
            gpu,
            meshes: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
            shaders: Vec::new(),
            vertex_uniform_layout,
            pixel_uniform_layout,
            pipelines: HashMap::new(),
            depth,
            shadow_texture: TextureId(0),
            shadow_sampler: SamplerId(0),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            passes: Vec::new(),
            bound_vertex: None,
            bound_pixel: None,
        };

        let shadow = Texture::depth(
            &device.gpu.device,
            shadow_resolution,
            shadow_resolution,
            "Shadow Map",
        );
        device.shadow_texture = device.push_texture(shadow);
        device.shadow_sampler = device.add_sampler(SamplerKind::Comparison);
        log::debug!("shadow map {shadow_resolution}x{shadow_resolution}");
        device
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn aspect(&self) -> f32 {
        self.gpu.aspect()
    }

    /// Resizes the surface and the main depth buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.depth = Texture::depth(&self.gpu.device, width, height, "Main Depth");
    }

    pub fn add_mesh(&mut self, data: &MeshData) -> MeshId {
        self.meshes.push(Mesh::new(&self.gpu.device, data));
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_texture(&mut self, data: &TextureData, color_space: ColorSpace, label: &str) -> TextureId {
        let texture = Texture::from_data(&self.gpu.device, &self.gpu.queue, data, color_space, label);
        self.push_texture(texture)
    }

    /// Loads and uploads an image file.
    pub fn load_texture(&mut self, path: impl AsRef<Path>, color_space: ColorSpace) -> Result<TextureId> {
        let path = path.as_ref();
        let data = TextureData::from_file(path)?;
        Ok(self.add_texture(&data, color_space, &path.display().to_string()))
    }

    /// Uploads six faces as a cube texture.
    pub fn add_cube_texture(&mut self, faces: &[TextureData], label: &str) -> Result<TextureId> {
        let texture = Texture::cube(&self.gpu.device, &self.gpu.queue, faces, label)?;
        Ok(self.push_texture(texture))
    }

    pub fn add_sampler(&mut self, kind: SamplerKind) -> SamplerId {
        let label = match kind {
            SamplerKind::Filtering => "Basic Sampler",
            SamplerKind::Comparison => "Shadow Sampler",
        };
        self.samplers
            .push(texture::create_sampler(&self.gpu.device, kind, label));
        SamplerId(self.samplers.len() - 1)
    }

    /// Compiles a shader stage and allocates its uniform storage.
    pub fn add_shader(&mut self, desc: ShaderDesc) -> ShaderId {
        let device = &self.gpu.device;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });

        let resource_layout = match desc.kind {
            StageKind::Vertex => None,
            StageKind::Pixel => Some(resource_layout(device, &desc)),
        };

        let state = StageState::new(desc);
        let layout = self.uniform_layout_for(state.desc().kind);
        let capacity = INITIAL_SLOTS * slot_size(&state);
        let (buffer, uniform_bind_group) =
            uniform_storage(device, layout, capacity, state.block().size(), state.desc().label);

        log::debug!(
            "shader {} ({:?}): {} uniform bytes",
            state.desc().label,
            state.desc().kind,
            state.block().size()
        );
        self.shaders.push(GpuShader {
            state,
            module,
            resource_layout,
            buffer,
            uniform_bind_group,
        });
        ShaderId(self.shaders.len() - 1)
    }

    fn push_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    fn uniform_layout_for(&self, kind: StageKind) -> &wgpu::BindGroupLayout {
        match kind {
            StageKind::Vertex => &self.vertex_uniform_layout,
            StageKind::Pixel => &self.pixel_uniform_layout,
        }
    }

    fn shader(&self, id: ShaderId) -> Result<&GpuShader> {
        self.shaders.get(id.0).ok_or(GlintError::UnknownShader(id))
    }

    /// Latest uniform snapshot of a stage, taking one if none exists yet.
    fn snapshot_offset(&mut self, id: ShaderId) -> Result<u32> {
        let shader = self
            .shaders
            .get_mut(id.0)
            .ok_or(GlintError::UnknownShader(id))?;
        if shader.state.current_offset().is_none() {
            shader.state.copy_all_buffer_data();
        }
        Ok(shader.state.current_offset().unwrap_or(0))
    }

    fn resource_bind_group(&self, id: ShaderId) -> Result<wgpu::BindGroup> {
        let shader = self.shader(id)?;
        let layout = shader
            .resource_layout
            .as_ref()
            .ok_or(GlintError::UnknownShader(id))?;
        let state = &shader.state;

        let desc = state.desc();
        let mut entries = Vec::new();
        for (binding, (texture, &(slot, kind))) in state.textures().iter().zip(&desc.textures).enumerate() {
            let id = texture.ok_or(GlintError::UnboundSlot {
                stage: desc.label,
                slot,
            })?;
            let texture = self.textures.get(id.0).ok_or(GlintError::UnknownTexture(id))?;
            ensure_texture_kind(desc.label, slot, kind, texture.kind())?;
            entries.push(wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        let first_sampler = desc.textures.len();
        for (index, (sampler, &(slot, _))) in state.samplers().iter().zip(&desc.samplers).enumerate() {
            let id = sampler.ok_or(GlintError::UnboundSlot {
                stage: desc.label,
                slot,
            })?;
            let sampler = self.samplers.get(id.0).ok_or(GlintError::UnknownSampler(id))?;
            entries.push(wgpu::BindGroupEntry {
                binding: (first_sampler + index) as u32,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }

        Ok(self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(desc.label),
            layout,
            entries: &entries,
        }))
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) -> Result<()> {
        if self.pipelines.contains_key(&key) {
            return Ok(());
        }

        let vertex = self.shader(key.vertex)?;
        let pixel = key.pixel.map(|id| self.shader(id)).transpose()?;

        let mut layouts = vec![&self.vertex_uniform_layout];
        if let Some(pixel) = pixel {
            layouts.push(&self.pixel_uniform_layout);
            if let Some(resources) = &pixel.resource_layout {
                layouts.push(resources);
            }
        }

        let device = &self.gpu.device;
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glint Pipeline Layout"),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let targets = [Some(wgpu::ColorTargetState {
            format: self.gpu.config.format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let fragment = pixel.map(|pixel| wgpu::FragmentState {
            module: &pixel.module,
            entry_point: Some(pixel.state.desc().entry_point),
            targets: &targets,
            compilation_options: Default::default(),
        });

        let (cull_mode, depth_write_enabled, depth_compare, bias) = match key.target {
            PassTarget::Shadow => (
                Some(wgpu::Face::Back),
                true,
                wgpu::CompareFunction::Less,
                wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            ),
            PassTarget::Main => (
                Some(wgpu::Face::Back),
                true,
                wgpu::CompareFunction::Less,
                wgpu::DepthBiasState::default(),
            ),
            PassTarget::Sky => (
                Some(wgpu::Face::Front),
                false,
                wgpu::CompareFunction::LessEqual,
                wgpu::DepthBiasState::default(),
            ),
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(vertex.state.desc().label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: Some(vertex.state.desc().entry_point),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
                front_face: wgpu::FrontFace::Cw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare,
                stencil: wgpu::StencilState::default(),
                bias,
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!("created pipeline {key:?}");
        self.pipelines.insert(key, pipeline);
        Ok(())
    }

    fn record_draw(&mut self, mesh: MeshId) -> Result<()> {
        if mesh.0 >= self.meshes.len() {
            return Err(GlintError::UnknownMesh(mesh));
        }
        let vertex = self.bound_vertex.ok_or(GlintError::NoVertexShader)?;
        let Some(kind) = self.passes.last().map(|pass| pass.kind) else {
            log::warn!("draw issued outside a pass");
            return Ok(());
        };

        let vertex_offset = self.snapshot_offset(vertex)?;
        let pixel = match self.bound_pixel {
            Some(id) => {
                let offset = self.snapshot_offset(id)?;
                Some((offset, self.resource_bind_group(id)?))
            }
            None => None,
        };

        let pipeline = PipelineKey {
            vertex,
            pixel: self.bound_pixel,
            target: kind.into(),
        };
        self.ensure_pipeline(pipeline)?;

        if let Some(pass) = self.passes.last_mut() {
            pass.draws.push(DrawRecord {
                mesh,
                pipeline,
                vertex_offset,
                pixel,
            });
        }
        Ok(())
    }

    /// Writes this frame's uniform snapshots, growing buffers as needed.
    fn upload_uniforms(&mut self) {
        let device = &self.gpu.device;
        for shader in &mut self.shaders {
            let staging = shader.state.staging();
            if staging.is_empty() {
                continue;
            }
            if staging.len() as u64 > shader.buffer.size() {
                let capacity = staging.len().next_power_of_two();
                let layout = match shader.state.desc().kind {
                    StageKind::Vertex => &self.vertex_uniform_layout,
                    StageKind::Pixel => &self.pixel_uniform_layout,
                };
                let (buffer, bind_group) = uniform_storage(
                    device,
                    layout,
                    capacity,
                    shader.state.block().size(),
                    shader.state.desc().label,
                );
                log::debug!("{}: uniform buffer grown to {capacity} bytes", shader.state.desc().label);
                shader.buffer = buffer;
                shader.uniform_bind_group = bind_group;
            }
            self.gpu.queue.write_buffer(&shader.buffer, 0, staging);
        }
    }

    fn encode_passes(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let clear = wgpu::Color {
            r: f64::from(self.clear_color.x),
            g: f64::from(self.clear_color.y),
            b: f64::from(self.clear_color.z),
            a: f64::from(self.clear_color.w),
        };
        let mut color_cleared = false;
        let mut depth_cleared = false;
        let mut shadow_cleared = false;

        for pass in &self.passes {
            let shadow_view = &self.textures[self.shadow_texture.0].view;
            let (color_view, depth_view, depth_load) = match pass.kind {
                PassKind::Shadow { .. } => {
                    let load = clear_once(&mut shadow_cleared);
                    (None, shadow_view, load)
                }
                PassKind::Main { .. } | PassKind::Sky => {
                    let load = clear_once(&mut depth_cleared);
                    (Some(target), &self.depth.view, load)
                }
            };
            let color_attachment = color_view.map(|view| {
                let load = if color_cleared {
                    wgpu::LoadOp::Load
                } else {
                    wgpu::LoadOp::Clear(clear)
                };
                color_cleared = true;
                wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }
            });
            let color_attachments = [color_attachment];

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(match pass.kind {
                    PassKind::Shadow { .. } => "Shadow Pass",
                    PassKind::Main { .. } => "Main Pass",
                    PassKind::Sky => "Sky Pass",
                }),
                color_attachments: if color_attachments[0].is_some() {
                    &color_attachments[..]
                } else {
                    &[]
                },
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let PassKind::Main { width, height } = pass.kind {
                let width = width.clamp(1, self.depth.width);
                let height = height.clamp(1, self.depth.height);
                render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
            }

            for draw in &pass.draws {
                let (Some(pipeline), Some(mesh)) =
                    (self.pipelines.get(&draw.pipeline), self.meshes.get(draw.mesh.0))
                else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(
                    0,
                    &self.shaders[draw.pipeline.vertex.0].uniform_bind_group,
                    &[draw.vertex_offset],
                );
                if let (Some(pixel), Some((offset, resources))) = (draw.pipeline.pixel, &draw.pixel) {
                    render_pass.set_bind_group(1, &self.shaders[pixel.0].uniform_bind_group, &[*offset]);
                    render_pass.set_bind_group(2, resources, &[]);
                }
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        if !color_cleared {
            // Nothing drew to the back buffer; still show the clear color
            let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
    }
}

impl RenderDevice for WgpuDevice {
    fn begin_frame(&mut self, clear_color: Vec4) {
        self.clear_color = clear_color;
        self.passes.clear();
        self.bound_vertex = None;
        self.bound_pixel = None;
        for shader in &mut self.shaders {
            shader.state.reset_frame();
        }
    }

    fn begin_pass(&mut self, pass: PassKind) {
        match pass {
            PassKind::Shadow { resolution } => {
                let current = &self.textures[self.shadow_texture.0];
                if current.width != resolution.max(1) {
                    log::debug!("shadow map resized to {resolution}");
                    self.textures[self.shadow_texture.0] =
                        Texture::depth(&self.gpu.device, resolution, resolution, "Shadow Map");
                }
            }
            PassKind::Main { width, height } => {
                if (width, height) != (self.depth.width, self.depth.height) && width > 0 && height > 0 {
                    self.depth = Texture::depth(&self.gpu.device, width, height, "Main Depth");
                }
            }
            PassKind::Sky => {}
        }
        self.passes.push(PassRecord {
            kind: pass,
            draws: Vec::new(),
        });
    }

    fn bind_vertex_shader(&mut self, shader: ShaderId) {
        self.bound_vertex = Some(shader);
    }

    fn bind_pixel_shader(&mut self, shader: Option<ShaderId>) {
        self.bound_pixel = shader;
    }

    fn stage(&mut self, shader: ShaderId) -> Option<&mut dyn ShaderStage> {
        self.shaders
            .get_mut(shader.0)
            .map(|shader| &mut shader.state as &mut dyn ShaderStage)
    }

    fn draw(&mut self, mesh: MeshId) {
        match self.record_draw(mesh) {
            Ok(()) => {}
            Err(err @ GlintError::UnboundSlot { .. }) => log::debug!("skipping draw of {mesh:?}: {err}"),
            Err(err) => log::warn!("skipping draw of {mesh:?}: {err}"),
        }
    }

    fn viewport_size(&self) -> (u32, u32) {
        (self.gpu.width(), self.gpu.height())
    }

    fn shadow_map(&self) -> (TextureId, SamplerId) {
        (self.shadow_texture, self.shadow_sampler)
    }

    fn present(&mut self) -> Result<()> {
        self.upload_uniforms();

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.encode_passes(&mut encoder, &view);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// A view only binds to slots of its own kind.
fn ensure_texture_kind(
    stage: &'static str,
    slot: &'static str,
    expected: TextureKind,
    found: TextureKind,
) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(GlintError::TextureKindMismatch {
            stage,
            slot,
            expected,
            found,
        })
    }
}

fn clear_once(cleared: &mut bool) -> wgpu::LoadOp<f32> {
    if std::mem::replace(cleared, true) {
        wgpu::LoadOp::Load
    } else {
        wgpu::LoadOp::Clear(1.0)
    }
}

fn slot_size(state: &StageState) -> usize {
    state.block().size().next_multiple_of(UNIFORM_SLOT_ALIGN)
}

fn uniform_layout(
    device: &wgpu::Device,
    visibility: wgpu::ShaderStages,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_storage(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
    block_size: usize,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(block_size as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn resource_layout(device: &wgpu::Device, desc: &ShaderDesc) -> wgpu::BindGroupLayout {
    let textures = desc.textures.iter().map(|(_, kind)| {
        let (sample_type, view_dimension) = match kind {
            TextureKind::D2 => (
                wgpu::TextureSampleType::Float { filterable: true },
                wgpu::TextureViewDimension::D2,
            ),
            TextureKind::Depth => (wgpu::TextureSampleType::Depth, wgpu::TextureViewDimension::D2),
            TextureKind::Cube => (
                wgpu::TextureSampleType::Float { filterable: true },
                wgpu::TextureViewDimension::Cube,
            ),
        };
        wgpu::BindingType::Texture {
            sample_type,
            view_dimension,
            multisampled: false,
        }
    });
    let samplers = desc.samplers.iter().map(|(_, kind)| {
        wgpu::BindingType::Sampler(match kind {
            SamplerKind::Filtering => wgpu::SamplerBindingType::Filtering,
            SamplerKind::Comparison => wgpu::SamplerBindingType::Comparison,
        })
    });

    let entries: Vec<wgpu::BindGroupLayoutEntry> = textures
        .chain(samplers)
        .enumerate()
        .map(|(binding, ty)| wgpu::BindGroupLayoutEntry {
            binding: binding as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty,
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(desc.label),
        entries: &entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TextureKind::D2, TextureKind::D2, true)]
    #[case(TextureKind::Cube, TextureKind::Cube, true)]
    #[case(TextureKind::Depth, TextureKind::Depth, true)]
    #[case(TextureKind::Cube, TextureKind::D2, false)]
    #[case(TextureKind::Depth, TextureKind::D2, false)]
    #[case(TextureKind::D2, TextureKind::Depth, false)]
    fn texture_kind_must_match_slot(
        #[case] expected: TextureKind,
        #[case] found: TextureKind,
        #[case] accepted: bool,
    ) {
        let result = ensure_texture_kind("sky_ps", "SkyTexture", expected, found);
        assert_eq!(result.is_ok(), accepted);
        if let Err(err) = result {
            assert!(matches!(err, GlintError::TextureKindMismatch { .. }));
        }
    }

    #[test]
    fn depth_targets_clear_once_per_frame() {
        let mut cleared = false;
        assert!(matches!(clear_once(&mut cleared), wgpu::LoadOp::Clear(depth) if depth == 1.0));
        assert!(matches!(clear_once(&mut cleared), wgpu::LoadOp::Load));
    }
}
