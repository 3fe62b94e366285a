//! Named shader parameters.
//!
//! Every vertex or pixel stage exposes its uniforms, textures and samplers by
//! name through the [`ShaderStage`] trait. The renderer writes values with the
//! typed setters and then calls
//! [`copy_all_buffer_data`](ShaderStage::copy_all_buffer_data) to snapshot the
//! block for the next draw.
//!
//! [`UniformBlock`] lays the named fields out with WGSL uniform address-space
//! rules so the bytes can be copied straight into a `var<uniform>` struct:
//!
//! | Type        | Align | Size |
//! |-------------|-------|------|
//! | `i32`/`f32` | 4     | 4    |
//! | `vec2<f32>` | 8     | 8    |
//! | `vec3<f32>` | 16    | 12   |
//! | `vec4<f32>` | 16    | 16   |
//! | `mat4x4`    | 16    | 64   |
//! | raw data    | 16    | n    |

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::handles::{SamplerId, TextureId};

/// Dynamic uniform offsets must be multiples of this.
pub const UNIFORM_SLOT_ALIGN: usize = 256;

/// Parameter interface of one compiled shader stage.
///
/// Setters return `false` when the stage has no parameter of that name; the
/// value is then dropped.
pub trait ShaderStage {
    /// Writes raw bytes into a uniform field. Fails if the name is unknown or
    /// the bytes do not fit.
    fn set_data(&mut self, name: &str, data: &[u8]) -> bool;

    fn set_texture(&mut self, name: &str, texture: TextureId) -> bool;

    fn set_sampler(&mut self, name: &str, sampler: SamplerId) -> bool;

    /// Unbinds every texture and sampler slot.
    fn clear_resources(&mut self);

    /// Snapshots the current uniform values for the next draw.
    fn copy_all_buffer_data(&mut self);

    fn set_int(&mut self, name: &str, value: i32) -> bool {
        self.set_data(name, bytemuck::bytes_of(&value))
    }

    fn set_float(&mut self, name: &str, value: f32) -> bool {
        self.set_data(name, bytemuck::bytes_of(&value))
    }

    fn set_float2(&mut self, name: &str, value: Vec2) -> bool {
        self.set_data(name, bytemuck::bytes_of(&value.to_array()))
    }

    fn set_float3(&mut self, name: &str, value: Vec3) -> bool {
        self.set_data(name, bytemuck::bytes_of(&value.to_array()))
    }

    fn set_float4(&mut self, name: &str, value: Vec4) -> bool {
        self.set_data(name, bytemuck::bytes_of(&value.to_array()))
    }

    /// Column-major, matching WGSL `mat4x4<f32>`.
    fn set_matrix4x4(&mut self, name: &str, value: Mat4) -> bool {
        self.set_data(name, bytemuck::bytes_of(&value.to_cols_array()))
    }
}

/// Which pipeline stage a shader runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Pixel,
}

/// Type of a named uniform field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformType {
    Int,
    Float,
    Float2,
    Float3,
    Float4,
    Matrix4x4,
    /// Opaque bytes, e.g. an array of structs.
    Data { size: usize },
}

impl UniformType {
    pub fn align(self) -> usize {
        match self {
            Self::Int | Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 | Self::Float4 | Self::Matrix4x4 | Self::Data { .. } => 16,
        }
    }

    pub fn size(self) -> usize {
        match self {
            Self::Int | Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Matrix4x4 => 64,
            Self::Data { size } => size,
        }
    }
}

/// A named uniform declared by a shader.
#[derive(Clone, Copy, Debug)]
pub struct UniformField {
    pub name: &'static str,
    pub ty: UniformType,
}

impl UniformField {
    pub const fn new(name: &'static str, ty: UniformType) -> Self {
        Self { name, ty }
    }
}

/// Kind of texture a slot expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Filterable `texture_2d<f32>`.
    D2,
    /// `texture_depth_2d`.
    Depth,
    /// Filterable `texture_cube<f32>`.
    Cube,
}

/// Kind of sampler a slot expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    Filtering,
    Comparison,
}

/// Everything needed to build a shader stage: WGSL source plus the names and
/// order of its parameters.
///
/// Uniform fields must be listed in the same order as the WGSL struct at
/// `@binding(0)`. Textures come first in the resource group, followed by
/// samplers, each in listed order.
#[derive(Clone, Debug)]
pub struct ShaderDesc {
    pub label: &'static str,
    pub kind: StageKind,
    pub source: &'static str,
    pub entry_point: &'static str,
    pub uniforms: Vec<UniformField>,
    pub textures: Vec<(&'static str, TextureKind)>,
    pub samplers: Vec<(&'static str, SamplerKind)>,
}

const MAIN_WGSL: &str = include_str!("shaders/main.wgsl");
const SHADOW_WGSL: &str = include_str!("shaders/shadow.wgsl");
const SKY_WGSL: &str = include_str!("shaders/sky.wgsl");

impl ShaderDesc {
    /// Lit vertex stage: transforms into view and light space.
    pub fn main_vertex() -> Self {
        use UniformType::Matrix4x4;
        Self {
            label: "main_vs",
            kind: StageKind::Vertex,
            source: MAIN_WGSL,
            entry_point: "vs_main",
            uniforms: vec![
                UniformField::new("world", Matrix4x4),
                UniformField::new("worldInverseTranspose", Matrix4x4),
                UniformField::new("view", Matrix4x4),
                UniformField::new("projection", Matrix4x4),
                UniformField::new("lightView", Matrix4x4),
                UniformField::new("lightProjection", Matrix4x4),
            ],
            textures: Vec::new(),
            samplers: Vec::new(),
        }
    }

    /// Lit pixel stage: PBR-style shading with a shadowed key light.
    pub fn main_pixel() -> Self {
        use UniformType::*;
        Self {
            label: "main_ps",
            kind: StageKind::Pixel,
            source: MAIN_WGSL,
            entry_point: "fs_main",
            uniforms: vec![
                UniformField::new("colorTint", Float4),
                UniformField::new("cameraPos", Float3),
                UniformField::new("roughness", Float),
                UniformField::new("ambient", Float3),
                UniformField::new("lightCount", Int),
                UniformField::new("uvScale", Float2),
                UniformField::new("uvOffset", Float2),
                UniformField::new(
                    "lights",
                    Data {
                        size: crate::light::LIGHTS_BYTES,
                    },
                ),
            ],
            textures: vec![
                ("Albedo", TextureKind::D2),
                ("NormalMap", TextureKind::D2),
                ("RoughnessMap", TextureKind::D2),
                ("MetalnessMap", TextureKind::D2),
                ("ShadowMap", TextureKind::Depth),
            ],
            samplers: vec![
                ("BasicSampler", SamplerKind::Filtering),
                ("ShadowSampler", SamplerKind::Comparison),
            ],
        }
    }

    /// Depth-only vertex stage for the shadow pass.
    pub fn shadow_vertex() -> Self {
        use UniformType::Matrix4x4;
        Self {
            label: "shadow_vs",
            kind: StageKind::Vertex,
            source: SHADOW_WGSL,
            entry_point: "vs_main",
            uniforms: vec![
                UniformField::new("world", Matrix4x4),
                UniformField::new("view", Matrix4x4),
                UniformField::new("projection", Matrix4x4),
            ],
            textures: Vec::new(),
            samplers: Vec::new(),
        }
    }

    pub fn sky_vertex() -> Self {
        use UniformType::Matrix4x4;
        Self {
            label: "sky_vs",
            kind: StageKind::Vertex,
            source: SKY_WGSL,
            entry_point: "vs_main",
            uniforms: vec![
                UniformField::new("view", Matrix4x4),
                UniformField::new("projection", Matrix4x4),
            ],
            textures: Vec::new(),
            samplers: Vec::new(),
        }
    }

    pub fn sky_pixel() -> Self {
        Self {
            label: "sky_ps",
            kind: StageKind::Pixel,
            source: SKY_WGSL,
            entry_point: "fs_main",
            uniforms: Vec::new(),
            textures: vec![("SkyTexture", TextureKind::Cube)],
            samplers: vec![("BasicSampler", SamplerKind::Filtering)],
        }
    }
}

#[derive(Clone, Debug)]
struct FieldSlot {
    name: &'static str,
    ty: UniformType,
    offset: usize,
}

/// CPU copy of a uniform struct, addressed by field name.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    fields: Vec<FieldSlot>,
    data: Vec<u8>,
}

impl UniformBlock {
    pub fn new(fields: &[UniformField]) -> Self {
        let mut offset = 0usize;
        let slots = fields
            .iter()
            .map(|field| {
                offset = offset.next_multiple_of(field.ty.align());
                let slot = FieldSlot {
                    name: field.name,
                    ty: field.ty,
                    offset,
                };
                offset += field.ty.size();
                slot
            })
            .collect();

        let size = offset.next_multiple_of(16).max(16);
        Self {
            fields: slots,
            data: vec![0; size],
        }
    }

    /// Total size in bytes, padded to a multiple of 16.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.field(name).map(|slot| slot.offset)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Copies `bytes` into the named field. Shorter writes fill the start of
    /// the field; longer ones are rejected.
    pub fn write(&mut self, name: &str, bytes: &[u8]) -> bool {
        let Some(slot) = self.field(name) else {
            return false;
        };
        if bytes.len() > slot.ty.size() {
            return false;
        }
        let start = slot.offset;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        true
    }

    /// Current bytes of the named field.
    pub fn read(&self, name: &str) -> Option<&[u8]> {
        self.field(name)
            .map(|slot| &self.data[slot.offset..slot.offset + slot.ty.size()])
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|slot| slot.name == name)
    }
}

/// CPU-side state of one shader stage.
///
/// Holds the uniform block, the bound texture and sampler per slot, and the
/// uniform snapshots taken this frame. Each call to
/// [`copy_all_buffer_data`](ShaderStage::copy_all_buffer_data) appends the
/// block to a staging buffer at a [`UNIFORM_SLOT_ALIGN`]-aligned offset so
/// every draw keeps its own values.
#[derive(Debug)]
pub struct StageState {
    desc: ShaderDesc,
    block: UniformBlock,
    textures: Vec<Option<TextureId>>,
    samplers: Vec<Option<SamplerId>>,
    staging: Vec<u8>,
    current_offset: Option<u32>,
}

impl StageState {
    pub fn new(desc: ShaderDesc) -> Self {
        let block = UniformBlock::new(&desc.uniforms);
        let textures = vec![None; desc.textures.len()];
        let samplers = vec![None; desc.samplers.len()];
        Self {
            desc,
            block,
            textures,
            samplers,
            staging: Vec::new(),
            current_offset: None,
        }
    }

    pub fn desc(&self) -> &ShaderDesc {
        &self.desc
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    pub fn textures(&self) -> &[Option<TextureId>] {
        &self.textures
    }

    pub fn samplers(&self) -> &[Option<SamplerId>] {
        &self.samplers
    }

    /// Offset of the latest snapshot inside [`staging`](Self::staging).
    pub fn current_offset(&self) -> Option<u32> {
        self.current_offset
    }

    /// All snapshots taken since the last [`reset_frame`](Self::reset_frame).
    pub fn staging(&self) -> &[u8] {
        &self.staging
    }

    pub fn reset_frame(&mut self) {
        self.staging.clear();
        self.current_offset = None;
    }
}

impl ShaderStage for StageState {
    fn set_data(&mut self, name: &str, data: &[u8]) -> bool {
        let written = self.block.write(name, data);
        if !written {
            log::trace!("{}: no uniform named {name}", self.desc.label);
        }
        written
    }

    fn set_texture(&mut self, name: &str, texture: TextureId) -> bool {
        match self.desc.textures.iter().position(|(slot, _)| *slot == name) {
            Some(index) => {
                self.textures[index] = Some(texture);
                true
            }
            None => {
                log::trace!("{}: no texture slot named {name}", self.desc.label);
                false
            }
        }
    }

    fn set_sampler(&mut self, name: &str, sampler: SamplerId) -> bool {
        match self.desc.samplers.iter().position(|(slot, _)| *slot == name) {
            Some(index) => {
                self.samplers[index] = Some(sampler);
                true
            }
            None => {
                log::trace!("{}: no sampler slot named {name}", self.desc.label);
                false
            }
        }
    }

    fn clear_resources(&mut self) {
        self.textures.fill(None);
        self.samplers.fill(None);
    }

    fn copy_all_buffer_data(&mut self) {
        let offset = self.staging.len();
        self.staging.extend_from_slice(self.block.bytes());
        self.staging
            .resize(self.staging.len().next_multiple_of(UNIFORM_SLOT_ALIGN), 0);
        self.current_offset = Some(offset as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::GpuLight;

    #[test]
    fn pixel_block_follows_wgsl_layout() {
        let block = UniformBlock::new(&ShaderDesc::main_pixel().uniforms);
        assert_eq!(block.offset_of("colorTint"), Some(0));
        assert_eq!(block.offset_of("cameraPos"), Some(16));
        assert_eq!(block.offset_of("roughness"), Some(28));
        assert_eq!(block.offset_of("ambient"), Some(32));
        assert_eq!(block.offset_of("lightCount"), Some(44));
        assert_eq!(block.offset_of("uvScale"), Some(48));
        assert_eq!(block.offset_of("uvOffset"), Some(56));
        assert_eq!(block.offset_of("lights"), Some(64));
        assert_eq!(block.size(), 64 + crate::light::MAX_LIGHTS * 48);
    }

    #[test]
    fn vertex_blocks_are_packed_matrices() {
        let main = UniformBlock::new(&ShaderDesc::main_vertex().uniforms);
        assert_eq!(main.size(), 6 * 64);
        assert_eq!(main.offset_of("lightProjection"), Some(5 * 64));

        let shadow = UniformBlock::new(&ShaderDesc::shadow_vertex().uniforms);
        assert_eq!(shadow.size(), 3 * 64);
    }

    #[test]
    fn alignment_padding_between_fields() {
        let block = UniformBlock::new(&[
            UniformField::new("a", UniformType::Float),
            UniformField::new("b", UniformType::Float2),
            UniformField::new("c", UniformType::Float),
            UniformField::new("d", UniformType::Float3),
        ]);
        assert_eq!(block.offset_of("b"), Some(8));
        assert_eq!(block.offset_of("c"), Some(16));
        assert_eq!(block.offset_of("d"), Some(32));
        assert_eq!(block.size(), 48);
    }

    #[test]
    fn empty_block_has_minimum_size() {
        let block = UniformBlock::new(&[]);
        assert_eq!(block.size(), 16);
    }

    #[test]
    fn setters_report_unknown_names() {
        let mut stage = StageState::new(ShaderDesc::main_pixel());
        assert!(stage.set_float("roughness", 0.5));
        assert!(!stage.set_float("metallic", 0.5));
        assert!(stage.set_texture("Albedo", TextureId(2)));
        assert!(!stage.set_texture("Emissive", TextureId(2)));
        assert!(stage.set_sampler("ShadowSampler", SamplerId(1)));
        assert!(!stage.set_sampler("Missing", SamplerId(1)));

        assert_eq!(stage.textures()[0], Some(TextureId(2)));
        assert_eq!(stage.samplers()[1], Some(SamplerId(1)));
    }

    #[test]
    fn oversized_writes_are_rejected() {
        let mut stage = StageState::new(ShaderDesc::main_pixel());
        assert!(!stage.set_float4("roughness", Vec4::ONE));
        assert_eq!(stage.block().read("roughness"), Some(&[0u8; 4][..]));
    }

    #[test]
    fn float3_lands_at_its_offset() {
        let mut stage = StageState::new(ShaderDesc::main_pixel());
        stage.set_float3("cameraPos", Vec3::new(1.0, 2.0, 3.0));

        let bytes = stage.block().read("cameraPos").map(<[u8]>::to_vec);
        let value: [f32; 3] = bytemuck::pod_read_unaligned(&bytes.unwrap_or_default());
        assert_eq!(value, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn light_array_accepts_partial_writes() {
        let mut stage = StageState::new(ShaderDesc::main_pixel());
        let lights = [<GpuLight as bytemuck::Zeroable>::zeroed(); 3];
        assert!(stage.set_data("lights", bytemuck::cast_slice(&lights)));
    }

    #[test]
    fn snapshots_get_aligned_slots() {
        let mut stage = StageState::new(ShaderDesc::main_vertex());
        stage.set_matrix4x4("world", Mat4::from_translation(Vec3::X));
        stage.copy_all_buffer_data();
        assert_eq!(stage.current_offset(), Some(0));

        stage.set_matrix4x4("world", Mat4::from_translation(Vec3::Y));
        stage.copy_all_buffer_data();
        assert_eq!(stage.current_offset(), Some(512));
        assert_eq!(stage.staging().len(), 1024);

        // First snapshot kept its own world matrix
        let first: [f32; 16] = bytemuck::pod_read_unaligned(&stage.staging()[..64]);
        assert_eq!(first[12], 1.0);
        let second: [f32; 16] = bytemuck::pod_read_unaligned(&stage.staging()[512..576]);
        assert_eq!(second[13], 1.0);

        stage.reset_frame();
        assert!(stage.staging().is_empty());
        assert_eq!(stage.current_offset(), None);
    }
}
