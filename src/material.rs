//! Surface appearance shared between entities.

use std::collections::HashMap;

use glam::{Vec2, Vec4};

use crate::handles::{SamplerId, ShaderId, TextureId};
use crate::shader::ShaderStage;

/// Shading parameters, shader pair and named texture/sampler bindings.
///
/// Materials live in the [`Scene`](crate::Scene) and are referenced by
/// [`MaterialId`](crate::MaterialId), so one edit affects every entity that
/// uses the material.
#[derive(Clone, Debug)]
pub struct Material {
    color_tint: Vec4,
    roughness: f32,
    uv_scale: Vec2,
    uv_offset: Vec2,
    vertex_shader: ShaderId,
    pixel_shader: ShaderId,
    textures: HashMap<String, TextureId>,
    samplers: HashMap<String, SamplerId>,
}

impl Material {
    pub fn new(
        color_tint: Vec4,
        roughness: f32,
        uv_scale: Vec2,
        uv_offset: Vec2,
        vertex_shader: ShaderId,
        pixel_shader: ShaderId,
    ) -> Self {
        Self {
            color_tint,
            roughness,
            uv_scale,
            uv_offset,
            vertex_shader,
            pixel_shader,
            textures: HashMap::new(),
            samplers: HashMap::new(),
        }
    }

    pub fn color_tint(&self) -> Vec4 {
        self.color_tint
    }

    pub fn set_color_tint(&mut self, color_tint: Vec4) {
        self.color_tint = color_tint;
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness;
    }

    pub fn uv_scale(&self) -> Vec2 {
        self.uv_scale
    }

    pub fn set_uv_scale(&mut self, uv_scale: Vec2) {
        self.uv_scale = uv_scale;
    }

    pub fn uv_offset(&self) -> Vec2 {
        self.uv_offset
    }

    pub fn set_uv_offset(&mut self, uv_offset: Vec2) {
        self.uv_offset = uv_offset;
    }

    pub fn vertex_shader(&self) -> ShaderId {
        self.vertex_shader
    }

    pub fn set_vertex_shader(&mut self, shader: ShaderId) {
        self.vertex_shader = shader;
    }

    pub fn pixel_shader(&self) -> ShaderId {
        self.pixel_shader
    }

    pub fn set_pixel_shader(&mut self, shader: ShaderId) {
        self.pixel_shader = shader;
    }

    /// Binds a texture to a named slot, replacing any previous binding.
    pub fn add_texture(&mut self, slot: impl Into<String>, texture: TextureId) {
        self.textures.insert(slot.into(), texture);
    }

    /// Binds a sampler to a named slot, replacing any previous binding.
    pub fn add_sampler(&mut self, slot: impl Into<String>, sampler: SamplerId) {
        self.samplers.insert(slot.into(), sampler);
    }

    pub fn texture(&self, slot: &str) -> Option<TextureId> {
        self.textures.get(slot).copied()
    }

    pub fn sampler(&self, slot: &str) -> Option<SamplerId> {
        self.samplers.get(slot).copied()
    }

    /// Replaces the pixel stage's texture and sampler bindings with this
    /// material's. Slots the material does not name end up unbound.
    pub fn prepare(&self, stage: &mut dyn ShaderStage) {
        stage.clear_resources();
        for (slot, texture) in &self.textures {
            stage.set_texture(slot, *texture);
        }
        for (slot, sampler) in &self.samplers {
            stage.set_sampler(slot, *sampler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{ShaderDesc, StageState};

    fn material() -> Material {
        Material::new(
            Vec4::ONE,
            0.99,
            Vec2::splat(2.0),
            Vec2::ZERO,
            ShaderId(0),
            ShaderId(1),
        )
    }

    #[test]
    fn re_adding_a_slot_overwrites() {
        let mut material = material();
        material.add_texture("Albedo", TextureId(1));
        material.add_texture("Albedo", TextureId(7));
        material.add_sampler("BasicSampler", SamplerId(0));
        material.add_sampler("BasicSampler", SamplerId(3));

        assert_eq!(material.texture("Albedo"), Some(TextureId(7)));
        assert_eq!(material.sampler("BasicSampler"), Some(SamplerId(3)));
        assert_eq!(material.texture("NormalMap"), None);
    }

    #[test]
    fn prepare_binds_known_slots() {
        let mut material = material();
        material.add_texture("Albedo", TextureId(4));
        material.add_texture("MetalnessMap", TextureId(5));
        material.add_texture("NotInShader", TextureId(6));
        material.add_sampler("BasicSampler", SamplerId(2));

        let mut stage = StageState::new(ShaderDesc::main_pixel());
        material.prepare(&mut stage);

        assert_eq!(stage.textures()[0], Some(TextureId(4)));
        assert_eq!(stage.textures()[3], Some(TextureId(5)));
        assert_eq!(stage.samplers()[0], Some(SamplerId(2)));
    }

    #[test]
    fn prepare_unbinds_slots_the_material_lacks() {
        let mut stage = StageState::new(ShaderDesc::main_pixel());
        let mut first = material();
        first.add_texture("Albedo", TextureId(7));
        first.add_sampler("BasicSampler", SamplerId(1));
        first.prepare(&mut stage);

        let mut second = material();
        second.add_texture("NormalMap", TextureId(8));
        second.prepare(&mut stage);

        assert_eq!(stage.textures()[0], None);
        assert_eq!(stage.textures()[1], Some(TextureId(8)));
        assert_eq!(stage.samplers()[0], None);
    }

    #[test]
    fn shaders_are_swappable() {
        let mut material = material();
        material.set_pixel_shader(ShaderId(9));
        material.set_vertex_shader(ShaderId(8));
        assert_eq!(material.pixel_shader(), ShaderId(9));
        assert_eq!(material.vertex_shader(), ShaderId(8));
    }
}
