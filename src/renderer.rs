//! Frame orchestration.
//!
//! [`FrameRenderer::draw`] walks a [`Scene`] once per frame and drives a
//! [`RenderDevice`] through four steps:
//!
//! 1. **Shadow pass**: depth only, from the light's point of view.
//! 2. **Main pass**: every entity with its material, the camera, the lights
//!    and the shadow map.
//! 3. **Sky pass**: the sky cube at the far plane, if the scene has one.
//! 4. **Present**.
//!
//! Entities are drawn in the order they were added, once per pass.

use glam::{Mat3, Mat4, Vec4};

use crate::error::Result;
use crate::handles::{MeshId, SamplerId, ShaderId, TextureId};
use crate::scene::Scene;
use crate::shader::ShaderStage;

/// Render target configuration for a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    /// Depth-only shadow target of `resolution` squared.
    Shadow { resolution: u32 },
    /// Back buffer and main depth buffer at full size.
    Main { width: u32, height: u32 },
    /// Back buffer with depth test against the main pass, `LessEqual`,
    /// front faces culled.
    Sky,
}

/// The GPU-facing side of the renderer.
///
/// Implemented by [`WgpuDevice`](crate::WgpuDevice); tests use a recording
/// implementation.
pub trait RenderDevice {
    /// Starts a frame and clears the back buffer, main depth and shadow depth.
    fn begin_frame(&mut self, clear_color: Vec4);

    fn begin_pass(&mut self, pass: PassKind);

    fn bind_vertex_shader(&mut self, shader: ShaderId);

    /// `None` leaves the pixel stage unbound (depth-only rendering).
    fn bind_pixel_shader(&mut self, shader: Option<ShaderId>);

    /// Parameter interface of a shader stage, or `None` for an unknown handle.
    fn stage(&mut self, shader: ShaderId) -> Option<&mut dyn ShaderStage>;

    /// Draws a mesh with the currently bound stages and their latest
    /// uploaded parameters.
    fn draw(&mut self, mesh: MeshId);

    /// Current back buffer size in pixels.
    fn viewport_size(&self) -> (u32, u32);

    /// Depth texture written by the shadow pass and the comparison sampler
    /// used to read it.
    fn shadow_map(&self) -> (TextureId, SamplerId);

    fn present(&mut self) -> Result<()>;
}

/// Per-frame draw logic, independent of the graphics backend.
#[derive(Clone, Copy, Debug)]
pub struct FrameRenderer {
    shadow_vertex_shader: ShaderId,
    clear_color: Vec4,
}

impl FrameRenderer {
    pub fn new(shadow_vertex_shader: ShaderId, clear_color: Vec4) -> Self {
        Self {
            shadow_vertex_shader,
            clear_color,
        }
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, clear_color: Vec4) {
        self.clear_color = clear_color;
    }

    /// Records and presents one frame.
    pub fn draw<D: RenderDevice>(&self, scene: &Scene, device: &mut D) -> Result<()> {
        device.begin_frame(self.clear_color);
        self.shadow_pass(scene, device);
        self.main_pass(scene, device);
        self.sky_pass(scene, device);
        device.present()
    }

    fn shadow_pass<D: RenderDevice>(&self, scene: &Scene, device: &mut D) {
        let shadow = scene.shadow_map();
        device.begin_pass(PassKind::Shadow {
            resolution: shadow.resolution(),
        });
        device.bind_pixel_shader(None);
        device.bind_vertex_shader(self.shadow_vertex_shader);

        let Some(stage) = device.stage(self.shadow_vertex_shader) else {
            log::warn!("shadow vertex shader missing, skipping shadow pass");
            return;
        };
        stage.set_matrix4x4("view", shadow.view());
        stage.set_matrix4x4("projection", shadow.projection());

        for entity in scene.entities() {
            if let Some(stage) = device.stage(self.shadow_vertex_shader) {
                stage.set_matrix4x4("world", entity.transform().world_matrix());
                stage.copy_all_buffer_data();
            }
            device.draw(entity.mesh());
        }
    }

    fn main_pass<D: RenderDevice>(&self, scene: &Scene, device: &mut D) {
        let (width, height) = device.viewport_size();
        device.begin_pass(PassKind::Main { width, height });

        let camera = scene.active_camera();
        let shadow = scene.shadow_map();
        let (shadow_texture, shadow_sampler) = device.shadow_map();

        let mut lights = scene.lights().to_gpu();
        let light_count = lights.len() as i32;
        lights.resize(crate::light::MAX_LIGHTS, bytemuck::Zeroable::zeroed());

        for entity in scene.entities() {
            let Some(material) = scene.material(entity.material()) else {
                log::warn!("entity references unknown material {:?}", entity.material());
                continue;
            };
            let transform = entity.transform();

            let vertex_shader = material.vertex_shader();
            if let Some(vs) = device.stage(vertex_shader) {
                vs.set_matrix4x4("world", transform.world_matrix());
                vs.set_matrix4x4(
                    "worldInverseTranspose",
                    transform.world_inverse_transpose_matrix(),
                );
                vs.set_matrix4x4("view", camera.view());
                vs.set_matrix4x4("projection", camera.projection());
                vs.set_matrix4x4("lightView", shadow.view());
                vs.set_matrix4x4("lightProjection", shadow.projection());
                vs.copy_all_buffer_data();
            }
            device.bind_vertex_shader(vertex_shader);

            let pixel_shader = material.pixel_shader();
            if let Some(ps) = device.stage(pixel_shader) {
                ps.set_float4("colorTint", material.color_tint());
                ps.set_float3("cameraPos", camera.transform().position());
                ps.set_float("roughness", material.roughness());
                ps.set_float3("ambient", scene.ambient());
                ps.set_float2("uvScale", material.uv_scale());
                ps.set_float2("uvOffset", material.uv_offset());
                ps.set_int("lightCount", light_count);
                ps.set_data("lights", bytemuck::cast_slice(&lights));
                material.prepare(ps);
                ps.set_texture("ShadowMap", shadow_texture);
                ps.set_sampler("ShadowSampler", shadow_sampler);
                ps.copy_all_buffer_data();
            }
            device.bind_pixel_shader(Some(pixel_shader));

            device.draw(entity.mesh());
        }
    }

    fn sky_pass<D: RenderDevice>(&self, scene: &Scene, device: &mut D) {
        let Some(sky) = scene.sky() else {
            return;
        };
        device.begin_pass(PassKind::Sky);

        let camera = scene.active_camera();
        let view = Mat4::from_mat3(Mat3::from_mat4(camera.view()));

        if let Some(vs) = device.stage(sky.vertex_shader) {
            vs.set_matrix4x4("view", view);
            vs.set_matrix4x4("projection", camera.projection());
            vs.copy_all_buffer_data();
        }
        device.bind_vertex_shader(sky.vertex_shader);

        if let Some(ps) = device.stage(sky.pixel_shader) {
            ps.set_texture("SkyTexture", sky.texture);
            ps.set_sampler("BasicSampler", sky.sampler);
            ps.copy_all_buffer_data();
        }
        device.bind_pixel_shader(Some(sky.pixel_shader));

        device.draw(sky.mesh);
    }
}
