use crate::handles::{MeshId, SamplerId, ShaderId, TextureId};

/// A cube-mapped background drawn after all opaque entities.
///
/// The cube mesh is rendered from the inside with the camera's translation
/// removed, so it always surrounds the viewer at the far plane.
#[derive(Clone, Copy, Debug)]
pub struct Sky {
    pub mesh: MeshId,
    pub texture: TextureId,
    pub sampler: SamplerId,
    pub vertex_shader: ShaderId,
    pub pixel_shader: ShaderId,
}

impl Sky {
    pub fn new(
        mesh: MeshId,
        texture: TextureId,
        sampler: SamplerId,
        vertex_shader: ShaderId,
        pixel_shader: ShaderId,
    ) -> Self {
        Self {
            mesh,
            texture,
            sampler,
            vertex_shader,
            pixel_shader,
        }
    }
}
