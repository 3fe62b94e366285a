//! Error types for the renderer's collaborator layer.
//!
//! The scene core (transforms, cameras, materials, lights and the frame
//! orchestration) cannot fail. Everything that talks to the GPU, the window
//! system or the filesystem reports failures through [`GlintError`].

use crate::handles::{MeshId, SamplerId, ShaderId, TextureId};
use crate::shader::TextureKind;

/// Errors raised while creating GPU resources or presenting frames.
#[derive(Debug, thiserror::Error)]
pub enum GlintError {
    /// No adapter compatible with the window surface was found.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The logical device could not be created.
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The window surface could not be created.
    #[error("failed to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// The next swapchain image could not be acquired.
    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A texture file could not be decoded.
    #[error("failed to load texture: {0}")]
    Image(#[from] image::ImageError),

    /// Cube textures need six faces of identical square size.
    #[error("cube texture faces must be six {size}x{size} RGBA images")]
    CubeFaces { size: u32 },

    #[error("unknown mesh handle {0:?}")]
    UnknownMesh(MeshId),

    #[error("unknown texture handle {0:?}")]
    UnknownTexture(TextureId),

    #[error("unknown sampler handle {0:?}")]
    UnknownSampler(SamplerId),

    #[error("unknown shader handle {0:?}")]
    UnknownShader(ShaderId),

    /// A texture or sampler slot of the bound pixel stage is empty.
    #[error("{stage}: nothing bound to {slot}")]
    UnboundSlot {
        stage: &'static str,
        slot: &'static str,
    },

    /// A texture bound to a slot that expects another kind of view.
    #[error("{stage}: {slot} expects a {expected:?} texture, got {found:?}")]
    TextureKindMismatch {
        stage: &'static str,
        slot: &'static str,
        expected: TextureKind,
        found: TextureKind,
    },

    /// A draw was issued without a vertex stage bound.
    #[error("draw issued with no vertex shader bound")]
    NoVertexShader,

    /// The scene must own at least one camera.
    #[error("a scene needs at least one camera")]
    NoCamera,

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop failed to start or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, GlintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            GlintError::NoCamera.to_string(),
            "a scene needs at least one camera"
        );
        assert_eq!(
            GlintError::UnknownMesh(MeshId(3)).to_string(),
            "unknown mesh handle MeshId(3)"
        );
        assert_eq!(
            GlintError::CubeFaces { size: 64 }.to_string(),
            "cube texture faces must be six 64x64 RGBA images"
        );
        assert_eq!(
            GlintError::TextureKindMismatch {
                stage: "sky_ps",
                slot: "SkyTexture",
                expected: TextureKind::Cube,
                found: TextureKind::D2,
            }
            .to_string(),
            "sky_ps: SkyTexture expects a Cube texture, got D2"
        );
    }
}
