//! # Glint
//!
//! **A small real-time 3D scene renderer on wgpu.**
//!
//! Entities pair a shared mesh with a shared material and their own
//! [`Transform`]. Every frame the [`FrameRenderer`] draws a depth-only shadow
//! pass from a fixed directional light, a lit main pass with up to eight
//! lights, and a cube-mapped sky, all through the [`RenderDevice`] seam.
//!
//! ## Quick Start
//!
//! ```no_run
//! use glint::*;
//!
//! fn main() -> Result<()> {
//!     run(AppConfig::new().title("Sphere"), |ctx| {
//!         let camera = Camera::new(
//!             ctx.aspect(),
//!             Vec3::new(0.0, 0.0, -4.0),
//!             45f32.to_radians(),
//!             0.1,
//!             100.0,
//!             3.0,
//!             0.01,
//!             false,
//!         );
//!         let sun = Vec3::new(0.0, -1.0, 1.0);
//!         let lights = LightSet::new(Vec3::splat(0.1), [Light::directional(sun, Vec3::ONE, 1.0)]);
//!         let mut scene = Scene::new(vec![camera], lights, ShadowMap::from_directional(sun, 1024))?;
//!
//!         let white = ctx.texture(&TextureData::solid([255; 4]), ColorSpace::Srgb, "white");
//!         let normal = ctx.texture(&TextureData::flat_normal(), ColorSpace::Linear, "normal");
//!         let sampler = ctx.sampler(SamplerKind::Filtering);
//!
//!         let shaders = ctx.shaders;
//!         let mut material = Material::new(
//!             Vec4::ONE,
//!             0.5,
//!             Vec2::ONE,
//!             Vec2::ZERO,
//!             shaders.main_vertex,
//!             shaders.main_pixel,
//!         );
//!         material.add_sampler("BasicSampler", sampler);
//!         material.add_texture("Albedo", white);
//!         material.add_texture("NormalMap", normal);
//!         material.add_texture("RoughnessMap", white);
//!         material.add_texture("MetalnessMap", white);
//!         let material = scene.add_material(material);
//!
//!         let sphere = ctx.mesh(&MeshData::sphere(32, 16));
//!         scene.add_entity(Entity::new(sphere, material));
//!         Ok(scene)
//!     })
//! }
//! ```
//!
//! ## Controls
//!
//! - **WASD** move, **Space**/**Shift** rise and sink
//! - hold the **left mouse button** to look around
//! - **1**-**9** switch cameras, **Escape** quits

mod app;
mod camera;
mod device;
mod entity;
mod error;
mod gpu;
mod handles;
mod input;
mod light;
mod material;
mod mesh;
mod renderer;
mod scene;
mod shader;
mod shadow;
mod sky;
mod texture;
mod transform;

pub use app::{AppConfig, SetupContext, run};
pub use camera::{Camera, PITCH_LIMIT};
pub use device::{BuiltinShaders, WgpuDevice};
pub use entity::Entity;
pub use error::{GlintError, Result};
pub use gpu::GpuContext;
pub use handles::{MaterialId, MeshId, SamplerId, ShaderId, TextureId};
pub use input::Input;
pub use light::{GpuLight, Light, LightSet, MAX_LIGHTS};
pub use material::Material;
pub use mesh::{Mesh, MeshData, Vertex3d};
pub use renderer::{FrameRenderer, PassKind, RenderDevice};
pub use scene::{FrameControl, Scene};
pub use shader::{
    SamplerKind, ShaderDesc, ShaderStage, StageKind, StageState, TextureKind, UniformBlock,
    UniformField, UniformType,
};
pub use shadow::ShadowMap;
pub use sky::Sky;
pub use texture::{ColorSpace, Texture, TextureData};
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
