//! Type-safe handles to shared resources.
//!
//! Meshes, textures, samplers, shader stages and materials live in arenas
//! owned by the [`WgpuDevice`](crate::WgpuDevice) or the [`Scene`](crate::Scene).
//! Entities refer to them through these index newtypes, so any number of
//! entities can share one mesh or one material. Mutating a material through
//! [`Scene::material_mut`](crate::Scene::material_mut) is visible to every
//! entity that holds its [`MaterialId`].
//!
//! # Example
//!
//! ```ignore
//! let sphere: MeshId = ctx.mesh(&MeshData::sphere(32, 16));
//! let bronze: MaterialId = scene.add_material(material);
//!
//! // Two entities, one mesh, one material
//! scene.add_entity(Entity::new(sphere, bronze));
//! scene.add_entity(Entity::new(sphere, bronze));
//! ```

/// Handle to an uploaded mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Handle to a texture view (2D, depth or cube).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// Handle to a sampler state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SamplerId(pub(crate) usize);

/// Handle to a vertex or pixel shader stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub(crate) usize);

/// Handle to a material stored in a [`Scene`](crate::Scene).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

impl MeshId {
    /// Arena index behind this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

impl TextureId {
    /// Arena index behind this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

impl SamplerId {
    /// Arena index behind this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

impl ShaderId {
    /// Arena index behind this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

impl MaterialId {
    /// Arena index behind this handle.
    pub fn index(self) -> usize {
        self.0
    }
}
