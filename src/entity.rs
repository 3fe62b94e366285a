use crate::handles::{MaterialId, MeshId};
use crate::transform::Transform;

/// A drawable object: one mesh, one material and its own transform.
///
/// The mesh is fixed at construction; the material can be swapped.
#[derive(Clone, Debug)]
pub struct Entity {
    mesh: MeshId,
    material: MaterialId,
    transform: Transform,
}

impl Entity {
    pub fn new(mesh: MeshId, material: MaterialId) -> Self {
        Self {
            mesh,
            material,
            transform: Transform::new(),
        }
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}
