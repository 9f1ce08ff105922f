use crate::{mesh::MeshId, scene::material::MaterialId, scene::transform::Transform};

/// A mesh drawn with a material at a transform.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    mesh: MeshId,
    material: MaterialId,
    pub transform: Transform,
}

impl Entity {
    pub fn new(name: impl Into<String>, mesh: MeshId, material: MaterialId) -> Self {
        Self {
            name: name.into(),
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
}
