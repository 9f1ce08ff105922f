use crate::{mesh::MeshId, scene::material::TextureId};

/// Cube-mapped background drawn behind everything else.
#[derive(Debug, Clone)]
pub struct Sky {
    /// +X, -X, +Y, -Y, +Z, -Z.
    pub faces: [TextureId; 6],
    pub mesh: MeshId,
}

impl Sky {
    pub const FACE_NAMES: [&'static str; 6] = ["right", "left", "up", "down", "front", "back"];

    pub fn new(faces: [TextureId; 6], mesh: MeshId) -> Self {
        Self { faces, mesh }
    }
}
