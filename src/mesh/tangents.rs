use anyhow::bail;
use bevy_mikktspace::{generate_tangents, Geometry};
use glam::Vec3;

use crate::mesh::Mesh;

impl Geometry for Mesh {
    fn num_faces(&self) -> usize {
        self.triangle_count()
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.vertex_by_triangle_index(face, vert).position.to_array()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.vertex_by_triangle_index(face, vert).normal.to_array()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.vertex_by_triangle_index(face, vert)
            .tex_coords
            .to_array()
    }

    fn set_tangent(
        &mut self,
        tangent: [f32; 3],
        _bi_tangent: [f32; 3],
        _f_mag_s: f32,
        _f_mag_t: f32,
        bi_tangent_preserves_orientation: bool,
        face: usize,
        vert: usize,
    ) {
        // Mirrored UV islands flip the bitangent, the shader rebuilds it from this sign.
        let sign = if bi_tangent_preserves_orientation {
            1.0
        } else {
            -1.0
        };
        let vertex = self.vertex_by_triangle_index_mut(face, vert);
        vertex.tangent = Vec3::from_array(tangent).extend(sign);
    }
}

impl Mesh {
    /// Per-vertex tangents for normal mapping, using the MikkTSpace algorithm.
    pub fn generate_tangents(&mut self) -> anyhow::Result<()> {
        if self.indices.is_empty() {
            return Ok(());
        }

        if !generate_tangents(self) {
            bail!("Failed to generate tangents for {}", self.name)
        }

        Ok(())
    }
}
