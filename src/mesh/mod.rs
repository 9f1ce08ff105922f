use anyhow::bail;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use id_arena::Id;

pub mod obj;
pub mod primitives;
mod tangents;

pub type MeshId = Id<Mesh>;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    /// Tangent in `xyz`, bitangent sign in `w`.
    pub tangent: Vec4,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            tangent: Vec4::ZERO,
        }
    }
}

/// Indexed triangle list in the renderer's left handed space. Front faces wind
/// clockwise when seen from outside.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> anyhow::Result<Self> {
        let name = name.into();

        if indices.len() % 3 != 0 {
            bail!(
                "Mesh {name} has {} indices, which is not a triangle list",
                indices.len()
            );
        }

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            bail!(
                "Mesh {name} references vertex {index} but only has {}",
                vertices.len()
            );
        }

        Ok(Self {
            name,
            vertices,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
    }

    fn vertex_by_triangle_index(&self, face: usize, vert: usize) -> &Vertex {
        &self.vertices[self.indices[face * 3 + vert] as usize]
    }

    fn vertex_by_triangle_index_mut(&mut self, face: usize, vert: usize) -> &mut Vertex {
        let index = self.indices[face * 3 + vert] as usize;
        &mut self.vertices[index]
    }

    fn face_normal(&self, [a, b, c]: [usize; 3]) -> Vec3 {
        let a = self.vertices[a].position;
        let b = self.vertices[b].position;
        let c = self.vertices[c].position;
        (b - a).cross(c - a)
    }

    /// Area weighted vertex normals from the current winding.
    pub fn compute_smooth_normals(&mut self) {
        let normals = self.smooth_normals();

        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal;
        }
    }

    fn smooth_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for triangle in self.triangles() {
            let normal = self.face_normal(triangle);
            for index in triangle {
                normals[index] += normal;
            }
        }

        normals.into_iter().map(Vec3::normalize_or_zero).collect()
    }

    /// Flips every triangle whose winding disagrees with its vertex normals.
    pub fn orient_triangles(&mut self) {
        for face in 0..self.triangle_count() {
            let triangle = [
                self.indices[face * 3] as usize,
                self.indices[face * 3 + 1] as usize,
                self.indices[face * 3 + 2] as usize,
            ];

            let reference: Vec3 = triangle
                .iter()
                .map(|&index| self.vertices[index].normal)
                .sum();

            if self.face_normal(triangle).dot(reference) < 0.0 {
                self.indices.swap(face * 3 + 1, face * 3 + 2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(indices: Vec<u32>) -> anyhow::Result<Mesh> {
        let vertices = vec![
            Vertex::new(Vec3::ZERO, Vec3::NEG_Z, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::Y, Vec3::NEG_Z, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::X, Vec3::NEG_Z, Vec2::new(1.0, 1.0)),
        ];
        Mesh::new("triangle", vertices, indices)
    }

    #[test]
    fn rejects_out_of_range_indices() {
        assert!(triangle(vec![0, 1, 3]).is_err());
        assert!(triangle(vec![0, 1]).is_err());
        assert!(triangle(vec![0, 1, 2]).is_ok());
    }

    #[test]
    fn counts() {
        let mesh = triangle(vec![0, 1, 2, 0, 2, 1]).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn orient_triangles_makes_faces_clockwise_from_the_front() {
        let mut mesh = triangle(vec![0, 2, 1]).unwrap();
        mesh.orient_triangles();
        assert_eq!(mesh.indices, vec![0, 1, 2]);

        // Already correct winding is left alone.
        mesh.orient_triangles();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn smooth_normals_follow_winding() {
        let mut mesh = triangle(vec![0, 1, 2]).unwrap();
        for vertex in &mut mesh.vertices {
            vertex.normal = Vec3::ZERO;
        }

        mesh.compute_smooth_normals();
        for vertex in &mesh.vertices {
            assert_eq!(vertex.normal, Vec3::NEG_Z);
        }
    }
}
