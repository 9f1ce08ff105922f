//! Wavefront OBJ import.
//!
//! OBJ files are authored right handed with counter-clockwise front faces and V pointing
//! up. The renderer is left handed with clockwise front faces and V pointing down, so
//! Z is mirrored, V is flipped and every triangle's winding is reversed on import.

use std::{io::BufRead, ops::Range, path::Path};

use anyhow::{bail, Context};
use glam::{Vec2, Vec3};
use itertools::Itertools;

use crate::mesh::{Mesh, Vertex};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

pub fn load_obj_file(path: impl AsRef<Path>) -> anyhow::Result<Mesh> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())
        .with_context(|| format!("Failed to parse OBJ file {}", path.display()))?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    mesh_from_models(name, &models)
}

pub fn parse_obj(name: impl Into<String>, reader: &mut impl BufRead) -> anyhow::Result<Mesh> {
    // Materials are assigned by the scene, so .mtl references are ignored.
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Ok(Default::default()))
            .context("Failed to parse OBJ data")?;

    mesh_from_models(name.into(), &models)
}

fn mesh_from_models(name: String, models: &[tobj::Model]) -> anyhow::Result<Mesh> {
    if models.is_empty() {
        bail!("OBJ file {name} contains no objects");
    }

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    // Vertices of objects that came without normals.
    let mut unshaded: Vec<Range<usize>> = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let base = vertices.len() as u32;
        let vertex_count = mesh.positions.len() / 3;

        if mesh.normals.len() < vertex_count * 3 {
            unshaded.push(base as usize..base as usize + vertex_count);
        }
        let has_tex_coords = mesh.texcoords.len() >= vertex_count * 2;

        for (i, position) in mesh.positions.chunks_exact(3).enumerate() {
            let normal = mesh
                .normals
                .get(i * 3..i * 3 + 3)
                .map(|n| Vec3::new(n[0], n[1], -n[2]))
                .unwrap_or(Vec3::ZERO);

            let tex_coords = if has_tex_coords {
                Vec2::new(mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1])
            } else {
                Vec2::ZERO
            };

            vertices.push(Vertex::new(
                Vec3::new(position[0], position[1], -position[2]),
                normal,
                tex_coords,
            ));
        }

        for (a, b, c) in mesh.indices.iter().tuples() {
            indices.extend_from_slice(&[base + a, base + c, base + b]);
        }

        log::debug!(
            "OBJ {name}: object {} with {vertex_count} vertices",
            model.name
        );
    }

    let mut mesh = Mesh::new(name, vertices, indices)?;

    if !unshaded.is_empty() {
        let normals = mesh.smooth_normals();
        for index in unshaded.into_iter().flatten() {
            mesh.vertices[index].normal = normals[index];
        }
    }

    mesh.generate_tangents()?;

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const QUAD: &str = "\
o Quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const BARE_TRIANGLE: &str = "\
v 0.0 0.0 1.0
v 1.0 0.0 1.0
v 0.0 1.0 1.0
f 1 2 3
";

    #[test]
    fn quad_is_triangulated_and_converted() {
        let mesh = parse_obj("quad", &mut Cursor::new(QUAD)).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);

        for vertex in &mesh.vertices {
            assert_eq!(vertex.normal, Vec3::NEG_Z);
        }

        // V is flipped: the bottom-left corner samples the bottom of the image.
        let bottom_left = mesh
            .vertices
            .iter()
            .find(|v| v.position == Vec3::new(-1.0, -1.0, 0.0))
            .unwrap();
        assert_eq!(bottom_left.tex_coords, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn winding_agrees_with_normals() {
        let mesh = parse_obj("quad", &mut Cursor::new(QUAD)).unwrap();

        for [a, b, c] in mesh.triangles() {
            let (a, b, c) = (
                mesh.vertices[a].position,
                mesh.vertices[b].position,
                mesh.vertices[c].position,
            );
            assert!((b - a).cross(c - a).dot(mesh.vertices[0].normal) > 0.0);
        }
    }

    #[test]
    fn missing_normals_are_synthesised() {
        let mesh = parse_obj("bare", &mut Cursor::new(BARE_TRIANGLE)).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        for vertex in &mesh.vertices {
            assert!(vertex.normal.abs_diff_eq(Vec3::NEG_Z, 1e-6));
            assert_eq!(vertex.position.z, -1.0);
        }
    }

    #[test]
    fn authored_normals_survive_next_to_bare_objects() {
        let triangle = |z: f32| vec![0.0, 0.0, z, 1.0, 0.0, z, 0.0, 1.0, z];
        let authored = tobj::Model::new(
            tobj::Mesh {
                positions: triangle(0.0),
                normals: [1.0, 0.0, 0.0].repeat(3),
                indices: vec![0, 1, 2],
                ..Default::default()
            },
            "Authored".to_string(),
        );
        let bare = tobj::Model::new(
            tobj::Mesh {
                positions: triangle(1.0),
                indices: vec![0, 1, 2],
                ..Default::default()
            },
            "Bare".to_string(),
        );

        let mesh = mesh_from_models("mixed".to_string(), &[authored, bare]).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        for vertex in &mesh.vertices[..3] {
            assert_eq!(vertex.normal, Vec3::X);
        }
        for vertex in &mesh.vertices[3..] {
            assert!(vertex.normal.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        }
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(parse_obj("empty", &mut Cursor::new("# nothing\n")).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_obj_file("no/such/mesh.obj").is_err());
    }
}
