//! Procedural meshes, centred on the origin and roughly one unit across.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::mesh::{Mesh, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Cube,
    Quad,
    DoubleSidedQuad,
    Sphere,
    Cylinder,
    Torus,
    Helix,
}

impl Primitive {
    pub fn build(self) -> anyhow::Result<Mesh> {
        match self {
            Primitive::Cube => cube(),
            Primitive::Quad => quad(),
            Primitive::DoubleSidedQuad => double_sided_quad(),
            Primitive::Sphere => sphere(32, 16),
            Primitive::Cylinder => cylinder(32),
            Primitive::Torus => torus(48, 16),
            Primitive::Helix => helix(3.0, 128, 12),
        }
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn push(&mut self, position: Vec3, normal: Vec3, tex_coords: Vec2) -> u32 {
        self.vertices.push(Vertex::new(position, normal, tex_coords));
        self.vertices.len() as u32 - 1
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles over a quad given in ring order.
    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    /// Face on the plane through `normal * distance`, spanned by `u` and `v`.
    fn face(&mut self, normal: Vec3, u: Vec3, v: Vec3, distance: f32) {
        let center = normal * distance;
        let corners = [
            (-0.5, -0.5, Vec2::new(0.0, 1.0)),
            (0.5, -0.5, Vec2::new(1.0, 1.0)),
            (0.5, 0.5, Vec2::new(1.0, 0.0)),
            (-0.5, 0.5, Vec2::new(0.0, 0.0)),
        ];

        let [a, b, c, d] =
            corners.map(|(x, y, uv)| self.push(center + u * x + v * y, normal, uv));
        self.quad(a, b, c, d);
    }

    /// Grid of `(columns + 1) * (rows + 1)` vertices, joined into quads.
    fn grid(
        &mut self,
        columns: u32,
        rows: u32,
        mut vertex: impl FnMut(f32, f32) -> (Vec3, Vec3),
    ) {
        let base = self.vertices.len() as u32;
        for row in 0..=rows {
            for column in 0..=columns {
                let u = column as f32 / columns as f32;
                let v = row as f32 / rows as f32;
                let (position, normal) = vertex(u, v);
                self.push(position, normal, Vec2::new(u, v));
            }
        }

        let stride = columns + 1;
        for row in 0..rows {
            for column in 0..columns {
                let a = base + row * stride + column;
                self.quad(a, a + 1, a + stride + 1, a + stride);
            }
        }
    }

    fn build(self, name: &str) -> anyhow::Result<Mesh> {
        let mut mesh = Mesh::new(name, self.vertices, self.indices)?;
        mesh.orient_triangles();
        mesh.generate_tangents()?;
        Ok(mesh)
    }
}

pub fn cube() -> anyhow::Result<Mesh> {
    let mut builder = MeshBuilder::default();

    for (normal, u, v) in [
        (Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::X, Vec3::Y),
    ] {
        builder.face(normal, u, v, 0.5);
    }

    builder.build("cube")
}

/// Unit quad in the XY plane, visible from -Z.
pub fn quad() -> anyhow::Result<Mesh> {
    let mut builder = MeshBuilder::default();
    builder.face(Vec3::NEG_Z, Vec3::X, Vec3::Y, 0.0);
    builder.build("quad")
}

pub fn double_sided_quad() -> anyhow::Result<Mesh> {
    let mut builder = MeshBuilder::default();
    builder.face(Vec3::NEG_Z, Vec3::X, Vec3::Y, 0.0);
    builder.face(Vec3::Z, Vec3::NEG_X, Vec3::Y, 0.0);
    builder.build("quad_double_sided")
}

pub fn sphere(slices: u32, stacks: u32) -> anyhow::Result<Mesh> {
    let mut builder = MeshBuilder::default();

    builder.grid(slices, stacks, |u, v| {
        let theta = u * TAU;
        let phi = v * PI;
        let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
        (normal * 0.5, normal)
    });

    builder.build("sphere")
}

pub fn cylinder(slices: u32) -> anyhow::Result<Mesh> {
    let mut builder = MeshBuilder::default();

    builder.grid(slices, 1, |u, v| {
        let theta = u * TAU;
        let normal = Vec3::new(theta.cos(), 0.0, theta.sin());
        (normal * 0.5 + Vec3::Y * (0.5 - v), normal)
    });

    for (normal, y) in [(Vec3::Y, 0.5), (Vec3::NEG_Y, -0.5)] {
        let center = builder.push(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        let ring: Vec<u32> = (0..=slices)
            .map(|i| {
                let theta = i as f32 / slices as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                builder.push(
                    Vec3::new(cos * 0.5, y, sin * 0.5),
                    normal,
                    Vec2::new(0.5 + cos * 0.5, 0.5 - sin * 0.5),
                )
            })
            .collect();

        for pair in ring.windows(2) {
            builder.triangle(center, pair[0], pair[1]);
        }
    }

    builder.build("cylinder")
}

/// Sweeps a circle of `radius` along `path`, which maps t in 0..1 to a point on the
/// centre line and the tangent there.
fn tube(
    builder: &mut MeshBuilder,
    segments: u32,
    sides: u32,
    radius: f32,
    path: impl Fn(f32) -> (Vec3, Vec3),
) {
    builder.grid(sides, segments, |u, v| {
        let (center, tangent) = path(v);
        let tangent = tangent.normalize();
        let outward = Vec3::new(center.x, 0.0, center.z).normalize_or(Vec3::X);
        let binormal = tangent.cross(outward).normalize();
        let side = binormal.cross(tangent);

        let angle = u * TAU;
        let normal = side * angle.cos() + binormal * angle.sin();
        (center + normal * radius, normal)
    });
}

pub fn torus(segments: u32, sides: u32) -> anyhow::Result<Mesh> {
    let mut builder = MeshBuilder::default();
    let major = 0.35;

    tube(&mut builder, segments, sides, 0.15, |t| {
        let angle = t * TAU;
        let (sin, cos) = angle.sin_cos();
        (Vec3::new(cos, 0.0, sin) * major, Vec3::new(-sin, 0.0, cos))
    });

    builder.build("torus")
}

pub fn helix(turns: f32, segments: u32, sides: u32) -> anyhow::Result<Mesh> {
    let mut builder = MeshBuilder::default();
    let (radius, height) = (0.35, 1.0);

    tube(&mut builder, segments, sides, 0.08, |t| {
        let angle = t * turns * TAU;
        let (sin, cos) = angle.sin_cos();
        let center = Vec3::new(cos * radius, (t - 0.5) * height, sin * radius);
        let tangent = Vec3::new(-sin * radius * turns * TAU, height, cos * radius * turns * TAU);
        (center, tangent)
    });

    builder.build("helix")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Primitive; 7] = [
        Primitive::Cube,
        Primitive::Quad,
        Primitive::DoubleSidedQuad,
        Primitive::Sphere,
        Primitive::Cylinder,
        Primitive::Torus,
        Primitive::Helix,
    ];

    #[test]
    fn every_primitive_winds_clockwise_about_its_normals() {
        for primitive in ALL {
            let mesh = primitive.build().unwrap();
            assert!(mesh.triangle_count() > 0, "{primitive:?} is empty");

            for triangle in mesh.triangles() {
                let [a, b, c] = triangle.map(|i| mesh.vertices[i]);
                let geometric = (b.position - a.position).cross(c.position - a.position);
                let reference = a.normal + b.normal + c.normal;
                assert!(
                    geometric.dot(reference) >= -1e-6,
                    "{primitive:?} has an inward facing triangle"
                );
            }
        }
    }

    #[test]
    fn normals_are_unit_length() {
        for primitive in ALL {
            let mesh = primitive.build().unwrap();
            for vertex in &mesh.vertices {
                assert!(
                    (vertex.normal.length() - 1.0).abs() < 1e-4,
                    "{primitive:?} has a bad normal {:?}",
                    vertex.normal
                );
            }
        }
    }

    #[test]
    fn cube_tangents_lie_in_the_face() {
        let mesh = cube().unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);

        for vertex in &mesh.vertices {
            let tangent = vertex.tangent.truncate();
            assert!(tangent.dot(vertex.normal).abs() < 1e-4);
            assert!((tangent.length() - 1.0).abs() < 1e-3);
            assert_eq!(vertex.tangent.w.abs(), 1.0);
        }
    }

    #[test]
    fn sphere_stays_on_its_radius() {
        let mesh = sphere(16, 8).unwrap();
        for vertex in &mesh.vertices {
            assert!((vertex.position.length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn torus_normals_point_away_from_the_centre_line() {
        let mesh = torus(24, 8).unwrap();
        for vertex in &mesh.vertices {
            let ring = Vec3::new(vertex.position.x, 0.0, vertex.position.z).normalize() * 0.35;
            let offset = vertex.position - ring;
            assert!((offset.length() - 0.15).abs() < 1e-4);
            assert!(offset.normalize().dot(vertex.normal) > 0.999);
        }
    }
}
