//! Mesh geometry: CPU-side primitives and their GPU upload.
//!
//! - [`Vertex3d`]: the vertex format shared by every pipeline
//! - [`MeshData`]: vertices and indices in memory, with built-in primitives
//! - [`Mesh`]: vertex and index buffers on the GPU
//!
//! # Vertex Layout
//!
//! Each [`Vertex3d`] occupies 44 bytes:
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |
//! | tangent   | Float32x3 | 32     | 3               |
//!
//! # Winding Order
//!
//! The renderer is left-handed and treats clockwise triangles as front
//! facing. For every built-in primitive, `(b - a).cross(c - a)` points away
//! from the surface, in the direction of the vertex normals.

use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use std::f32::consts::{PI, TAU};

/// A vertex with position, normal, texture coordinates and tangent.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Direction of increasing U in model space, for normal mapping.
    pub tangent: [f32; 3],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
            // tangent
            wgpu::VertexAttribute {
                offset: 32,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    /// Creates a vertex with a zero tangent; see [`MeshData::compute_tangents`].
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            tangent: [0.0; 3],
        }
    }
}

/// Triangle-list geometry in CPU memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Unit cube centered at the origin, 24 vertices for flat faces.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // Front face (Z+)
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
            // Back face (Z-)
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
            // Top face (Y+)
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
            // Bottom face (Y-)
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
            // Right face (X+)
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
            // Left face (X-)
            Vertex3d::new([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 0.0]),
        ];

        #[rustfmt::skip]
        let indices: Vec<u32> = vec![
            0,  1,  2,  2,  3,  0,  // front
            4,  5,  6,  6,  7,  4,  // back
            8,  9,  10, 10, 11, 8,  // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        let mut mesh = Self::new(vertices, indices);
        mesh.compute_tangents();
        mesh
    }

    /// UV sphere of radius 0.5.
    ///
    /// `segments` divide the equator and `rings` run pole to pole; both are
    /// raised to sensible minimums.
    pub fn sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = TAU * seg as f32 / segments as f32;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                vertices.push(Vertex3d::new(
                    (normal * 0.5).to_array(),
                    normal.to_array(),
                    [seg as f32 / segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        let indices = grid_indices(rings, segments);
        let mut mesh = Self::new(vertices, indices);
        mesh.compute_tangents();
        mesh
    }

    /// Square on the XZ plane facing +Y.
    pub fn plane(size: f32) -> Self {
        let half = size * 0.5;
        let up = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex3d::new([-half, 0.0, -half], up, [0.0, 1.0]),
            Vertex3d::new([half, 0.0, -half], up, [1.0, 1.0]),
            Vertex3d::new([half, 0.0, half], up, [1.0, 0.0]),
            Vertex3d::new([-half, 0.0, half], up, [0.0, 0.0]),
        ];
        let indices = vec![0, 2, 1, 0, 3, 2];

        let mut mesh = Self::new(vertices, indices);
        mesh.compute_tangents();
        mesh
    }

    /// Capped cylinder along Y, radius 0.5 and height 1, centered.
    pub fn cylinder(segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side: a bottom and a top vertex per column
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = TAU * u;
            let normal = [theta.cos(), 0.0, theta.sin()];
            let (x, z) = (normal[0] * 0.5, normal[2] * 0.5);
            vertices.push(Vertex3d::new([x, -0.5, z], normal, [u, 1.0]));
            vertices.push(Vertex3d::new([x, 0.5, z], normal, [u, 0.0]));
        }
        for seg in 0..segments {
            let bottom = seg * 2;
            let top = bottom + 1;
            let next_bottom = bottom + 2;
            let next_top = bottom + 3;
            indices.extend_from_slice(&[bottom, top, next_bottom, next_bottom, top, next_top]);
        }

        for (y, normal_y) in [(0.5f32, 1.0f32), (-0.5, -1.0)] {
            let normal = [0.0, normal_y, 0.0];
            let center = vertices.len() as u32;
            vertices.push(Vertex3d::new([0.0, y, 0.0], normal, [0.5, 0.5]));
            for seg in 0..=segments {
                let theta = TAU * seg as f32 / segments as f32;
                let (x, z) = (theta.cos() * 0.5, theta.sin() * 0.5);
                vertices.push(Vertex3d::new([x, y, z], normal, [x + 0.5, 0.5 - z * normal_y]));
            }
            for seg in 0..segments {
                let rim = center + 1 + seg;
                if normal_y > 0.0 {
                    indices.extend_from_slice(&[center, rim + 1, rim]);
                } else {
                    indices.extend_from_slice(&[center, rim, rim + 1]);
                }
            }
        }

        let mut mesh = Self::new(vertices, indices);
        mesh.compute_tangents();
        mesh
    }

    /// Torus in the XZ plane.
    ///
    /// `major_radius` is the distance from the center to the middle of the
    /// tube; `minor_radius` is the tube radius.
    pub fn torus(major_radius: f32, minor_radius: f32, segments: u32, sides: u32) -> Self {
        let segments = segments.max(3);
        let sides = sides.max(3);
        let mut vertices = Vec::with_capacity(((segments + 1) * (sides + 1)) as usize);

        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = TAU * u;
            for side in 0..=sides {
                let v = side as f32 / sides as f32;
                let phi = TAU * v;
                let normal = Vec3::new(phi.cos() * theta.cos(), phi.sin(), phi.cos() * theta.sin());
                let center = Vec3::new(theta.cos(), 0.0, theta.sin()) * major_radius;
                let position = center + normal * minor_radius;
                vertices.push(Vertex3d::new(position.to_array(), normal.to_array(), [u, v]));
            }
        }

        let indices = grid_indices(segments, sides);
        let mut mesh = Self::new(vertices, indices);
        mesh.compute_tangents();
        mesh
    }

    /// Fills every vertex tangent from the triangle UV gradients.
    ///
    /// Tangents are orthogonalized against the normal. Vertices whose
    /// triangles have degenerate UVs get an arbitrary perpendicular.
    pub fn compute_tangents(&mut self) {
        let mut accumulated = vec![Vec3::ZERO; self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let (Some(v0), Some(v1), Some(v2)) = (
                self.vertices.get(i0),
                self.vertices.get(i1),
                self.vertices.get(i2),
            ) else {
                continue;
            };

            let edge1 = Vec3::from(v1.position) - Vec3::from(v0.position);
            let edge2 = Vec3::from(v2.position) - Vec3::from(v0.position);
            let duv1 = Vec2::from(v1.uv) - Vec2::from(v0.uv);
            let duv2 = Vec2::from(v2.uv) - Vec2::from(v0.uv);

            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;
            for index in [i0, i1, i2] {
                accumulated[index] += tangent;
            }
        }

        for (vertex, tangent) in self.vertices.iter_mut().zip(accumulated) {
            let normal = Vec3::from(vertex.normal);
            let orthogonal = tangent - normal * normal.dot(tangent);
            let tangent = orthogonal
                .try_normalize()
                .unwrap_or_else(|| normal.any_orthonormal_vector());
            vertex.tangent = tangent.to_array();
        }
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = Vec3::from(self.vertices.first()?.position);
        Some(self.vertices.iter().fold((first, first), |(min, max), vertex| {
            let position = Vec3::from(vertex.position);
            (min.min(position), max.max(position))
        }))
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Indices for a `(rows + 1) x (columns + 1)` vertex grid where rows advance
/// along the first parameter and columns along the second.
fn grid_indices(rows: u32, columns: u32) -> Vec<u32> {
    let stride = columns + 1;
    let mut indices = Vec::with_capacity((rows * columns * 6) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let current = row * stride + column;
            let next = current + stride;
            indices.extend_from_slice(&[current, current + 1, next, current + 1, next + 1, next]);
        }
    }
    indices
}

/// GPU-resident mesh geometry.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Uploads vertex and index data. An empty mesh is valid and draws nothing.
    pub fn new(device: &wgpu::Device, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn primitives() -> Vec<(&'static str, MeshData)> {
        vec![
            ("cube", MeshData::cube()),
            ("sphere", MeshData::sphere(24, 12)),
            ("plane", MeshData::plane(4.0)),
            ("cylinder", MeshData::cylinder(16)),
            ("torus", MeshData::torus(0.35, 0.15, 24, 12)),
        ]
    }

    #[test]
    fn vertex_is_44_bytes() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 44);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 44);
    }

    #[test]
    fn indices_in_range_and_normals_unit() {
        for (name, mesh) in primitives() {
            assert_eq!(mesh.indices.len() % 3, 0, "{name}");
            let count = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < count), "{name}");
            for vertex in &mesh.vertices {
                let length = Vec3::from(vertex.normal).length();
                assert!((length - 1.0).abs() < 1e-4, "{name}: normal length {length}");
            }
        }
    }

    #[test]
    fn triangles_face_along_their_normals() {
        for (name, mesh) in primitives() {
            for triangle in mesh.indices.chunks_exact(3) {
                let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
                    .map(|i| mesh.vertices[i as usize]);
                let face = (Vec3::from(b.position) - Vec3::from(a.position))
                    .cross(Vec3::from(c.position) - Vec3::from(a.position));
                let normal = Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
                assert!(face.dot(normal) >= -1e-6, "{name}: inward triangle {triangle:?}");
            }
        }
    }

    #[test]
    fn tangents_are_unit_and_perpendicular() {
        for (name, mesh) in primitives() {
            for vertex in &mesh.vertices {
                let tangent = Vec3::from(vertex.tangent);
                assert!((tangent.length() - 1.0).abs() < 1e-3, "{name}");
                assert!(tangent.dot(Vec3::from(vertex.normal)).abs() < 1e-3, "{name}");
            }
        }
    }

    #[test]
    fn cube_tangent_follows_u() {
        let cube = MeshData::cube();
        // Front face: U increases along +X
        assert_eq!(cube.vertices[0].tangent, [1.0, 0.0, 0.0]);
    }

    #[rstest]
    #[case(MeshData::cube(), Vec3::splat(-0.5), Vec3::splat(0.5))]
    #[case(MeshData::plane(4.0), Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 0.0, 2.0))]
    #[case(MeshData::cylinder(8), Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5))]
    fn bounds(#[case] mesh: MeshData, #[case] min: Vec3, #[case] max: Vec3) {
        let (actual_min, actual_max) = mesh.bounds().expect("non-empty mesh");
        assert!(actual_min.abs_diff_eq(min, 1e-5));
        assert!(actual_max.abs_diff_eq(max, 1e-5));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert_eq!(MeshData::default().bounds(), None);
        assert_eq!(MeshData::default().triangle_count(), 0);
    }

    #[test]
    fn tessellation_is_clamped() {
        let sphere = MeshData::sphere(0, 0);
        assert_eq!(sphere.triangle_count(), 3 * 2 * 2);
    }
}
