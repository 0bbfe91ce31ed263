//! Mesh generation for the playback surfaces
//!
//! Flat formats are drawn on a unit quad, 180° and 360° formats on a
//! unit sphere. The sphere is shared by both spherical formats; they only
//! differ in shader treatment.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use super::types::Format;

/// Angular tessellation of the sphere mesh
pub const SPHERE_SEGMENTS: u32 = 32;

/// Interleaved vertex uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// Normal vector
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// Size of vertex in bytes
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Vertex buffer layout for wgpu
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // normal
                wgpu::VertexAttribute {
                    offset: 20,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Generated mesh data
///
/// Attributes are kept as separate streams; `cells` index into all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub cells: Vec<[u32; 3]>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    /// Mesh for a video format.
    ///
    /// Spherical formats get [`Mesh::sphere`], everything else the flat
    /// [`Mesh::quad`].
    pub fn for_format(format: Format) -> Self {
        match format {
            Format::Fov180 | Format::Fov360 => Self::sphere(1.0, SPHERE_SEGMENTS),
            Format::Screen => Self::quad(),
        }
    }

    /// Unit quad in the XY plane facing -Z
    pub fn quad() -> Self {
        let normal = Vec3::new(0.0, 0.0, -1.0);
        Self {
            positions: vec![
                Vec3::new(-1.0, 1.0, 0.0),
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
            ],
            cells: vec![[0, 2, 1], [0, 3, 2]],
            uvs: vec![
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
            ],
            normals: vec![normal; 4],
        }
    }

    /// UV sphere
    ///
    /// Uses `segments + 2` latitude rings and twice as many longitude
    /// columns. The seam column is duplicated so U runs 0..=1 without
    /// wrapping. Vertices with `z > 0` are exactly those with `u < 0.5`.
    pub fn sphere(radius: f32, segments: u32) -> Self {
        let rings = segments + 2;
        let columns = rings * 2;
        let vertex_count = ((rings + 1) * (columns + 1)) as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut cells = Vec::with_capacity((rings * columns * 2) as usize);

        for ring in 0..=rings {
            let nz = ring as f32 / rings as f32;
            let angle_z = nz * PI;

            for column in 0..=columns {
                let ny = column as f32 / columns as f32;
                let angle_y = ny * TAU;

                let normal = Vec3::new(
                    -angle_y.cos() * angle_z.sin(),
                    angle_z.cos(),
                    angle_y.sin() * angle_z.sin(),
                );

                positions.push(normal * radius);
                normals.push(normal);
                uvs.push(Vec2::new(ny, 1.0 - nz));
            }

            if ring > 0 {
                let stride = columns + 1;
                let previous = (ring - 1) * stride;
                for k in previous..previous + columns {
                    cells.push([k, k + 1, k + stride]);
                    cells.push([k + stride, k + 1, k + stride + 1]);
                }
            }
        }

        Self {
            positions,
            cells,
            uvs,
            normals,
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices (three per cell)
    pub fn index_count(&self) -> u32 {
        (self.cells.len() * 3) as u32
    }

    /// Interleave the attribute streams for upload
    pub fn vertices(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(&self.uvs)
            .zip(&self.normals)
            .map(|((position, uv), normal)| MeshVertex {
                position: position.to_array(),
                uv: uv.to_array(),
                normal: normal.to_array(),
            })
            .collect()
    }

    /// Flattened triangle indices
    pub fn indices(&self) -> Vec<u32> {
        self.cells.iter().flatten().copied().collect()
    }
}
