// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Floats per interleaved vertex: position (3) + normal (3)
pub const INTERLEAVED_STRIDE: usize = 6;

/// Triangle mesh with separate position and normal streams
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Build a mesh from an interleaved `[px, py, pz, nx, ny, nz, ...]` buffer
    ///
    /// Every 6 floats become one position triple and one normal triple. Fails with
    /// [`Error::EmptyMesh`] when either array is empty, which callers treat as
    /// "nothing to render" rather than a hard failure.
    pub fn from_interleaved(vertex_data: &[f32], index_data: &[u32]) -> Result<Self> {
        if vertex_data.is_empty() || index_data.is_empty() {
            return Err(Error::EmptyMesh(format!(
                "{} vertex floats, {} indices",
                vertex_data.len(),
                index_data.len()
            )));
        }
        if vertex_data.len() % INTERLEAVED_STRIDE != 0 {
            return Err(Error::MisalignedVertexData(vertex_data.len()));
        }

        let vertex_count = vertex_data.len() / INTERLEAVED_STRIDE;
        if let Some(&index) = index_data.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let mut mesh = Self::with_capacity(vertex_count, index_data.len());
        for vertex in vertex_data.chunks_exact(INTERLEAVED_STRIDE) {
            mesh.positions.extend_from_slice(&vertex[0..3]);
            mesh.normals.extend_from_slice(&vertex[3..6]);
        }
        mesh.indices.extend_from_slice(index_data);
        Ok(mesh)
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Batch merge multiple meshes at once (reserves once up front)
    #[inline]
    pub fn merge_all(&mut self, meshes: &[Mesh]) {
        let total_positions: usize = meshes.iter().map(|m| m.positions.len()).sum();
        let total_indices: usize = meshes.iter().map(|m| m.indices.len()).sum();

        self.positions.reserve(total_positions);
        self.normals.reserve(total_positions);
        self.indices.reserve(total_indices);

        for mesh in meshes {
            self.merge(mesh);
        }
    }

    /// Apply a transform in place
    ///
    /// Positions take the full matrix; normals take the inverse-transpose of its
    /// upper 3x3 and are re-normalised, so non-uniform scale keeps shading correct.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        if self.is_empty() {
            return;
        }

        for chunk in self.positions.chunks_exact_mut(3) {
            let p = matrix.transform_point(&Point3::new(
                chunk[0] as f64,
                chunk[1] as f64,
                chunk[2] as f64,
            ));
            chunk[0] = p.x as f32;
            chunk[1] = p.y as f32;
            chunk[2] = p.z as f32;
        }

        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);

        for chunk in self.normals.chunks_exact_mut(3) {
            let n = normal_matrix * Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let n = n.try_normalize(f64::EPSILON).unwrap_or(n);
            chunk[0] = n.x as f32;
            chunk[1] = n.y as f32;
            chunk[2] = n.z as f32;
        }
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Calculate the axis-aligned bounds of the positions
    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_positions(&self.positions)
    }

    /// Approximate heap footprint of the buffers, in bytes
    #[inline]
    pub fn byte_size(&self) -> usize {
        (self.positions.len() + self.normals.len()) * std::mem::size_of::<f32>()
            + self.indices.len() * std::mem::size_of::<u32>()
    }

    /// Clear the mesh
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
