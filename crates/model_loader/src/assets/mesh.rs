//! Indexed mesh data built from parsed geometry
//!
//! The OBJ parser emits one vertex per face corner. This module folds
//! identical corners together into an interleaved vertex buffer plus a
//! triangle index buffer, the layout renderers upload.

use std::collections::HashMap;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use super::obj_parser::GeometryData;

bitflags! {
    /// Vertex attributes available for every vertex of a chunk
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexAttributes: u8 {
        /// Position (always present for non-empty chunks)
        const POSITION = 0b0001;
        /// Texture coordinates
        const TEXCOORD = 0b0010;
        /// Normals
        const NORMAL = 0b0100;
        /// Per-vertex colors
        const COLOR = 0b1000;
    }
}

/// Texture coordinate used when a chunk has none
pub const DEFAULT_TEX_COORD: [f32; 2] = [0.0, 0.0];

/// Normal used when a chunk has none
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Color used when a chunk has no vertex colors
pub const DEFAULT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Mesh building errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Attribute array is neither empty nor one entry per vertex
    #[error("{attribute} has {found} floats, expected 0 or {expected}")]
    RaggedAttribute {
        /// Attribute name
        attribute: &'static str,
        /// Float count found
        found: usize,
        /// Float count required for full coverage
        expected: usize,
    },

    /// Mesh too large for 32-bit indices
    #[error("Mesh has more than u32::MAX unique vertices")]
    TooManyVertices,
}

/// Interleaved vertex ready for GPU upload
///
/// `#[repr(C)]` with only `f32` fields, so a `&[Vertex]` can be viewed as
/// bytes without padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],

    /// Vertex color
    pub color: [f32; 3],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2], color: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            color,
        }
    }

    /// Bit pattern used for deduplication (NaN payloads compare by bits)
    fn key(&self) -> [u32; 11] {
        let mut key = [0u32; 11];
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(self));
        for (k, f) in key.iter_mut().zip(floats) {
            *k = f.to_bits();
        }
        key
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Unique vertices
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,

    /// Attributes that came from the source rather than defaults
    pub attributes: VertexAttributes,
}

impl Default for VertexAttributes {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mesh {
    /// Create a new mesh
    pub const fn new(vertices: Vec<Vertex>, indices: Vec<u32>, attributes: VertexAttributes) -> Self {
        Self {
            vertices,
            indices,
            attributes,
        }
    }

    /// Deduplicate a chunk's flat arrays into an indexed mesh
    ///
    /// Texcoords, normals and colors must each be empty (a constant default
    /// is used) or cover every vertex. Partially covered chunks are rejected
    /// because their per-vertex association is lost in the flat arrays.
    pub fn from_geometry(data: &GeometryData) -> Result<Self, MeshError> {
        let count = data.vertex_count();
        check_coverage("texcoord", &data.texcoord, count, 2)?;
        check_coverage("normal", &data.normal, count, 3)?;
        check_coverage("color", &data.color, count, 3)?;

        let mut vertices = Vec::new();
        let mut indices = Vec::with_capacity(count);
        let mut seen: HashMap<[u32; 11], u32> = HashMap::new();

        for i in 0..count {
            let vertex = Vertex::new(
                read3(&data.position, i),
                if data.normal.is_empty() { DEFAULT_NORMAL } else { read3(&data.normal, i) },
                if data.texcoord.is_empty() {
                    DEFAULT_TEX_COORD
                } else {
                    [data.texcoord[i * 2], data.texcoord[i * 2 + 1]]
                },
                if data.color.is_empty() { DEFAULT_COLOR } else { read3(&data.color, i) },
            );

            let index = match seen.get(&vertex.key()) {
                Some(&index) => index,
                None => {
                    let index = u32::try_from(vertices.len()).map_err(|_| MeshError::TooManyVertices)?;
                    seen.insert(vertex.key(), index);
                    vertices.push(vertex);
                    index
                }
            };
            indices.push(index);
        }

        log::trace!("Indexed {} vertices down to {}", count, vertices.len());
        Ok(Self::new(vertices, indices, data.attributes()))
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex buffer contents as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

fn read3(values: &[f32], vertex: usize) -> [f32; 3] {
    [values[vertex * 3], values[vertex * 3 + 1], values[vertex * 3 + 2]]
}

fn check_coverage(attribute: &'static str, values: &[f32], count: usize, width: usize) -> Result<(), MeshError> {
    if values.is_empty() || values.len() == count * width {
        Ok(())
    } else {
        Err(MeshError::RaggedAttribute {
            attribute,
            found: values.len(),
            expected: count * width,
        })
    }
}
