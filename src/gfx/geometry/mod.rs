//! # Procedural Geometry Generation
//!
//! Every mesh the heatmap scene needs is generated here, so no model files
//! are loaded at runtime.
//!
//! ## Supported Primitives
//!
//! - **Box**: Wall slabs with configurable extents
//! - **Plane**: Floor and tile quads lying in the XZ plane
//! - **Ring**: Flat annulus used to mark the selected tile
//! - **Grid lines**: Line list overlay drawn just above the floor
//!
//! ## Usage
//!
//! ```rust
//! use spotmap::gfx::geometry::{generate_plane, generate_ring};
//!
//! // A tile quad slightly smaller than its grid cell
//! let tile = generate_plane(0.95, 0.95);
//! assert_eq!(tile.triangle_count(), 2);
//!
//! // Selection ring
//! let ring = generate_ring(0.6, 0.7, 32);
//! assert_eq!(ring.triangle_count(), 64);
//! ```

pub mod primitives;

pub use primitives::*;

/// How the index buffer of a mesh is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Generated geometry ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Optional per-vertex colours, used by line overlays
    pub colors: Vec<[f32; 3]>,
    /// Triangle or line indices (counter-clockwise winding for triangles)
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl GeometryData {
    /// Create a new empty triangle mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
            topology: Topology::Triangles,
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => 0,
        }
    }

    /// Get the number of line segments in this geometry
    pub fn line_count(&self) -> usize {
        match self.topology {
            Topology::Lines => self.indices.len() / 2,
            Topology::Triangles => 0,
        }
    }

    /// Interleave into the vertex format consumed by the renderer
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices: Vec<Vertex3D> = (0..self.vertices.len())
            .map(|i| {
                Vertex3D::new(
                    self.vertices[i],
                    self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    self.colors.get(i).copied().unwrap_or([1.0, 1.0, 1.0]),
                )
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}
