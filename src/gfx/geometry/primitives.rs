//! # Primitive Shape Generation
//!
//! Shapes are generated in a Y-up frame. Flat shapes lie in the XZ plane with
//! their normal pointing along positive Y.

use super::{GeometryData, Topology};
use std::f32::consts::PI;

/// Generate an axis-aligned box centered at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // Front face (positive Z)
        ([0.0, 0.0, 1.0], [[-hx, -hy, hz], [hx, -hy, hz], [hx, hy, hz], [-hx, hy, hz]]),
        // Back face (negative Z)
        ([0.0, 0.0, -1.0], [[hx, -hy, -hz], [-hx, -hy, -hz], [-hx, hy, -hz], [hx, hy, -hz]]),
        // Left face (negative X)
        ([-1.0, 0.0, 0.0], [[-hx, -hy, -hz], [-hx, -hy, hz], [-hx, hy, hz], [-hx, hy, -hz]]),
        // Right face (positive X)
        ([1.0, 0.0, 0.0], [[hx, -hy, hz], [hx, -hy, -hz], [hx, hy, -hz], [hx, hy, hz]]),
        // Top face (positive Y)
        ([0.0, 1.0, 0.0], [[-hx, hy, hz], [hx, hy, hz], [hx, hy, -hz], [-hx, hy, -hz]]),
        // Bottom face (negative Y)
        ([0.0, -1.0, 0.0], [[-hx, -hy, -hz], [hx, -hy, -hz], [hx, -hy, hz], [-hx, -hy, hz]]),
    ];

    for (normal, corners) in faces {
        let base = data.vertices.len() as u32;
        for corner in corners {
            data.vertices.push(corner);
            data.normals.push(normal);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a single-quad plane in the XZ plane, facing up
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
pub fn generate_plane(width: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let (hx, hz) = (width * 0.5, depth * 0.5);

    data.vertices = vec![[-hx, 0.0, hz], [hx, 0.0, hz], [hx, 0.0, -hz], [-hx, 0.0, -hz]];
    data.normals = vec![[0.0, 1.0, 0.0]; 4];
    // Counter-clockwise when viewed from above
    data.indices = vec![0, 1, 2, 2, 3, 0];

    data
}

/// Generate a flat annulus in the XZ plane
///
/// # Arguments
/// * `inner_radius` - Radius of the hole
/// * `outer_radius` - Outer radius
/// * `segments` - Number of angular segments (minimum 3)
pub fn generate_ring(inner_radius: f32, outer_radius: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();

        data.vertices.push([inner_radius * cos_a, 0.0, -inner_radius * sin_a]);
        data.normals.push([0.0, 1.0, 0.0]);

        data.vertices.push([outer_radius * cos_a, 0.0, -outer_radius * sin_a]);
        data.normals.push([0.0, 1.0, 0.0]);
    }

    for i in 0..segs {
        let inner = i * 2;
        let outer = inner + 1;
        let next_inner = inner + 2;
        let next_outer = inner + 3;

        data.indices.extend_from_slice(&[inner, outer, next_outer]);
        data.indices.extend_from_slice(&[next_outer, next_inner, inner]);
    }

    data
}

/// Generate a square grid of lines in the XZ plane
///
/// The two center lines use `center_color`, the rest use `line_color`.
///
/// # Arguments
/// * `size` - Edge length of the grid
/// * `divisions` - Number of cells per side
pub fn generate_grid_lines(
    size: f32,
    divisions: u32,
    center_color: [f32; 3],
    line_color: [f32; 3],
) -> GeometryData {
    let mut data = GeometryData::new();
    data.topology = Topology::Lines;

    let divs = divisions.max(1);
    let step = size / divs as f32;
    let half = size * 0.5;
    let center = divs / 2;

    for i in 0..=divs {
        let offset = -half + i as f32 * step;
        let color = if divs % 2 == 0 && i == center {
            center_color
        } else {
            line_color
        };

        for endpoints in [
            [[-half, 0.0, offset], [half, 0.0, offset]],
            [[offset, 0.0, -half], [offset, 0.0, half]],
        ] {
            for point in endpoints {
                data.indices.push(data.vertices.len() as u32);
                data.vertices.push(point);
                data.normals.push([0.0, 1.0, 0.0]);
                data.colors.push(color);
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_generation() {
        let slab = generate_box(20.2, 4.0, 0.2);
        assert_eq!(slab.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(slab.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(slab.vertex_count(), 24);
        assert_eq!(slab.triangle_count(), 12);

        let max_x = slab.vertices.iter().map(|v| v[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 10.1).abs() < 1e-5);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(0.95, 0.95);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.triangle_count(), 2);
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
        assert!(plane.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_ring_generation() {
        let ring = generate_ring(0.6, 0.7, 32);
        assert_eq!(ring.vertices.len(), 66); // (32 + 1) * 2
        assert_eq!(ring.triangle_count(), 64);

        for v in &ring.vertices {
            let r = (v[0] * v[0] + v[2] * v[2]).sqrt();
            assert!(r > 0.599 && r < 0.701);
        }
    }

    #[test]
    fn test_grid_lines_generation() {
        let grid = generate_grid_lines(20.0, 20, [0.0; 3], [1.0; 3]);
        assert_eq!(grid.topology, Topology::Lines);
        assert_eq!(grid.line_count(), 42); // 21 lines per axis
        assert_eq!(grid.triangle_count(), 0);
        assert_eq!(grid.colors.len(), grid.vertices.len());
        // exactly the two centre lines carry the centre colour
        assert_eq!(grid.colors.iter().filter(|c| **c == [0.0; 3]).count(), 4);
    }
}
