//! Indexed mesh generation for the planet sphere and the disk plane.

use std::f32::consts::{PI, TAU};

use celestial_render::VertexPositionNormalUv;

/// CPU-side indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// UV sphere centred on the origin with +Y as the polar axis.
///
/// `width_segments` slices around the equator, `height_segments` stacks from
/// pole to pole. Degenerate pole triangles are skipped. Both counts are
/// clamped to the smallest sphere that still encloses volume.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row = width_segments + 1;

    let mut vertices = Vec::with_capacity((row * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let normal = glam::Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            vertices.push(VertexPositionNormalUv {
                position: (normal * radius).to_array(),
                normal: normal.normalize_or_zero().to_array(),
                uv: [u, 1.0 - v],
            });
        }
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Subdivided plane in the local XY plane facing +Z, centred on the origin.
pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let grid_x = width_segments.max(1);
    let grid_y = height_segments.max(1);
    let row = grid_x + 1;
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;

    let mut vertices = Vec::with_capacity((row * (grid_y + 1)) as usize);
    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - height / 2.0;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - width / 2.0;
            vertices.push(VertexPositionNormalUv {
                position: [x, -y, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32],
            });
        }
    }

    let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = ix + 1 + row * (iy + 1);
            let d = ix + 1 + row * iy;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle_normal(mesh: &MeshData, tri: &[u32]) -> Vec3 {
        let p = |i: u32| Vec3::from_array(mesh.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = uv_sphere(3.2, 64, 64);
        assert_eq!(mesh.vertices.len(), 65 * 65);
        // Two triangles per quad, minus one row of degenerate triangles at each pole.
        assert_eq!(mesh.triangle_count(), 64 * 64 * 2 - 2 * 64);
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = uv_sphere(3.2, 16, 12);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            assert!((r - 3.2).abs() < 1e-4, "radius {r}");
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_triangles_face_outward() {
        let mesh = uv_sphere(1.0, 24, 16);
        for tri in mesh.indices.chunks(3) {
            let centroid: Vec3 = tri
                .iter()
                .map(|&i| Vec3::from_array(mesh.vertices[i as usize].position))
                .sum::<Vec3>()
                / 3.0;
            assert!(triangle_normal(&mesh, tri).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_plane_counts_and_extent() {
        let mesh = plane(22.0, 22.0, 128, 128);
        assert_eq!(mesh.vertices.len(), 129 * 129);
        assert_eq!(mesh.triangle_count(), 128 * 128 * 2);

        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert!((max_x - 11.0).abs() < 1e-4);
        assert!(mesh.vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_plane_triangles_face_positive_z() {
        let mesh = plane(2.0, 2.0, 4, 4);
        for tri in mesh.indices.chunks(3) {
            assert!(triangle_normal(&mesh, tri).z > 0.0);
        }
    }

    #[test]
    fn test_plane_uv_corners() {
        let mesh = plane(2.0, 2.0, 1, 1);
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[3].uv, [1.0, 0.0]);
        assert_eq!(mesh.vertices[0].position, [-1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_indices_in_range() {
        for mesh in [uv_sphere(1.0, 8, 6), plane(1.0, 1.0, 3, 5)] {
            let n = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < n));
        }
    }
}
