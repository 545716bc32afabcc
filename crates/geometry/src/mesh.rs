use glam::{Vec2, Vec3};

/// One mesh vertex as consumed by the vertex stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Indexed triangle mesh. Front faces wind counter-clockwise.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned bounds of the vertex positions, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.min(v.position), hi.max(v.position))
        }))
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [&MeshVertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                &self.vertices[tri[0] as usize],
                &self.vertices[tri[1] as usize],
                &self.vertices[tri[2] as usize],
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> MeshVertex {
        MeshVertex {
            position: Vec3::new(x, y, z),
            normal: Vec3::Z,
            uv: Vec2::ZERO,
        }
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
    }

    #[test]
    fn bounds_and_triangles() {
        let mesh = Mesh {
            vertices: vec![
                vertex(-1.0, 0.0, 0.0),
                vertex(1.0, -2.0, 0.5),
                vertex(0.0, 3.0, 0.0),
            ],
            indices: vec![0, 1, 2],
        };
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(hi, Vec3::new(1.0, 3.0, 0.5));
        assert_eq!(mesh.triangle_count(), 1);
        let tri = mesh.triangles().next().unwrap();
        assert_eq!(tri[2].position.y, 3.0);
    }
}
