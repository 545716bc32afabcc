use glam::{Mat4, Vec2, Vec3, Vec4};
use knotfade_geometry::MeshVertex;

/// Matrices and camera position supplied by the host each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
}

impl Default for Transforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
        }
    }
}

/// Per-vertex outputs interpolated across each triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Varyings {
    pub clip_position: Vec4,
    /// Mesh uv, carried through but not used for coloring.
    pub uv: Vec2,
    /// Object-space position remapped from [-1, 1] to [0, 1] per axis.
    pub unit_position: Vec3,
    /// Unit vector from the surface point towards the camera, world space.
    pub view_dir: Vec3,
    /// Unit surface normal, world space.
    pub world_normal: Vec3,
}

/// Vertex stage of the knot shader.
pub fn shade_vertex(vertex: &MeshVertex, transforms: &Transforms) -> Varyings {
    let world_position = transforms.model * vertex.position.extend(1.0);
    // w = 0 drops the translation column
    let world_normal = transforms.model * vertex.normal.extend(0.0);

    Varyings {
        clip_position: transforms.projection * transforms.view * world_position,
        uv: vertex.uv,
        unit_position: vertex.position * 0.5 + 0.5,
        view_dir: (transforms.camera_position - world_position.truncate()).normalize(),
        world_normal: world_normal.truncate().normalize(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(position: Vec3, normal: Vec3) -> MeshVertex {
        MeshVertex {
            position,
            normal,
            uv: Vec2::new(0.25, 0.75),
        }
    }

    #[test]
    fn remaps_object_space_to_unit_range() {
        let t = Transforms::default();
        let out = shade_vertex(&vertex(Vec3::new(-1.0, 0.0, 1.0), Vec3::Y), &t);
        assert_eq!(out.unit_position, Vec3::new(0.0, 0.5, 1.0));
        assert_eq!(out.uv, Vec2::new(0.25, 0.75));
    }

    #[test]
    fn remap_ignores_model_matrix() {
        let t = Transforms {
            model: Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)),
            ..Transforms::default()
        };
        let out = shade_vertex(&vertex(Vec3::new(0.0, 0.5, 0.0), Vec3::Y), &t);
        assert_eq!(out.unit_position.y, 0.75);
    }

    #[test]
    fn view_direction_points_at_camera() {
        let t = Transforms {
            camera_position: Vec3::new(0.0, 0.0, 3.0),
            ..Transforms::default()
        };
        let out = shade_vertex(&vertex(Vec3::new(0.0, 0.0, 1.0), Vec3::Z), &t);
        assert!((out.view_dir - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn normal_ignores_translation_and_is_normalized() {
        let t = Transforms {
            model: Mat4::from_scale_rotation_translation(
                Vec3::splat(4.0),
                glam::Quat::IDENTITY,
                Vec3::new(10.0, -3.0, 2.0),
            ),
            ..Transforms::default()
        };
        let out = shade_vertex(&vertex(Vec3::ZERO, Vec3::X), &t);
        assert!((out.world_normal - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn clip_position_applies_model_view_projection() {
        let t = Transforms {
            model: Mat4::from_translation(Vec3::X),
            view: Mat4::from_translation(Vec3::Y),
            projection: Mat4::from_scale(Vec3::splat(2.0)),
            camera_position: Vec3::Z,
        };
        let out = shade_vertex(&vertex(Vec3::ZERO, Vec3::Z), &t);
        assert_eq!(out.clip_position, Vec4::new(2.0, 2.0, 0.0, 1.0));
    }
}
