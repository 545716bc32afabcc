use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::mesh::{Mesh, MeshVertex};

/// Errors from invalid torus-knot parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
    #[error("{0} must be finite")]
    NotFinite(&'static str),
    #[error("winding p must be non-zero")]
    ZeroWinding,
    #[error("{tubular}x{radial} segments exceed the 32-bit index range")]
    TooManyVertices { tubular: u32, radial: u32 },
}

/// Parametric (p, q) torus knot swept by a circular tube.
///
/// The curve winds `p` times around the torus axis and `q` times through its
/// hole. Defaults match the scene: radius 0.5, tube 0.2, 110×20 segments, p=2, q=3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusKnot {
    pub radius: f32,
    pub tube: f32,
    pub tubular_segments: u32,
    pub radial_segments: u32,
    pub p: u32,
    pub q: u32,
}

impl Default for TorusKnot {
    fn default() -> Self {
        Self {
            radius: 0.5,
            tube: 0.2,
            tubular_segments: 110,
            radial_segments: 20,
            p: 2,
            q: 3,
        }
    }
}

/// Step along the curve used to estimate the tangent frame.
const FRAME_EPSILON: f32 = 0.01;

impl TorusKnot {
    pub fn validate(&self) -> Result<(), GeometryError> {
        check_size("radius", self.radius)?;
        check_size("tube", self.tube)?;
        if self.tubular_segments == 0 {
            return Err(GeometryError::NonPositive("tubular_segments"));
        }
        if self.radial_segments == 0 {
            return Err(GeometryError::NonPositive("radial_segments"));
        }
        if self.p == 0 {
            return Err(GeometryError::ZeroWinding);
        }
        self.vertex_count()?;
        Ok(())
    }

    /// `(tubular + 1) * (radial + 1)`, if every vertex is addressable by a `u32` index.
    pub fn vertex_count(&self) -> Result<u32, GeometryError> {
        let rings = self.tubular_segments.checked_add(1);
        let ring = self.radial_segments.checked_add(1);
        rings
            .zip(ring)
            .and_then(|(rings, ring)| rings.checked_mul(ring))
            .ok_or(GeometryError::TooManyVertices {
                tubular: self.tubular_segments,
                radial: self.radial_segments,
            })
    }

    /// Point on the knot's center curve at parameter `u`.
    pub fn curve_point(&self, u: f32) -> Vec3 {
        let (su, cu) = u.sin_cos();
        let qu_over_p = self.q as f32 / self.p as f32 * u;
        let cs = qu_over_p.cos();
        Vec3::new(
            self.radius * (2.0 + cs) * 0.5 * cu,
            self.radius * (2.0 + cs) * su * 0.5,
            self.radius * qu_over_p.sin() * 0.5,
        )
    }

    /// Generate the indexed mesh.
    ///
    /// Emits `(tubular + 1) * (radial + 1)` vertices: the first and last ring,
    /// and the first and last vertex of each ring, coincide so uvs stay continuous.
    pub fn build(&self) -> Result<Mesh, GeometryError> {
        self.validate()?;
        let vertex_count = self.vertex_count()?;

        let tubular = self.tubular_segments;
        let radial = self.radial_segments;
        let ring = radial + 1;

        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * self.p as f32 * TAU;

            let p1 = self.curve_point(u);
            let p2 = self.curve_point(u + FRAME_EPSILON);
            let tangent = p2 - p1;
            let mut normal = p2 + p1;
            let binormal = tangent.cross(normal).normalize();
            normal = binormal.cross(tangent).normalize();

            for j in 0..=radial {
                let v = j as f32 / radial as f32 * TAU;
                let cx = -self.tube * v.cos();
                let cy = self.tube * v.sin();

                let position = p1 + normal * cx + binormal * cy;
                vertices.push(MeshVertex {
                    position,
                    normal: (position - p1).normalize(),
                    uv: Vec2::new(i as f32 / tubular as f32, j as f32 / radial as f32),
                });
            }
        }

        let mut indices = Vec::with_capacity(tubular as usize * radial as usize * 6);
        for j in 1..=tubular {
            for i in 1..=radial {
                let a = ring * (j - 1) + (i - 1);
                let b = ring * j + (i - 1);
                let c = ring * j + i;
                let d = ring * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        tracing::debug!(
            vertices = vertices.len(),
            indices = indices.len(),
            p = self.p,
            q = self.q,
            "built torus knot"
        );

        Ok(Mesh { vertices, indices })
    }
}

fn check_size(name: &'static str, value: f32) -> Result<(), GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::NotFinite(name));
    }
    if value <= 0.0 {
        return Err(GeometryError::NonPositive(name));
    }
    Ok(())
}
