use std::fmt;

use glam::{Mat4, Vec3, Vec4};
use knotfade_geometry::Mesh;
use serde::Serialize;

use crate::fragment::{FragmentTerms, FrameInputs};
use crate::vertex::{Transforms, Varyings, shade_vertex};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl RenderView {
    /// Build the per-frame transforms for a viewport of the given aspect ratio.
    pub fn transforms(&self, aspect: f32, model: Mat4) -> Transforms {
        Transforms {
            model,
            view: Mat4::look_at_rh(self.eye, self.target, Vec3::Y),
            projection: Mat4::perspective_rh(
                self.fov_degrees.to_radians(),
                aspect,
                self.near,
                self.far,
            ),
            camera_position: self.eye,
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the mesh, a view and the frame's uniform inputs, then
/// produces output. It never mutates the shading parameters.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, mesh: &Mesh, view: &RenderView, frame: &FrameInputs) -> Self::Output;
}

/// Shading model evaluated at a single mesh vertex.
#[derive(Debug, Clone, Copy)]
pub struct ShadeSample {
    pub varyings: Varyings,
    pub terms: FragmentTerms,
    pub color: Vec4,
}

/// Run both shader stages at every vertex of `mesh`.
pub fn shade_vertices(
    mesh: &Mesh,
    transforms: &Transforms,
    frame: &FrameInputs,
) -> Vec<ShadeSample> {
    mesh.vertices
        .iter()
        .map(|vertex| {
            let varyings = shade_vertex(vertex, transforms);
            let terms = FragmentTerms::evaluate(&varyings, frame);
            ShadeSample {
                varyings,
                terms,
                color: terms.color(),
            }
        })
        .collect()
}

/// Aggregate statistics over a set of shaded samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadeReport {
    pub frame: FrameInputs,
    pub samples: usize,
    /// Samples whose fade mask is 1.
    pub opaque: usize,
    /// Samples inside the shine band.
    pub lit: usize,
    /// Samples whose normal faces the camera.
    pub front_facing: usize,
    /// Samples with a non-finite color, from negative fresnel exponents at facing = 1.
    pub non_finite: usize,
    /// Mean RGB over opaque samples with finite color.
    pub mean_color: [f32; 3],
    pub direction_min: f32,
    pub direction_max: f32,
}

impl ShadeReport {
    pub fn from_samples(frame: FrameInputs, samples: &[ShadeSample]) -> Self {
        let mut report = Self {
            frame,
            samples: samples.len(),
            direction_min: f32::INFINITY,
            direction_max: f32::NEG_INFINITY,
            ..Self::default()
        };

        let mut color_sum = Vec3::ZERO;
        let mut color_count = 0usize;
        for sample in samples {
            let terms = &sample.terms;
            report.direction_min = report.direction_min.min(terms.direction);
            report.direction_max = report.direction_max.max(terms.direction);
            if terms.fade == 1.0 {
                report.opaque += 1;
            }
            if terms.shine == 1.0 {
                report.lit += 1;
            }
            if terms.facing > 0.0 {
                report.front_facing += 1;
            }

            let rgb = sample.color.truncate();
            if !rgb.is_finite() {
                report.non_finite += 1;
            } else if terms.fade == 1.0 {
                color_sum += rgb;
                color_count += 1;
            }
        }

        if color_count > 0 {
            report.mean_color = (color_sum / color_count as f32).to_array();
        }
        if samples.is_empty() {
            report.direction_min = 0.0;
            report.direction_max = 0.0;
        }
        report
    }

    pub fn opaque_fraction(&self) -> f32 {
        fraction(self.opaque, self.samples)
    }

    pub fn lit_fraction(&self) -> f32 {
        fraction(self.lit, self.samples)
    }
}

fn fraction(count: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        count as f32 / total as f32
    }
}

impl fmt::Display for ShadeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.frame.params;
        writeln!(
            f,
            "=== Shading (t={:.3}) progress={:.3} fresnelAmount={:.4} shineSize={:.3} shineSpeed={:.3} ===",
            self.frame.elapsed_time, p.progress, p.fresnel_amount, p.shine_size, p.shine_speed
        )?;
        writeln!(f, "Samples: {}", self.samples)?;
        writeln!(
            f,
            "Opaque: {} ({:.1}%)  Lit: {} ({:.1}%)  Front-facing: {}",
            self.opaque,
            self.opaque_fraction() * 100.0,
            self.lit,
            self.lit_fraction() * 100.0,
            self.front_facing
        )?;
        writeln!(
            f,
            "Direction: [{:.3}, {:.3}]",
            self.direction_min, self.direction_max
        )?;
        write!(
            f,
            "Mean color: ({:.3}, {:.3}, {:.3})",
            self.mean_color[0], self.mean_color[1], self.mean_color[2]
        )?;
        if self.non_finite > 0 {
            write!(f, "\nNon-finite: {}", self.non_finite)?;
        }
        Ok(())
    }
}

/// CPU renderer that samples the shading model at mesh vertices.
///
/// Stands in for the GPU when there is no window: the CLI and tests use it
/// to inspect what the shader produces for a given parameter set.
#[derive(Debug, Clone, Copy)]
pub struct SampleRenderer {
    pub aspect: f32,
    pub model: Mat4,
}

impl Default for SampleRenderer {
    fn default() -> Self {
        Self {
            aspect: 16.0 / 9.0,
            model: Mat4::IDENTITY,
        }
    }
}

impl SampleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for SampleRenderer {
    type Output = ShadeReport;

    fn render(&self, mesh: &Mesh, view: &RenderView, frame: &FrameInputs) -> ShadeReport {
        let _span =
            tracing::info_span!("sample_render", vertices = mesh.vertex_count()).entered();
        let transforms = view.transforms(self.aspect, self.model);
        let samples = shade_vertices(mesh, &transforms, frame);
        let report = ShadeReport::from_samples(*frame, &samples);
        tracing::debug!(
            opaque = report.opaque,
            lit = report.lit,
            "sampled shading model"
        );
        report
    }
}
