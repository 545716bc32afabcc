use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use knotfade_common::ShadingParams;
use knotfade_geometry::TorusKnot;
use knotfade_shading::{FrameInputs, RenderView, Renderer, SampleRenderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "knotfade-cli", about = "CLI tool for inspecting the knotfade scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print torus-knot mesh statistics
    Mesh {
        #[command(flatten)]
        knot: KnotArgs,
    },
    /// Evaluate the shading model at every mesh vertex and report
    Shade {
        #[command(flatten)]
        params: ParamArgs,
        /// Seconds since the scene started
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// Viewport aspect ratio
        #[arg(long, default_value = "1.7777778")]
        aspect: f32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report the opaque fraction across evenly spaced progress values
    Sweep {
        /// Number of intervals between progress 0 and 1
        #[arg(short, long, default_value = "10")]
        steps: u32,
    },
}

#[derive(Args)]
struct KnotArgs {
    #[arg(long, default_value = "0.5")]
    radius: f32,
    #[arg(long, default_value = "0.2")]
    tube: f32,
    #[arg(long, default_value = "110")]
    tubular_segments: u32,
    #[arg(long, default_value = "20")]
    radial_segments: u32,
    #[arg(short, default_value = "2")]
    p: u32,
    #[arg(short, default_value = "3")]
    q: u32,
}

impl From<&KnotArgs> for TorusKnot {
    fn from(args: &KnotArgs) -> Self {
        TorusKnot {
            radius: args.radius,
            tube: args.tube,
            tubular_segments: args.tubular_segments,
            radial_segments: args.radial_segments,
            p: args.p,
            q: args.q,
        }
    }
}

#[derive(Args)]
struct ParamArgs {
    /// Fade threshold, 0..=1
    #[arg(long, default_value = "0")]
    progress: f32,
    /// Fresnel exponent, -3..=3
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    fresnel_amount: f32,
    /// Shine band width, 0..=1
    #[arg(long, default_value = "0.012")]
    shine_size: f32,
    /// Shine scroll rate, 1..=20
    #[arg(long, default_value = "3")]
    shine_speed: f32,
}

impl ParamArgs {
    /// Validated parameters, rounded onto the control-panel step grid.
    fn to_params(&self) -> anyhow::Result<ShadingParams> {
        let params = ShadingParams::new(
            self.progress,
            self.fresnel_amount,
            self.shine_size,
            self.shine_speed,
        )
        .context("invalid shading parameters")?;
        Ok(params.snapped())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("knotfade-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", knotfade_common::crate_info());
            println!("geometry: {}", knotfade_geometry::crate_info());
            println!("shading: {}", knotfade_shading::crate_info());
        }
        Commands::Mesh { knot } => {
            let knot = TorusKnot::from(&knot);
            let mesh = knot.build().context("build torus knot")?;
            println!(
                "Torus knot: radius={} tube={} segments={}x{} p={} q={}",
                knot.radius,
                knot.tube,
                knot.tubular_segments,
                knot.radial_segments,
                knot.p,
                knot.q
            );
            println!(
                "Vertices: {}  Indices: {}  Triangles: {}",
                mesh.vertex_count(),
                mesh.index_count(),
                mesh.triangle_count()
            );
            if let Some((min, max)) = mesh.bounds() {
                println!(
                    "Bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
                    min.x, min.y, min.z, max.x, max.y, max.z
                );
            }
        }
        Commands::Shade {
            params,
            time,
            aspect,
            json,
        } => {
            anyhow::ensure!(time >= 0.0, "time must be non-negative, got {time}");
            anyhow::ensure!(
                aspect.is_finite() && aspect > 0.0,
                "aspect must be positive, got {aspect}"
            );

            let params = params.to_params()?;
            let mesh = TorusKnot::default().build()?;
            let renderer = SampleRenderer {
                aspect,
                ..SampleRenderer::default()
            };
            let report = renderer.render(
                &mesh,
                &RenderView::default(),
                &FrameInputs::new(params, time),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
        Commands::Sweep { steps } => {
            anyhow::ensure!(steps > 0, "steps must be at least 1");

            let mesh = TorusKnot::default().build()?;
            let renderer = SampleRenderer::new();
            let view = RenderView::default();
            println!("progress  opaque");
            for i in 0..=steps {
                let progress = i as f32 / steps as f32;
                let params = ShadingParams {
                    progress,
                    ..ShadingParams::default()
                };
                let report = renderer.render(&mesh, &view, &FrameInputs::new(params, 0.0));
                println!("{progress:>8.3}  {:>5.1}%", report.opaque_fraction() * 100.0);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use knotfade_geometry::GeometryError;

    #[test]
    fn shade_params_snap_to_slider_steps() {
        let cli = Cli::try_parse_from([
            "knotfade-cli",
            "shade",
            "--progress",
            "0.12345",
            "--fresnel-amount",
            "-1.23456",
        ])
        .unwrap();
        let Commands::Shade { params, .. } = cli.command else {
            panic!("expected shade");
        };
        let params = params.to_params().unwrap();
        assert_eq!(params.progress, 0.123);
        assert_eq!(params.fresnel_amount, -1.2346);
    }

    #[test]
    fn shade_rejects_out_of_range_params() {
        let cli = Cli::try_parse_from(["knotfade-cli", "shade", "--shine-size", "1.5"]).unwrap();
        let Commands::Shade { params, .. } = cli.command else {
            panic!("expected shade");
        };
        assert!(params.to_params().is_err());
    }

    #[test]
    fn mesh_rejects_unindexable_segment_counts() {
        let cli = Cli::try_parse_from([
            "knotfade-cli",
            "mesh",
            "--radial-segments",
            "4294967295",
        ])
        .unwrap();
        let Commands::Mesh { knot } = cli.command else {
            panic!("expected mesh");
        };
        assert!(matches!(
            TorusKnot::from(&knot).build(),
            Err(GeometryError::TooManyVertices { .. })
        ));
    }
}
