use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec3};
use knotfade_common::ShadingParams;
use knotfade_geometry::{Mesh, TorusKnot};
use knotfade_shading::{
    BASE_TINT, FrameInputs, RenderView, Renderer, SampleRenderer, ShadeSample, fade_mask,
    shade_vertices, shine_wave,
};

fn knot() -> Mesh {
    TorusKnot::default().build().unwrap()
}

fn sample(params: ShadingParams, elapsed_time: f32) -> Vec<ShadeSample> {
    let transforms = RenderView::default().transforms(1.0, Mat4::IDENTITY);
    shade_vertices(&knot(), &transforms, &FrameInputs::new(params, elapsed_time))
}

#[test]
fn defaults_at_time_zero_are_fully_opaque_teal_and_fresnel() {
    let samples = sample(ShadingParams::default(), 0.0);

    assert!(samples.iter().all(|s| s.color.w == 1.0));

    // uv.y stays below 1 on the knot, so at t = 0 the wave never reaches its peak.
    assert!(samples.iter().all(|s| s.terms.shine == 0.0));

    for s in &samples {
        let facing = s.terms.facing;
        let expected = BASE_TINT * facing + Vec3::splat(1.0 - facing);
        assert!((s.color.truncate() - expected).length() < 1e-5);
    }
}

#[test]
fn full_progress_hides_the_whole_knot() {
    let params = ShadingParams {
        progress: 1.0,
        ..ShadingParams::default()
    };
    let report = SampleRenderer::new().render(
        &knot(),
        &RenderView::default(),
        &FrameInputs::new(params, 0.0),
    );
    assert_eq!(report.opaque, 0);
    assert!(report.direction_max < 1.0);
    // Only the exact top of the remapped range would survive.
    assert_eq!(fade_mask(1.0, 1.0), 1.0);
}

#[test]
fn zero_progress_shows_everything() {
    let samples = sample(ShadingParams::default(), 3.7);
    assert!(samples.iter().all(|s| s.terms.fade == 1.0));
}

#[test]
fn alpha_tracks_fade_mask_for_every_vertex() {
    for progress in [0.2, 0.45, 0.5, 0.8] {
        let params = ShadingParams {
            progress,
            ..ShadingParams::default()
        };
        for s in sample(params, 1.0) {
            assert_eq!(s.color.w, fade_mask(progress, s.terms.direction));
            assert_eq!(s.color.w, s.terms.fade);
        }
    }
}

#[test]
fn shine_band_returns_after_one_period() {
    let speed = 3.0;
    let params = ShadingParams {
        shine_size: 0.012,
        shine_speed: speed,
        ..ShadingParams::default()
    };
    // Put the wave peak at uv.y = 0.5, mid-knot.
    let t0 = (FRAC_PI_2 - 0.5) / speed;
    let t1 = t0 + TAU / speed;
    let threshold = 1.0 - params.shine_size * 0.5;

    let before = sample(params, t0);
    let after = sample(params, t1);

    let lit = before.iter().filter(|s| s.terms.shine == 1.0).count();
    assert!(lit > 0, "band should cross the knot at t0");

    for (a, b) in before.iter().zip(&after) {
        let wave = shine_wave(a.varyings.unit_position.y, t0, speed);
        if (wave - threshold).abs() > 1e-3 {
            assert_eq!(a.terms.shine, b.terms.shine);
        }
    }
}

#[test]
fn half_period_moves_the_band_off_the_knot() {
    let speed = 3.0;
    let params = ShadingParams {
        shine_size: 0.012,
        shine_speed: speed,
        ..ShadingParams::default()
    };
    let t0 = (FRAC_PI_2 - 0.5) / speed;
    let samples = sample(params, t0 + TAU / (2.0 * speed));
    assert!(samples.iter().all(|s| s.terms.shine == 0.0));
}

#[test]
fn report_serializes_to_json() {
    let report =
        SampleRenderer::new().render(&knot(), &RenderView::default(), &FrameInputs::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["samples"], 2331);
    assert_eq!(json["frame"]["progress"], 0.0);
}
