use glam::{Vec3, Vec4};
use knotfade_common::ShadingParams;
use serde::Serialize;

use crate::vertex::Varyings;

/// Teal tint scaled by how directly a surface faces the camera.
pub const BASE_TINT: Vec3 = Vec3::new(0.0, 0.7, 0.5);
/// Weight of the shine color when blending it over the base color.
pub const SHINE_ALPHA: f32 = 0.2;

/// Uniform inputs for one frame: the tunable parameters and the host clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInputs {
    #[serde(flatten)]
    pub params: ShadingParams,
    /// Seconds since the scene started.
    pub elapsed_time: f32,
}

impl FrameInputs {
    pub fn new(params: ShadingParams, elapsed_time: f32) -> Self {
        Self {
            params,
            elapsed_time,
        }
    }
}

/// `1.0` when `x >= edge`, else `0.0`.
#[inline]
pub fn step(edge: f32, x: f32) -> f32 {
    if x >= edge { 1.0 } else { 0.0 }
}

/// Fresnel falloff `(1 - facing) ^ amount`. Not clamped: zero or negative
/// exponents flatten or invert the rim term.
#[inline]
pub fn fresnel(facing: f32, amount: f32) -> f32 {
    (1.0 - facing).powf(amount)
}

/// Phase of the shine wave at vertical coordinate `uv_y`, in [0, 1].
#[inline]
pub fn shine_wave(uv_y: f32, elapsed_time: f32, speed: f32) -> f32 {
    0.5 + 0.5 * (uv_y + elapsed_time * speed).sin()
}

/// Binary shine band: lit where the wave reaches `1 - size / 2`.
#[inline]
pub fn shine(uv_y: f32, elapsed_time: f32, size: f32, speed: f32) -> f32 {
    step(1.0 - size * 0.5, shine_wave(uv_y, elapsed_time, speed))
}

/// Binary dissolve mask: opaque at or above `progress`.
#[inline]
pub fn fade_mask(progress: f32, direction: f32) -> f32 {
    step(progress, direction)
}

/// Every intermediate term of the fragment stage for one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FragmentTerms {
    /// Vertical pseudo-uv driving the fade.
    pub direction: f32,
    /// Cosine between surface normal and view direction.
    pub facing: f32,
    pub fresnel: f32,
    pub shine: f32,
    pub fade: f32,
}

impl FragmentTerms {
    pub fn evaluate(varyings: &Varyings, frame: &FrameInputs) -> Self {
        let params = &frame.params;
        let direction = varyings.unit_position.y;
        let facing = varyings.world_normal.dot(varyings.view_dir);
        let uv = varyings.unit_position.truncate();

        Self {
            direction,
            facing,
            fresnel: fresnel(facing, params.fresnel_amount),
            shine: shine(uv.y, frame.elapsed_time, params.shine_size, params.shine_speed),
            fade: fade_mask(params.progress, direction),
        }
    }

    /// Combine the terms into the output color. Alpha is the fade mask itself.
    pub fn color(&self) -> Vec4 {
        let fresnel_color = Vec3::ONE * self.fresnel;
        let shine_color = Vec3::splat(1.0 + self.shine);
        let base = BASE_TINT * self.facing;

        let rgb = (base + fresnel_color).lerp(shine_color, self.shine * SHINE_ALPHA);
        rgb.extend(self.fade)
    }
}

/// Fragment stage of the knot shader.
pub fn shade_fragment(varyings: &Varyings, frame: &FrameInputs) -> Vec4 {
    FragmentTerms::evaluate(varyings, frame).color()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};
    use std::f32::consts::{FRAC_PI_2, TAU};

    fn varyings(y: f32, normal: Vec3, view_dir: Vec3) -> Varyings {
        Varyings {
            clip_position: Vec4::ZERO,
            uv: Vec2::ZERO,
            unit_position: Vec3::new(0.5, y, 0.5),
            view_dir,
            world_normal: normal,
        }
    }

    #[test]
    fn fresnel_linear_at_amount_one() {
        for i in 0..=10 {
            let seed = i as f32 / 10.0;
            assert_eq!(fresnel(seed, 1.0), 1.0 - seed);
        }
    }

    #[test]
    fn fresnel_flat_at_amount_zero() {
        for i in 0..=10 {
            let seed = i as f32 / 10.0;
            assert_eq!(fresnel(seed, 0.0), 1.0);
        }
        // 0^0 is 1 for powf.
        assert_eq!(fresnel(1.0, 0.0), 1.0);
    }

    #[test]
    fn fresnel_negative_amount_is_unbounded() {
        assert!(fresnel(1.0, -1.0).is_infinite());
        assert!(fresnel(0.5, -2.0) > 1.0);
    }

    #[test]
    fn shine_is_binary() {
        for i in 0..200 {
            let y = i as f32 / 200.0;
            let s = shine(y, i as f32 * 0.37, 0.3, 7.0);
            assert!(s == 0.0 || s == 1.0);
        }
    }

    #[test]
    fn full_size_shine_lights_half_the_cycle() {
        let n = 1000;
        let lit = (0..n)
            .map(|i| shine(i as f32 / n as f32 * TAU + 0.001, 0.0, 1.0, 1.0))
            .filter(|&s| s == 1.0)
            .count();
        assert!((lit as i32 - 500).abs() <= 2, "lit {lit} of {n}");
    }

    #[test]
    fn zero_size_shine_only_at_peak() {
        assert_eq!(shine(FRAC_PI_2, 0.0, 0.0, 1.0), 1.0);
        assert_eq!(shine(FRAC_PI_2 + 0.01, 0.0, 0.0, 1.0), 0.0);
        assert_eq!(shine(0.0, 0.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn shine_scrolls_with_time() {
        // The peak at uv.y = pi/2 - t * speed.
        let speed = 3.0;
        let t = 0.2;
        assert_eq!(shine(FRAC_PI_2 - t * speed, t, 0.05, speed), 1.0);
        assert_eq!(shine(FRAC_PI_2, t, 0.05, speed), 0.0);
    }

    #[test]
    fn fade_mask_thresholds() {
        assert_eq!(fade_mask(0.5, 0.5), 1.0);
        assert_eq!(fade_mask(0.5, 0.49), 0.0);
        assert_eq!(fade_mask(0.0, 0.0), 1.0);
        assert_eq!(fade_mask(1.0, 1.0), 1.0);
        assert_eq!(fade_mask(1.0, 0.999), 0.0);
    }

    #[test]
    fn alpha_is_the_fade_mask() {
        let v = varyings(0.3, Vec3::Z, Vec3::Z);
        for progress in [0.0, 0.29, 0.3, 0.31, 1.0] {
            let frame = FrameInputs::new(
                ShadingParams {
                    progress,
                    ..ShadingParams::default()
                },
                0.0,
            );
            let color = shade_fragment(&v, &frame);
            assert_eq!(color.w, fade_mask(progress, 0.3));
        }
    }

    #[test]
    fn facing_surface_without_shine_is_pure_tint() {
        // facing = 1: fresnel = 0 at amount 1, tint at full strength.
        let v = varyings(0.5, Vec3::Z, Vec3::Z);
        let color = shade_fragment(&v, &FrameInputs::default());
        assert!((color.truncate() - BASE_TINT).length() < 1e-6);
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn silhouette_is_white_from_fresnel() {
        let v = varyings(0.5, Vec3::X, Vec3::Z);
        let color = shade_fragment(&v, &FrameInputs::default());
        assert!((color.truncate() - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn shine_blends_toward_double_white() {
        let speed = 3.0;
        let t = (FRAC_PI_2 - 0.5) / speed;
        let v = varyings(0.5, Vec3::Z, Vec3::Z);
        let frame = FrameInputs::new(
            ShadingParams {
                shine_size: 0.1,
                shine_speed: speed,
                ..ShadingParams::default()
            },
            t,
        );
        let terms = FragmentTerms::evaluate(&v, &frame);
        assert_eq!(terms.shine, 1.0);
        let expected = BASE_TINT.lerp(Vec3::splat(2.0), SHINE_ALPHA);
        assert!((terms.color().truncate() - expected).length() < 1e-6);
    }

    #[test]
    fn frame_inputs_serialize_flat() {
        let json = serde_json::to_value(FrameInputs::new(ShadingParams::default(), 1.5)).unwrap();
        assert_eq!(json["elapsedTime"], 1.5);
        assert_eq!(json["shineSpeed"], 3.0);
    }
}
