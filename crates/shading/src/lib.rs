//! Knot shading model: fresnel rim, scrolling shine band, progress fade.
//!
//! This crate is the CPU reference of the WGSL shader in `knotfade-render-wgpu`.
//! Both stages are pure functions of their inputs; the host owns the
//! parameters and the clock and passes them in each frame.
//!
//! # Invariants
//! - The shading model never mutates [`ShadingParams`](knotfade_common::ShadingParams).
//! - Output alpha is exactly the fade mask.
//! - `shine` and the fade mask are always exactly `0.0` or `1.0`.

mod fragment;
mod renderer;
mod vertex;

pub use fragment::{
    BASE_TINT, FragmentTerms, FrameInputs, SHINE_ALPHA, fade_mask, fresnel, shade_fragment, shine,
    shine_wave, step,
};
pub use renderer::{RenderView, Renderer, SampleRenderer, ShadeReport, ShadeSample, shade_vertices};
pub use vertex::{Transforms, Varyings, shade_vertex};

pub fn crate_info() -> &'static str {
    "knotfade-shading v0.1.0"
}
