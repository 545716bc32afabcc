//! Shared types for the knotfade scene.
//!
//! # Invariants
//! - Shading parameters are owned by the host and never mutated by the shading model.
//! - Every [`ShadingParams`] built through [`ShadingParams::new`] lies inside its declared ranges.

mod params;
mod types;

pub use params::{ParamError, ParamRange, ShadingParams};
pub use types::Transform;

pub fn crate_info() -> &'static str {
    "knotfade-common v0.1.0"
}
