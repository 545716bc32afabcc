//! wgpu render backend for the knot scene.
//!
//! Draws one alpha-blended torus knot with the fresnel/shine/fade shader.
//! The camera orbits the origin with damped drag rotation, pan and dolly.
//!
//! # Invariants
//! - Renderer never mutates the shading parameters it uploads.
//! - Shading uniforms are written once per frame, before that frame's draw is submitted.
//! - Uniform structs here and in the WGSL source share one layout.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{BACKGROUND, KnotRenderer, ShadingUniforms, TransformUniforms};
pub use shaders::KNOT_SHADER;
