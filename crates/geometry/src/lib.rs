//! Mesh generation for the knotfade scene.
//!
//! The scene draws exactly one static torus knot, built once at startup.

mod mesh;
mod torus_knot;

pub use mesh::{Mesh, MeshVertex};
pub use torus_knot::{GeometryError, TorusKnot};

pub fn crate_info() -> &'static str {
    "knotfade-geometry v0.1.0"
}
