//! Adaptive 2D piecewise-linear approximation with closed-form Y-integration.
//!
//! The crate builds a quadtree over a rectangular domain, refining until the
//! bilinear corner average predicts the sampled midpoint to working precision.
//! Every leaf is split into four apex-centred triangles carrying an affine fit,
//! and triangles facing a finer neighbour are split again so that the overlay
//! is continuous across refinement levels.
//!
//! Layout
//! - `eval`: the `Evaluable2D` / `Evaluable1D` seams (closures work out of the box).
//! - `mesh`: arena-backed quadtree, triangle overlay, point location.
//! - `spline`: 1D piecewise polynomial (`PolySpline`) and the interval accumulator.
//! - `integrate`: `∫ mesh(x, y) · w(y) dy` as a `PolySpline` in `x`.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.

pub mod error;
pub mod eval;
pub mod integrate;
pub mod mesh;
pub mod spline;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{IntegrateError, MeshError, SplineError};
pub use eval::{Evaluable1D, Evaluable2D};
pub use integrate::integrate_along_y;
pub use mesh::{build_mesh, Mesh2D, MeshBuilder, MeshCfg, MeshStats, Rect};
pub use nalgebra::Vector2 as Vec2;
pub use spline::PolySpline;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{IntegrateError, MeshError, SplineError};
    pub use crate::eval::{Evaluable1D, Evaluable2D};
    pub use crate::integrate::integrate_along_y;
    pub use crate::mesh::{
        build_mesh, Corner, Mesh2D, MeshBuilder, MeshCfg, MeshStats, QuadId, QuadState, Rect,
        Side, TriId,
    };
    pub use crate::spline::{Accumulator, PolySpline, Sign};
    pub use nalgebra::Vector2 as Vec2;
}
