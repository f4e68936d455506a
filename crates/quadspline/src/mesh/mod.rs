//! Adaptive quadtree mesh with a continuous triangle overlay.
//!
//! Purpose
//! - Approximate an `Evaluable2D` on a rectangle by a continuous piecewise
//!   affine function, refining only where the bilinear corner mean fails to
//!   predict the centre sample.
//! - Answer point queries in `O(depth)` without edge-by-edge tests.
//!
//! Model
//! - `Mesh2D` owns two arenas: quadrants (root at index 0) and triangles.
//! - Each leaf quadrant holds four triangles `[edge low, edge high, centre]`,
//!   one per `Side`. A triangle facing a refined same-level neighbour is split
//!   at the shared edge midpoint, recursively, so the overlay has no cracks.
//! - Degenerate subdivisions are rolled back locally; the parent becomes a
//!   leaf and its ancestors are marked impure. Only a degenerate root fails.
//!
//! Code cross-refs: `build::MeshBuilder`, `overlay`, `locate`, `cfg::MeshCfg`.

mod affine;
mod build;
mod cfg;
mod locate;
mod overlay;
mod types;

pub use affine::{AffineFit, HalfPlane};
pub use build::{build_mesh, MeshBuilder};
pub use cfg::MeshCfg;
pub use types::{
    Corner, Mesh2D, MeshStats, QuadId, QuadState, Quadrant, Rect, Side, TriId, Triangle, Vertex,
};

#[cfg(test)]
mod tests;
