//! Vertical-slab decomposition of overlay triangles.
//!
//! Over a slab `[xl, xr]` a triangle's vertical cross-section runs between
//! two of its edges, both affine in `x`. Vertical triangles (Left/Right)
//! have a vertical border, so a single slab between the border and the apex
//! is bounded by the two spokes. Horizontal triangles (Up/Down) have a flat
//! border and need up to two slabs, cut at the sorted vertex abscissae; the
//! apex may lie beyond either end of the border once the triangle has been
//! split.

use nalgebra::Vector2;

use crate::mesh::Triangle;

/// Segment between two vertices, read as `y(x)`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge {
    a: Vector2<f64>,
    b: Vector2<f64>,
}

impl Edge {
    pub(crate) fn new(a: Vector2<f64>, b: Vector2<f64>) -> Self {
        Self { a, b }
    }

    /// Height at `x`, exact at the endpoints and clamped to the segment's y-range.
    ///
    /// Only called with `x` inside the segment's x-span on a non-vertical edge.
    pub(crate) fn y_at(&self, x: f64) -> f64 {
        if x == self.a.x {
            return self.a.y;
        }
        if x == self.b.x {
            return self.b.y;
        }
        let t = (x - self.a.x) / (self.b.x - self.a.x);
        let y = self.a.y + t * (self.b.y - self.a.y);
        y.clamp(self.a.y.min(self.b.y), self.a.y.max(self.b.y))
    }
}

/// Cross-section `[lower(x), upper(x)]` over `x ∈ [xl, xr]`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Slab {
    pub xl: f64,
    pub xr: f64,
    pub lower: Edge,
    pub upper: Edge,
}

impl Slab {
    fn between(xl: f64, xr: f64, e1: Edge, e2: Edge) -> Option<Self> {
        if !(xl < xr) {
            return None;
        }
        let m = 0.5 * (xl + xr);
        let (lower, upper) = if e1.y_at(m) <= e2.y_at(m) {
            (e1, e2)
        } else {
            (e2, e1)
        };
        Some(Self {
            xl,
            xr,
            lower,
            upper,
        })
    }
}

/// Slabs covering `tri`, in increasing `x`.
pub(crate) fn slabs(tri: &Triangle) -> Vec<Slab> {
    let [low, high, apex] = tri.vertices.map(|v| v.p);
    let spoke_low = Edge::new(low, apex);
    let spoke_high = Edge::new(high, apex);

    if tri.side.is_vertical() {
        let (xl, xr) = if low.x < apex.x {
            (low.x, apex.x)
        } else {
            (apex.x, low.x)
        };
        return Slab::between(xl, xr, spoke_low, spoke_high)
            .into_iter()
            .collect();
    }

    let border = Edge::new(low, high);
    let xc = apex.x;
    let parts = if xc <= low.x {
        [
            (xc, low.x, spoke_low, spoke_high),
            (low.x, high.x, border, spoke_high),
        ]
    } else if xc >= high.x {
        [
            (low.x, high.x, border, spoke_low),
            (high.x, xc, spoke_low, spoke_high),
        ]
    } else {
        [
            (low.x, xc, border, spoke_low),
            (xc, high.x, border, spoke_high),
        ]
    };
    parts
        .into_iter()
        .filter_map(|(xl, xr, e1, e2)| Slab::between(xl, xr, e1, e2))
        .collect()
}
