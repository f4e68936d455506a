//! Closed-form integration of a mesh against a 1D weight along `y`.
//!
//! Produces `G(x) = ∫ mesh(x, y) · w(y) dy` as a `PolySpline` in `x` whose
//! degree is the weight's degree plus two.
//!
//! Method
//! - Each leaf triangle carries `f = v + g·(z - o)` anchored at its apex `o`.
//!   With `W(x, Y) = ∫^{Y} f(x, y) w(y) dy`, the triangle adds
//!   `W(x, upper(x)) - W(x, lower(x))` over every vertical slab.
//! - The weight pieces crossing the triangle are re-expanded in powers of
//!   `y - o_y`, so every term is on the scale of the triangle.
//! - Along an edge `Y = Y(lo) + u1 (x - lo)`, `W` restricted to one weight
//!   piece is a polynomial in `x - lo`: the piece antiderivatives are composed
//!   with the edge line by binomial expansion. Edges are cut where they cross
//!   weight breakpoints.
//! - Upper-edge terms are added and lower-edge terms subtracted in an
//!   `Accumulator`, which is drained over the mesh's x-range.

mod slab;

use tracing::debug;

use crate::error::{IntegrateError, IntegrateResult};
use crate::mesh::{Mesh2D, Triangle};
use crate::spline::poly::{add_scaled, antiderivative, compose_affine, horner, times_linear, times_x};
use crate::spline::{Accumulator, PolySpline, Sign};
use slab::{slabs, Edge};

/// `∫ mesh(x, y) · weight(y) dy` for every `x` in the mesh's domain.
///
/// The weight's range must cover the mesh's y-range.
pub fn integrate_along_y(mesh: &Mesh2D, weight: &PolySpline) -> IntegrateResult<PolySpline> {
    let d = mesh.domain();
    let (lo, hi) = weight.range();
    for y in [d.y_lo, d.y_hi] {
        if y < lo || y > hi {
            return Err(IntegrateError::WeightOutOfRange { y, lo, hi });
        }
    }

    let mut acc = Accumulator::new();
    let mut count = 0usize;
    for tri in mesh.leaf_triangles() {
        integrate_triangle(tri, weight, &mut acc)?;
        count += 1;
    }
    debug!(
        triangles = count,
        intervals = acc.len(),
        weight_pieces = weight.num_pieces(),
        "integrated along y"
    );
    acc.drain(d.x_lo, d.x_hi)
}

/// Weight antiderivatives around one triangle, in powers of `r = y - o_y`.
///
/// For `Y` in piece `k`, `∫^{Y} w = p1[k](Y - o_y) + c1[k]` and
/// `∫^{Y} (y - o_y) w = p2[k](Y - o_y) + c2[k]`, with constants chosen so
/// both are continuous across the breakpoints inside the triangle.
struct LocalWeight<'a> {
    spline: &'a PolySpline,
    oy: f64,
    first: usize,
    p1: Vec<Vec<f64>>,
    p2: Vec<Vec<f64>>,
    c1: Vec<f64>,
    c2: Vec<f64>,
}

impl<'a> LocalWeight<'a> {
    fn new(spline: &'a PolySpline, oy: f64, y_min: f64, y_max: f64) -> Self {
        let t = spline.breakpoints();
        let first = spline.locate_piece(y_min);
        let last = spline.locate_piece(y_max);
        let n = last - first + 1;
        let mut lw = Self {
            spline,
            oy,
            first,
            p1: Vec::with_capacity(n),
            p2: Vec::with_capacity(n),
            c1: Vec::with_capacity(n),
            c2: Vec::with_capacity(n),
        };
        for k in first..=last {
            let w = compose_affine(spline.coefficients_of_piece(k), oy - t[k], 1.0);
            let p1 = antiderivative(&w);
            let p2 = antiderivative(&times_x(&w));
            let (c1, c2) = match (lw.p1.last(), lw.p2.last()) {
                (Some(q1), Some(q2)) => {
                    let r = t[k] - oy;
                    let i = k - first - 1;
                    (
                        lw.c1[i] + horner(q1, r) - horner(&p1, r),
                        lw.c2[i] + horner(q2, r) - horner(&p2, r),
                    )
                }
                _ => (0.0, 0.0),
            };
            lw.c1.push(c1);
            lw.c2.push(c2);
            lw.p1.push(p1);
            lw.p2.push(p2);
        }
        lw
    }

    fn locate(&self, y: f64) -> usize {
        self.spline.locate_piece(y)
    }

    fn breakpoint(&self, k: usize) -> f64 {
        self.spline.breakpoints()[k]
    }

    /// `W(x, Y(x))` in powers of `X = x - lo`, for an edge with
    /// `Y(x) - o_y = lo_r + u1 X` that stays inside piece `k`.
    fn along(&self, k: usize, fit: LocalFit, lo_r: f64, u1: f64) -> Vec<f64> {
        let i = k - self.first;
        let mut q1 = compose_affine(&self.p1[i], lo_r, u1);
        let mut q2 = compose_affine(&self.p2[i], lo_r, u1);
        q1[0] += self.c1[i];
        q2[0] += self.c2[i];
        let mut out = times_linear(&q1, fit.alpha, fit.gx);
        add_scaled(&mut out, &q2, fit.gy);
        out
    }
}

/// A triangle's fit re-anchored at `(lo, o_y)`: `alpha + gx (x - lo) + gy (y - o_y)`.
#[derive(Clone, Copy, Debug)]
struct LocalFit {
    alpha: f64,
    gx: f64,
    gy: f64,
}

fn integrate_triangle(tri: &Triangle, weight: &PolySpline, acc: &mut Accumulator) -> IntegrateResult<()> {
    let (y_min, y_max) = tri
        .vertices
        .iter()
        .map(|v| v.p.y)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let local = LocalWeight::new(weight, tri.fit.origin.y, y_min, y_max);
    for s in slabs(tri) {
        edge_terms(s.upper, s.xl, s.xr, tri, &local, Sign::Add, acc)?;
        edge_terms(s.lower, s.xl, s.xr, tri, &local, Sign::Subtract, acc)?;
    }
    Ok(())
}

/// Insert `±W(x, edge(x))` over `[xl, xr]`, one interval per weight piece crossed.
fn edge_terms(
    edge: Edge,
    xl: f64,
    xr: f64,
    tri: &Triangle,
    local: &LocalWeight<'_>,
    sign: Sign,
    acc: &mut Accumulator,
) -> IntegrateResult<()> {
    let fit = &tri.fit;
    let at = |lo: f64| LocalFit {
        alpha: fit.value + fit.grad.x * (lo - fit.origin.x),
        gx: fit.grad.x,
        gy: fit.grad.y,
    };
    let (yl, yr) = (edge.y_at(xl), edge.y_at(xr));
    let u1 = (yr - yl) / (xr - xl);
    let rl = yl - local.oy;

    if yl == yr {
        let k = local.locate(yl);
        return acc.insert(xl, xr, &local.along(k, at(xl), rl, 0.0), sign);
    }

    let (y_min, y_max) = if yl < yr { (yl, yr) } else { (yr, yl) };
    let k_lo = local.locate(y_min);
    let mut k_hi = local.locate(y_max);
    if k_hi > k_lo && local.breakpoint(k_hi) == y_max {
        k_hi -= 1;
    }
    // Inverse of the edge line, exact at the slab ends.
    let x_of = |y: f64| {
        if y == yl {
            xl
        } else if y == yr {
            xr
        } else {
            (xl + (y - yl) / (yr - yl) * (xr - xl)).clamp(xl, xr)
        }
    };
    for k in k_lo..=k_hi {
        let ya = y_min.max(local.breakpoint(k));
        let yb = y_max.min(local.breakpoint(k + 1));
        if !(ya < yb) {
            continue;
        }
        let (xa, xb) = (x_of(ya), x_of(yb));
        let (lo, hi) = if xa < xb { (xa, xb) } else { (xb, xa) };
        let lo_r = rl + u1 * (lo - xl);
        acc.insert(lo, hi, &local.along(k, at(lo), lo_r, u1), sign)?;
    }
    Ok(())
}
