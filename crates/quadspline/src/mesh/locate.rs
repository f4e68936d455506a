//! Point location and evaluation.
//!
//! Quadtree descent sends `x >= mid_x` right and `y >= mid_y` up. Inside a
//! leaf the Up/Down triangle of the point's half is tested first, then the
//! Left/Right one; split triangles test their low half before the high one.
//! All tests are closed, so points on a shared spoke resolve to whichever
//! candidate comes first. No bounds check is made.

use nalgebra::Vector2;

use super::types::{Corner, Mesh2D, QuadState, Side, TriId};
use crate::eval::Evaluable2D;

impl Mesh2D {
    /// Leaf triangle covering `(x, y)`.
    ///
    /// `None` only if descent reaches a quadrant that was never resolved,
    /// which a successfully built mesh does not contain.
    pub fn locate(&self, x: f64, y: f64) -> Option<TriId> {
        let p = Vector2::new(x, y);
        let mut id = self.root();
        loop {
            let q = &self.quads[id.0];
            let c = q.rect.center();
            match q.state {
                QuadState::Refined { children, .. } => {
                    id = children[Corner::from_halves(x >= c.x, y >= c.y).index()];
                }
                QuadState::Triangulated { triangles, .. } => {
                    let first = if y >= c.y { Side::Up } else { Side::Down };
                    let second = if x >= c.x { Side::Right } else { Side::Left };
                    let t = triangles[first.index()];
                    let t = if self.tris[t.0].contains(p) {
                        t
                    } else {
                        triangles[second.index()]
                    };
                    return Some(self.descend(t, p));
                }
                QuadState::Unrefined | QuadState::Degenerate => return None,
            }
        }
    }

    fn descend(&self, mut t: TriId, p: Vector2<f64>) -> TriId {
        while let Some([low, high]) = self.tris[t.0].children {
            t = if self.tris[low.0].contains(p) { low } else { high };
        }
        t
    }

    /// Value of the piecewise-linear approximation at `(x, y)`.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.locate(x, y)
            .map_or(f64::NAN, |t| self.tris[t.0].value_at(Vector2::new(x, y)))
    }

    /// Evaluate on an `nx × ny` grid spanning the domain, ends included.
    ///
    /// Rows run along `x` fastest. A count of 1 samples the domain centre on
    /// that axis.
    pub fn sample_grid(&self, nx: usize, ny: usize) -> Vec<[f64; 3]> {
        let d = self.domain();
        let xs = axis(d.x_lo, d.x_hi, nx);
        let ys = axis(d.y_lo, d.y_hi, ny);
        let mut out = Vec::with_capacity(xs.len() * ys.len());
        for &y in &ys {
            for &x in &xs {
                out.push([x, y, self.evaluate(x, y)]);
            }
        }
        out
    }
}

fn axis(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![(lo + hi) * 0.5],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i + 1 == n { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

impl Evaluable2D for Mesh2D {
    #[inline]
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        Mesh2D::evaluate(self, x, y)
    }
}
