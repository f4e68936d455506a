//! 1D piecewise polynomials.
//!
//! Purpose
//! - `PolySpline` is both the weight consumed by `integrate_along_y` and the
//!   result it produces: ordered breakpoints `t_0 < … < t_K`, one coefficient
//!   vector per interval `[t_k, t_{k+1}]`.
//! - Coefficients are local to the interval start: piece `k` is
//!   `c_0 + c_1 (x - t_k) + c_2 (x - t_k)² + …`. Far from the origin this
//!   keeps every term on the scale of the interval width.
//! - `Accumulator` merges overlapping contributions into a disjoint set of
//!   intervals and drains into a `PolySpline`.
//!
//! Out-of-range queries return an optional fill value per side. Without a
//! fill, `value` reports `SplineError::OutOfRange` and the `Evaluable1D`
//! implementation yields NaN.

pub mod accum;
pub mod poly;

pub use accum::{Accumulator, Sign};

use crate::error::{SplineError, SplineResult};
use crate::eval::Evaluable1D;

/// Piecewise polynomial with coefficients local to each interval's left breakpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct PolySpline {
    breakpoints: Vec<f64>,
    pieces: Vec<Vec<f64>>,
    lower_fill: Option<f64>,
    upper_fill: Option<f64>,
}

impl PolySpline {
    /// Validate and wrap breakpoints plus one coefficient vector per interval.
    pub fn new(breakpoints: Vec<f64>, pieces: Vec<Vec<f64>>) -> SplineResult<Self> {
        if breakpoints.len() < 2 {
            return Err(SplineError::TooFewBreakpoints(breakpoints.len()));
        }
        if pieces.len() + 1 != breakpoints.len() {
            return Err(SplineError::LengthMismatch {
                breakpoints: breakpoints.len(),
                pieces: pieces.len(),
            });
        }
        if !breakpoints[0].is_finite() {
            return Err(SplineError::NotIncreasing { index: 0 });
        }
        for (i, w) in breakpoints.windows(2).enumerate() {
            // `!(a < b)` also rejects NaN.
            if !(w[0] < w[1]) || !w[1].is_finite() {
                return Err(SplineError::NotIncreasing { index: i + 1 });
            }
        }
        if let Some(index) = pieces.iter().position(|p| p.is_empty()) {
            return Err(SplineError::EmptyPiece { index });
        }
        Ok(Self {
            breakpoints,
            pieces,
            lower_fill: None,
            upper_fill: None,
        })
    }

    /// A single constant piece on `[lo, hi]`.
    pub fn constant(lo: f64, hi: f64, value: f64) -> SplineResult<Self> {
        Self::new(vec![lo, hi], vec![vec![value]])
    }

    /// Interpolate samples with quadratic pieces through consecutive triples.
    ///
    /// Breakpoints sit on every other sample. With an even sample count the
    /// last two samples form a linear piece, padded to quadratic length.
    pub fn from_samples(xs: &[f64], ys: &[f64]) -> SplineResult<Self> {
        if xs.len() != ys.len() {
            return Err(SplineError::SampleLengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let n = xs.len();
        if n < 3 {
            return Err(SplineError::TooFewSamples(n));
        }
        let linear_tail = (n - 1) % 2 == 1;
        let quad_count = (n - 1) / 2;

        let mut breakpoints = Vec::with_capacity(quad_count + 2);
        let mut pieces = Vec::with_capacity(quad_count + 1);
        for q in 0..quad_count {
            let i = 2 * q;
            breakpoints.push(xs[i]);
            pieces.push(quadratic_through(
                [xs[i + 1] - xs[i], xs[i + 2] - xs[i]],
                [ys[i], ys[i + 1], ys[i + 2]],
            ));
        }
        if linear_tail {
            let i = n - 2;
            breakpoints.push(xs[i]);
            let slope = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]);
            pieces.push(vec![ys[i], slope, 0.0]);
        }
        breakpoints.push(xs[n - 1]);

        if let Some(index) = pieces.iter().position(|p| p.iter().any(|c| !c.is_finite())) {
            return Err(SplineError::NonFiniteCoefficients { index });
        }
        Self::new(breakpoints, pieces)
    }

    /// Value returned below the first breakpoint.
    #[must_use]
    pub fn with_lower_fill(mut self, v: f64) -> Self {
        self.lower_fill = Some(v);
        self
    }

    /// Value returned above the last breakpoint.
    #[must_use]
    pub fn with_upper_fill(mut self, v: f64) -> Self {
        self.upper_fill = Some(v);
        self
    }

    /// Extend both ends with the spline's own edge values.
    #[must_use]
    pub fn with_edge_fills(self) -> Self {
        let (lo, hi) = self.range();
        let lo_v = self.piece_at(0, lo);
        let hi_v = self.piece_at(self.pieces.len() - 1, hi);
        self.with_lower_fill(lo_v).with_upper_fill(hi_v)
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn coefficients_of_piece(&self, i: usize) -> &[f64] {
        &self.pieces[i]
    }

    pub fn num_pieces(&self) -> usize {
        self.pieces.len()
    }

    /// Highest coefficient count minus one across all pieces.
    pub fn degree(&self) -> usize {
        self.pieces.iter().map(Vec::len).max().unwrap_or(1) - 1
    }

    /// `(t_0, t_K)`.
    #[inline]
    pub fn range(&self) -> (f64, f64) {
        (self.breakpoints[0], self.breakpoints[self.breakpoints.len() - 1])
    }

    /// Index `k` with `t_k <= x < t_{k+1}`, clamped to the first/last piece.
    ///
    /// `x == t_K` maps to the last piece.
    #[inline]
    pub fn locate_piece(&self, x: f64) -> usize {
        let above = self.breakpoints.partition_point(|&t| t <= x);
        above.saturating_sub(1).min(self.pieces.len() - 1)
    }

    /// Value at `x`, honouring fills outside the range.
    pub fn value(&self, x: f64) -> SplineResult<f64> {
        let (lo, hi) = self.range();
        if x < lo {
            return self.lower_fill.ok_or(SplineError::OutOfRange { x, lo, hi });
        }
        if x > hi {
            return self.upper_fill.ok_or(SplineError::OutOfRange { x, lo, hi });
        }
        Ok(self.piece_at(self.locate_piece(x), x))
    }

    /// Piece `k` evaluated at `x`, without range checks.
    #[inline]
    pub fn piece_at(&self, k: usize, x: f64) -> f64 {
        poly::horner(&self.pieces[k], x - self.breakpoints[k])
    }

    /// `∫_{t_0}^{x} s`. Zero below the range, the full integral above it.
    pub fn integral_to(&self, x: f64) -> f64 {
        let (lo, _) = self.range();
        if x <= lo {
            return 0.0;
        }
        let last = self.locate_piece(x);
        let mut total = 0.0;
        for k in 0..=last {
            let b = if k == last {
                x.min(self.breakpoints[k + 1])
            } else {
                self.breakpoints[k + 1]
            };
            let p = poly::antiderivative(&self.pieces[k]);
            total += poly::horner(&p, b - self.breakpoints[k]);
        }
        total
    }

    /// `∫_{t_0}^{t_K} s`.
    pub fn definite_integral(&self) -> f64 {
        self.integral_to(self.range().1)
    }
}

impl Evaluable1D for PolySpline {
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        self.value(x).unwrap_or(f64::NAN)
    }
}

/// Local coefficients of the parabola through `(0, y0)`, `(h1, y1)`, `(h2, y2)`.
fn quadratic_through(h: [f64; 2], y: [f64; 3]) -> Vec<f64> {
    let [h1, h2] = h;
    let [y0, y1, y2] = y;
    let s1 = (y1 - y0) / h1;
    let s2 = (y2 - y0) / h2;
    let c2 = (s2 - s1) / (h2 - h1);
    let c1 = s1 - c2 * h1;
    vec![y0, c1, c2]
}
