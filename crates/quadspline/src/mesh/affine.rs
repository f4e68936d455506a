//! Affine fits and half-planes used by triangles.
//!
//! - `HalfPlane`: closed half-space `n·x <= c` (no normalization).
//! - `AffineFit`: `f(z) = value + grad·(z - origin)`, anchored at the apex so
//!   that evaluation there returns the sampled value bit-for-bit.

use nalgebra::{Matrix2, Vector2};

use super::types::Vertex;

/// Closed half-plane `n · x <= c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfPlane {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl HalfPlane {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }

    /// Half-plane bounded by the line through `a` and `b`, on the side of `inside`.
    pub fn through(a: Vector2<f64>, b: Vector2<f64>, inside: Vector2<f64>) -> Self {
        let d = b - a;
        let n = Vector2::new(-d.y, d.x);
        let c = n.dot(&a);
        if n.dot(&inside) > c {
            Self::new(-n, -c)
        } else {
            Self::new(n, c)
        }
    }

    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        self.n.dot(&p) <= self.c
    }
}

/// Affine function of the plane through three sampled points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineFit {
    pub origin: Vector2<f64>,
    pub value: f64,
    pub grad: Vector2<f64>,
}

impl AffineFit {
    /// Plane through `apex`, `a`, `b`. `None` if collinear or non-finite.
    pub fn through(apex: Vertex, a: Vertex, b: Vertex) -> Option<Self> {
        let da = a.p - apex.p;
        let db = b.p - apex.p;
        let m = Matrix2::new(da.x, da.y, db.x, db.y);
        let inv = m.try_inverse()?;
        let grad = inv * Vector2::new(a.f - apex.f, b.f - apex.f);
        let fit = Self {
            origin: apex.p,
            value: apex.f,
            grad,
        };
        fit.is_finite().then_some(fit)
    }

    #[inline]
    pub fn eval(&self, z: Vector2<f64>) -> f64 {
        self.value + self.grad.dot(&(z - self.origin))
    }

    /// Global coefficients `(A, B, C)` of `A + B x + C y`.
    #[inline]
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (
            self.value - self.grad.dot(&self.origin),
            self.grad.x,
            self.grad.y,
        )
    }

    fn is_finite(&self) -> bool {
        self.value.is_finite() && self.grad.iter().all(|g| g.is_finite()) && {
            let (a, _, _) = self.coefficients();
            a.is_finite()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn v(x: f64, y: f64, f: f64) -> Vertex {
        Vertex::new(vector![x, y], f)
    }

    #[test]
    fn fit_reproduces_plane() {
        let plane = |x: f64, y: f64| 0.5 - 2.0 * x + 3.0 * y;
        let apex = v(0.5, 0.5, plane(0.5, 0.5));
        let a = v(0.0, 0.0, plane(0.0, 0.0));
        let b = v(0.0, 1.0, plane(0.0, 1.0));
        let fit = AffineFit::through(apex, a, b).unwrap();
        assert_eq!(fit.eval(apex.p), apex.f);
        for &(x, y) in &[(0.1, 0.2), (0.3, 0.7), (0.0, 1.0)] {
            assert!((fit.eval(vector![x, y]) - plane(x, y)).abs() < 1e-12);
        }
        let (ca, cb, cc) = fit.coefficients();
        assert!((ca - 0.5).abs() < 1e-12);
        assert!((cb + 2.0).abs() < 1e-12);
        assert!((cc - 3.0).abs() < 1e-12);
    }

    #[test]
    fn fit_rejects_collinear_and_nan() {
        let apex = v(0.0, 0.0, 0.0);
        assert!(AffineFit::through(apex, v(1.0, 1.0, 1.0), v(2.0, 2.0, 2.0)).is_none());
        assert!(AffineFit::through(apex, v(1.0, 0.0, f64::NAN), v(0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn half_plane_orientation() {
        let h = HalfPlane::through(vector![0.0, 0.0], vector![1.0, 1.0], vector![1.0, 0.0]);
        assert!(h.contains(vector![1.0, 0.0]));
        assert!(h.contains(vector![0.5, 0.5]));
        assert!(!h.contains(vector![0.0, 1.0]));
        let flipped = HalfPlane::through(vector![0.0, 0.0], vector![1.0, 1.0], vector![0.0, 1.0]);
        assert!(flipped.contains(vector![0.0, 1.0]));
        assert!(!flipped.contains(vector![1.0, 0.0]));
    }
}
