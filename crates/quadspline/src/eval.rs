//! Evaluation seams shared by the mesh builder, the integrator and callers.
//!
//! Anything that can be sampled pointwise implements one of these traits.
//! Closures get blanket implementations, so `build_mesh(&|x, y| x * y, ..)`
//! works without a wrapper type.

/// A real-valued function of two variables.
pub trait Evaluable2D {
    fn evaluate(&self, x: f64, y: f64) -> f64;
}

/// A real-valued function of one variable.
pub trait Evaluable1D {
    fn evaluate(&self, x: f64) -> f64;
}

impl<F> Evaluable2D for F
where
    F: Fn(f64, f64) -> f64,
{
    #[inline]
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

impl<F> Evaluable1D for F
where
    F: Fn(f64) -> f64,
{
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}
