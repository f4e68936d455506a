//! Error types for mesh construction, 1D splines and integration.

use thiserror::Error;

use crate::mesh::Side;

/// Result alias for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;
/// Result alias for spline construction and lookup.
pub type SplineResult<T> = Result<T, SplineError>;
/// Result alias for integration.
pub type IntegrateResult<T> = Result<T, IntegrateError>;

/// Failures while building a `Mesh2D`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Domain bounds are non-finite or empty.
    #[error("invalid domain [{x_lo}, {x_hi}] x [{y_lo}, {y_hi}]")]
    InvalidDomain {
        x_lo: f64,
        y_lo: f64,
        x_hi: f64,
        y_hi: f64,
    },

    /// Precision factor must be finite and strictly positive.
    #[error("invalid precision factor {0}")]
    InvalidPrecision(f64),

    /// The root quadrant cannot be subdivided at working precision.
    #[error("domain is degenerate at working precision; no mesh can be built")]
    DegenerateRoot,

    /// The evaluator returned NaN or infinity.
    #[error("evaluator returned non-finite value {value} at ({x}, {y})")]
    NonFiniteSample { x: f64, y: f64, value: f64 },

    /// Affine coefficients of a triangle came out non-finite.
    #[error("non-finite affine fit for {side:?} triangle of quadrant {quad}")]
    NonFiniteAffineFit { quad: usize, side: Side },
}

/// Failures while building or querying a `PolySpline`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    /// A spline needs at least two breakpoints.
    #[error("need at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),

    /// `pieces.len()` must be `breakpoints.len() - 1`.
    #[error("{pieces} pieces for {breakpoints} breakpoints")]
    LengthMismatch { breakpoints: usize, pieces: usize },

    /// Breakpoints must be finite and strictly increasing.
    #[error("breakpoint {index} is not finite or not strictly increasing")]
    NotIncreasing { index: usize },

    /// A piece has no coefficients.
    #[error("piece {index} has no coefficients")]
    EmptyPiece { index: usize },

    /// Fitted coefficients came out NaN or infinite.
    #[error("piece {index} has non-finite coefficients")]
    NonFiniteCoefficients { index: usize },

    /// Sample abscissae and ordinates differ in length.
    #[error("{xs} sample positions for {ys} sample values")]
    SampleLengthMismatch { xs: usize, ys: usize },

    /// Sample-based construction needs at least three samples.
    #[error("need at least 3 samples, got {0}")]
    TooFewSamples(usize),

    /// Query outside the breakpoint range with no fill value set.
    #[error("{x} outside spline range [{lo}, {hi}]")]
    OutOfRange { x: f64, lo: f64, hi: f64 },
}

/// Failures of the Y-integration pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrateError {
    /// The mesh extends beyond the weight spline's range.
    #[error("weight covers [{lo}, {hi}] but the mesh reaches y = {y}")]
    WeightOutOfRange { y: f64, lo: f64, hi: f64 },

    /// An interval handed to the accumulator is reversed or non-finite.
    #[error("invalid interval [{lo}, {hi}]")]
    InvalidInterval { lo: f64, hi: f64 },

    /// Drained intervals leave a gap, overlap, or miss the expected range.
    #[error("inconsistent coverage: expected an interval starting at {expected}, found {found}")]
    InconsistentCoverage { expected: f64, found: f64 },

    /// Nothing was accumulated.
    #[error("accumulator is empty")]
    EmptyAccumulator,

    /// Converting the drained intervals into a spline failed.
    #[error(transparent)]
    Spline(#[from] SplineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_location() {
        let err = MeshError::NonFiniteSample {
            x: 0.5,
            y: 1.5,
            value: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("(0.5, 1.5)"));

        let err = IntegrateError::InconsistentCoverage {
            expected: 1.0,
            found: 1.25,
        };
        assert!(err.to_string().contains("1.25"));
    }

    #[test]
    fn spline_errors_convert() {
        let err: IntegrateError = SplineError::TooFewBreakpoints(1).into();
        assert!(matches!(err, IntegrateError::Spline(SplineError::TooFewBreakpoints(1))));
    }
}
