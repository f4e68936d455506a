//! Refinement configuration and the fixed numeric policy behind it.
//!
//! Policy
//! - Acceptance and degeneracy are decided at single precision. A quadrant
//!   whose midpoint prediction agrees with the sample once both are rounded
//!   to `f32` is accepted; a quadrant whose half-width vanishes against its
//!   endpoints at `f32` resolution cannot be subdivided further.
//! - `precision_factor` scales the sampled value before comparison, so
//!   larger factors tolerate larger prediction errors and give coarser meshes.

use super::types::Rect;
use crate::error::{MeshError, MeshResult};

/// Mesh construction settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshCfg {
    /// Scales the acceptance test; must be finite and positive.
    pub precision_factor: f64,
    /// Quadrants at this level are accepted without testing. `None` means no cap.
    pub max_level: Option<u32>,
}

impl Default for MeshCfg {
    fn default() -> Self {
        Self {
            precision_factor: 1.0,
            max_level: None,
        }
    }
}

impl MeshCfg {
    #[must_use]
    pub fn with_precision(precision_factor: f64) -> Self {
        Self {
            precision_factor,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn max_level(mut self, level: u32) -> Self {
        self.max_level = Some(level);
        self
    }

    pub fn validate(&self) -> MeshResult<()> {
        let pf = self.precision_factor;
        if !pf.is_finite() || pf <= 0.0 {
            return Err(MeshError::InvalidPrecision(pf));
        }
        Ok(())
    }
}

/// True when `actual` and `predicted` agree at working precision.
///
/// Compares `actual·pf + (actual - predicted)` against `actual·pf` after
/// rounding both to `f32`.
///
/// Meaningful only while `|actual·pf|` stays within `f32` range, roughly
/// `1e-45..3.4e38`. Below it both sides round to zero and any prediction
/// error under the smallest subnormal is accepted; above it both sides
/// round to infinity and every prediction is accepted.
#[inline]
pub(crate) fn within_precision(actual: f64, predicted: f64, pf: f64) -> bool {
    let scaled = actual * pf;
    (scaled + (actual - predicted)) as f32 == scaled as f32
}

/// True when halving `[lo, hi]` at `mid` no longer moves away from either end.
#[inline]
fn axis_unresolvable(lo: f64, mid: f64, hi: f64) -> bool {
    mid.is_nan()
        || (lo + (lo - mid)) as f32 == lo as f32
        || (hi + (hi - mid)) as f32 == hi as f32
}

/// A rectangle that cannot be split into four distinguishable children.
pub(crate) fn is_unresolvable(r: &Rect) -> bool {
    let c = r.center();
    axis_unresolvable(r.x_lo, c.x, r.x_hi) || axis_unresolvable(r.y_lo, c.y, r.y_hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_validation() {
        let cfg = MeshCfg::default();
        assert_eq!(cfg.precision_factor, 1.0);
        assert!(cfg.max_level.is_none());
        assert!(cfg.validate().is_ok());
        assert!(MeshCfg::with_precision(0.0).validate().is_err());
        assert!(MeshCfg::with_precision(-1.0).validate().is_err());
        assert!(MeshCfg::with_precision(f64::NAN).validate().is_err());
        assert_eq!(MeshCfg::default().max_level(7).max_level, Some(7));
    }

    #[test]
    fn precision_test_tracks_factor() {
        assert!(within_precision(1.0, 1.0, 1.0));
        // An error of 1e-3 on a unit value is visible at factor 1 but not at 1e6.
        assert!(!within_precision(1.0, 1.001, 1.0));
        assert!(within_precision(1.0, 1.001, 1e6));
        // Zero samples only accept an exact prediction (up to f32 underflow).
        assert!(within_precision(0.0, 0.0, 1.0));
        assert!(!within_precision(0.0, 1e-6, 1.0));
    }

    #[test]
    fn precision_test_outside_f32_range() {
        // Scaled values past f32::MAX round to infinity on both sides.
        assert!(within_precision(1e30, 2e30, 1e10));
        // Values below the smallest subnormal vanish together with the error.
        assert!(within_precision(1e-50, 2e-50, 1.0));
        // Inside the range the same relative error is caught.
        assert!(!within_precision(1e10, 2e10, 1.0));
    }

    #[test]
    fn unresolvable_widths() {
        let wide = Rect::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(!is_unresolvable(&wide));
        let thin = Rect::new(1.0, 0.0, 1.0 + 1e-9, 1.0).unwrap();
        assert!(is_unresolvable(&thin));
        let flat = Rect::new(0.0, 5.0, 1.0, 5.0 + 1e-8).unwrap();
        assert!(is_unresolvable(&flat));
    }
}
