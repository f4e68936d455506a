//! Interval accumulator: sums piecewise polynomials over overlapping ranges.
//!
//! Entries are kept sorted and pairwise disjoint. Inserting `[lo, hi]` splits
//! any entry straddling `lo` or `hi`, adds the coefficients to every entry
//! inside the range, and fills the uncovered gaps with fresh entries. Draining
//! checks that the entries tile the expected range exactly.
//!
//! Every entry stores powers of `x - entry.lo`. Inserted coefficients are
//! powers of `x - lo` and get re-anchored before they are added.

use tracing::debug;

use super::{poly, PolySpline};
use crate::error::{IntegrateError, IntegrateResult};

/// Whether an insertion adds or subtracts its coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Add,
    Subtract,
}

#[derive(Clone, Debug)]
struct Entry {
    lo: f64,
    hi: f64,
    coefs: Vec<f64>,
}

/// Disjoint-interval sum of polynomial contributions.
#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    entries: Vec<Entry>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add (or subtract) `coefs`, in powers of `x - lo`, over `[lo, hi]`.
    ///
    /// Zero-width intervals are ignored.
    pub fn insert(&mut self, lo: f64, hi: f64, coefs: &[f64], sign: Sign) -> IntegrateResult<()> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(IntegrateError::InvalidInterval { lo, hi });
        }
        if lo == hi {
            return Ok(());
        }
        let scale = match sign {
            Sign::Add => 1.0,
            Sign::Subtract => -1.0,
        };

        self.split_at(lo);
        self.split_at(hi);

        let mut i = self.entries.partition_point(|e| e.hi <= lo);
        let mut cursor = lo;
        while i < self.entries.len() && self.entries[i].lo < hi {
            if self.entries[i].lo > cursor {
                let gap_hi = self.entries[i].lo;
                let gap = fresh(cursor, gap_hi, &reanchor(coefs, cursor - lo), scale);
                self.entries.insert(i, gap);
                i += 1;
            }
            let e = &mut self.entries[i];
            let local = reanchor(coefs, e.lo - lo);
            poly::add_scaled(&mut e.coefs, &local, scale);
            cursor = e.hi;
            i += 1;
        }
        if cursor < hi {
            let tail = fresh(cursor, hi, &reanchor(coefs, cursor - lo), scale);
            self.entries.insert(i, tail);
        }
        Ok(())
    }

    /// Split the entry strictly containing `x` into two copies.
    fn split_at(&mut self, x: f64) {
        let i = self.entries.partition_point(|e| e.hi <= x);
        if let Some(e) = self.entries.get(i) {
            if e.lo < x && x < e.hi {
                let right = Entry {
                    lo: x,
                    hi: e.hi,
                    coefs: reanchor(&e.coefs, x - e.lo),
                };
                self.entries[i].hi = x;
                self.entries.insert(i + 1, right);
            }
        }
    }

    /// Consume the entries into a spline covering exactly `[lo, hi]`.
    ///
    /// Every piece is zero-padded to the longest coefficient vector.
    pub fn drain(self, lo: f64, hi: f64) -> IntegrateResult<PolySpline> {
        if self.entries.is_empty() {
            return Err(IntegrateError::EmptyAccumulator);
        }
        let mut expected = lo;
        for e in &self.entries {
            if e.lo != expected {
                return Err(IntegrateError::InconsistentCoverage {
                    expected,
                    found: e.lo,
                });
            }
            expected = e.hi;
        }
        if expected != hi {
            return Err(IntegrateError::InconsistentCoverage {
                expected: hi,
                found: expected,
            });
        }

        let width = self.entries.iter().map(|e| e.coefs.len()).max().unwrap_or(1);
        let mut breakpoints = Vec::with_capacity(self.entries.len() + 1);
        breakpoints.push(lo);
        let mut pieces = Vec::with_capacity(self.entries.len());
        for mut e in self.entries {
            breakpoints.push(e.hi);
            e.coefs.resize(width, 0.0);
            pieces.push(e.coefs);
        }
        debug!(pieces = pieces.len(), degree = width - 1, "accumulator drained");
        Ok(PolySpline::new(breakpoints, pieces)?)
    }
}

/// Coefficients of `p(s + by)` in powers of `s`.
fn reanchor(coefs: &[f64], by: f64) -> Vec<f64> {
    if by == 0.0 {
        coefs.to_vec()
    } else {
        poly::compose_affine(coefs, by, 1.0)
    }
}

fn fresh(lo: f64, hi: f64, coefs: &[f64], scale: f64) -> Entry {
    Entry {
        lo,
        hi,
        coefs: coefs.iter().map(|c| c * scale).collect(),
    }
}
