//! Dense polynomial helpers on coefficient vectors.
//!
//! A slice `c` represents `c[0] + c[1] x + c[2] x² + …`. All helpers allocate
//! fresh vectors; lengths are never trimmed, so trailing zeros survive.

/// Horner evaluation.
#[inline]
pub fn horner(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Antiderivative with zero constant term.
pub fn antiderivative(c: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(c.len() + 1);
    out.push(0.0);
    out.extend(c.iter().enumerate().map(|(i, &ci)| ci / (i as f64 + 1.0)));
    out
}

/// Multiply by the independent variable.
pub fn times_x(c: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(c.len() + 1);
    out.push(0.0);
    out.extend_from_slice(c);
    out
}

/// Multiply by the linear factor `a + b x`.
pub fn times_linear(c: &[f64], a: f64, b: f64) -> Vec<f64> {
    let mut out = vec![0.0; c.len() + 1];
    for (i, &ci) in c.iter().enumerate() {
        out[i] += a * ci;
        out[i + 1] += b * ci;
    }
    out
}

/// Binomial coefficient `C(n, k)` as a float.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Substitute `y = u0 + u1 x` into `p(y)` and expand in powers of `x`.
///
/// Uses `(u0 + u1 x)^k = Σ_j C(k, j) u0^(k-j) u1^j x^j`.
pub fn compose_affine(c: &[f64], u0: f64, u1: f64) -> Vec<f64> {
    let mut out = vec![0.0; c.len()];
    for (k, &ck) in c.iter().enumerate() {
        if ck == 0.0 {
            continue;
        }
        for (j, slot) in out.iter_mut().enumerate().take(k + 1) {
            *slot += ck * binomial(k, j) * u0.powi((k - j) as i32) * u1.powi(j as i32);
        }
    }
    out
}

/// `dst += scale · src`, growing `dst` with zeros when `src` is longer.
pub fn add_scaled(dst: &mut Vec<f64>, src: &[f64], scale: f64) {
    if dst.len() < src.len() {
        dst.resize(src.len(), 0.0);
    }
    for (d, &s) in dst.iter_mut().zip(src) {
        *d += scale * s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horner_matches_direct_sum() {
        let c = [1.0, -2.0, 0.5, 3.0];
        let x = 1.7_f64;
        let direct = 1.0 - 2.0 * x + 0.5 * x * x + 3.0 * x.powi(3);
        assert!((horner(&c, x) - direct).abs() < 1e-12);
        assert_eq!(horner(&[], 4.0), 0.0);
    }

    #[test]
    fn binomials() {
        assert_eq!(binomial(0, 0), 1.0);
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(6, 3), 20.0);
        assert_eq!(binomial(3, 4), 0.0);
    }

    #[test]
    fn antiderivative_differentiates_back() {
        let c = [3.0, 2.0, 6.0];
        let p = antiderivative(&c);
        assert_eq!(p, vec![0.0, 3.0, 1.0, 2.0]);
    }

    #[test]
    fn composition_agrees_pointwise() {
        let c = [0.5, -1.0, 2.0, 0.25];
        let (u0, u1) = (0.3, -1.4);
        let composed = compose_affine(&c, u0, u1);
        for &x in &[-1.0, 0.0, 0.4, 2.5] {
            let expect = horner(&c, u0 + u1 * x);
            assert!((horner(&composed, x) - expect).abs() < 1e-12);
        }
        // Constant substitution collapses to a constant polynomial.
        let flat = compose_affine(&c, 2.0, 0.0);
        assert!((flat[0] - horner(&c, 2.0)).abs() < 1e-12);
        assert!(flat[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn linear_product_and_padding() {
        let p = times_linear(&[1.0, 1.0], 2.0, 3.0);
        assert_eq!(p, vec![2.0, 5.0, 3.0]);
        let mut acc = vec![1.0];
        add_scaled(&mut acc, &p, -1.0);
        assert_eq!(acc, vec![-1.0, -5.0, -3.0]);
        assert_eq!(times_x(&[4.0]), vec![0.0, 4.0]);
    }
}
