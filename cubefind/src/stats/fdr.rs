//! False Discovery Rate helpers.
//!
//! The Benjamini-Hochberg procedure with the correction for correlated tests:
//! sort p-values ascending and keep the largest rank `r` with
//! `p[r] < alpha * (r / N) / c_N`, where `c_N = sum(1/k, k = 1..num_correlated)`.

use rayon::prelude::*;
use statrs::function::erf::erfc;

/// Lower and upper bounds of the bisection for the inverse survival function.
const Z_SEARCH_RANGE: (f64, f64) = (-40.0, 40.0);

/// Bisection stops once the bracket is narrower than this.
const Z_TOLERANCE: f64 = 1e-6;

/// One-tailed Gaussian survival function, `P(Z > z)`.
#[inline]
pub fn survival(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Find `z` such that `survival(z) == p` by bisection.
///
/// `p` outside (0, 1) saturates at the ends of the search range.
pub fn inverse_survival(p: f64) -> f64 {
    let (mut lo, mut hi) = Z_SEARCH_RANGE;
    while hi - lo > Z_TOLERANCE {
        let mid = 0.5 * (lo + hi);
        // Survival is decreasing in z.
        if survival(mid) > p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Harmonic number `sum(1/k, k = 1..n)`, at least 1.
pub fn correlation_factor(num_correlated: usize) -> f64 {
    (1..=num_correlated.max(1)).map(|k| 1.0 / k as f64).sum()
}

/// Benjamini-Hochberg p-value cutoff. Returns 0 when no test passes.
pub fn benjamini_hochberg(mut p_values: Vec<f64>, alpha: f64, num_correlated: usize) -> f64 {
    if p_values.is_empty() {
        return 0.0;
    }
    p_values.par_sort_unstable_by(f64::total_cmp);

    let n = p_values.len() as f64;
    let c_n = correlation_factor(num_correlated);
    p_values
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, &p)| p < alpha * ((i + 1) as f64 / n) / c_n)
        .map_or(0.0, |(_, &p)| p)
}
