//! SHAP kernel weight math.
//!
//! The kernel for a coalition of size `s` out of `d` features is
//!
//! ```text
//! w(s) = (d - 1) / ( C(d, s) * s * (d - s) )        for 0 < s < d
//! ```
//!
//! with infinite weight at `s = 0` and `s = d` (those ends are enforced
//! through the regression's equality constraints, not through samples).
//! Binomials are evaluated in log space so the weight stays finite and
//! accurate for feature counts far past the point where `C(d, s)`
//! overflows an integer.

/// Natural log of the binomial coefficient `C(n, k)`.
///
/// Stable sum of log ratios; exact to within normal f64 rounding for any
/// `n` that fits in a `usize`. Returns `-inf` when `k > n`.
pub fn ln_binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let k = k.min(n - k);
    let mut acc = 0.0;
    for i in 1..=k {
        acc += ((n - k + i) as f64).ln() - (i as f64).ln();
    }
    acc
}

/// Binomial coefficient `C(n, k)` saturated at `cap`.
///
/// Exact integer product (the running value is itself a binomial, so the
/// stepwise division is exact); once the running value exceeds `cap` the
/// cap is returned. Used for budget arithmetic where only comparisons
/// against the remaining sample budget matter.
pub fn binomial_capped(n: usize, k: usize, cap: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 1..=k {
        acc = acc * (n - k + i) as u128 / i as u128;
        if acc > cap as u128 {
            return cap;
        }
    }
    acc as u64
}

/// The SHAP kernel weight `w(s)` for a coalition of `s` out of `d` features.
///
/// Infinite at `s = 0` and `s = d`.
///
/// # Panics
///
/// Panics if `s > d` or `d == 0`.
pub fn kernel_weight(d: usize, s: usize) -> f64 {
    assert!(d >= 1, "kernel weight needs at least one feature");
    assert!(s <= d, "coalition size {} exceeds feature count {}", s, d);
    if s == 0 || s == d {
        return f64::INFINITY;
    }
    let ln_w = ((d - 1) as f64).ln()
        - ln_binomial(d, s)
        - (s as f64).ln()
        - ((d - s) as f64).ln();
    ln_w.exp()
}

/// Normalized coalition mass per subset size, over the small half of the
/// interior sizes `1..=d/2`.
///
/// Entry `i` holds the total kernel mass of sizes `s = i + 1` and `d - s`
/// combined: `omega(s) = (d-1)/(s(d-s))`, doubled when `s != d - s`, then
/// normalized so the entries sum to 1. Empty for `d < 2`.
pub fn size_weights(d: usize) -> Vec<f64> {
    if d < 2 {
        return Vec::new();
    }
    let num_subset_sizes = d / 2;
    let num_paired = (d - 1) / 2;
    let mut weights: Vec<f64> = (1..=num_subset_sizes)
        .map(|s| {
            let mut w = (d - 1) as f64 / (s * (d - s)) as f64;
            if s <= num_paired {
                w *= 2.0;
            }
            w
        })
        .collect();
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}
