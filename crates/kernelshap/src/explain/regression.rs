//! Weighted equality-constrained least squares.
//!
//! Solves, per output class `c`,
//!
//! ```text
//! minimize    sum_t w_t * ( y[t,c] - phi0_c - sum_j z[t,j] * phi[j,c] )^2
//! subject to  sum_j phi[j,c] = fx_c - phi0_c
//! ```
//!
//! by eliminating the last coefficient through the constraint. The
//! substitution turns every regressor into `z_j - z_last` and the target
//! into `y - phi0 - z_last * (fx - phi0)`, leaving an unconstrained
//! weighted least squares in `d - 1` unknowns. The normal matrix is shared
//! across classes, so it is formed and factored once; each class solves
//! its own right-hand side and recovers the dropped coefficient from the
//! constraint, which therefore holds to round-off by construction.

use crate::data::Matrix;

use super::Coalitions;

/// The normal matrix stayed rank-deficient after ridging.
///
/// Carries no context; the explainer wraps it with the seed/budget needed
/// to reproduce.
#[derive(Debug)]
pub(crate) struct DegenerateNormalEquations;

/// Solve for the attribution matrix `phi` of shape `d × k`.
///
/// `y_bar` holds one mean prediction row per coalition; `base_values` and
/// `fx` have one entry per output class. `ridge_scale` scales the
/// trace-proportional ridge added to the normal matrix diagonal.
pub(crate) fn solve_constrained_wls(
    coalitions: &Coalitions,
    y_bar: &Matrix,
    base_values: &[f64],
    fx: &[f64],
    ridge_scale: f64,
) -> Result<Matrix, DegenerateNormalEquations> {
    let d = coalitions.n_features();
    let k = base_values.len();
    let m = coalitions.n_masks();
    debug_assert!(d >= 2);
    debug_assert_eq!(y_bar.n_rows(), m);
    debug_assert_eq!(y_bar.n_cols(), k);
    debug_assert_eq!(fx.len(), k);

    let p = d - 1;

    // Normal matrix A = Z'^T W Z' with z'_j = z_j - z_last, and one
    // right-hand side per class. Entries of z' are in {-1, 0, 1}.
    let mut a = vec![0.0; p * p];
    let mut rhs = vec![0.0; p * k];
    let mut z_adj = vec![0.0; p];
    let mut y_adj = vec![0.0; k];

    for t in 0..m {
        let mask = coalitions.mask(t);
        let w = coalitions.weight(t);
        if w == 0.0 {
            continue;
        }
        let z_last = mask[p] as f64;
        for j in 0..p {
            z_adj[j] = mask[j] as f64 - z_last;
        }
        let y_row = y_bar.row_slice(t);
        for c in 0..k {
            y_adj[c] = y_row[c] - base_values[c] - z_last * (fx[c] - base_values[c]);
        }

        for i in 0..p {
            let zi = z_adj[i];
            if zi == 0.0 {
                continue;
            }
            let wz = w * zi;
            for j in 0..=i {
                a[i * p + j] += wz * z_adj[j];
            }
            for c in 0..k {
                rhs[i * k + c] += wz * y_adj[c];
            }
        }
    }
    // Mirror the lower triangle.
    for i in 0..p {
        for j in i + 1..p {
            a[i * p + j] = a[j * p + i];
        }
    }

    // Trace-proportional ridge for conditioning.
    let trace: f64 = (0..p).map(|i| a[i * p + i]).sum();
    let lambda = ridge_scale * trace / p as f64;
    for i in 0..p {
        a[i * p + i] += lambda;
    }

    cholesky_in_place(&mut a, p)?;

    // Solve per class and recover the eliminated coefficient.
    let mut phi = vec![0.0; d * k];
    let mut b = vec![0.0; p];
    for c in 0..k {
        for i in 0..p {
            b[i] = rhs[i * k + c];
        }
        cholesky_solve(&a, p, &mut b);
        let mut sum = 0.0;
        for j in 0..p {
            phi[j * k + c] = b[j];
            sum += b[j];
        }
        phi[p * k + c] = (fx[c] - base_values[c]) - sum;
    }

    Ok(Matrix::from_vec(phi, d, k))
}

/// In-place lower-triangular Cholesky factorization of a symmetric
/// positive-definite `p × p` matrix.
fn cholesky_in_place(a: &mut [f64], p: usize) -> Result<(), DegenerateNormalEquations> {
    for i in 0..p {
        for j in 0..=i {
            let mut sum = a[i * p + j];
            for l in 0..j {
                sum -= a[i * p + l] * a[j * p + l];
            }
            if i == j {
                if !(sum > 0.0) || !sum.is_finite() {
                    return Err(DegenerateNormalEquations);
                }
                a[i * p + i] = sum.sqrt();
            } else {
                a[i * p + j] = sum / a[j * p + j];
            }
        }
    }
    Ok(())
}

/// Solve `L L^T x = b` in place given the factor from
/// [`cholesky_in_place`].
fn cholesky_solve(l: &[f64], p: usize, b: &mut [f64]) {
    // Forward substitution: L y = b
    for i in 0..p {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i * p + j] * b[j];
        }
        b[i] = sum / l[i * p + i];
    }
    // Back substitution: L^T x = y
    for i in (0..p).rev() {
        let mut sum = b[i];
        for j in i + 1..p {
            sum -= l[j * p + i] * b[j];
        }
        b[i] = sum / l[i * p + i];
    }
}
