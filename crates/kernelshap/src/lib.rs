//! kernelshap: model-agnostic SHAP attributions for black-box predictors.
//!
//! Given a batched predictor `f: R^{m×d} -> R^{m×k}`, a background dataset
//! and a query point, [`KernelExplainer`] returns per-feature, per-class
//! attributions `phi` with `phi_0 + sum_j phi_j = f(x)`, approximating
//! Shapley values of the marginal-expectation game via the KernelSHAP
//! weighted regression.
//!
//! # Key Types
//!
//! - [`KernelExplainer`] - the explainer: construction caches the base
//!   value, `explain` attributes one query
//! - [`ExplainConfig`] - configuration builder (budget, seed, ridge,
//!   chunking, verbosity)
//! - [`Explanation`] - attributions plus additivity check and ranked
//!   reporting
//! - [`Predictor`] / [`FnPredictor`] - the model seam
//! - [`Matrix`] / [`MatrixView`] - dense row-major data handling
//!
//! # Example
//!
//! ```
//! use kernelshap::{ExplainConfig, FnPredictor, KernelExplainer, Matrix};
//!
//! // f(x) = x0 + 2*x1, one output
//! let f = FnPredictor::new(|batch: kernelshap::MatrixView<'_>| {
//!     let out: Vec<f64> = (0..batch.n_rows())
//!         .map(|i| {
//!             let r = batch.row_slice(i);
//!             r[0] + 2.0 * r[1]
//!         })
//!         .collect();
//!     Ok(Matrix::from_vec(out, batch.n_rows(), 1))
//! });
//!
//! let background = Matrix::from_vec(vec![0.0, 0.0, 2.0, 2.0], 2, 2);
//! let explainer = KernelExplainer::new(f, background, ExplainConfig::default())?;
//! let explanation = explainer.explain(&[3.0, 1.0])?;
//! assert!(explanation.verify(1e-6));
//! # Ok::<(), kernelshap::ExplainError>(())
//! ```

// Re-export approx traits for users who want to compare attributions
pub use approx;

pub mod data;
pub mod explain;
pub mod predict;
pub mod testing;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// The explainer and its surroundings (most users want these)
pub use explain::{
    ConfigError, ExplainConfig, ExplainError, Explanation, FeatureContribution,
    KernelExplainer, Verbosity,
};

// The model seam
pub use predict::{FnPredictor, Predictor, PredictorError};

// Data handling
pub use data::{DenseMatrix, Matrix, MatrixView};
