//! The KernelSHAP core.
//!
//! Attributes a black-box predictor's output to input features: coalition
//! masks are enumerated and sampled under the SHAP kernel, expanded
//! against the background data into synthetic samples, and a weighted
//! equality-constrained regression solves for attributions whose sum
//! matches the prediction.
//!
//! # Example
//!
//! ```ignore
//! use kernelshap::explain::{ExplainConfig, KernelExplainer};
//!
//! let explainer = KernelExplainer::new(model, background, ExplainConfig::default())?;
//! let explanation = explainer.explain(&query)?;
//! let top = explanation.top_k(0, 3);
//! ```

mod coalitions;
mod explainer;
mod kernel;
mod logger;
mod regression;
mod samples;
mod values;

pub use coalitions::{sample_coalitions, Coalitions, Lcg64};
pub use explainer::{ConfigError, ExplainConfig, KernelExplainer};
pub use kernel::{binomial_capped, kernel_weight, ln_binomial, size_weights};
pub use logger::{ExplainLogger, Verbosity};
pub use samples::SyntheticSamples;
pub use values::{Explanation, FeatureContribution};

use crate::predict::PredictorError;

/// Errors from explainer construction or a single explanation.
///
/// Nothing is retried internally and partial results are never returned;
/// variants carry the context needed to reproduce the failure.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    /// The query length does not match the background width.
    #[error("query has {got} features but the explainer expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    /// The background matrix has no rows or no columns.
    #[error("background data must have at least one row and one column")]
    EmptyBackground,

    /// The coalition budget cannot represent the outermost size pair.
    #[error(
        "coalition budget {n_samples} is too small for {n_features} features; \
         need at least {min}"
    )]
    BudgetTooSmall {
        n_samples: usize,
        n_features: usize,
        min: usize,
    },

    /// Background or query data contains NaN or infinity.
    #[error("input contains a non-finite value at row {row}, column {col}")]
    NonFiniteInput { row: usize, col: usize },

    /// The predictor produced NaN or infinity.
    #[error("predictor produced a non-finite value at row {row}")]
    NonFinitePrediction { row: usize },

    /// The predictor returned a matrix of the wrong shape.
    #[error(
        "predictor returned a {got_rows}x{got_cols} matrix, \
         expected {expected_rows}x{expected_cols}"
    )]
    PredictorShape {
        expected_rows: usize,
        expected_cols: usize,
        got_rows: usize,
        got_cols: usize,
    },

    /// The regression system stayed rank-deficient after ridging.
    #[error(
        "coalition design is degenerate after ridging \
         (d = {n_features}, budget = {n_samples}, seed = {seed}); \
         increase the sample budget"
    )]
    DegenerateSystem {
        n_features: usize,
        n_samples: usize,
        seed: u64,
    },

    /// The predictor collaborator failed; the cause is attached unchanged.
    #[error("predictor failed")]
    Predictor(#[source] PredictorError),
}
