//! The KernelSHAP explainer.
//!
//! [`KernelExplainer`] owns the background data and the predictor
//! reference, caches the base value at construction, and runs the full
//! pipeline per query: coalition sampling, synthetic sample construction,
//! one (possibly chunked) predictor evaluation, and the constrained
//! weighted regression.
//!
//! # Example
//!
//! ```
//! use kernelshap::data::Matrix;
//! use kernelshap::explain::{ExplainConfig, KernelExplainer};
//! use kernelshap::predict::FnPredictor;
//!
//! // f(x) = 2*x0 + 3*x1
//! let f = FnPredictor::new(|batch: kernelshap::data::MatrixView<'_>| {
//!     let out: Vec<f64> = (0..batch.n_rows())
//!         .map(|i| {
//!             let r = batch.row_slice(i);
//!             2.0 * r[0] + 3.0 * r[1]
//!         })
//!         .collect();
//!     Ok(Matrix::from_vec(out, batch.n_rows(), 1))
//! });
//!
//! let background = Matrix::from_vec(vec![0.0, 0.0, 1.0, 1.0], 2, 2);
//! let explainer =
//!     KernelExplainer::new(f, background, ExplainConfig::default()).unwrap();
//! let explanation = explainer.explain(&[2.0, 1.0]).unwrap();
//! assert!(explanation.verify(1e-6));
//! ```

use bon::Builder;

use crate::data::{Matrix, MatrixView};
use crate::predict::Predictor;

use super::coalitions::{sample_coalitions, Lcg64};
use super::logger::{ExplainLogger, Verbosity};
use super::regression::solve_constrained_wls;
use super::samples::SyntheticSamples;
use super::values::Explanation;
use super::ExplainError;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors from configuration validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// `ridge_scale` must be non-negative and finite.
    #[error("ridge_scale must be non-negative and finite, got {0}")]
    InvalidRidgeScale(f64),

    /// `max_cell_budget` must allow at least one cell.
    #[error("max_cell_budget must be positive")]
    InvalidCellBudget,
}

// =============================================================================
// ExplainConfig
// =============================================================================

/// Configuration for a [`KernelExplainer`].
///
/// # Example
///
/// ```
/// use kernelshap::explain::{ExplainConfig, Verbosity};
///
/// // All defaults
/// let config = ExplainConfig::builder().build().unwrap();
///
/// // Customized budget and seed
/// let config = ExplainConfig::builder()
///     .n_samples(4096)
///     .seed(7)
///     .verbosity(Verbosity::Info)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ExplainConfig {
    /// Coalition sample budget `M`. `None` uses `2 * d + 2048`.
    pub n_samples: Option<usize>,

    /// Scale of the trace-proportional ridge added to the regression's
    /// normal matrix. Default: `1e-8`.
    #[builder(default = 1e-8)]
    pub ridge_scale: f64,

    /// Upper bound, in matrix cells, on a single predictor batch over the
    /// synthetic sample matrix; larger explanations are chunked.
    /// Default: `1 << 24`.
    #[builder(default = 1 << 24)]
    pub max_cell_budget: usize,

    /// Seed for the injected coalition-sampling PRNG. The same seed yields
    /// bitwise-identical attributions. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Progress output level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,

    /// Feature names carried into [`Explanation`] for reporting.
    pub feature_names: Option<Vec<String>>,
}

/// Custom finishing function that validates the config.
impl<S: explain_config_builder::IsComplete> ExplainConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `ridge_scale` is negative or non-finite,
    /// or `max_cell_budget` is zero.
    pub fn build(self) -> Result<ExplainConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ExplainConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.ridge_scale.is_finite() || self.ridge_scale < 0.0 {
            return Err(ConfigError::InvalidRidgeScale(self.ridge_scale));
        }
        if self.max_cell_budget == 0 {
            return Err(ConfigError::InvalidCellBudget);
        }
        Ok(())
    }
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// KernelExplainer
// =============================================================================

/// Model-agnostic KernelSHAP explainer.
///
/// Owns the background data and the working state of one explanation at a
/// time; concurrent explanations run on independent instances and share no
/// mutable state.
pub struct KernelExplainer<P: Predictor> {
    predictor: P,
    background: Matrix,
    base_values: Vec<f64>,
    n_outputs: usize,
    config: ExplainConfig,
}

impl<P: Predictor> KernelExplainer<P> {
    /// Create an explainer, validating shapes and caching the base value
    /// `phi_0 = mean(f(X_bg), axis=0)`.
    pub fn new(
        predictor: P,
        background: Matrix,
        config: ExplainConfig,
    ) -> Result<Self, ExplainError> {
        if background.n_rows() == 0 || background.n_cols() == 0 {
            return Err(ExplainError::EmptyBackground);
        }
        check_finite(background.view())?;

        let n = background.n_rows();
        let preds = predictor
            .predict(background.view())
            .map_err(ExplainError::Predictor)?;
        if preds.n_rows() != n || preds.n_cols() == 0 {
            return Err(ExplainError::PredictorShape {
                expected_rows: n,
                expected_cols: preds.n_cols().max(1),
                got_rows: preds.n_rows(),
                got_cols: preds.n_cols(),
            });
        }
        let n_outputs = preds.n_cols();

        let mut base_values = vec![0.0; n_outputs];
        for i in 0..n {
            let row = preds.row_slice(i);
            for c in 0..n_outputs {
                if !row[c].is_finite() {
                    return Err(ExplainError::NonFinitePrediction { row: i });
                }
                base_values[c] += row[c];
            }
        }
        for v in &mut base_values {
            *v /= n as f64;
        }

        Ok(Self {
            predictor,
            background,
            base_values,
            n_outputs,
            config,
        })
    }

    /// Base value per output class: the mean prediction over the
    /// background.
    #[inline]
    pub fn base_values(&self) -> &[f64] {
        &self.base_values
    }

    /// Number of features `d`.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.background.n_cols()
    }

    /// Number of output classes `k`.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// The background data.
    #[inline]
    pub fn background(&self) -> &Matrix {
        &self.background
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    /// Explain one query instance.
    ///
    /// Returns attributions `phi` of shape `d × k` satisfying
    /// `phi_0 + sum_j phi_j = f(x)` per class, up to round-off.
    pub fn explain(&self, x: &[f64]) -> Result<Explanation, ExplainError> {
        let d = self.n_features();
        if x.len() != d {
            return Err(ExplainError::ShapeMismatch {
                expected: d,
                got: x.len(),
            });
        }
        for (col, &v) in x.iter().enumerate() {
            if !v.is_finite() {
                return Err(ExplainError::NonFiniteInput { row: 0, col });
            }
        }

        let fx = self.predict_query(x)?;
        let logger = ExplainLogger::new(self.config.verbosity);

        // One feature carries the whole difference; no sampling needed.
        if d == 1 {
            let values: Vec<f64> = fx
                .iter()
                .zip(&self.base_values)
                .map(|(f, b)| f - b)
                .collect();
            return Ok(Explanation::new(
                values,
                self.base_values.clone(),
                fx,
                d,
                self.n_outputs,
                0,
                true,
                self.config.feature_names.clone(),
            ));
        }

        let budget = self.config.n_samples.unwrap_or(2 * d + 2048);
        if budget < 2 * d {
            return Err(ExplainError::BudgetTooSmall {
                n_samples: budget,
                n_features: d,
                min: 2 * d,
            });
        }
        logger.log_plan(d, budget);

        let mut rng = Lcg64::new(self.config.seed);
        let coalitions = sample_coalitions(d, budget, &mut rng, &logger);

        let mut samples = SyntheticSamples::new(&self.background, coalitions.n_masks());
        for t in 0..coalitions.n_masks() {
            samples.add_sample(x, coalitions.mask(t), coalitions.weight(t));
        }
        let y_bar = samples.mean_predictions(
            &self.predictor,
            self.n_outputs,
            self.config.max_cell_budget,
        )?;

        logger.log_solve(coalitions.n_masks(), self.n_outputs);
        let phi = solve_constrained_wls(
            &coalitions,
            &y_bar,
            &self.base_values,
            &fx,
            self.config.ridge_scale,
        )
        .map_err(|_| ExplainError::DegenerateSystem {
            n_features: d,
            n_samples: budget,
            seed: self.config.seed,
        })?;

        Ok(Explanation::new(
            phi.into_vec(),
            self.base_values.clone(),
            fx,
            d,
            self.n_outputs,
            coalitions.n_masks(),
            coalitions.is_exact(),
            self.config.feature_names.clone(),
        ))
    }

    /// Evaluate the predictor at the query point.
    fn predict_query(&self, x: &[f64]) -> Result<Vec<f64>, ExplainError> {
        let d = x.len();
        let query = MatrixView::from_slice(x, 1, d);
        let pred = self
            .predictor
            .predict(query)
            .map_err(ExplainError::Predictor)?;
        if pred.n_rows() != 1 || pred.n_cols() != self.n_outputs {
            return Err(ExplainError::PredictorShape {
                expected_rows: 1,
                expected_cols: self.n_outputs,
                got_rows: pred.n_rows(),
                got_cols: pred.n_cols(),
            });
        }
        let row = pred.row_slice(0);
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ExplainError::NonFinitePrediction { row: 0 });
        }
        Ok(row.to_vec())
    }
}

fn check_finite(m: MatrixView<'_>) -> Result<(), ExplainError> {
    for row in 0..m.n_rows() {
        let r = m.row_slice(row);
        for (col, &v) in r.iter().enumerate() {
            if !v.is_finite() {
                return Err(ExplainError::NonFiniteInput { row, col });
            }
        }
    }
    Ok(())
}
