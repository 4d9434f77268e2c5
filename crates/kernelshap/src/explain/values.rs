//! Attribution container for one explained instance.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A single feature's contribution to one output class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureContribution {
    /// Feature index.
    pub feature_index: usize,
    /// Feature name, if the explainer was configured with names.
    pub feature_name: Option<String>,
    /// Attribution value `phi_j`.
    pub value: f64,
}

/// Attributions `phi` for one query instance.
///
/// Stores per-feature, per-output values plus the base values and the
/// query predictions, so the additivity identity
/// `phi_0 + sum_j phi_j = f(x)` can be checked per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Flat storage `[feature][output]`.
    values: Vec<f64>,
    /// Base value per output: mean prediction over the background.
    base_values: Vec<f64>,
    /// Predictor output at the query, per class.
    predictions: Vec<f64>,
    n_features: usize,
    n_outputs: usize,
    /// Coalitions actually used by the regression.
    n_coalitions: usize,
    /// Whether every interior coalition was enumerated.
    exact: bool,
    feature_names: Option<Vec<String>>,
}

impl Explanation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        values: Vec<f64>,
        base_values: Vec<f64>,
        predictions: Vec<f64>,
        n_features: usize,
        n_outputs: usize,
        n_coalitions: usize,
        exact: bool,
        feature_names: Option<Vec<String>>,
    ) -> Self {
        debug_assert_eq!(values.len(), n_features * n_outputs);
        debug_assert_eq!(base_values.len(), n_outputs);
        debug_assert_eq!(predictions.len(), n_outputs);
        Self {
            values,
            base_values,
            predictions,
            n_features,
            n_outputs,
            n_coalitions,
            exact,
            feature_names,
        }
    }

    /// Number of features `d`.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of output classes `k`.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Attribution of `feature` toward `output`.
    #[inline]
    pub fn value(&self, feature: usize, output: usize) -> f64 {
        self.values[feature * self.n_outputs + output]
    }

    /// All attributions toward one output, in feature order.
    pub fn feature_values(&self, output: usize) -> Vec<f64> {
        (0..self.n_features).map(|j| self.value(j, output)).collect()
    }

    /// Base value `phi_0` for one output.
    #[inline]
    pub fn base_value(&self, output: usize) -> f64 {
        self.base_values[output]
    }

    /// Predictor output at the query for one class.
    #[inline]
    pub fn prediction(&self, output: usize) -> f64 {
        self.predictions[output]
    }

    /// The flat `[feature][output]` storage.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of coalitions the regression was fitted on.
    #[inline]
    pub fn n_coalitions(&self) -> usize {
        self.n_coalitions
    }

    /// `true` when the coalition budget covered every interior coalition,
    /// making the attributions exact Shapley values of the
    /// marginal-expectation game.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Configured feature names, if any.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Check `|phi_0 + sum_j phi_j - f(x)| <= tolerance` for every class.
    pub fn verify(&self, tolerance: f64) -> bool {
        (0..self.n_outputs).all(|c| {
            let total: f64 = self.base_value(c)
                + (0..self.n_features).map(|j| self.value(j, c)).sum::<f64>();
            (total - self.prediction(c)).abs() <= tolerance
        })
    }

    /// Contributions toward one output, sorted by |value| descending.
    pub fn contributions(&self, output: usize) -> Vec<FeatureContribution> {
        let mut out: Vec<FeatureContribution> = (0..self.n_features)
            .map(|j| FeatureContribution {
                feature_index: j,
                feature_name: self
                    .feature_names
                    .as_ref()
                    .map(|names| names[j].clone()),
                value: self.value(j, output),
            })
            .collect();
        out.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        out
    }

    /// The `k` largest contributions toward one output, by |value|.
    pub fn top_k(&self, output: usize, k: usize) -> Vec<FeatureContribution> {
        let mut out = self.contributions(output);
        out.truncate(k);
        out
    }

    /// Export attributions as an `[n_features, n_outputs]` array.
    pub fn values_array(&self) -> Array2<f64> {
        Array2::from_shape_vec((self.n_features, self.n_outputs), self.values.clone())
            .expect("flat storage matches shape")
    }
}
