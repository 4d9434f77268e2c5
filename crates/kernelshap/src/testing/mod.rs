//! Deterministic fixtures for tests and benchmarks.
//!
//! The Iris logistic fixture reproduces a small binary classifier over
//! four features with a fixed five-row background; its predictions over
//! the background are pinned by the integration tests.

use rand::prelude::*;

use crate::data::{Matrix, MatrixView};
use crate::predict::{Predictor, PredictorError};

/// Coefficients of the Iris class-1 logistic regression fixture.
pub const IRIS_WEIGHTS: [f64; 4] = [-0.1991, 0.3426, 0.0478, 1.03745];

/// Intercept of the Iris logistic fixture.
pub const IRIS_BIAS: f64 = -1.6689;

/// The five-row Iris background block.
pub fn iris_background() -> Matrix {
    Matrix::from_vec(
        vec![
            5.8, 2.8, 5.1, 2.4, //
            5.8, 2.7, 5.1, 1.9, //
            7.2, 3.6, 6.1, 2.5, //
            6.2, 2.8, 4.8, 1.8, //
            4.9, 3.1, 1.5, 0.1,
        ],
        5,
        4,
    )
}

/// The canonical Iris query point (equal to the first background row).
pub fn iris_query() -> Vec<f64> {
    vec![5.8, 2.8, 5.1, 2.4]
}

/// Binary logistic model: outputs `[1 - p, p]` with
/// `p = sigmoid(x . weights + bias)`. Columns sum to 1.
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    /// The Iris fixture model.
    pub fn iris() -> Self {
        Self::new(IRIS_WEIGHTS.to_vec(), IRIS_BIAS)
    }
}

impl Predictor for LogisticModel {
    fn predict(&self, batch: MatrixView<'_>) -> Result<Matrix, PredictorError> {
        if batch.n_cols() != self.weights.len() {
            return Err(format!(
                "model expects {} features, got {}",
                self.weights.len(),
                batch.n_cols()
            )
            .into());
        }
        let mut out = Vec::with_capacity(batch.n_rows() * 2);
        for i in 0..batch.n_rows() {
            let z: f64 = batch
                .row_slice(i)
                .iter()
                .zip(&self.weights)
                .map(|(x, w)| x * w)
                .sum::<f64>()
                + self.bias;
            let p = 1.0 / (1.0 + (-z).exp());
            out.push(1.0 - p);
            out.push(p);
        }
        Ok(Matrix::from_vec(out, batch.n_rows(), 2))
    }
}

/// Single-output linear model `f(x) = x . weights + bias`.
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }
}

impl Predictor for LinearModel {
    fn predict(&self, batch: MatrixView<'_>) -> Result<Matrix, PredictorError> {
        if batch.n_cols() != self.weights.len() {
            return Err(format!(
                "model expects {} features, got {}",
                self.weights.len(),
                batch.n_cols()
            )
            .into());
        }
        let out: Vec<f64> = (0..batch.n_rows())
            .map(|i| {
                batch
                    .row_slice(i)
                    .iter()
                    .zip(&self.weights)
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + self.bias
            })
            .collect();
        Ok(Matrix::from_vec(out, batch.n_rows(), 1))
    }
}

/// Append a constant column to a matrix.
///
/// Useful for dummy-feature tests: a feature that is constant across the
/// background and the query must receive zero attribution.
pub fn with_constant_column(matrix: &Matrix, value: f64) -> Matrix {
    let rows = matrix.n_rows();
    let cols = matrix.n_cols();
    let mut data = Vec::with_capacity(rows * (cols + 1));
    for i in 0..rows {
        data.extend_from_slice(matrix.row_slice(i));
        data.push(value);
    }
    Matrix::from_vec(data, rows, cols + 1)
}

/// Random dense matrix with entries uniform in `[min, max]`.
pub fn random_matrix(rows: usize, cols: usize, seed: u64, min: f64, max: f64) -> Matrix {
    assert!(max >= min);
    let mut rng = StdRng::seed_from_u64(seed);
    let width = max - min;
    let data: Vec<f64> = (0..rows * cols)
        .map(|_| min + rng.r#gen::<f64>() * width)
        .collect();
    Matrix::from_vec(data, rows, cols)
}

/// Random weight vector with entries uniform in `[-1, 1]`.
pub fn random_weights(cols: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..cols).map(|_| rng.r#gen::<f64>() * 2.0 - 1.0).collect()
}
