//! The predictor seam.
//!
//! The explainer treats the model as an opaque batched callable: it hands
//! over an `m × d` matrix of rows and expects an `m × k` matrix of outputs
//! back. The predictor must be pure with respect to the input rows (no
//! dependence on row order or hidden state); evaluation is a single,
//! potentially long-running call and the core never retries it.

use crate::data::{Matrix, MatrixView};

/// Error type at the predictor boundary.
///
/// Collaborator failures are opaque to the core; they are wrapped into
/// [`ExplainError::Predictor`](crate::explain::ExplainError::Predictor)
/// and surfaced unchanged.
pub type PredictorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A batched black-box predictor `f: R^{m×d} -> R^{m×k}`.
pub trait Predictor {
    /// Evaluate the model on a batch of rows.
    ///
    /// Must return one output row per input row, with a fixed number of
    /// output columns `k >= 1` across calls.
    fn predict(&self, batch: MatrixView<'_>) -> Result<Matrix, PredictorError>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, batch: MatrixView<'_>) -> Result<Matrix, PredictorError> {
        (**self).predict(batch)
    }
}

/// Adapter turning a closure into a [`Predictor`].
///
/// # Example
///
/// ```
/// use kernelshap::data::Matrix;
/// use kernelshap::predict::{FnPredictor, Predictor};
///
/// // f(x) = sum of the row
/// let f = FnPredictor::new(|batch: kernelshap::data::MatrixView<'_>| {
///     let out: Vec<f64> = (0..batch.n_rows())
///         .map(|i| batch.row_slice(i).iter().sum())
///         .collect();
///     Ok(Matrix::from_vec(out, batch.n_rows(), 1))
/// });
/// let y = f.predict(Matrix::from_vec(vec![1.0, 2.0], 1, 2).view()).unwrap();
/// assert_eq!(y.row_slice(0), &[3.0]);
/// ```
pub struct FnPredictor<F>(F);

impl<F> FnPredictor<F>
where
    F: Fn(MatrixView<'_>) -> Result<Matrix, PredictorError>,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(MatrixView<'_>) -> Result<Matrix, PredictorError>,
{
    fn predict(&self, batch: MatrixView<'_>) -> Result<Matrix, PredictorError> {
        (self.0)(batch)
    }
}
