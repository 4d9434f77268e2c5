//! Synthetic sample construction (the masking step).
//!
//! For each coalition mask the builder materializes `n` rows, one per
//! background row: present features take the query value, absent features
//! keep the background value. The matrix starts as the background tiled
//! once per mask slot, so an untouched slot is exactly the background
//! block. Averaging the predictor output over each block realizes the
//! marginal expectation `E[f(x_S, X_bg)]`.

use crate::data::Matrix;
use crate::predict::Predictor;

use super::ExplainError;

/// The dense `capacity * n × d` sample matrix and per-slot kernel weights.
///
/// Allocated once per explanation and released with it, success or
/// failure.
#[derive(Debug, Clone)]
pub struct SyntheticSamples {
    data: Matrix,
    kernel_weights: Vec<f64>,
    n_background: usize,
    n_features: usize,
    capacity: usize,
    n_added: usize,
}

impl SyntheticSamples {
    /// Tile `background` once per mask slot.
    pub fn new(background: &Matrix, capacity: usize) -> Self {
        let n = background.n_rows();
        let d = background.n_cols();
        let mut data = Vec::with_capacity(capacity * n * d);
        for _ in 0..capacity {
            data.extend_from_slice(background.as_slice());
        }
        Self {
            data: Matrix::from_vec(data, capacity * n, d),
            kernel_weights: Vec::with_capacity(capacity),
            n_background: n,
            n_features: d,
            capacity,
            n_added: 0,
        }
    }

    /// Number of masks added so far.
    #[inline]
    pub fn n_added(&self) -> usize {
        self.n_added
    }

    /// Number of mask slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The full sample matrix (all slots, touched or not).
    #[inline]
    pub fn data(&self) -> &Matrix {
        &self.data
    }

    /// Kernel weights of the added masks, in insertion order.
    #[inline]
    pub fn kernel_weights(&self) -> &[f64] {
        &self.kernel_weights
    }

    /// Write mask `z` into the next free slot: for every feature with
    /// `z_j = 1`, the slot's rows take `x_j`; other columns keep the
    /// background values.
    ///
    /// # Panics
    ///
    /// Panics if the builder is full or the mask/query lengths are wrong.
    pub fn add_sample(&mut self, x: &[f64], mask: &[u8], weight: f64) {
        assert!(
            self.n_added < self.capacity,
            "sample builder is full ({} slots)",
            self.capacity
        );
        assert_eq!(x.len(), self.n_features, "query length mismatch");
        assert_eq!(mask.len(), self.n_features, "mask length mismatch");

        let start = self.n_added * self.n_background;
        for i in 0..self.n_background {
            let row = self.data.row_slice_mut(start + i);
            for (j, &present) in mask.iter().enumerate() {
                if present == 1 {
                    row[j] = x[j];
                }
            }
        }
        self.kernel_weights.push(weight);
        self.n_added += 1;
    }

    /// Run the predictor over all filled slots and average each slot's
    /// `n`-row block, producing the `n_added × k` regression targets.
    ///
    /// The predictor is offered whole blocks in contiguous chunks of at
    /// most `max_cells` matrix cells (at least one block per call), so a
    /// tight cell budget bounds peak collaborator input without changing
    /// the per-block accumulation order.
    pub fn mean_predictions<P: Predictor>(
        &self,
        predictor: &P,
        n_outputs: usize,
        max_cells: usize,
    ) -> Result<Matrix, ExplainError> {
        let n = self.n_background;
        let d = self.n_features;
        let blocks = self.n_added;
        let blocks_per_chunk = (max_cells / (n * d)).max(1);

        let mut means = Vec::with_capacity(blocks * n_outputs);
        let mut block = 0;
        while block < blocks {
            let count = blocks_per_chunk.min(blocks - block);
            let batch = self.data.rows_view(block * n, count * n);
            let pred = predictor
                .predict(batch)
                .map_err(ExplainError::Predictor)?;
            if pred.n_rows() != count * n || pred.n_cols() != n_outputs {
                return Err(ExplainError::PredictorShape {
                    expected_rows: count * n,
                    expected_cols: n_outputs,
                    got_rows: pred.n_rows(),
                    got_cols: pred.n_cols(),
                });
            }

            for b in 0..count {
                for c in 0..n_outputs {
                    let mut acc = 0.0;
                    for i in 0..n {
                        let v = pred.row_slice(b * n + i)[c];
                        if !v.is_finite() {
                            return Err(ExplainError::NonFinitePrediction {
                                row: (block + b) * n + i,
                            });
                        }
                        acc += v;
                    }
                    means.push(acc / n as f64);
                }
            }
            block += count;
        }

        Ok(Matrix::from_vec(means, blocks, n_outputs))
    }
}
