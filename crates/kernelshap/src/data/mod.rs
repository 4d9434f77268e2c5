//! Data handling: the dense matrix the core computes on, plus ndarray
//! interop at the API boundary.

mod matrix;
mod ndarray;

pub use matrix::{DenseMatrix, Matrix, MatrixView};
