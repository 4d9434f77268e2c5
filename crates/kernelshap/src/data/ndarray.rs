//! ndarray interop.
//!
//! Conversions between the crate's row-major [`Matrix`] / [`MatrixView`]
//! and `ndarray` 2D arrays. This is a boundary module only: the core never
//! computes on ndarray types.

use ndarray::{Array2, ArrayView2};

use super::{Matrix, MatrixView};

impl Matrix {
    /// Copy a 2D array into an owned matrix.
    ///
    /// Works for any memory layout; elements are read in logical
    /// row-major order.
    pub fn from_array2(array: &Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        Matrix::from_vec(array.iter().copied().collect(), rows, cols)
    }

    /// Export to an owned `Array2` of shape `[n_rows, n_cols]`.
    pub fn to_array2(&self) -> Array2<f64> {
        Array2::from_shape_vec((self.n_rows(), self.n_cols()), self.as_slice().to_vec())
            .expect("row-major storage matches shape")
    }
}

impl<'a> MatrixView<'a> {
    /// Zero-copy view of a standard-layout (C-order) 2D array view.
    ///
    /// Returns `None` if the view is not contiguous in standard layout;
    /// callers can fall back to [`Matrix::from_array2`] in that case.
    pub fn from_array_view2(array: ArrayView2<'a, f64>) -> Option<Self> {
        let (rows, cols) = array.dim();
        let slice = array.to_slice()?;
        Some(MatrixView::from_slice(slice, rows, cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn array2_roundtrip() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let m = Matrix::from_array2(&a);
        assert_eq!(m.row_slice(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.to_array2(), a);
    }

    #[test]
    fn view_of_standard_layout() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let v = MatrixView::from_array_view2(a.view()).unwrap();
        assert_eq!(v.row_slice(0), &[1.0, 2.0]);
    }

    #[test]
    fn view_of_transposed_is_none() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let t = a.t();
        assert!(MatrixView::from_array_view2(t).is_none());
    }

    #[test]
    fn from_array2_handles_any_layout() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let t = a.t().to_owned().reversed_axes();
        let m = Matrix::from_array2(&t);
        assert_eq!(m.row_slice(0), &[1.0, 2.0]);
    }
}
