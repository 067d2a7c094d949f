//! Sparse matrix utilities.
//!
//! Helper functions for working with nalgebra-sparse matrices.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Create a CSC matrix from triplets (row, col, value).
///
/// Duplicates are summed together; out-of-range entries are dropped.
pub fn csc_from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: impl IntoIterator<Item = (usize, usize, f64)>,
) -> CscMatrix<f64> {
    let mut coo = CooMatrix::new(nrows, ncols);
    for (row, col, val) in triplets {
        if row < nrows && col < ncols {
            coo.push(row, col, val);
        }
    }
    CscMatrix::from(&coo)
}

/// Convert a dense matrix to CSC format.
pub fn dense_to_csc(dense: &DMatrix<f64>) -> CscMatrix<f64> {
    let triplets = (0..dense.ncols()).flat_map(|j| {
        (0..dense.nrows()).filter_map(move |i| {
            let v = dense[(i, j)];
            (v.abs() > 1e-15).then_some((i, j, v))
        })
    });
    csc_from_triplets(dense.nrows(), dense.ncols(), triplets)
}

/// Convert CSC to dense matrix.
pub fn csc_to_dense(sparse: &CscMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(sparse.nrows(), sparse.ncols());
    for (row, col, val) in sparse.triplet_iter() {
        dense[(row, col)] = *val;
    }
    dense
}

/// Add two CSC matrices of the same shape.
pub fn csc_add(a: &CscMatrix<f64>, b: &CscMatrix<f64>) -> CscMatrix<f64> {
    let triplets = a
        .triplet_iter()
        .chain(b.triplet_iter())
        .map(|(r, c, v)| (r, c, *v));
    csc_from_triplets(a.nrows(), a.ncols(), triplets)
}

/// Scale a CSC matrix.
pub fn csc_scale(a: &CscMatrix<f64>, scalar: f64) -> CscMatrix<f64> {
    let mut scaled = a.clone();
    for v in scaled.values_mut() {
        *v *= scalar;
    }
    scaled
}

/// Negate a CSC matrix.
pub fn csc_neg(a: &CscMatrix<f64>) -> CscMatrix<f64> {
    csc_scale(a, -1.0)
}

/// Stack `times` copies of `m` on top of each other.
pub fn csc_repeat_rows(m: &CscMatrix<f64>, times: usize) -> CscMatrix<f64> {
    let rows = m.nrows();
    let triplets = m
        .triplet_iter()
        .flat_map(|(r, c, v)| (0..times).map(move |t| (t * rows + r, c, *v)));
    csc_from_triplets(rows * times, m.ncols(), triplets)
}

/// Row `row` of `m` as a `1 x ncols` matrix.
pub fn csc_select_row(m: &CscMatrix<f64>, row: usize) -> CscMatrix<f64> {
    let triplets = m
        .triplet_iter()
        .filter(|(r, _, _)| *r == row)
        .map(|(_, c, v)| (0, c, *v));
    csc_from_triplets(1, m.ncols(), triplets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csc_from_triplets_sums_duplicates() {
        let m = csc_from_triplets(2, 2, [(0, 0, 1.0), (0, 0, 2.0), (1, 1, 4.0)]);
        let d = csc_to_dense(&m);
        assert_eq!(d[(0, 0)], 3.0);
        assert_eq!(d[(1, 1)], 4.0);
    }

    #[test]
    fn test_dense_roundtrip() {
        let dense = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        let sparse = dense_to_csc(&dense);
        assert_eq!(sparse.nnz(), 3);
        assert_eq!(csc_to_dense(&sparse), dense);
    }

    #[test]
    fn test_add_and_neg() {
        let i = CscMatrix::<f64>::identity(2);
        let sum = csc_add(&i, &csc_neg(&i));
        assert_eq!(csc_to_dense(&sum), DMatrix::zeros(2, 2));
    }

    #[test]
    fn test_repeat_rows() {
        let one = CscMatrix::<f64>::identity(1);
        let m = csc_repeat_rows(&one, 3);
        assert_eq!(csc_to_dense(&m), DMatrix::from_element(3, 1, 1.0));
    }

    #[test]
    fn test_select_row() {
        let i = CscMatrix::<f64>::identity(3);
        let row = csc_select_row(&i, 1);
        assert_eq!(csc_to_dense(&row), DMatrix::from_row_slice(1, 3, &[0.0, 1.0, 0.0]));
    }
}
