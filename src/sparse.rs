//! Sparse matrix utilities.
//!
//! Helper functions for working with nalgebra-sparse matrices.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix, CsrMatrix};

/// Create a CSC matrix from triplets (row, col, value).
///
/// Duplicates are summed together and exact zeros are dropped, so the sparsity
/// pattern of the result only holds structural nonzeros.
pub fn csc_from_triplets(
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
) -> CscMatrix<f64> {
    if rows.is_empty() {
        return CscMatrix::zeros(nrows, ncols);
    }

    let mut coo = CooMatrix::new(nrows, ncols);
    for ((row, col), val) in rows.into_iter().zip(cols).zip(vals) {
        if row < nrows && col < ncols {
            coo.push(row, col, val);
        }
    }

    CscMatrix::from(&coo).filter(|_, _, v| *v != 0.0)
}

/// Collect the triplets of a CSC matrix.
pub fn csc_triplets(m: &CscMatrix<f64>) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
    let mut rows = Vec::with_capacity(m.nnz());
    let mut cols = Vec::with_capacity(m.nnz());
    let mut vals = Vec::with_capacity(m.nnz());
    for (r, c, v) in m.triplet_iter() {
        rows.push(r);
        cols.push(c);
        vals.push(*v);
    }
    (rows, cols, vals)
}

/// Add two CSC matrices with the same number of rows.
///
/// The result is as wide as the wider operand.
pub fn csc_add(a: &CscMatrix<f64>, b: &CscMatrix<f64>) -> CscMatrix<f64> {
    let (mut rows, mut cols, mut vals) = csc_triplets(a);
    let (b_rows, b_cols, b_vals) = csc_triplets(b);
    rows.extend(b_rows);
    cols.extend(b_cols);
    vals.extend(b_vals);

    csc_from_triplets(a.nrows(), a.ncols().max(b.ncols()), rows, cols, vals)
}

/// Scale a CSC matrix.
pub fn csc_scale(a: &CscMatrix<f64>, scalar: f64) -> CscMatrix<f64> {
    let (rows, cols, vals) = csc_triplets(a);
    let vals = vals.into_iter().map(|v| v * scalar).collect();
    csc_from_triplets(a.nrows(), a.ncols(), rows, cols, vals)
}

/// Repeat rows of a CSC matrix.
pub fn csc_repeat_rows(m: &CscMatrix<f64>, times: usize) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (r, c, v) in m.triplet_iter() {
        for t in 0..times {
            rows.push(t * m.nrows() + r);
            cols.push(c);
            vals.push(*v);
        }
    }

    csc_from_triplets(m.nrows() * times, m.ncols(), rows, cols, vals)
}

/// Pick rows of a CSC matrix, in the given order.
///
/// Row `k` of the result is row `selected[k]` of `m`; a row may be picked
/// more than once.
pub fn csc_select_rows(m: &CscMatrix<f64>, selected: &[usize]) -> CscMatrix<f64> {
    let mut targets: Vec<Vec<usize>> = vec![Vec::new(); m.nrows()];
    for (k, &row) in selected.iter().enumerate() {
        if row < m.nrows() {
            targets[row].push(k);
        }
    }

    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    for (r, c, v) in m.triplet_iter() {
        for &k in &targets[r] {
            rows.push(k);
            cols.push(c);
            vals.push(*v);
        }
    }

    csc_from_triplets(selected.len(), m.ncols(), rows, cols, vals)
}

/// Stack CSC blocks vertically into a matrix with `ncols` columns.
pub fn csc_vstack_all<'a>(
    blocks: impl IntoIterator<Item = &'a CscMatrix<f64>>,
    ncols: usize,
) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    let mut offset = 0;

    for block in blocks {
        for (r, c, v) in block.triplet_iter() {
            rows.push(offset + r);
            cols.push(c);
            vals.push(*v);
        }
        offset += block.nrows();
    }

    csc_from_triplets(offset, ncols, rows, cols, vals)
}

/// Left-multiply the rows of a CSC matrix by a dense matrix.
///
/// The rows of `sparse` are the row-major flattening of an `n x stride`
/// block; the result holds the flattening of `dense * block`, i.e. the
/// product with `dense ⊗ I_stride`.
pub fn dense_csc_matmul(
    dense: &DMatrix<f64>,
    sparse: &CscMatrix<f64>,
    stride: usize,
) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (k, c, v) in sparse.triplet_iter() {
        let (r, j) = (k / stride, k % stride);
        for p in 0..dense.nrows() {
            let a = dense[(p, r)];
            if a != 0.0 {
                rows.push(p * stride + j);
                cols.push(c);
                vals.push(a * v);
            }
        }
    }

    csc_from_triplets(dense.nrows() * stride, sparse.ncols(), rows, cols, vals)
}

/// Column indices referenced by row `row` of a CSR matrix, ascending.
pub fn csr_row_pattern(m: &CsrMatrix<f64>, row: usize) -> Vec<usize> {
    m.get_row(row)
        .map(|r| r.col_indices().to_vec())
        .unwrap_or_default()
}

/// Convert CSC to dense matrix.
pub fn csc_to_dense(sparse: &CscMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(sparse.nrows(), sparse.ncols());
    for (row, col, val) in sparse.triplet_iter() {
        dense[(row, col)] = *val;
    }
    dense
}
