//! Square integer matrices and row-block parallel multiplication.
//!
//! Matrices are stored in row-major order. The parallel product splits the
//! output buffer into one block of whole rows per worker, so every unit
//! writes only memory it owns.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::exec::{for_each_block_mut, Plan};
use crate::partition::Range;

/// `dim x dim` matrix of i64, row-major.
///
/// Deserialization goes through [`Matrix::from_vec`], so a payload whose
/// data does not hold `dim * dim` cells is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    dim: usize,
    data: Vec<i64>,
}

#[derive(Deserialize)]
struct RawMatrix {
    dim: usize,
    data: Vec<i64>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = Error;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        Matrix::from_vec(raw.dim, raw.data)
    }
}

impl Matrix {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0; dim * dim],
        }
    }

    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            m.data[i * dim + i] = 1;
        }
        m
    }

    /// Build from row-major data; `data.len()` must be `dim * dim`.
    pub fn from_vec(dim: usize, data: Vec<i64>) -> Result<Self> {
        if dim.checked_mul(dim) != Some(data.len()) {
            return Err(Error::invalid(format!(
                "{} elements cannot form a {}x{} matrix",
                data.len(),
                dim,
                dim
            )));
        }
        Ok(Self { dim, data })
    }

    /// Build from nested rows; every row must be as long as there are rows.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let dim = rows.len();
        let mut data = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(Error::invalid(format!(
                    "matrix is not square: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            data.extend(row);
        }
        Ok(Self { dim, data })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.dim + col]
    }

    pub fn row(&self, row: usize) -> &[i64] {
        &self.data[row * self.dim..(row + 1) * self.dim]
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Sum of all cells, wrapping. Handy for printing a one-number summary.
    pub fn checksum(&self) -> i64 {
        self.data.iter().fold(0i64, |acc, &x| acc.wrapping_add(x))
    }
}

pub(crate) fn check_dims(a: &Matrix, b: &Matrix) -> Result<()> {
    if a.dim != b.dim {
        return Err(Error::invalid(format!(
            "matrix dimensions differ: {}x{} vs {}x{}",
            a.dim, a.dim, b.dim, b.dim
        )));
    }
    Ok(())
}

/// Compute rows `rows` of `a * b` into `out`, which holds exactly those rows.
pub fn matmul_row_block(a: &Matrix, b: &Matrix, rows: Range, out: &mut [i64]) {
    let n = a.dim;
    for (i, out_row) in rows.indices().zip(out.chunks_mut(n.max(1))) {
        for j in 0..n {
            let mut sum = 0i64;
            for k in 0..n {
                sum = sum.wrapping_add(a.data[i * n + k].wrapping_mul(b.data[k * n + j]));
            }
            out_row[j] = sum;
        }
    }
}

/// Classic triple-loop product.
pub fn sequential(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    check_dims(a, b)?;
    let n = a.dim;
    let mut c = Matrix::zeros(n);
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0i64;
            for k in 0..n {
                sum = sum.wrapping_add(a.data[i * n + k].wrapping_mul(b.data[k * n + j]));
            }
            c.data[i * n + j] = sum;
        }
    }
    Ok(c)
}

/// Row-block parallel product with the default plan.
pub fn parallel(a: &Matrix, b: &Matrix, workers: usize) -> Result<Matrix> {
    parallel_with(a, b, &Plan::new(workers))
}

/// Row-block parallel product: worker `w` computes the output rows of its
/// range and nothing else.
pub fn parallel_with(a: &Matrix, b: &Matrix, plan: &Plan) -> Result<Matrix> {
    check_dims(a, b)?;
    let n = a.dim;
    let ranges = plan.ranges(n)?;
    log::debug!("matmul: {}x{} over {} row ranges", n, n, ranges.len());

    let mut c = Matrix::zeros(n);
    for_each_block_mut(plan.executor, &mut c.data, n, &ranges, |rows, block| {
        matmul_row_block(a, b, rows, block)
    })?;
    Ok(c)
}

/// Cell-by-cell equality, stopping at the first difference.
pub fn matrices_equal(a: &Matrix, b: &Matrix) -> bool {
    if a.dim != b.dim {
        return false;
    }
    for i in 0..a.dim {
        for j in 0..a.dim {
            if a.get(i, j) != b.get(i, j) {
                return false;
            }
        }
    }
    true
}
