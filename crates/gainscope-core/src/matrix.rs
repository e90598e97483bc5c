use crate::error::{GainError, GainResult};

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense 2-D matrix of `f64`, shared by every gainscope crate.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major (C-order) layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

/// Serialized form, checked by `Matrix::new` on the way in.
#[derive(Deserialize)]
struct RawMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = GainError;

    fn try_from(raw: RawMatrix) -> GainResult<Self> {
        Matrix::new(raw.data, raw.rows, raw.cols)
    }
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> GainResult<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(GainError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::full(rows, cols, 0.0)
    }

    /// Create a matrix filled with a constant value.
    pub fn full(rows: usize, cols: usize, value: f64) -> Self {
        Matrix {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from a slice of equally long rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> GainResult<Self> {
        if rows.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let cols = rows[0].len();
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(GainError::DimensionMismatch(format!(
                "all rows must have {} columns, found a row with {}",
                cols,
                bad.len()
            )));
        }
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(flat, rows.len(), cols)
    }

    /// Single-column matrix from a slice.
    pub fn column(values: &[f64]) -> Self {
        Matrix {
            data: values.to_vec(),
            rows: values.len(),
            cols: 1,
        }
    }

    /// Uniform random matrix in `[low, high)` drawn from the given generator.
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Self {
        let data = (0..rows * cols).map(|_| rng.gen_range(low..high)).collect();
        Matrix { data, rows, cols }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    fn check_index(&self, i: usize, j: usize) -> GainResult<()> {
        if i >= self.rows {
            return Err(GainError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.rows,
            });
        }
        if j >= self.cols {
            return Err(GainError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok(())
    }

    pub fn get(&self, i: usize, j: usize) -> GainResult<f64> {
        self.check_index(i, j)?;
        Ok(self.data[i * self.cols + j])
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> GainResult<()> {
        self.check_index(i, j)?;
        self.data[i * self.cols + j] = value;
        Ok(())
    }

    /// Borrow one row.
    pub fn row(&self, i: usize) -> GainResult<&[f64]> {
        if i >= self.rows {
            return Err(GainError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.rows,
            });
        }
        let start = i * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// Copy one column out.
    pub fn col(&self, j: usize) -> GainResult<Vec<f64>> {
        if j >= self.cols {
            return Err(GainError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    /// Iterate over rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Gather the given rows, in order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> GainResult<Matrix> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i)?);
        }
        Matrix::new(data, indices.len(), self.cols)
    }

    // ─── Shape Manipulation ─────────────────────────────────────────────────

    /// Transpose.
    pub fn t(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    // ─── Element-wise ───────────────────────────────────────────────────────

    /// Apply a function to every element.
    pub fn apply<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn scale(&self, s: f64) -> Matrix {
        self.apply(|x| x * s)
    }

    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Matrix, f: F) -> GainResult<Matrix> {
        if self.shape() != other.shape() {
            return Err(GainError::ShapeMismatch {
                expected: vec![self.rows, self.cols],
                got: vec![other.rows, other.cols],
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }

    pub fn add(&self, other: &Matrix) -> GainResult<Matrix> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> GainResult<Matrix> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Hadamard product.
    pub fn mul(&self, other: &Matrix) -> GainResult<Matrix> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Add a `[1, cols]` row vector to every row.
    pub fn add_row_vector(&self, row: &Matrix) -> GainResult<Matrix> {
        if row.rows != 1 || row.cols != self.cols {
            return Err(GainError::ShapeMismatch {
                expected: vec![1, self.cols],
                got: vec![row.rows, row.cols],
            });
        }
        let mut out = self.clone();
        for chunk in out.data.chunks_exact_mut(self.cols.max(1)) {
            for (v, &b) in chunk.iter_mut().zip(row.data.iter()) {
                *v += b;
            }
        }
        Ok(out)
    }

    // ─── Reductions ─────────────────────────────────────────────────────────

    pub fn sum_all(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Column sums as a `[1, cols]` matrix.
    pub fn sum_rows(&self) -> Matrix {
        let mut data = vec![0.0; self.cols];
        for row in self.iter_rows() {
            for (acc, &v) in data.iter_mut().zip(row) {
                *acc += v;
            }
        }
        Matrix {
            data,
            rows: 1,
            cols: self.cols,
        }
    }

    /// Per-column mean.
    pub fn mean_axis0(&self) -> GainResult<Vec<f64>> {
        if self.rows == 0 {
            return Err(GainError::EmptyInput("mean over zero rows"));
        }
        let n = self.rows as f64;
        Ok(self.sum_rows().data.into_iter().map(|s| s / n).collect())
    }

    /// Per-column population standard deviation.
    pub fn std_axis0(&self) -> GainResult<Vec<f64>> {
        let mean = self.mean_axis0()?;
        let mut var = vec![0.0; self.cols];
        for row in self.iter_rows() {
            for ((acc, &v), &m) in var.iter_mut().zip(row).zip(mean.iter()) {
                *acc += (v - m) * (v - m);
            }
        }
        let n = self.rows as f64;
        Ok(var.into_iter().map(|v| (v / n).sqrt()).collect())
    }

    /// Index of the largest entry of each row. Ties resolve to the first index.
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.iter_rows()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold(0usize, |best, (i, &v)| if v > row[best] { i } else { best })
            })
            .collect()
    }

    // ─── Linear Algebra ─────────────────────────────────────────────────────

    /// Matrix product; rows of the output are computed in parallel.
    pub fn matmul(&self, other: &Matrix) -> GainResult<Matrix> {
        if self.cols != other.rows {
            return Err(GainError::DimensionMismatch(format!(
                "matmul: inner dimensions must match, got {} and {}",
                self.cols, other.rows
            )));
        }
        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut data = vec![0.0; m * n];
        if n > 0 {
            data.par_chunks_mut(n).enumerate().for_each(|(i, out_row)| {
                let a_row = &self.data[i * k..(i + 1) * k];
                for (p, &a) in a_row.iter().enumerate() {
                    let b_row = &other.data[p * n..(p + 1) * n];
                    for (o, &b) in out_row.iter_mut().zip(b_row) {
                        *o += a * b;
                    }
                }
            });
        }
        Matrix::new(data, m, n)
    }

    // ─── Softmax ────────────────────────────────────────────────────────────

    /// Row-wise softmax.
    pub fn softmax_rows(&self) -> Matrix {
        let mut out = self.clone();
        for row in out.data.chunks_exact_mut(self.cols.max(1)) {
            // Numerical stability: subtract max
            let max_val = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mut sum = 0.0;
            for v in row.iter_mut() {
                *v = (*v - max_val).exp();
                sum += *v;
            }
            for v in row.iter_mut() {
                *v /= sum;
            }
        }
        out
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix [{} x {}]", self.rows, self.cols)?;
        for row in self.iter_rows() {
            let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
            writeln!(f, "  [{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_checks_length() {
        assert!(Matrix::new(vec![1.0, 2.0, 3.0], 2, 2).is_err());
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 3.0);
    }

    #[test]
    fn test_deserialized_shape_is_checked() {
        let bad = RawMatrix {
            data: vec![1.0],
            rows: 2,
            cols: 2,
        };
        assert!(matches!(
            Matrix::try_from(bad),
            Err(GainError::ShapeMismatch { .. })
        ));
        let overflow = RawMatrix {
            data: vec![],
            rows: usize::MAX,
            cols: 2,
        };
        assert!(Matrix::try_from(overflow).is_err());
        let ok = RawMatrix {
            data: vec![1.0, 2.0],
            rows: 1,
            cols: 2,
        };
        assert_eq!(Matrix::try_from(ok).unwrap().shape(), (1, 2));
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2).unwrap(), 6.0);
        assert!(Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_matmul() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        let b = Matrix::new(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], 3, 2).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), (2, 2));
        // [1*7+2*9+3*11, 1*8+2*10+3*12] = [58, 64]
        // [4*7+5*9+6*11, 4*8+5*10+6*12] = [139, 154]
        assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
        assert!(a.matmul(&a).is_err());
    }

    #[test]
    fn test_transpose() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        let t = a.t();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(1, 0).unwrap(), 2.0);
        assert_eq!(t.get(2, 1).unwrap(), 6.0);
    }

    #[test]
    fn test_add_row_vector() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        let b = Matrix::new(vec![10.0, 20.0, 30.0], 1, 3).unwrap();
        let c = a.add_row_vector(&b).unwrap();
        assert_eq!(c.data(), &[11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
    }

    #[test]
    fn test_axis_stats() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 2.0], vec![5.0, 2.0]]).unwrap();
        assert_eq!(a.sum_rows().data(), &[9.0, 6.0]);
        let mean = a.mean_axis0().unwrap();
        assert_abs_diff_eq!(mean[0], 3.0, epsilon = 1e-12);
        let std = a.std_axis0().unwrap();
        assert_abs_diff_eq!(std[0], (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(std[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_softmax_and_argmax() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![5.0, 1.0, 5.0]]).unwrap();
        let sm = a.softmax_rows();
        for row in sm.iter_rows() {
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
        assert_eq!(a.argmax_rows(), vec![2, 0]);
    }

    #[test]
    fn test_select_rows() {
        let a = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let s = a.select_rows(&[2, 0]).unwrap();
        assert_eq!(s.data(), &[3.0, 1.0]);
        assert!(a.select_rows(&[3]).is_err());
    }

    #[test]
    fn test_random_uniform_is_seeded() {
        let mut r1 = StdRng::seed_from_u64(7);
        let mut r2 = StdRng::seed_from_u64(7);
        let a = Matrix::random_uniform(4, 3, -1.0, 1.0, &mut r1);
        let b = Matrix::random_uniform(4, 3, -1.0, 1.0, &mut r2);
        assert_eq!(a, b);
        assert!(a.data().iter().all(|&v| (-1.0..1.0).contains(&v)));
    }
}
