use rand::Rng;
use std::f64::consts::PI;
use std::ops::AddAssign;

use crate::error::{check_len, NnError, Result};

/// Dense row-major matrix. Layer weights are stored as (outputs × inputs).
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    ///
    /// Shape: (rows, cols). `cols` is the fan-in (number of input connections).
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / cols as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// Recommended before Sigmoid/Tanh/Identity layers. Keeps the variance of
    /// activations and gradients roughly equal across layers.
    ///
    /// Shape: (rows, cols). `cols` is the fan-in (number of input connections).
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / cols as f64).sqrt(), rng)
    }

    /// Builds a matrix from row vectors. Rows must be non-empty and equally long.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = match data.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(NnError::Configuration("matrix must have at least one row and one column".into())),
        };
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(NnError::DimensionMismatch {
                context: "matrix row",
                expected: cols,
                got: bad.len(),
            });
        }
        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// `self · v`. Caller guarantees `v.len() == cols`.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.cols);
        self.data.iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect()
    }

    /// `selfᵗ · v` without materializing the transpose. Caller guarantees `v.len() == rows`.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.rows);
        let mut res = vec![0.0; self.cols];
        for (row, &d) in self.data.iter().zip(v) {
            for (acc, w) in res.iter_mut().zip(row) {
                *acc += w * d;
            }
        }
        res
    }

    /// Accumulates the outer product `a · bᵗ` into `self`.
    pub fn add_outer(&mut self, a: &[f64], b: &[f64]) {
        debug_assert_eq!(a.len(), self.rows);
        debug_assert_eq!(b.len(), self.cols);
        for (row, &ai) in self.data.iter_mut().zip(a) {
            for (x, &bj) in row.iter_mut().zip(b) {
                *x += ai * bj;
            }
        }
    }

    /// `self -= scale * other`, in place.
    pub fn scaled_sub_assign(&mut self, other: &Matrix, scale: f64) {
        if self.rows != other.rows || self.cols != other.cols {
            panic!("Matrices are of incorrect sizes")
        }
        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            for (x, o) in row.iter_mut().zip(other_row) {
                *x -= scale * o;
            }
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Checks that `data` really holds `rows` rows of `cols` values each.
    pub fn check_shape(&self) -> Result<()> {
        check_len("matrix row count", self.rows, self.data.len())?;
        for row in &self.data {
            check_len("matrix row", self.cols, row.len())?;
        }
        Ok(())
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        for (row, rhs_row) in self.data.iter_mut().zip(&rhs.data) {
            for (x, r) in row.iter_mut().zip(rhs_row) {
                *x += r;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn mul_vec_and_transpose_mul_vec() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.mul_vec(&[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
        assert_eq!(m.transpose_mul_vec(&[1.0, 1.0]), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn add_outer_accumulates() {
        let mut m = Matrix::zeros(2, 2);
        m.add_outer(&[1.0, 2.0], &[3.0, 4.0]);
        m.add_outer(&[1.0, 0.0], &[1.0, 1.0]);
        assert_eq!(m.data, vec![vec![4.0, 5.0], vec![6.0, 8.0]]);
    }

    #[test]
    fn scaled_sub_and_add_assign() {
        let mut m = Matrix::from_data(vec![vec![1.0, 1.0]]).unwrap();
        let g = Matrix::from_data(vec![vec![2.0, 4.0]]).unwrap();
        m.scaled_sub_assign(&g, 0.5);
        assert_eq!(m.data, vec![vec![0.0, -1.0]]);
        m += &g;
        assert_eq!(m.data, vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn from_data_rejects_ragged_rows() {
        assert!(Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Matrix::from_data(vec![]).is_err());
    }

    #[test]
    fn check_shape_catches_stale_dimensions() {
        assert!(Matrix::zeros(2, 3).check_shape().is_ok());
        let narrow = Matrix { rows: 2, cols: 3, data: vec![vec![1.0], vec![1.0]] };
        assert!(matches!(
            narrow.check_shape(),
            Err(NnError::DimensionMismatch { expected: 3, got: 1, .. })
        ));
        let short = Matrix { rows: 3, cols: 1, data: vec![vec![1.0]] };
        assert!(matches!(
            short.check_shape(),
            Err(NnError::DimensionMismatch { expected: 3, got: 1, .. })
        ));
    }

    #[test]
    fn seeded_init_is_reproducible() {
        let a = Matrix::xavier(4, 3, &mut StdRng::seed_from_u64(7));
        let b = Matrix::xavier(4, 3, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.shape(), (4, 3));
    }
}
