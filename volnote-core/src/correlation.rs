//! Constant-correlation matrix and its Cholesky factor.
//!
//! The radicand on the diagonal is clamped at zero. For a pathological
//! correlation (`rho <= -1/(n-1)`) the matrix is not positive definite: the
//! clamp turns the offending diagonal entry into 0 and the entries below it
//! become non-finite. That case is not validated.

/// `n x n` matrix with 1 on the diagonal and `rho` elsewhere.
pub fn constant_correlation(n: usize, rho: f64) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { rho }).collect())
        .collect()
}

/// Lower-triangular `L` with `L * L^T = A`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactor {
    n: usize,
    lower: Vec<f64>,
}

impl CholeskyFactor {
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.lower[i * self.n + j]
    }

    /// Row `i` up to and including the diagonal.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.lower[i * self.n..i * self.n + i + 1]
    }

    /// Write `L * z` into `out`.
    ///
    /// # Panics
    /// If `z` or `out` do not have length `dim()`.
    pub fn correlate(&self, z: &[f64], out: &mut [f64]) {
        assert_eq!(z.len(), self.n, "shock vector length mismatch");
        assert_eq!(out.len(), self.n, "output vector length mismatch");
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.row(i).iter().zip(z).map(|(l, z)| l * z).sum();
        }
    }
}

/// Cholesky–Banachiewicz factorization of a symmetric matrix.
pub fn cholesky(matrix: &[Vec<f64>]) -> CholeskyFactor {
    let n = matrix.len();
    let mut lower = vec![0.0; n * n];

    for i in 0..n {
        for j in 0..=i {
            let s: f64 = (0..j).map(|k| lower[i * n + k] * lower[j * n + k]).sum();
            lower[i * n + j] = if i == j {
                (matrix[i][i] - s).max(0.0).sqrt()
            } else {
                (matrix[i][j] - s) / lower[j * n + j]
            };
        }
    }

    CholeskyFactor { n, lower }
}
