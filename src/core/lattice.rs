//! Lattice representation and basis diagnostics

use crate::core::matrix::Matrix;
use crate::core::error::{LatticeError, Result};

/// A lattice given by an immutable integer basis matrix `B`
///
/// Basis vectors are the columns of `B`, so a coefficient vector `x` has one
/// entry per column and its lattice point is `B·x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    basis: Matrix,
}

impl Lattice {
    /// Create a new lattice from a basis matrix
    pub fn new(basis: Matrix) -> Result<Self> {
        if basis.rows() == 0 || basis.cols() == 0 {
            return Err(LatticeError::invalid_parameters("Basis matrix cannot be empty"));
        }
        Ok(Lattice { basis })
    }

    /// Create a lattice from a 2D vector representation (rows of `B`)
    pub fn from_matrix(data: Vec<Vec<i64>>) -> Result<Self> {
        let matrix = Matrix::new(data)?;
        Lattice::new(matrix)
    }

    /// Get the dimension of the basis matrix (rows, cols)
    pub fn dimension(&self) -> (usize, usize) {
        self.basis.dimension()
    }

    /// Number of basis vectors (columns of `B`)
    pub fn rank(&self) -> usize {
        self.basis.cols()
    }

    /// Length of image vectors (rows of `B`)
    pub fn ambient_dimension(&self) -> usize {
        self.basis.rows()
    }

    /// Get a reference to the basis matrix
    pub fn basis(&self) -> &Matrix {
        &self.basis
    }

    /// Image vector `B·x` of a coefficient vector
    pub fn image(&self, coefficients: &[i64]) -> Result<Vec<i64>> {
        self.basis.mul_vec(coefficients)
    }

    /// Euclidean norms of the basis vectors
    pub fn column_norms(&self) -> Result<Vec<f64>> {
        (0..self.rank())
            .map(|j| {
                let col = self.basis.get_col(j)?;
                Ok(col.iter().map(|&v| (v as f64).powi(2)).sum::<f64>().sqrt())
            })
            .collect()
    }

    /// Successive Gram-Schmidt subtraction over the columns of `B`.
    ///
    /// The projection of `v` onto `u` is taken as `u * (u·v)`, without dividing
    /// by `u·u`. Results are returned row-major with the same shape as `B`, the
    /// orthogonalized vectors sitting in the columns. Diagnostic only; the
    /// sieve never depends on it.
    pub fn orthogonalize(&self) -> Result<Vec<Vec<f64>>> {
        let (rows, cols) = self.dimension();
        let mut us: Vec<Vec<f64>> = Vec::with_capacity(cols);

        for i in 0..cols {
            let v: Vec<f64> = self.basis.get_col(i)?.into_iter().map(|x| x as f64).collect();
            let mut u = v.clone();
            for prev in &us {
                let coeff = dot_f64(prev, &v);
                for k in 0..rows {
                    u[k] -= prev[k] * coeff;
                }
            }
            us.push(u);
        }

        let mut out = vec![vec![0.0f64; cols]; rows];
        for (j, u) in us.iter().enumerate() {
            for (k, row) in out.iter_mut().enumerate() {
                row[j] = u[k];
            }
        }
        Ok(out)
    }

    /// Absolute determinant of a square basis (the lattice volume)
    pub fn determinant(&self) -> Result<f64> {
        if self.rank() != self.ambient_dimension() {
            return Err(LatticeError::invalid_parameters(
                "Determinant only defined for square bases"
            ));
        }
        Ok(self.basis.determinant()?.abs())
    }

    /// Minkowski upper bound `sqrt(n) * det^(1/n)` on the shortest vector length
    pub fn minkowski_bound(&self) -> Result<f64> {
        let n = self.rank() as f64;
        let det = self.determinant()?;
        Ok(n.sqrt() * det.powf(1.0 / n))
    }
}

impl std::fmt::Display for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.basis)
    }
}

fn dot_f64(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}
