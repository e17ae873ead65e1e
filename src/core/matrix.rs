//! Integer matrix storage and the products the sieve needs

use crate::core::error::{LatticeError, Result};

/// Matrix represented as a vector of vectors (row-major)
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<Vec<i64>>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a new matrix from 2D vector
    pub fn new(data: Vec<Vec<i64>>) -> Result<Self> {
        if data.is_empty() {
            return Err(LatticeError::invalid_parameters("Matrix cannot be empty"));
        }

        let rows = data.len();
        let cols = data[0].len();
        if cols == 0 {
            return Err(LatticeError::invalid_parameters("Matrix rows cannot be empty"));
        }

        // Verify all rows have the same length
        for (i, row) in data.iter().enumerate() {
            if row.len() != cols {
                return Err(LatticeError::invalid_dimensions(
                    (rows, cols),
                    (i + 1, row.len())
                ));
            }
        }

        Ok(Matrix { data, rows, cols })
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(LatticeError::invalid_parameters("Dimension cannot be zero"));
        }

        let mut data = vec![vec![0i64; n]; n];
        for (i, row) in data.iter_mut().enumerate() {
            row[i] = 1;
        }

        Ok(Matrix { data, rows: n, cols: n })
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the dimension of the matrix
    pub fn dimension(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get a column as a vector
    pub fn get_col(&self, col: usize) -> Result<Vec<i64>> {
        if col >= self.cols {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, self.cols),
                (self.rows, col + 1)
            ));
        }

        Ok(self.data.iter().map(|row| row[col]).collect())
    }

    /// Return a copy with column `col` replaced
    pub fn with_col(&self, col: usize, values: &[i64]) -> Result<Self> {
        if col >= self.cols {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, self.cols),
                (self.rows, col + 1)
            ));
        }
        if values.len() != self.rows {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, 1),
                (values.len(), 1)
            ));
        }

        let mut data = self.data.clone();
        for (row, &value) in data.iter_mut().zip(values) {
            row[col] = value;
        }
        Ok(Matrix { data, rows: self.rows, cols: self.cols })
    }

    /// Matrix-vector product `self · x`
    ///
    /// Each entry is accumulated in `i128`; a result outside `i64` is an error.
    pub fn mul_vec(&self, x: &[i64]) -> Result<Vec<i64>> {
        if x.len() != self.cols {
            return Err(LatticeError::invalid_dimensions(
                (self.cols, 1),
                (x.len(), 1)
            ));
        }

        self.data
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut acc = 0i128;
                for (&b, &c) in row.iter().zip(x) {
                    acc = acc
                        .checked_add(b as i128 * c as i128)
                        .ok_or_else(|| overflow(i))?;
                }
                i64::try_from(acc).map_err(|_| overflow(i))
            })
            .collect()
    }

    /// Determinant by partial-pivot elimination in `f64`
    ///
    /// Diagnostic only; entries of real bases overflow `i64` cofactor expansion.
    pub fn determinant(&self) -> Result<f64> {
        if self.rows != self.cols {
            return Err(LatticeError::invalid_parameters(
                "Determinant only defined for square matrices",
            ));
        }

        let n = self.rows;
        let mut a: Vec<Vec<f64>> = self
            .data
            .iter()
            .map(|row| row.iter().map(|&v| v as f64).collect())
            .collect();
        let mut det = 1.0f64;

        for col in 0..n {
            let pivot = (col..n)
                .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
                .unwrap_or(col);
            if a[pivot][col] == 0.0 {
                return Ok(0.0);
            }
            if pivot != col {
                a.swap(pivot, col);
                det = -det;
            }
            det *= a[col][col];
            for r in (col + 1)..n {
                let factor = a[r][col] / a[col][col];
                if factor != 0.0 {
                    for c in col..n {
                        a[r][c] -= factor * a[col][c];
                    }
                }
            }
        }

        Ok(det)
    }

    /// Convert to Vec<Vec<i64>>
    pub fn to_vec(&self) -> Vec<Vec<i64>> {
        self.data.clone()
    }
}

fn overflow(row: usize) -> LatticeError {
    LatticeError::invalid_parameters(format!("entry {} of B·x overflows i64", row))
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.data.iter().enumerate() {
            let open = if i == 0 { "[[" } else { " [" };
            let close = if i + 1 == self.rows { "]]" } else { "]" };
            let entries = row.iter().map(|x| x.to_string()).collect::<Vec<_>>();
            writeln!(f, "{}{}{}", open, entries.join(", "), close)?;
        }
        Ok(())
    }
}
