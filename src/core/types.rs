//! Core value types shared by the sampler, combiners and sieve

use crate::core::error::{LatticeError, Result};
use crate::core::lattice::Lattice;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A point on a lattice: coefficient vector `x`, image `p = B·x` and `‖p‖`.
///
/// The image and norm are derived together at construction and there are no
/// setters, so they cannot drift away from the coefficients. Equality and
/// hashing look only at the image, because different coefficient vectors can
/// name the same lattice point.
#[derive(Debug, Clone, Serialize)]
pub struct LatticePoint {
    coefficients: Vec<i64>,
    image: Vec<i64>,
    norm_squared: i128,
    norm: f64,
}

impl LatticePoint {
    /// Build a point from its coefficient vector
    pub fn new(lattice: &Lattice, coefficients: Vec<i64>) -> Result<Self> {
        let image = lattice.image(&coefficients)?;
        let norm_squared = image
            .iter()
            .try_fold(0i128, |acc, &v| acc.checked_add((v as i128) * (v as i128)))
            .ok_or_else(|| LatticeError::invalid_parameters("squared norm overflows i128"))?;
        Ok(LatticePoint {
            coefficients,
            image,
            norm_squared,
            norm: (norm_squared as f64).sqrt(),
        })
    }

    /// Unit coefficient vector `e_index`
    pub fn unit(lattice: &Lattice, index: usize) -> Result<Self> {
        let rank = lattice.rank();
        if index >= rank {
            return Err(LatticeError::invalid_parameters(format!(
                "unit index {} out of bounds for rank {}",
                index, rank
            )));
        }
        let mut x = vec![0i64; rank];
        x[index] = 1;
        LatticePoint::new(lattice, x)
    }

    /// Coefficient vector `x`
    pub fn coefficients(&self) -> &[i64] {
        &self.coefficients
    }

    /// Image vector `p = B·x`
    pub fn image(&self) -> &[i64] {
        &self.image
    }

    /// Exact squared norm of the image
    pub fn norm_squared(&self) -> i128 {
        self.norm_squared
    }

    /// Euclidean norm of the image
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Number of coefficients
    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    /// The trivial lattice relation
    pub fn is_zero(&self) -> bool {
        self.norm_squared == 0
    }

    /// Recompute `B·x` and compare against the stored image
    pub fn is_consistent_with(&self, lattice: &Lattice) -> Result<bool> {
        Ok(lattice.image(&self.coefficients)? == self.image)
    }
}

impl PartialEq for LatticePoint {
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image
    }
}

impl Eq for LatticePoint {}

impl Hash for LatticePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.image.hash(state);
    }
}

impl std::fmt::Display for LatticePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "p=[{}], x=[{}], norm={:.6}",
            join(&self.image),
            join(&self.coefficients),
            self.norm
        )
    }
}

fn join(values: &[i64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

/// Half-open integer range `[low, high)` for random coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientRange {
    pub low: i64,
    pub high: i64,
}

impl CoefficientRange {
    /// Create a new range; see [`CoefficientRange::validate`]
    pub fn new(low: i64, high: i64) -> Self {
        CoefficientRange { low, high }
    }

    /// Validate that the range is non-empty
    pub fn validate(&self) -> Result<()> {
        if self.low >= self.high {
            return Err(LatticeError::invalid_parameters(format!(
                "coefficient range [{}, {}) is empty",
                self.low, self.high
            )));
        }
        Ok(())
    }

    /// Number of distinct values per coordinate
    pub fn width(&self) -> u64 {
        self.high.abs_diff(self.low)
    }
}

impl Default for CoefficientRange {
    fn default() -> Self {
        CoefficientRange { low: -2, high: 3 }
    }
}

impl std::fmt::Display for CoefficientRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn skewed() -> Lattice {
        // columns (1, 0) and (1, 1)
        Lattice::from_matrix(vec![vec![1, 1], vec![0, 1]]).unwrap()
    }

    #[test]
    fn test_point_derives_image_and_norm() {
        let lattice = skewed();
        let point = LatticePoint::new(&lattice, vec![2, -1]).unwrap();
        assert_eq!(point.image(), &[1, -1]);
        assert_eq!(point.norm_squared(), 2);
        assert!((point.norm() - 2.0f64.sqrt()).abs() < 1e-12);
        assert!(point.is_consistent_with(&lattice).unwrap());
    }

    #[test]
    fn test_point_dimension_mismatch() {
        let lattice = skewed();
        assert!(LatticePoint::new(&lattice, vec![1, 2, 3]).is_err());
        assert!(LatticePoint::unit(&lattice, 2).is_err());
    }

    #[test]
    fn test_equality_uses_image() {
        // dependent columns: x = (1, 0) and x = (0, 1) both map to (2, 2)
        let lattice = Lattice::from_matrix(vec![vec![2, 2], vec![2, 2]]).unwrap();
        let a = LatticePoint::new(&lattice, vec![1, 0]).unwrap();
        let b = LatticePoint::new(&lattice, vec![0, 1]).unwrap();
        assert_ne!(a.coefficients(), b.coefficients());
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_overflowing_image_is_refused() {
        let lattice = Lattice::from_matrix(vec![vec![1 << 62, 0], vec![0, 1]]).unwrap();
        assert!(matches!(
            LatticePoint::new(&lattice, vec![2, 0]),
            Err(LatticeError::InvalidParameters(_))
        ));

        // each squared entry fits i128 but their sum does not
        let lattice = Lattice::from_matrix(vec![vec![i64::MIN], vec![i64::MIN]]).unwrap();
        assert!(LatticePoint::new(&lattice, vec![1]).is_err());
    }

    #[test]
    fn test_zero_point() {
        let lattice = skewed();
        let zero = LatticePoint::new(&lattice, vec![0, 0]).unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.norm(), 0.0);
    }

    #[test]
    fn test_coefficient_range() {
        assert!(CoefficientRange::default().validate().is_ok());
        assert_eq!(CoefficientRange::default().width(), 5);
        assert!(CoefficientRange::new(3, 3).validate().is_err());
        assert!(CoefficientRange::new(4, -1).validate().is_err());
    }
}
