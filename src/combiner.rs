//! Rules that derive a new lattice point from one or two existing ones
//!
//! Midpoints stay on the lattice only when every coordinate of `p.x - q.x`
//! is even. [`average`] honours that strictly and reports "no result"
//! otherwise; the modified variants nudge a private copy of `q.x` by ±1 on
//! the odd coordinates so a point is always produced.

use crate::core::error::{LatticeError, Result};
use crate::core::lattice::Lattice;
use crate::core::types::{CoefficientRange, LatticePoint};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of noise kicks applied by default
pub const DEFAULT_NOISE_KICKS: usize = 3;
/// Magnitude of a noise kick; must stay even to preserve parity
pub const DEFAULT_NOISE_STEP: i64 = 2;

/// Combination rule used by the sieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Combiner {
    /// `p.x - q.x`
    Difference,
    /// Exact midpoint, only when all coordinate differences are even
    Average,
    /// Parity-corrected midpoint
    ModifiedAverage,
    /// Parity-corrected midpoint with `kicks` random ±`step` perturbations
    ModifiedAverageWithNoise { kicks: usize, step: i64 },
    /// Fresh random point; parents are ignored
    Random { range: CoefficientRange },
}

impl Default for Combiner {
    fn default() -> Self {
        Combiner::ModifiedAverage
    }
}

impl Combiner {
    /// Noisy modified average with the default noise settings
    pub fn noisy() -> Self {
        Combiner::ModifiedAverageWithNoise {
            kicks: DEFAULT_NOISE_KICKS,
            step: DEFAULT_NOISE_STEP,
        }
    }

    /// Whether this rule generates points independently of its parents
    pub fn is_generator(&self) -> bool {
        matches!(self, Combiner::Random { .. })
    }

    /// Validate rule settings
    pub fn validate(&self) -> Result<()> {
        match self {
            Combiner::ModifiedAverageWithNoise { step, .. } => {
                if *step == 0 || step % 2 != 0 {
                    return Err(LatticeError::invalid_parameters(format!(
                        "noise step must be a nonzero even integer, got {}",
                        step
                    )));
                }
                Ok(())
            }
            Combiner::Random { range } => range.validate(),
            _ => Ok(()),
        }
    }

    /// Apply the rule to `p` and `q`
    ///
    /// `Ok(None)` means the pair has no valid result under this rule, which is
    /// an expected outcome and not a failure.
    pub fn combine<R: Rng + ?Sized>(
        &self,
        lattice: &Lattice,
        p: &LatticePoint,
        q: &LatticePoint,
        rng: &mut R,
    ) -> Result<Option<LatticePoint>> {
        match *self {
            Combiner::Difference => difference(lattice, p, q).map(Some),
            Combiner::Average => average(lattice, p, q),
            Combiner::ModifiedAverage => modified_average(lattice, p, q, rng).map(Some),
            Combiner::ModifiedAverageWithNoise { kicks, step } => {
                modified_average_with_noise(lattice, p, q, kicks, step, rng).map(Some)
            }
            Combiner::Random { range } => random_point(lattice, range, rng).map(Some),
        }
    }
}

impl std::fmt::Display for Combiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Combiner::Difference => write!(f, "difference"),
            Combiner::Average => write!(f, "average"),
            Combiner::ModifiedAverage => write!(f, "modified-average"),
            Combiner::ModifiedAverageWithNoise { kicks, step } => {
                write!(f, "modified-average-noise({}x±{})", kicks, step)
            }
            Combiner::Random { range } => write!(f, "random{}", range),
        }
    }
}

/// Point with coefficients `p.x - q.x`
pub fn difference(lattice: &Lattice, p: &LatticePoint, q: &LatticePoint) -> Result<LatticePoint> {
    check_same_dimension(p, q)?;
    let x = p
        .coefficients()
        .iter()
        .zip(q.coefficients())
        .map(|(&a, &b)| a.checked_sub(b).ok_or_else(|| overflow("difference")))
        .collect::<Result<Vec<i64>>>()?;
    LatticePoint::new(lattice, x)
}

/// Exact midpoint `(p.x + q.x) / 2`, or `None` if any coordinate difference is odd
pub fn average(
    lattice: &Lattice,
    p: &LatticePoint,
    q: &LatticePoint,
) -> Result<Option<LatticePoint>> {
    check_same_dimension(p, q)?;
    if p
        .coefficients()
        .iter()
        .zip(q.coefficients())
        .any(|(&a, &b)| odd_difference(a, b))
    {
        return Ok(None);
    }
    halve_sum(lattice, p.coefficients(), q.coefficients()).map(Some)
}

/// Midpoint after forcing every coordinate difference even
///
/// Each odd coordinate of a copy of `q.x` is moved by +1 or -1, chosen
/// independently and uniformly.
pub fn modified_average<R: Rng + ?Sized>(
    lattice: &Lattice,
    p: &LatticePoint,
    q: &LatticePoint,
    rng: &mut R,
) -> Result<LatticePoint> {
    check_same_dimension(p, q)?;
    let adjusted = parity_corrected(p.coefficients(), q.coefficients(), rng)?;
    halve_sum(lattice, p.coefficients(), &adjusted)
}

/// [`modified_average`] plus `kicks` perturbations of ±`step` on random
/// coordinates before halving
pub fn modified_average_with_noise<R: Rng + ?Sized>(
    lattice: &Lattice,
    p: &LatticePoint,
    q: &LatticePoint,
    kicks: usize,
    step: i64,
    rng: &mut R,
) -> Result<LatticePoint> {
    check_same_dimension(p, q)?;
    if step % 2 != 0 {
        return Err(LatticeError::invalid_parameters(format!(
            "noise step must be even, got {}",
            step
        )));
    }

    let mut adjusted = parity_corrected(p.coefficients(), q.coefficients(), rng)?;
    let dim = adjusted.len();
    for _ in 0..kicks {
        let i = rng.random_range(0..dim);
        let kick = if rng.random_bool(0.5) { step } else { -step };
        adjusted[i] = adjusted[i]
            .checked_add(kick)
            .ok_or_else(|| overflow("noise kick"))?;
    }
    halve_sum(lattice, p.coefficients(), &adjusted)
}

/// Point with every coefficient drawn uniformly from `range`
pub fn random_point<R: Rng + ?Sized>(
    lattice: &Lattice,
    range: CoefficientRange,
    rng: &mut R,
) -> Result<LatticePoint> {
    range.validate()?;
    let x = (0..lattice.rank())
        .map(|_| rng.random_range(range.low..range.high))
        .collect();
    LatticePoint::new(lattice, x)
}

fn parity_corrected<R: Rng + ?Sized>(p: &[i64], q: &[i64], rng: &mut R) -> Result<Vec<i64>> {
    p.iter()
        .zip(q)
        .map(|(&a, &b)| {
            if !odd_difference(a, b) {
                return Ok(b);
            }
            let nudge = if rng.random_bool(0.5) { 1 } else { -1 };
            b.checked_add(nudge).ok_or_else(|| overflow("parity correction"))
        })
        .collect()
}

/// The midpoint of two `i64` values always fits `i64`; the sum is taken in `i128`
fn halve_sum(lattice: &Lattice, a: &[i64], b: &[i64]) -> Result<LatticePoint> {
    let x = a
        .iter()
        .zip(b)
        .map(|(&u, &v)| {
            let sum = u as i128 + v as i128;
            debug_assert_eq!(sum % 2, 0);
            (sum / 2) as i64
        })
        .collect();
    LatticePoint::new(lattice, x)
}

/// Parity test that cannot overflow, unlike `(a - b) % 2`
fn odd_difference(a: i64, b: i64) -> bool {
    (a ^ b) & 1 == 1
}

fn overflow(step: &str) -> LatticeError {
    LatticeError::invalid_parameters(format!("{} overflows i64 coefficients", step))
}

fn check_same_dimension(p: &LatticePoint, q: &LatticePoint) -> Result<()> {
    if p.dimension() != q.dimension() {
        return Err(LatticeError::invalid_dimensions(
            (p.dimension(), 1),
            (q.dimension(), 1),
        ));
    }
    Ok(())
}
