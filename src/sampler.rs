//! Initial populations for the sieve

use crate::core::error::Result;
use crate::core::lattice::Lattice;
use crate::core::types::{CoefficientRange, LatticePoint};
use crate::combiner::random_point;
use crate::population::Population;
use rand::Rng;

/// Outcome of random seeding
#[derive(Debug, Clone)]
pub struct SampledPopulation {
    /// Accepted points, sorted by norm
    pub population: Population,
    /// Draws made, accepted or not
    pub attempts: usize,
    /// The attempt budget ran out before the target size was reached
    pub exhausted: bool,
}

/// Generates starting points on a lattice
pub struct PopulationSampler<'a> {
    lattice: &'a Lattice,
}

impl<'a> PopulationSampler<'a> {
    pub fn new(lattice: &'a Lattice) -> Self {
        PopulationSampler { lattice }
    }

    /// One point per unit coefficient vector, i.e. the basis vectors themselves
    ///
    /// Zero columns and repeated columns collapse through de-duplication.
    pub fn basis_vectors(&self) -> Result<Population> {
        let rank = self.lattice.rank();
        let mut population = Population::with_capacity(rank);
        for i in 0..rank {
            population.insert(LatticePoint::unit(self.lattice, i)?);
        }
        population.sort_by_norm();
        Ok(population)
    }

    /// Draw coefficient vectors uniformly from `range` until `target` distinct
    /// nonzero points are collected or `max_attempts` draws have been made
    pub fn random<R: Rng + ?Sized>(
        &self,
        target: usize,
        range: CoefficientRange,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<SampledPopulation> {
        range.validate()?;

        let mut population = Population::with_capacity(target);
        let mut attempts = 0usize;
        while population.len() < target && attempts < max_attempts {
            attempts += 1;
            population.insert(random_point(self.lattice, range, rng)?);
        }

        let exhausted = population.len() < target;
        if exhausted {
            log::warn!(
                "random seeding stopped at {}/{} points after {} attempts (range {})",
                population.len(),
                target,
                attempts,
                range
            );
        }

        population.sort_by_norm();
        Ok(SampledPopulation { population, attempts, exhausted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_basis_vectors_identity() {
        let lattice = Lattice::from_matrix(vec![vec![1, 0], vec![0, 1]]).unwrap();
        let population = PopulationSampler::new(&lattice).basis_vectors().unwrap();
        let images: Vec<&[i64]> = population.iter().map(|p| p.image()).collect();
        assert_eq!(images, vec![&[1, 0][..], &[0, 1][..]]);
        assert!(population.iter().all(|p| p.norm() == 1.0));
    }

    #[test]
    fn test_basis_vectors_skip_zero_and_repeated_columns() {
        let lattice = Lattice::from_matrix(vec![vec![2, 0, 2], vec![1, 0, 1]]).unwrap();
        let population = PopulationSampler::new(&lattice).basis_vectors().unwrap();
        assert_eq!(population.len(), 1);
        assert_eq!(population.first().unwrap().image(), &[2, 1]);
    }

    #[test]
    fn test_random_reaches_target() {
        let lattice =
            Lattice::from_matrix(vec![vec![5, 1, 0], vec![0, 7, 1], vec![1, 0, 9]]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let sampled = PopulationSampler::new(&lattice)
            .random(20, CoefficientRange::default(), 10_000, &mut rng)
            .unwrap();
        assert!(!sampled.exhausted);
        assert_eq!(sampled.population.len(), 20);
        assert!(sampled.population.is_sorted_by_norm());
        assert!(sampled.population.iter().all(|p| !p.is_zero()));
    }

    #[test]
    fn test_random_is_bounded_when_range_is_too_small() {
        // range {0, 1} in 2-D has only three nonzero points
        let lattice = Lattice::from_matrix(vec![vec![1, 0], vec![0, 1]]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let sampled = PopulationSampler::new(&lattice)
            .random(10, CoefficientRange::new(0, 2), 500, &mut rng)
            .unwrap();
        assert!(sampled.exhausted);
        assert_eq!(sampled.attempts, 500);
        assert_eq!(sampled.population.len(), 3);
    }
}
