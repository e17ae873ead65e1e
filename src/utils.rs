//! Utility functions: basis generation, population statistics and timing

use crate::core::error::{LatticeError, Result};
use crate::core::lattice::Lattice;
use crate::population::Population;
use serde::Serialize;

/// Matrix utilities
pub mod matrix_utils {
    use super::*;

    /// Generate a `rows x cols` basis with entries uniform in `low..=high`
    pub fn generate_random_lattice(
        rows: usize,
        cols: usize,
        low: i64,
        high: i64,
        seed: Option<u64>,
    ) -> Result<Lattice> {
        use rand::rngs::StdRng;
        use rand::{rng, Rng, SeedableRng};

        if low > high {
            return Err(LatticeError::invalid_parameters(format!(
                "Entry range {}..={} is empty",
                low, high
            )));
        }

        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut entropy = rng();
                <StdRng as SeedableRng>::from_rng(&mut entropy)
            }
        };

        let mut data = Vec::with_capacity(rows);
        for _ in 0..rows {
            let row = (0..cols).map(|_| rng.random_range(low..=high)).collect();
            data.push(row);
        }

        Lattice::from_matrix(data)
    }

    /// Replace basis column `col` with `vector`, giving a lattice with a
    /// known short member
    pub fn plant_short_vector(lattice: &Lattice, col: usize, vector: &[i64]) -> Result<Lattice> {
        let basis = lattice.basis().with_col(col, vector)?;
        Lattice::new(basis)
    }
}

/// Timing helpers
pub mod profiling {
    use std::time::Instant;

    /// Run `func`, logging how long it took at debug level
    pub fn profile_function<F, R>(name: &str, func: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = func();
        let duration = start.elapsed();

        log::debug!("Function '{}' took {:.2?}", name, duration);
        result
    }
}

/// Statistical utilities
pub mod statistics {
    use super::*;

    /// Norm statistics of a population
    pub fn population_statistics(population: &Population) -> PopulationStatistics {
        if population.is_empty() {
            return PopulationStatistics::default();
        }

        let norms = population.norms();
        let mean_norm = mean(&norms);
        let variance = variance(&norms);

        let mut min_norm = f64::INFINITY;
        let mut max_norm: f64 = 0.0;
        for &norm in &norms {
            min_norm = min_norm.min(norm);
            max_norm = max_norm.max(norm);
        }

        PopulationStatistics {
            count: norms.len(),
            mean_norm,
            variance,
            std_dev: variance.sqrt(),
            min_norm,
            max_norm,
        }
    }

    fn mean(data: &[f64]) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        data.iter().sum::<f64>() / data.len() as f64
    }

    fn variance(data: &[f64]) -> f64 {
        if data.len() <= 1 {
            return 0.0;
        }
        let mean_val = mean(data);
        let sum_sq: f64 = data.iter().map(|&x| (x - mean_val).powi(2)).sum();
        sum_sq / (data.len() - 1) as f64
    }
}

/// Norm statistics for a set of lattice points
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationStatistics {
    pub count: usize,
    pub mean_norm: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min_norm: f64,
    pub max_norm: f64,
}
