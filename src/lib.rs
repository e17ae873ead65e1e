//! Randomized population sieve for short vectors in integer lattices
//!
//! This crate searches for a short nonzero vector of a lattice (an
//! approximate answer to the Shortest Vector Problem) with:
//! - lattice points that keep coefficients, image and norm in step
//! - parity-aware combination rules (difference, average, modified average,
//!   modified average with noise)
//! - basis-vector or random seeding with bounded retries
//! - an elitist sieve whose rounds cannot livelock
//! - optional parallel candidate evaluation (`parallel` feature)
//!
//! # Examples
//!
//! ```rust
//! use lattice_sieve::{Combiner, Lattice, SieveParams, SieveSolver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let lattice = Lattice::from_matrix(vec![
//!     vec![3, 0, 0],
//!     vec![0, 60, 7],
//!     vec![0, 5, 70],
//! ])?;
//!
//! let params = SieveParams::default()
//!     .with_combiner(Combiner::ModifiedAverage)
//!     .with_population_size(50)
//!     .with_rounds(10)
//!     .with_seed(7);
//! let result = SieveSolver::with_params(params).solve(&lattice)?;
//! assert!(result.norm > 0.0);
//! println!("shortest: {}", result.shortest);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod combiner;
pub mod population;
pub mod sampler;
pub mod sieve;
pub mod io;
pub mod utils;

pub use crate::core::*;
pub use combiner::Combiner;
pub use population::Population;
pub use sampler::{PopulationSampler, SampledPopulation};
pub use sieve::{
    Phase, RejectionCounts, RoundReport, Seeding, SieveEngine, SieveParams, SieveResult,
    SieveSolver, SieveStatus,
};

// Re-export commonly used types
pub use crate::core::lattice::Lattice;
pub use crate::core::matrix::Matrix;
pub use crate::core::error::{LatticeError, Result};

/// Feature flag utilities
pub mod features {
    /// Check if parallel candidate evaluation is compiled in
    pub fn parallel_enabled() -> bool {
        cfg!(feature = "parallel")
    }
}

/// Log which optional features this build carries
pub fn log_features() {
    log::info!("Feature status - Parallel: {}", features::parallel_enabled());
}
