//! Core module wiring: lattice basis, matrices, errors, and point types.

pub mod lattice;
pub mod matrix;
pub mod error;
pub mod types;

// Re-export the most commonly used items so downstream code can simply import
// `crate::core::*` without having to juggle individual submodules.
pub use error::*;
pub use lattice::*;
pub use matrix::*;
pub use types::*;
