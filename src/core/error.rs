//! Core error types for lattice and sieve operations

use thiserror::Error;

/// Error types for lattice sieving
///
/// Rejected sieve candidates are not errors; they are counted and redrawn.
#[derive(Debug, Clone, Error)]
pub enum LatticeError {
    /// A coefficient vector or matrix does not fit the basis
    #[error("Invalid dimensions: expected {expected:?}, found {found:?}")]
    InvalidDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A retry budget ran out before anything usable was produced
    #[error("Resource exhausted: {0}")]
    ResourceExhaustion(String),

    /// Malformed basis input
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LatticeError {
    fn from(e: std::io::Error) -> Self {
        LatticeError::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        LatticeError::parse_error(format!("JSON: {}", e))
    }
}

/// Result type for lattice operations
pub type Result<T> = std::result::Result<T, LatticeError>;

impl LatticeError {
    /// Create an invalid dimensions error
    pub fn invalid_dimensions(expected: (usize, usize), found: (usize, usize)) -> Self {
        LatticeError::InvalidDimensions { expected, found }
    }

    /// Create an invalid parameters error
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        LatticeError::InvalidParameters(msg.into())
    }

    /// Create a resource exhaustion error
    pub fn resource_exhaustion(msg: impl Into<String>) -> Self {
        LatticeError::ResourceExhaustion(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        LatticeError::Parse(msg.into())
    }

    /// Create an I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        LatticeError::Io(msg.into())
    }
}
