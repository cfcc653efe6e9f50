//! # Error Types
//!
//! This module defines the error type shared by the solvers, the bundled
//! problems and the seeding utilities. Errors only arise at construction
//! time: once a solver has been built, `run` is total.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use cgea::error::{Result, SolverError};
//!
//! fn checked_population(size: usize) -> Result<usize> {
//!     if size < 2 {
//!         return Err(SolverError::Configuration(
//!             "Population size must be at least 2".to_string(),
//!         ));
//!     }
//!     Ok(size)
//! }
//!
//! assert!(checked_population(10).is_ok());
//! assert!(checked_population(1).is_err());
//! ```

use thiserror::Error;

/// Represents errors that can occur while setting up a search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Error that occurs when invalid solver options are provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when a problem cannot be constructed with the given parameters.
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for solver setup.
///
/// This type is a convenience wrapper around `std::result::Result` with the error type
/// fixed to `SolverError`.
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category() {
        let err = SolverError::Configuration("bad factor".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad factor");

        let err = SolverError::InvalidProblem("dimension is not even".to_string());
        assert_eq!(err.to_string(), "Invalid problem: dimension is not even");

        let err = SolverError::Other("plain".to_string());
        assert_eq!(err.to_string(), "plain");
    }
}
