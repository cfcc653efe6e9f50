//! # Fitness Oracles
//!
//! The `FitnessOracle` trait is the only view the solvers have of the problem being
//! optimized: a gene count, an optional known optimum and a fitness function over
//! bitstrings. Genes are stored as `u8` values that are always `0` or `1`.
//!
//! ## Example
//!
//! ```rust
//! use cgea::problem::FitnessOracle;
//!
//! struct OneMax {
//!     dimension: usize,
//! }
//!
//! impl FitnessOracle for OneMax {
//!     type Fitness = usize;
//!
//!     fn dimension(&self) -> usize {
//!         self.dimension
//!     }
//!
//!     fn fitness_upper_bound(&self) -> Option<usize> {
//!         Some(self.dimension)
//!     }
//!
//!     fn fitness(&self, bitstring: &[u8]) -> usize {
//!         bitstring.iter().map(|&bit| bit as usize).sum()
//!     }
//! }
//!
//! let problem = OneMax { dimension: 8 };
//! assert_eq!(problem.fitness(&[1, 0, 1, 1, 0, 0, 0, 1]), 4);
//! ```

pub mod ising_ring;
pub mod ising_torus;
pub mod mivs;

use std::fmt::Debug;

pub use ising_ring::IsingRing;
pub use ising_torus::IsingTorus;
pub use mivs::MaximumIndependentVertexSet;

/// A totally ordered fitness value.
///
/// Any `Copy + Ord` type qualifies; larger values are better.
pub trait Fitness: Copy + Ord + Debug + Send + Sync {}

impl<T> Fitness for T where T: Copy + Ord + Debug + Send + Sync {}

/// A deterministic, thread-safe fitness function over fixed-length bitstrings.
///
/// `fitness` is called concurrently from several worker threads within a generation,
/// so implementations must not depend on shared mutable state. The solvers never retry:
/// an oracle that cannot score a bitstring should return a worst-case value instead.
pub trait FitnessOracle: Send + Sync {
    /// The ordered value returned by `fitness`.
    type Fitness: Fitness;

    /// Number of genes in every bitstring.
    fn dimension(&self) -> usize;

    /// The best attainable fitness, if known. Reaching it ends a run early.
    fn fitness_upper_bound(&self) -> Option<Self::Fitness> {
        None
    }

    /// Scores a bitstring of length `dimension()`.
    fn fitness(&self, bitstring: &[u8]) -> Self::Fitness;
}

impl<O: FitnessOracle + ?Sized> FitnessOracle for &O {
    type Fitness = O::Fitness;

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn fitness_upper_bound(&self) -> Option<Self::Fitness> {
        (**self).fitness_upper_bound()
    }

    fn fitness(&self, bitstring: &[u8]) -> Self::Fitness {
        (**self).fitness(bitstring)
    }
}

/// Scores an adjacent pair: `1` when both genes agree, `0` otherwise.
#[inline]
pub(crate) fn agreement(x: u8, y: u8) -> i64 {
    i64::from(x == y)
}
