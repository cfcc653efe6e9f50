use crate::error::{Result, SolverError};

use super::{agreement, FitnessOracle};

/// One-dimensional Ising model on a ring.
///
/// The fitness is the number of neighbouring gene pairs (including the pair that wraps
/// around) that hold the same value. Both the all-zeros and the all-ones bitstring
/// reach the optimum, which equals the dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsingRing {
    dimension: usize,
}

impl IsingRing {
    /// Creates a ring with `dimension` spins.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::InvalidProblem` if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(SolverError::InvalidProblem(
                "dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dimension })
    }
}

impl FitnessOracle for IsingRing {
    type Fitness = i64;

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn fitness_upper_bound(&self) -> Option<i64> {
        Some(self.dimension as i64)
    }

    fn fitness(&self, bitstring: &[u8]) -> i64 {
        let (Some(&first), Some(&last)) = (bitstring.first(), bitstring.last()) else {
            return 0;
        };
        let wrap = agreement(last, first);
        wrap + bitstring
            .windows(2)
            .map(|pair| agreement(pair[0], pair[1]))
            .sum::<i64>()
    }
}
