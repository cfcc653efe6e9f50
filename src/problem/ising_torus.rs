use crate::error::{Result, SolverError};

use super::{agreement, FitnessOracle};

/// Two-dimensional Ising model on a square torus.
///
/// Genes are laid out row by row on a `side × side` grid whose edges wrap around. Each
/// agreeing pair of orthogonal neighbours scores one point, so the optimum is twice the
/// dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsingTorus {
    dimension: usize,
    side: usize,
}

impl IsingTorus {
    /// Creates a torus with `dimension` spins.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::InvalidProblem` if `dimension` is zero or not a perfect square.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(SolverError::InvalidProblem(
                "dimension must be positive".to_string(),
            ));
        }

        let side = (dimension as f64).sqrt().round() as usize;
        if side * side != dimension {
            return Err(SolverError::InvalidProblem(format!(
                "dimension {} is not a perfect square",
                dimension
            )));
        }

        Ok(Self { dimension, side })
    }

    /// Length of one side of the grid.
    pub fn side(&self) -> usize {
        self.side
    }
}

impl FitnessOracle for IsingTorus {
    type Fitness = i64;

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn fitness_upper_bound(&self) -> Option<i64> {
        Some(2 * self.dimension as i64)
    }

    fn fitness(&self, bitstring: &[u8]) -> i64 {
        let n = self.side;
        let at = |row: usize, col: usize| bitstring[row * n + col];
        let mut fitness = 0;
        for row in 0..n {
            for col in 0..n {
                let me = at(row, col);
                fitness += agreement(me, at((row + n - 1) % n, col));
                fitness += agreement(me, at((row + 1) % n, col));
                fitness += agreement(me, at(row, (col + 1) % n));
                fitness += agreement(me, at(row, (col + n - 1) % n));
            }
        }
        // every edge was visited from both ends
        fitness / 2
    }
}
