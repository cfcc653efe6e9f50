use crate::error::{Result, SolverError};

use super::FitnessOracle;

/// Maximum independent vertex set on a two-row ladder graph with crossed rungs.
///
/// Vertices `0..n/2` form the top row and `n/2..n` the bottom row. Each row is a path,
/// and vertex `i` of the top row is joined to the bottom-row vertices `n/2 + i + 1` and
/// `n/2 + i - 1`. A selected vertex scores one point and every selected edge costs `n`,
/// so any infeasible set scores below every feasible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximumIndependentVertexSet {
    dimension: usize,
    upper_bound: i64,
}

impl MaximumIndependentVertexSet {
    /// Creates a graph with `dimension` vertices.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::InvalidProblem` if `dimension` is odd or smaller than four.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension % 2 == 1 {
            return Err(SolverError::InvalidProblem(format!(
                "dimension {} is not even",
                dimension
            )));
        }
        if dimension < 4 {
            return Err(SolverError::InvalidProblem(format!(
                "dimension {} is smaller than 4",
                dimension
            )));
        }

        let mut target = dimension / 2;
        if target % 2 == 1 {
            target += 1;
        }

        Ok(Self {
            dimension,
            upper_bound: target as i64,
        })
    }

    fn is_edge(&self, i: usize, j: usize) -> bool {
        let n = self.dimension;
        let half = n / 2;
        (j == i + 1 && i + 1 != half)
            || (j == i + half + 1 && i + 2 <= half)
            || (j + 1 == i + half && i < half && i > 0)
    }
}

impl FitnessOracle for MaximumIndependentVertexSet {
    type Fitness = i64;

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn fitness_upper_bound(&self) -> Option<i64> {
        Some(self.upper_bound)
    }

    fn fitness(&self, bitstring: &[u8]) -> i64 {
        let penalty = self.dimension as i64;
        let selected: Vec<usize> = bitstring
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit == 1)
            .map(|(i, _)| i)
            .collect();

        let mut fitness = selected.len() as i64;
        for &i in &selected {
            for &j in &selected {
                if self.is_edge(i, j) {
                    fitness -= penalty;
                }
            }
        }
        fitness
    }
}
