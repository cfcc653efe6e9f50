pub mod caching;
pub mod candidate;
pub mod error;
pub mod model;
pub mod problem;
pub mod rng;
pub mod solver;

// Re-export commonly used types for convenience
pub use error::{Result, SolverError};
pub use problem::{Fitness, FitnessOracle};
pub use rng::{RandomNumberGenerator, UniformRandomSource};
pub use solver::{
    HitEvent, PartialRestartOptions, PartialRestartSolver, SmartRestartOptions,
    SmartRestartSolver, Solver, TrialRecord,
};
