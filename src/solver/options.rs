//! # Solver Options
//!
//! Configuration for the two solvers. Both option structs come with sensible defaults
//! and a fluent builder.
//!
//! ## Example
//!
//! ```rust
//! use cgea::solver::options::{PartialRestartOptions, SmartRestartOptions};
//!
//! let partial = PartialRestartOptions::builder()
//!     .population_size(16)
//!     .reset_probability(0.2)
//!     .build();
//! assert_eq!(partial.get_population_size(), 16);
//!
//! let smart = SmartRestartOptions::default();
//! assert_eq!(smart.get_update_factor(), 2.0);
//! ```
//!
//! ## Structs
//!
//! ### `PartialRestartOptions`
//!
//! - `population_size`: candidates sampled per generation (default 10).
//! - `reset_probability`: per-gene chance of forgetting at a restart (default 0.1).
//! - `parallel_threshold`: smallest batch evaluated on the rayon pool (default 1).
//!
//! ### `SmartRestartOptions`
//!
//! - `budget_factor`: an epoch with hypothetical population size `k` gets
//!   `budget_factor * k²` evaluations (default 8.0).
//! - `update_factor`: growth of `k` between epochs (default 2.0).

use crate::error::{Result, SolverError};

#[derive(Debug, Clone, PartialEq)]
pub struct PartialRestartOptions {
    population_size: usize,
    reset_probability: f64,
    /// Minimum number of candidates to evaluate in parallel
    parallel_threshold: usize,
}

impl PartialRestartOptions {
    pub fn new(population_size: usize, reset_probability: f64) -> Self {
        Self {
            population_size,
            reset_probability,
            parallel_threshold: 1,
        }
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_reset_probability(&self) -> f64 {
        self.reset_probability
    }

    /// Returns the minimum number of candidates to evaluate in parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    pub fn set_reset_probability(&mut self, reset_probability: f64) {
        self.reset_probability = reset_probability;
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Checks the options before a solver is built.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::Configuration` if the population has fewer than two
    /// candidates, the reset probability lies outside `[0, 1]`, or the parallel
    /// threshold is zero.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(SolverError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.reset_probability) {
            return Err(SolverError::Configuration(format!(
                "Reset probability must be in the range [0.0, 1.0], got {}",
                self.reset_probability
            )));
        }

        if self.parallel_threshold == 0 {
            return Err(SolverError::Configuration(
                "Parallel threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns a builder for creating a `PartialRestartOptions` instance.
    pub fn builder() -> PartialRestartOptionsBuilder {
        PartialRestartOptionsBuilder::default()
    }
}

impl Default for PartialRestartOptions {
    fn default() -> Self {
        Self::new(10, 0.1)
    }
}

/// Builder for `PartialRestartOptions`.
#[derive(Debug, Clone, Default)]
pub struct PartialRestartOptionsBuilder {
    population_size: Option<usize>,
    reset_probability: Option<f64>,
    parallel_threshold: Option<usize>,
}

impl PartialRestartOptionsBuilder {
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn reset_probability(mut self, value: f64) -> Self {
        self.reset_probability = Some(value);
        self
    }

    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    pub fn build(self) -> PartialRestartOptions {
        PartialRestartOptions {
            population_size: self.population_size.unwrap_or(10),
            reset_probability: self.reset_probability.unwrap_or(0.1),
            parallel_threshold: self.parallel_threshold.unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmartRestartOptions {
    budget_factor: f64,
    update_factor: f64,
}

impl SmartRestartOptions {
    pub fn new(budget_factor: f64, update_factor: f64) -> Self {
        Self {
            budget_factor,
            update_factor,
        }
    }

    pub fn get_budget_factor(&self) -> f64 {
        self.budget_factor
    }

    pub fn get_update_factor(&self) -> f64 {
        self.update_factor
    }

    pub fn set_budget_factor(&mut self, budget_factor: f64) {
        self.budget_factor = budget_factor;
    }

    pub fn set_update_factor(&mut self, update_factor: f64) {
        self.update_factor = update_factor;
    }

    /// Checks the options before a solver is built.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::Configuration` if the budget factor is not a positive
    /// finite number or the update factor is not a finite number above one.
    pub fn validate(&self) -> Result<()> {
        if !self.budget_factor.is_finite() || self.budget_factor <= 0.0 {
            return Err(SolverError::Configuration(format!(
                "Budget factor must be positive and finite, got {}",
                self.budget_factor
            )));
        }

        if !self.update_factor.is_finite() || self.update_factor <= 1.0 {
            return Err(SolverError::Configuration(format!(
                "Update factor must be finite and greater than 1.0, got {}",
                self.update_factor
            )));
        }

        Ok(())
    }

    /// Returns a builder for creating a `SmartRestartOptions` instance.
    pub fn builder() -> SmartRestartOptionsBuilder {
        SmartRestartOptionsBuilder::default()
    }
}

impl Default for SmartRestartOptions {
    fn default() -> Self {
        Self::new(8.0, 2.0)
    }
}

/// Builder for `SmartRestartOptions`.
#[derive(Debug, Clone, Default)]
pub struct SmartRestartOptionsBuilder {
    budget_factor: Option<f64>,
    update_factor: Option<f64>,
}

impl SmartRestartOptionsBuilder {
    pub fn budget_factor(mut self, value: f64) -> Self {
        self.budget_factor = Some(value);
        self
    }

    pub fn update_factor(mut self, value: f64) -> Self {
        self.update_factor = Some(value);
        self
    }

    pub fn build(self) -> SmartRestartOptions {
        SmartRestartOptions {
            budget_factor: self.budget_factor.unwrap_or(8.0),
            update_factor: self.update_factor.unwrap_or(2.0),
        }
    }
}
