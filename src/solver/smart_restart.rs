//! # Smart-Restart Compact Genetic Algorithm
//!
//! A compact GA that compares two sampled bitstrings per step and shifts the marginals
//! of the genes where they differ towards the winner by `1 / k`, where `k` is the
//! hypothetical population size. Marginals stay inside `[1/n, 1 - 1/n]`, so every
//! bitstring keeps a nonzero sampling probability.
//!
//! Since the right `k` is unknown, the solver restarts: epoch `i` runs with
//! `k = 2 · updateFactor^i` for `budgetFactor · k²` evaluations, then the model goes back
//! to uniform.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::candidate::Candidate;
use crate::error::{Result, SolverError};
use crate::model::ProbabilisticModel;
use crate::problem::FitnessOracle;
use crate::rng::{RandomNumberGenerator, UniformRandomSource};

use super::{BestSoFar, HitEvent, SmartRestartOptions, Solver};

const INITIAL_POPULATION_SIZE: usize = 2;

/// Smart-restart compact genetic algorithm.
///
/// # Examples
///
/// ```
/// use cgea::problem::IsingRing;
/// use cgea::rng::RandomNumberGenerator;
/// use cgea::solver::{SmartRestartOptions, SmartRestartSolver, Solver};
///
/// let problem = IsingRing::new(8)?;
/// let rng = RandomNumberGenerator::from_seed(42);
/// let mut solver = SmartRestartSolver::new(problem, rng, SmartRestartOptions::default())?;
///
/// let events = solver.run(2_000);
/// assert!(!events.is_empty());
/// assert_eq!(solver.best_bitstring().len(), 8);
/// # Ok::<(), cgea::error::SolverError>(())
/// ```
pub struct SmartRestartSolver<O: FitnessOracle, R = RandomNumberGenerator> {
    oracle: O,
    rng: R,
    options: SmartRestartOptions,
    model: ProbabilisticModel,
    first: Candidate<O::Fitness>,
    second: Candidate<O::Fitness>,
    hypothetical_population_size: usize,
    evaluations: usize,
    best: BestSoFar<O::Fitness>,
}

impl<O, R> SmartRestartSolver<O, R>
where
    O: FitnessOracle,
    R: UniformRandomSource,
{
    /// Creates a solver for `oracle` that draws all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::Configuration` if the options are invalid or the oracle
    /// has fewer than two genes.
    pub fn new(oracle: O, rng: R, options: SmartRestartOptions) -> Result<Self> {
        options.validate()?;

        let dimension = oracle.dimension();
        if dimension < 2 {
            return Err(SolverError::Configuration(format!(
                "Problem dimension must be at least 2, got {}",
                dimension
            )));
        }

        Ok(Self {
            oracle,
            rng,
            options,
            model: ProbabilisticModel::uniform(dimension),
            first: Candidate::new(dimension),
            second: Candidate::new(dimension),
            hypothetical_population_size: INITIAL_POPULATION_SIZE,
            evaluations: 0,
            best: BestSoFar::new(dimension),
        })
    }

    pub fn options(&self) -> &SmartRestartOptions {
        &self.options
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn model(&self) -> &ProbabilisticModel {
        &self.model
    }

    /// The hypothetical population size of the current (or last) epoch.
    pub fn hypothetical_population_size(&self) -> usize {
        self.hypothetical_population_size
    }

    fn epoch_budget(&self) -> usize {
        let size = self.hypothetical_population_size as f64;
        ((self.options.get_budget_factor() * size * size) as usize).max(1)
    }

    fn next_population_size(&self) -> usize {
        let size = self.hypothetical_population_size;
        let grown = (size as f64 * self.options.get_update_factor()) as usize;
        grown.max(size.saturating_add(1))
    }

    /// Runs steps until `limit` evaluations. Returns `true` if the optimum was hit.
    fn run_epoch(&mut self, limit: usize) -> bool {
        let upper_bound = self.oracle.fitness_upper_bound();

        while self.evaluations < limit {
            self.sample();
            let first_wins = self.evaluate_pair();

            let (winner, loser) = if first_wins {
                (&self.first, &self.second)
            } else {
                (&self.second, &self.first)
            };
            if self.best.observe(winner, upper_bound) {
                return true;
            }

            let delta = 1.0 / self.hypothetical_population_size as f64;
            let lower = 1.0 / self.model.dimension() as f64;
            let upper = 1.0 - lower;
            for (gene, (&won, &lost)) in winner.genes().iter().zip(loser.genes()).enumerate() {
                if won != lost {
                    self.model.shift_toward(gene, won, delta, lower, upper);
                }
            }
        }

        false
    }

    fn sample(&mut self) {
        for candidate in [&mut self.first, &mut self.second] {
            candidate.reinitialize();
            self.model.sample_into(candidate.genes_mut(), &mut self.rng);
            candidate.rehash();
        }
    }

    /// Evaluates both samples and reports whether the first one wins.
    ///
    /// Identical samples share one oracle call and one evaluation index.
    fn evaluate_pair(&mut self) -> bool {
        if self.first.same_genes(&self.second) {
            let fitness = self.oracle.fitness(self.first.genes());
            self.evaluations += 1;
            self.first.record(fitness, self.evaluations);
            self.second.record(fitness, self.evaluations);
            return true;
        }

        for candidate in [&mut self.first, &mut self.second] {
            let fitness = self.oracle.fitness(candidate.genes());
            self.evaluations += 1;
            candidate.record(fitness, self.evaluations);
        }

        self.second.fitness().cmp(&self.first.fitness()) != Ordering::Greater
    }
}

impl<O, R> Solver<O::Fitness> for SmartRestartSolver<O, R>
where
    O: FitnessOracle,
    R: UniformRandomSource,
{
    fn run(&mut self, budget: usize) -> Vec<HitEvent<O::Fitness>> {
        self.evaluations = 0;
        self.best.reset();
        self.hypothetical_population_size = INITIAL_POPULATION_SIZE;

        let mut epoch = 0usize;
        while self.evaluations < budget {
            epoch += 1;
            let limit = budget.min(self.evaluations.saturating_add(self.epoch_budget()));
            self.model.reset_uniform();
            debug!(
                epoch,
                hypothetical_population_size = self.hypothetical_population_size,
                evaluations = self.evaluations,
                limit,
                "starting restart epoch"
            );

            if self.run_epoch(limit) {
                break;
            }
            self.hypothetical_population_size = self.next_population_size();
        }

        let events = self.best.take_events();
        info!(
            epochs = epoch,
            events = events.len(),
            evaluations = self.evaluations,
            best_fitness = ?self.best.fitness(),
            "smart-restart run finished"
        );
        events
    }

    fn best_bitstring(&self) -> &[u8] {
        self.best.bitstring()
    }

    fn best_fitness(&self) -> Option<O::Fitness> {
        self.best.fitness()
    }

    fn evaluation_count(&self) -> usize {
        self.evaluations
    }
}
