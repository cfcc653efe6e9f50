//! # Solvers
//!
//! Both search engines implement the [`Solver`] trait: `run` spends an evaluation
//! budget and returns the sequence of [`HitEvent`]s, one per strict improvement of the
//! best fitness seen so far. After `run` the best bitstring and its fitness can be read
//! back from the solver.
//!
//! ## Example
//!
//! ```rust
//! use cgea::problem::IsingRing;
//! use cgea::rng::RandomNumberGenerator;
//! use cgea::solver::{PartialRestartOptions, PartialRestartSolver, Solver, TrialRecord};
//!
//! let problem = IsingRing::new(16)?;
//! let rng = RandomNumberGenerator::from_seed(167_776_193);
//! let mut solver = PartialRestartSolver::new(problem, rng, PartialRestartOptions::default())?;
//!
//! let events = solver.run(10_000);
//! let record = TrialRecord::from(events.as_slice());
//! assert_eq!(record.targets.last().copied(), solver.best_fitness());
//! # Ok::<(), cgea::error::SolverError>(())
//! ```

pub mod options;
pub mod partial_restart;
pub mod smart_restart;

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::problem::Fitness;

pub use options::{PartialRestartOptions, SmartRestartOptions};
pub use partial_restart::PartialRestartSolver;
pub use smart_restart::SmartRestartSolver;

/// A strict improvement of the best fitness, and the evaluation index that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitEvent<F> {
    pub fitness: F,
    pub evaluation: usize,
}

impl<F> HitEvent<F> {
    pub fn new(fitness: F, evaluation: usize) -> Self {
        Self {
            fitness,
            evaluation,
        }
    }
}

/// The hit events of one trial split into two parallel sequences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialRecord<F> {
    /// Evaluation index of every hit.
    pub hitting_times: Vec<usize>,
    /// Fitness reached at every hit.
    pub targets: Vec<F>,
}

impl<F: Copy> From<&[HitEvent<F>]> for TrialRecord<F> {
    fn from(events: &[HitEvent<F>]) -> Self {
        Self {
            hitting_times: events.iter().map(|event| event.evaluation).collect(),
            targets: events.iter().map(|event| event.fitness).collect(),
        }
    }
}

/// A black-box maximizer over fixed-length bitstrings.
pub trait Solver<F: Fitness> {
    /// Searches until `budget` oracle calls have been spent or the known optimum is hit.
    ///
    /// Every call starts from scratch: the evaluation counter, the best-so-far state and
    /// the event list are reset on entry. The budget is checked between batches, so the
    /// final batch may overshoot it. A zero budget performs no evaluation.
    fn run(&mut self, budget: usize) -> Vec<HitEvent<F>>;

    /// The best bitstring of the last run. Always `dimension` genes long.
    fn best_bitstring(&self) -> &[u8];

    /// The best fitness of the last run, or `None` if nothing was evaluated.
    fn best_fitness(&self) -> Option<F>;

    /// Oracle calls performed by the last run.
    fn evaluation_count(&self) -> usize;
}

/// Best-so-far bookkeeping shared by the solvers.
#[derive(Debug, Clone)]
pub(crate) struct BestSoFar<F> {
    bitstring: Vec<u8>,
    fitness: Option<F>,
    events: Vec<HitEvent<F>>,
}

impl<F: Fitness> BestSoFar<F> {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            bitstring: vec![0; dimension],
            fitness: None,
            events: Vec::new(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.bitstring.fill(0);
        self.fitness = None;
        self.events.clear();
    }

    pub(crate) fn bitstring(&self) -> &[u8] {
        &self.bitstring
    }

    pub(crate) fn fitness(&self) -> Option<F> {
        self.fitness
    }

    pub(crate) fn take_events(&mut self) -> Vec<HitEvent<F>> {
        std::mem::take(&mut self.events)
    }

    /// Offers the best candidate of a batch. Returns `true` once `upper_bound` is reached.
    ///
    /// A strict improvement records a hit event; an equal fitness only replaces the
    /// stored bitstring.
    pub(crate) fn observe(&mut self, candidate: &Candidate<F>, upper_bound: Option<F>) -> bool {
        let Some(fitness) = candidate.fitness() else {
            return false;
        };

        match self.fitness.map(|best| fitness.cmp(&best)) {
            None | Some(Ordering::Greater) => {
                self.fitness = Some(fitness);
                self.events
                    .push(HitEvent::new(fitness, candidate.evaluation()));
                self.bitstring.copy_from_slice(candidate.genes());
                tracing::debug!(
                    fitness = ?fitness,
                    evaluation = candidate.evaluation(),
                    "new best fitness"
                );
                upper_bound.is_some_and(|bound| fitness >= bound)
            }
            Some(Ordering::Equal) => {
                self.bitstring.copy_from_slice(candidate.genes());
                false
            }
            Some(Ordering::Less) => false,
        }
    }
}
