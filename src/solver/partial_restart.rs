//! # Partial-Restart Compact Evolutionary Algorithm
//!
//! The solver keeps a [`ProbabilisticModel`] and resolves one open gene per generation:
//!
//! 1. sample a population from the model and evaluate it through the [`EvaluationCache`];
//! 2. rank the population and give every candidate the utility `1 / rank`, with tied
//!    candidates sharing the utility of the worst rank in their tie;
//! 3. pick the open gene with the steepest utility-weighted gradient, breaking exact
//!    ties uniformly by reservoir sampling;
//! 4. flip that gene in every candidate and keep the twin when it is fitter (or, on a
//!    tie, with probability one half);
//! 5. fix the gene to the majority value of the upper half of the population.
//!
//! Once at most `log2(population_size)` genes remain open, every completion of the open
//! genes is enumerated and evaluated, which ends the epoch. The next epoch starts from
//! the best bitstring found, with each gene independently forgotten (reset to one half)
//! with the configured reset probability.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::caching::EvaluationCache;
use crate::candidate::Candidate;
use crate::error::{Result, SolverError};
use crate::model::ProbabilisticModel;
use crate::problem::{Fitness, FitnessOracle};
use crate::rng::{RandomNumberGenerator, UniformRandomSource};

use super::{BestSoFar, HitEvent, PartialRestartOptions, Solver};

/// How a restart epoch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpochOutcome {
    BudgetExhausted,
    Converged,
    OptimumFound,
}

/// Partial-restart compact evolutionary algorithm.
///
/// # Examples
///
/// ```
/// use cgea::problem::IsingRing;
/// use cgea::rng::RandomNumberGenerator;
/// use cgea::solver::{PartialRestartOptions, PartialRestartSolver, Solver};
///
/// let problem = IsingRing::new(4)?;
/// let rng = RandomNumberGenerator::from_seed(167_776_193);
/// let mut solver = PartialRestartSolver::new(problem, rng, PartialRestartOptions::default())?;
///
/// let events = solver.run(10_000);
/// assert_eq!(events.last().map(|event| event.fitness), Some(4));
/// # Ok::<(), cgea::error::SolverError>(())
/// ```
pub struct PartialRestartSolver<O: FitnessOracle, R = RandomNumberGenerator> {
    oracle: O,
    rng: R,
    options: PartialRestartOptions,
    /// Population in `0..population_size`, local-search twins after it.
    candidates: Vec<Candidate<O::Fitness>>,
    cache: EvaluationCache,
    model: ProbabilisticModel,
    starting: ProbabilisticModel,
    gradients: Vec<f64>,
    open_genes: Vec<usize>,
    ranking: Vec<usize>,
    evaluations: AtomicUsize,
    best: BestSoFar<O::Fitness>,
}

impl<O, R> PartialRestartSolver<O, R>
where
    O: FitnessOracle,
    R: UniformRandomSource,
{
    /// Creates a solver for `oracle` that draws all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::Configuration` if the options are invalid or the oracle
    /// has no genes.
    pub fn new(oracle: O, rng: R, options: PartialRestartOptions) -> Result<Self> {
        options.validate()?;

        let dimension = oracle.dimension();
        if dimension == 0 {
            return Err(SolverError::Configuration(
                "Problem dimension must be greater than 0".to_string(),
            ));
        }

        let pool_size = 2 * options.get_population_size();
        let cache = EvaluationCache::new(pool_size)
            .with_parallel_threshold(options.get_parallel_threshold());

        Ok(Self {
            oracle,
            rng,
            candidates: (0..pool_size).map(|_| Candidate::new(dimension)).collect(),
            cache,
            model: ProbabilisticModel::uniform(dimension),
            starting: ProbabilisticModel::uniform(dimension),
            gradients: vec![0.0; dimension],
            open_genes: Vec::with_capacity(dimension),
            ranking: Vec::with_capacity(options.get_population_size()),
            evaluations: AtomicUsize::new(0),
            best: BestSoFar::new(dimension),
            options,
        })
    }

    pub fn options(&self) -> &PartialRestartOptions {
        &self.options
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The live model of the current (or last) epoch.
    pub fn model(&self) -> &ProbabilisticModel {
        &self.model
    }

    /// The distribution the next epoch will start from.
    pub fn starting_distribution(&self) -> &ProbabilisticModel {
        &self.starting
    }

    fn population_size(&self) -> usize {
        self.options.get_population_size()
    }

    fn run_epoch(&mut self, budget: usize) -> EpochOutcome {
        let threshold = (self.population_size() as f64).log2();
        let upper_bound = self.oracle.fitness_upper_bound();

        loop {
            if self.evaluation_count() >= budget {
                return EpochOutcome::BudgetExhausted;
            }

            self.cache.clear();
            self.open_genes.clear();
            self.open_genes.extend(self.model.open_genes());

            let exhaustive = self.open_genes.len() as f64 <= threshold;
            if exhaustive {
                self.enumerate();
            } else {
                self.generation();
            }

            if self.best.observe(&self.candidates[0], upper_bound) {
                return EpochOutcome::OptimumFound;
            }
            if exhaustive {
                return EpochOutcome::Converged;
            }
        }
    }

    /// Evaluates every completion of the open genes. Leaves them sorted best first.
    fn enumerate(&mut self) {
        let count = 1usize << self.open_genes.len();
        let model = &self.model;
        let open_genes = &self.open_genes;

        self.candidates[..count]
            .par_iter_mut()
            .enumerate()
            .for_each(|(assignment, candidate)| {
                candidate.reinitialize();
                let genes = candidate.genes_mut();
                for (gene, value) in genes.iter_mut().enumerate() {
                    if let Some(fixed) = model.fixed_value(gene) {
                        *value = fixed;
                    }
                }
                for (bit, &gene) in open_genes.iter().enumerate() {
                    genes[gene] = ((assignment >> bit) & 1) as u8;
                }
                candidate.rehash();
            });

        self.cache
            .evaluate(&mut self.candidates, 0..count, &self.oracle, &self.evaluations);
        sort_descending(&mut self.candidates[..count]);

        trace!(
            open_genes = self.open_genes.len(),
            assignments = count,
            evaluations = self.evaluation_count(),
            "exhaustive enumeration"
        );
    }

    /// Runs one model-based generation, converging exactly one open gene.
    fn generation(&mut self) {
        let population_size = self.population_size();

        for candidate in &mut self.candidates[..population_size] {
            candidate.reinitialize();
            self.model.sample_into(candidate.genes_mut(), &mut self.rng);
            candidate.rehash();
        }
        self.cache.evaluate(
            &mut self.candidates,
            0..population_size,
            &self.oracle,
            &self.evaluations,
        );

        self.assign_utilities();
        let gene = self.select_gene();
        self.local_search(gene);
        self.converge_gene(gene);
    }

    fn assign_utilities(&mut self) {
        let population_size = self.population_size();
        let candidates = &self.candidates;

        self.ranking.clear();
        self.ranking.extend(0..population_size);
        self.ranking
            .sort_by(|&a, &b| candidates[b].fitness().cmp(&candidates[a].fitness()));

        let ranked: Vec<Option<O::Fitness>> = self
            .ranking
            .iter()
            .map(|&index| candidates[index].fitness())
            .collect();

        for (&index, utility) in self.ranking.iter().zip(rank_utilities(&ranked)) {
            self.candidates[index].set_utility(utility);
        }
    }

    fn select_gene(&mut self) -> usize {
        self.gradients.fill(0.0);
        for candidate in &self.candidates[..self.options.get_population_size()] {
            let genes = candidate.genes();
            let utility = candidate.utility();
            for &gene in &self.open_genes {
                let p = self.model.marginal(gene);
                if genes[gene] == 1 {
                    self.gradients[gene] += (1.0 - p) * utility;
                } else {
                    self.gradients[gene] -= p * utility;
                }
            }
        }

        steepest_gene(&self.gradients, &self.open_genes, &mut self.rng)
    }

    fn local_search(&mut self, gene: usize) {
        let population_size = self.population_size();

        let (originals, twins) = self.candidates.split_at_mut(population_size);
        for (original, twin) in originals.iter().zip(twins.iter_mut()) {
            twin.reinitialize();
            twin.copy_genes_from(original);
            twin.flip(gene);
        }
        self.cache.evaluate(
            &mut self.candidates,
            population_size..2 * population_size,
            &self.oracle,
            &self.evaluations,
        );

        for i in 0..population_size {
            let twin = i + population_size;
            let replace = match self.candidates[twin]
                .fitness()
                .cmp(&self.candidates[i].fitness())
            {
                Ordering::Greater => true,
                Ordering::Equal => self.rng.next_f64() < 0.5,
                Ordering::Less => false,
            };
            if replace {
                self.candidates.swap(i, twin);
            }
        }
    }

    /// Fixes `gene` by majority vote of the better half of the population.
    fn converge_gene(&mut self, gene: usize) {
        let population_size = self.population_size();
        sort_descending(&mut self.candidates[..population_size]);

        let voters = population_size / 2;
        let ones = self.candidates[..voters]
            .iter()
            .filter(|candidate| candidate.genes()[gene] == 1)
            .count();
        let zeros = voters - ones;

        let value = match ones.cmp(&zeros) {
            Ordering::Greater => 1,
            Ordering::Less => 0,
            Ordering::Equal => self.rng.next_bit(),
        };
        self.model.converge(gene, value);

        trace!(
            gene,
            ones,
            zeros,
            value,
            evaluations = self.evaluation_count(),
            "converged gene"
        );
    }
}

impl<O, R> Solver<O::Fitness> for PartialRestartSolver<O, R>
where
    O: FitnessOracle,
    R: UniformRandomSource,
{
    fn run(&mut self, budget: usize) -> Vec<HitEvent<O::Fitness>> {
        *self.evaluations.get_mut() = 0;
        self.best.reset();
        self.starting.reset_uniform();

        let mut epoch = 0usize;
        while self.evaluation_count() < budget {
            epoch += 1;
            self.model.copy_from(&self.starting);
            debug!(
                epoch,
                open_genes = self.model.open_gene_count(),
                evaluations = self.evaluation_count(),
                population_size = self.population_size(),
                "starting restart epoch"
            );

            if self.run_epoch(budget) == EpochOutcome::OptimumFound {
                break;
            }
            self.starting.restart_from(
                self.best.bitstring(),
                self.options.get_reset_probability(),
                &mut self.rng,
            );
        }

        let events = self.best.take_events();
        info!(
            epochs = epoch,
            events = events.len(),
            evaluations = self.evaluation_count(),
            best_fitness = ?self.best.fitness(),
            "partial-restart run finished"
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
        self.evaluations.load(AtomicOrdering::Relaxed)
    }
}

fn sort_descending<F: Fitness>(candidates: &mut [Candidate<F>]) {
    candidates.sort_by(|a, b| b.fitness().cmp(&a.fitness()));
}

/// Rank-based utilities for values already sorted best first.
///
/// The candidate at rank `r` (starting at one) gets `1 / r`; all members of a run of
/// equal values get the utility of the last rank in that run.
pub(crate) fn rank_utilities<T: PartialEq>(ranked: &[T]) -> Vec<f64> {
    let mut utilities = vec![0.0; ranked.len()];
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start + 1;
        while end < ranked.len() && ranked[end] == ranked[start] {
            end += 1;
        }
        utilities[start..end].fill(1.0 / end as f64);
        start = end;
    }
    utilities
}

/// The gene among `genes` with the largest absolute gradient.
///
/// Exact ties are broken uniformly with a single pass of reservoir sampling, so even an
/// all-zero gradient yields a uniformly random gene.
pub(crate) fn steepest_gene<R: UniformRandomSource>(
    gradients: &[f64],
    genes: &[usize],
    rng: &mut R,
) -> usize {
    let mut selected = genes.first().copied().unwrap_or(0);
    let mut steepest = f64::NEG_INFINITY;
    let mut ties = 0;

    for &gene in genes {
        let magnitude = gradients[gene].abs();
        if magnitude > steepest {
            steepest = magnitude;
            selected = gene;
            ties = 1;
        } else if magnitude == steepest {
            ties += 1;
            if rng.next_below(ties) == 0 {
                selected = gene;
            }
        }
    }

    selected
}
