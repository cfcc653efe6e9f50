//! # Candidate
//!
//! A `Candidate` is one bitstring together with everything a generation learns about it:
//! its content hash, its fitness, the evaluation index at which the fitness was first
//! computed and its rank-based utility. Solvers allocate a fixed pool of candidates once
//! and reinitialize them in place every generation.

use crate::problem::Fitness;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// How a candidate obtained its fitness within the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Not evaluated yet.
    #[default]
    Unresolved,
    /// The candidate called the oracle itself.
    Representative,
    /// An identical bitstring at the given pool index was evaluated instead.
    FollowerOf(usize),
}

/// A bitstring and its evaluation state.
#[derive(Debug, Clone)]
pub struct Candidate<F> {
    genes: Vec<u8>,
    hash: u64,
    fitness: Option<F>,
    evaluation: usize,
    utility: f64,
    resolution: Resolution,
}

impl<F: Fitness> Candidate<F> {
    /// Creates an all-zeros candidate with `dimension` genes.
    pub fn new(dimension: usize) -> Self {
        let mut candidate = Self {
            genes: vec![0; dimension],
            hash: 0,
            fitness: None,
            evaluation: 0,
            utility: 0.0,
            resolution: Resolution::Unresolved,
        };
        candidate.rehash();
        candidate
    }

    /// Clears everything except the genes so the candidate can be reused.
    pub fn reinitialize(&mut self) {
        self.fitness = None;
        self.evaluation = 0;
        self.utility = 0.0;
        self.resolution = Resolution::Unresolved;
    }

    pub fn genes(&self) -> &[u8] {
        &self.genes
    }

    /// Mutable access to the genes. Call [`Candidate::rehash`] after editing them.
    pub fn genes_mut(&mut self) -> &mut [u8] {
        &mut self.genes
    }

    /// Copies the genes of `other` into this candidate and adopts its hash.
    pub fn copy_genes_from(&mut self, other: &Self) {
        self.genes.copy_from_slice(&other.genes);
        self.hash = other.hash;
    }

    /// Flips a single gene and refreshes the hash.
    pub fn flip(&mut self, gene: usize) {
        self.genes[gene] ^= 1;
        self.rehash();
    }

    /// Recomputes the FNV-1a content hash over all genes.
    pub fn rehash(&mut self) {
        self.hash = self.genes.iter().fold(FNV_OFFSET, |hash, &gene| {
            (hash ^ u64::from(gene)).wrapping_mul(FNV_PRIME)
        });
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Whether both candidates carry the same bitstring.
    pub fn same_genes(&self, other: &Self) -> bool {
        self.hash == other.hash && self.genes == other.genes
    }

    /// The fitness, or `None` before evaluation.
    pub fn fitness(&self) -> Option<F> {
        self.fitness
    }

    /// Value of the evaluation counter when this bitstring was scored.
    pub fn evaluation(&self) -> usize {
        self.evaluation
    }

    pub fn utility(&self) -> f64 {
        self.utility
    }

    pub fn set_utility(&mut self, utility: f64) {
        self.utility = utility;
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution != Resolution::Unresolved
    }

    /// Records a fresh oracle result.
    pub(crate) fn record(&mut self, fitness: F, evaluation: usize) {
        self.fitness = Some(fitness);
        self.evaluation = evaluation;
        self.resolution = Resolution::Representative;
    }

    /// Marks this candidate as a duplicate of the candidate at pool index `representative`.
    pub(crate) fn follow(&mut self, representative: usize) {
        self.resolution = Resolution::FollowerOf(representative);
    }

    /// Copies the result of the representative without changing the resolution.
    pub(crate) fn adopt(&mut self, fitness: Option<F>, evaluation: usize) {
        self.fitness = fitness;
        self.evaluation = evaluation;
    }
}
