//! # Caching Module
//!
//! This module provides the per-generation deduplication cache used by the
//! partial-restart solver. Sampled populations, their local-search twins and exhaustive
//! enumerations regularly contain identical bitstrings; the cache makes sure each
//! distinct bitstring costs one oracle call per generation.
//!
//! The cache indexes into the solver's candidate pool. Every pool slot has an atomic
//! `next` link, every bucket an atomic head, and both are claimed with compare-and-set,
//! so insertion is lock-free:
//!
//! 1. The candidate hashes to a bucket and tries to claim it.
//! 2. If the bucket is taken, it walks the chain comparing hash and genes.
//! 3. A match turns the candidate into a follower of that entry; no oracle call.
//! 4. Otherwise it appends itself to the tail, evaluates and publishes its fitness.
//!
//! Followers copy the fitness of their representative once the batch has joined. The
//! cache is cleared at the start of every generation and never removes entries.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::candidate::{Candidate, Resolution};
use crate::problem::{Fitness, FitnessOracle};

const EMPTY: usize = usize::MAX;

/// What one candidate learned while inserting itself.
enum Claim<F> {
    /// The candidate was new and called the oracle.
    Evaluated(F, usize),
    /// An identical candidate is already in the chain at this pool index.
    Duplicate(usize),
}

/// A lock-free, index-addressed hash chain over a candidate pool.
#[derive(Debug)]
pub struct EvaluationCache {
    buckets: Box<[AtomicUsize]>,
    links: Box<[AtomicUsize]>,
    parallel_threshold: usize,
}

impl EvaluationCache {
    /// Creates a cache for a pool of `capacity` candidates.
    ///
    /// The bucket count is the smallest prime above twice the capacity.
    pub fn new(capacity: usize) -> Self {
        let bucket_count = next_prime(2 * capacity + 1);
        Self {
            buckets: (0..bucket_count).map(|_| AtomicUsize::new(EMPTY)).collect(),
            links: (0..capacity).map(|_| AtomicUsize::new(EMPTY)).collect(),
            parallel_threshold: 1,
        }
    }

    /// Batches smaller than `threshold` are evaluated on the calling thread.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn capacity(&self) -> usize {
        self.links.len()
    }

    /// Forgets every entry. Called once per generation.
    pub fn clear(&mut self) {
        for slot in self.buckets.iter_mut().chain(self.links.iter_mut()) {
            *slot.get_mut() = EMPTY;
        }
    }

    /// Evaluates `pool[range]`, calling the oracle once per bitstring not yet cached.
    ///
    /// Candidates inserted by earlier batches since the last [`EvaluationCache::clear`]
    /// stay visible, so a batch of twins reuses the results of its population. Every
    /// oracle call increments `counter`, and the incremented value becomes the
    /// candidate's evaluation index.
    pub fn evaluate<O: FitnessOracle>(
        &self,
        pool: &mut [Candidate<O::Fitness>],
        range: Range<usize>,
        oracle: &O,
        counter: &AtomicUsize,
    ) {
        debug_assert!(pool.len() <= self.capacity());

        let claims: Vec<Claim<O::Fitness>> = {
            let shared: &[Candidate<O::Fitness>] = pool;
            let claim = |index: usize| self.claim(shared, index, oracle, counter);
            if range.len() >= self.parallel_threshold {
                range.clone().into_par_iter().map(claim).collect()
            } else {
                range.clone().map(claim).collect()
            }
        };

        for (index, claim) in range.clone().zip(claims) {
            match claim {
                Claim::Evaluated(fitness, evaluation) => pool[index].record(fitness, evaluation),
                Claim::Duplicate(representative) => pool[index].follow(representative),
            }
        }

        // The batch has joined, so every representative has published its result.
        for index in range {
            if let Resolution::FollowerOf(first) = pool[index].resolution() {
                let source = representative_of(pool, first);
                let (fitness, evaluation) = (pool[source].fitness(), pool[source].evaluation());
                pool[index].adopt(fitness, evaluation);
            }
        }
    }

    fn claim<O: FitnessOracle>(
        &self,
        pool: &[Candidate<O::Fitness>],
        index: usize,
        oracle: &O,
        counter: &AtomicUsize,
    ) -> Claim<O::Fitness> {
        let candidate = &pool[index];
        let bucket = &self.buckets[(candidate.hash() % self.buckets.len() as u64) as usize];

        let mut current =
            match bucket.compare_exchange(EMPTY, index, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => EMPTY,
                Err(head) => head,
            };

        while current != EMPTY {
            if pool[current].same_genes(candidate) {
                return Claim::Duplicate(current);
            }
            current = match self.links[current].compare_exchange(
                EMPTY,
                index,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => EMPTY,
                Err(next) => next,
            };
        }

        let fitness = oracle.fitness(candidate.genes());
        let evaluation = counter.fetch_add(1, Ordering::Relaxed) + 1;
        Claim::Evaluated(fitness, evaluation)
    }
}

fn representative_of<F: Fitness>(pool: &[Candidate<F>], mut index: usize) -> usize {
    while let Resolution::FollowerOf(next) = pool[index].resolution() {
        index = next;
    }
    index
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Smallest prime that is at least `n`.
pub(crate) fn next_prime(n: usize) -> usize {
    (n.max(2)..).find(|&candidate| is_prime(candidate)).unwrap_or(n)
}
