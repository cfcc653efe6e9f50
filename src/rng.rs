//! # Random Number Generation
//!
//! The solvers consume randomness through the [`UniformRandomSource`] trait. All draws
//! happen on the thread that drives the search, never inside the parallel evaluation
//! phases, so a source only needs `&mut self` access.
//!
//! [`RandomNumberGenerator`] is the bundled source. It wraps a PCG XSL RR 128/64
//! generator and must always be seeded explicitly, which makes every run repeatable.
//!
//! ## Example
//!
//! ```rust
//! use cgea::rng::{RandomNumberGenerator, UniformRandomSource};
//!
//! let mut a = RandomNumberGenerator::from_seed(167_776_193);
//! let mut b = RandomNumberGenerator::from_seed(167_776_193);
//!
//! for _ in 0..5 {
//!     assert_eq!(a.next_f64(), b.next_f64());
//! }
//! ```
//!
//! ## Seeding from several entropy words
//!
//! [`SeedSource`] mixes any number of `u32` words into a seed buffer:
//!
//! ```rust
//! use cgea::rng::{RandomNumberGenerator, SeedSource};
//!
//! let source = SeedSource::new(&[2024, 7, 31]);
//! let rng = RandomNumberGenerator::from_seed_source(&source);
//! ```

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::error::{Result, SolverError};

/// A reproducible stream of uniform random numbers.
pub trait UniformRandomSource {
    /// Returns a uniform double in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Returns a uniform integer in `[0, bound)`, or `0` when `bound` is `0`.
    fn next_below(&mut self, bound: usize) -> usize;

    /// Returns `0` or `1` with equal probability.
    fn next_bit(&mut self) -> u8 {
        self.next_below(2) as u8
    }
}

/// A wrapper around a PCG-64 generator that provides the draws the solvers need.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: Pcg64,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed to use for the random number generator.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Creates a generator whose 32-byte state is drawn from a [`SeedSource`].
    pub fn from_seed_source(source: &SeedSource) -> Self {
        let mut seed = [0u8; 32];
        source.fill(&mut seed);
        Self {
            rng: Pcg64::from_seed(seed),
        }
    }

    /// Creates a generator from a list of entropy words mixed by a default-sized [`SeedSource`].
    pub fn from_entropies(entropies: &[u32]) -> Self {
        Self::from_seed_source(&SeedSource::new(entropies))
    }
}

impl UniformRandomSource for RandomNumberGenerator {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}

const DEFAULT_POOL_SIZE: usize = 4;
const INIT_A: u32 = 0x43b0_d7e5;
const MULT_A: u32 = 0x931e_8875;
const INIT_B: u32 = 0x8b51_f9dd;
const MULT_B: u32 = 0x58f3_8ded;
const MIX_MULT_L: u32 = 0xca01_f9dd;
const MIX_MULT_R: u32 = 0x4973_f715;
const XSHIFT: u32 = 16;

/// Mixes a list of entropy words into a fixed-size pool and expands it into seed bytes.
///
/// The same entropy words always produce the same bytes. Nothing is read from the
/// environment: callers decide where their entropy comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedSource {
    pool: Vec<u32>,
}

impl SeedSource {
    /// Creates a seed source with the default pool of four words.
    pub fn new(entropies: &[u32]) -> Self {
        Self {
            pool: mix_entropies(DEFAULT_POOL_SIZE, entropies),
        }
    }

    /// Creates a seed source with a custom pool size.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError::Configuration` if `pool_size` is smaller than four.
    pub fn with_pool_size(pool_size: usize, entropies: &[u32]) -> Result<Self> {
        if pool_size < DEFAULT_POOL_SIZE {
            return Err(SolverError::Configuration(format!(
                "The size of the entropy pool should be at least {}",
                DEFAULT_POOL_SIZE
            )));
        }

        Ok(Self {
            pool: mix_entropies(pool_size, entropies),
        })
    }

    /// Fills `destination` with seed bytes, cycling through the pool.
    pub fn fill(&self, destination: &mut [u8]) {
        let mut hash_constant = INIT_B;
        for (chunk, &word) in destination.chunks_mut(4).zip(self.pool.iter().cycle()) {
            let mut value = word ^ hash_constant;
            hash_constant = hash_constant.wrapping_mul(MULT_B);
            value = value.wrapping_mul(hash_constant);
            value ^= value >> XSHIFT;
            chunk.copy_from_slice(&value.to_be_bytes()[..chunk.len()]);
        }
    }
}

struct EntropyHasher {
    constant: u32,
}

impl EntropyHasher {
    fn hash(&mut self, value: u32) -> u32 {
        let mut value = value ^ self.constant;
        self.constant = self.constant.wrapping_mul(MULT_A);
        value = value.wrapping_mul(self.constant);
        value ^ (value >> XSHIFT)
    }
}

fn mix(x: u32, y: u32) -> u32 {
    let result = MIX_MULT_L.wrapping_mul(x).wrapping_sub(MIX_MULT_R.wrapping_mul(y));
    result ^ (result >> XSHIFT)
}

fn mix_entropies(pool_size: usize, entropies: &[u32]) -> Vec<u32> {
    let mut hasher = EntropyHasher { constant: INIT_A };
    let mut pool: Vec<u32> = (0..pool_size)
        .map(|i| hasher.hash(entropies.get(i).copied().unwrap_or(0)))
        .collect();

    for i in 0..pool_size {
        for j in 0..pool_size {
            if i != j {
                pool[j] = mix(pool[j], hasher.hash(pool[i]));
            }
        }
    }

    // Words beyond the pool size are folded into every slot.
    for &entropy in entropies.iter().skip(pool_size) {
        for slot in pool.iter_mut() {
            *slot = mix(*slot, hasher.hash(entropy));
        }
    }

    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut rng1 = RandomNumberGenerator::from_seed(42);
        let mut rng2 = RandomNumberGenerator::from_seed(42);

        let nums1: Vec<f64> = (0..16).map(|_| rng1.next_f64()).collect();
        let nums2: Vec<f64> = (0..16).map(|_| rng2.next_f64()).collect();

        assert_eq!(nums1, nums2);
    }

    #[test]
    fn test_clone() {
        let mut rng1 = RandomNumberGenerator::from_seed(7);
        rng1.next_f64();
        let mut rng2 = rng1.clone();

        for _ in 0..8 {
            assert_eq!(rng1.next_below(1000), rng2.next_below(1000));
        }
    }

    #[test]
    fn test_next_f64_in_unit_interval() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_next_below_bounds() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        assert_eq!(rng.next_below(0), 0);
        assert_eq!(rng.next_below(1), 0);

        let mut seen = [false; 5];
        for _ in 0..500 {
            let x = rng.next_below(5);
            assert!(x < 5);
            seen[x] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_next_bit() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        let ones: usize = (0..1000).map(|_| rng.next_bit() as usize).sum();
        assert!(ones > 400 && ones < 600);
    }

    #[test]
    fn test_seed_source_is_deterministic() {
        let a = SeedSource::new(&[1, 2, 3]);
        let b = SeedSource::new(&[1, 2, 3]);
        let mut buf_a = [0u8; 32];
        let mut buf_b = [0u8; 32];
        a.fill(&mut buf_a);
        b.fill(&mut buf_b);
        assert_eq!(buf_a, buf_b);

        let c = SeedSource::new(&[1, 2, 4]);
        let mut buf_c = [0u8; 32];
        c.fill(&mut buf_c);
        assert_ne!(buf_a, buf_c);
    }

    #[test]
    fn test_seed_source_uses_extra_entropy() {
        let short = SeedSource::new(&[1, 2, 3, 4]);
        let long = SeedSource::new(&[1, 2, 3, 4, 5]);
        assert_ne!(short, long);
    }

    #[test]
    fn test_seed_source_fill_odd_length() {
        let source = SeedSource::new(&[9]);
        let mut full = [0u8; 8];
        let mut partial = [0u8; 7];
        source.fill(&mut full);
        source.fill(&mut partial);
        assert_eq!(&full[..7], &partial[..]);
    }

    #[test]
    fn test_seed_source_pool_size_validation() {
        assert!(SeedSource::with_pool_size(3, &[1]).is_err());
        assert!(SeedSource::with_pool_size(8, &[1]).is_ok());
    }

    #[test]
    fn test_from_entropies_reproducible() {
        let mut a = RandomNumberGenerator::from_entropies(&[167_776_193]);
        let mut b = RandomNumberGenerator::from_entropies(&[167_776_193]);
        for _ in 0..8 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }
}
