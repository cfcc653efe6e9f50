//! # Probabilistic Model
//!
//! A `ProbabilisticModel` stands in for an explicit population: it keeps, for every gene,
//! the marginal probability that the gene is `1`. Sampling a bitstring draws each gene
//! independently from its marginal.
//!
//! A gene whose marginal is exactly `0` or `1` is *converged*. Converged genes are fixed
//! to that value and no longer take part in the search of the partial-restart solver.

use crate::rng::UniformRandomSource;

/// Per-gene marginal probabilities of a `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilisticModel {
    marginals: Vec<f64>,
}

impl ProbabilisticModel {
    /// Creates a model where every gene is `1` with probability one half.
    pub fn uniform(dimension: usize) -> Self {
        Self {
            marginals: vec![0.5; dimension],
        }
    }

    /// Creates a model from explicit marginals.
    pub fn from_marginals(marginals: Vec<f64>) -> Self {
        Self { marginals }
    }

    pub fn dimension(&self) -> usize {
        self.marginals.len()
    }

    pub fn marginals(&self) -> &[f64] {
        &self.marginals
    }

    pub fn marginal(&self, gene: usize) -> f64 {
        self.marginals[gene]
    }

    /// Resets every marginal to one half.
    pub fn reset_uniform(&mut self) {
        self.marginals.fill(0.5);
    }

    /// Overwrites this model with the marginals of `other`.
    pub fn copy_from(&mut self, other: &ProbabilisticModel) {
        self.marginals.copy_from_slice(&other.marginals);
    }

    /// The fixed value of a converged gene, or `None` while the gene is open.
    pub fn fixed_value(&self, gene: usize) -> Option<u8> {
        let p = self.marginals[gene];
        if p == 0.0 {
            Some(0)
        } else if p == 1.0 {
            Some(1)
        } else {
            None
        }
    }

    pub fn is_converged(&self, gene: usize) -> bool {
        self.fixed_value(gene).is_some()
    }

    /// Indices of the genes that are not converged, in ascending order.
    pub fn open_genes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.marginals.len()).filter(move |&gene| !self.is_converged(gene))
    }

    pub fn open_gene_count(&self) -> usize {
        self.open_genes().count()
    }

    /// Draws every gene independently from its marginal.
    ///
    /// A uniform draw `u` yields a `1` when `u < p`, so converged genes reproduce their
    /// fixed value exactly.
    pub fn sample_into<R: UniformRandomSource>(&self, genes: &mut [u8], rng: &mut R) {
        for (gene, &p) in genes.iter_mut().zip(&self.marginals) {
            *gene = u8::from(rng.next_f64() < p);
        }
    }

    /// Fixes a gene to `value`, marking it converged.
    pub fn converge(&mut self, gene: usize, value: u8) {
        self.marginals[gene] = f64::from(value.min(1));
    }

    /// Moves a marginal by `delta` towards `bit` and clamps it into `[lower, upper]`.
    pub fn shift_toward(&mut self, gene: usize, bit: u8, delta: f64, lower: f64, upper: f64) {
        let step = if bit == 1 { delta } else { -delta };
        self.marginals[gene] = (self.marginals[gene] + step).clamp(lower, upper);
    }

    /// Derives a restart distribution from a reference bitstring.
    ///
    /// Each gene independently goes back to one half with probability `reset_probability`
    /// and is otherwise pinned to the reference value.
    pub fn restart_from<R: UniformRandomSource>(
        &mut self,
        reference: &[u8],
        reset_probability: f64,
        rng: &mut R,
    ) {
        for (p, &bit) in self.marginals.iter_mut().zip(reference) {
            *p = if rng.next_f64() < reset_probability {
                0.5
            } else {
                f64::from(bit)
            };
        }
    }
}
