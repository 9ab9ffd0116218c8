//! Monte-Carlo PageRank
//!
//! Estimates PageRank by walking the random-surfer Markov chain for a fixed
//! number of transitions and counting how often each page is visited.
//! The walk never stops early: the sample budget is the only bound.
//!
//! Randomness is always injected. [`sample_ranks`] takes any [`Rng`];
//! [`SamplingPageRank`] seeds a [`StdRng`] from its configured seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::transition::distribute_node;
use super::{check_damping, RankVector};
use crate::errors::{RankError, Result};
use crate::graph::csr::CsrGraph;

/// Odd 64-bit constant used to spread chain seeds apart
const CHAIN_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Sample PageRank with a single chain of `sample_count` transitions
///
/// # Errors
/// - [`RankError::InvalidConfig`] if `damping` is outside `[0, 1]` or
///   `sample_count` is zero
/// - [`RankError::EmptyCorpus`] if the graph has no pages
pub fn sample_ranks<R: Rng + ?Sized>(
    graph: &CsrGraph,
    damping: f64,
    sample_count: usize,
    rng: &mut R,
) -> Result<RankVector> {
    check_sampling_args(graph, damping, sample_count)?;
    let visits = walk_chain(graph, damping, sample_count, rng)?;
    Ok(visits_to_ranks(graph, &visits, sample_count))
}

/// Monte-Carlo PageRank estimator
#[derive(Debug, Clone)]
pub struct SamplingPageRank {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Total number of transitions across all chains
    pub sample_count: usize,
    /// Number of independent chains sharing the sample budget
    pub chains: usize,
    /// Run chains on the rayon thread pool
    pub parallel: bool,
    /// Base seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for SamplingPageRank {
    fn default() -> Self {
        Self {
            damping: 0.85,
            sample_count: 10_000,
            chains: 1,
            parallel: false,
            seed: None,
        }
    }
}

impl SamplingPageRank {
    /// Create a new SamplingPageRank with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the total sample budget
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Split the budget across `chains` independent walks
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    /// Run chains in parallel
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run the estimator on a graph
    ///
    /// With one chain this is [`sample_ranks`] driven by a [`StdRng`] seeded
    /// from `seed`. With several chains, chain `i` walks
    /// `sample_count / chains` steps (the first `sample_count % chains`
    /// chains take one extra) from its own derived seed, and the visit
    /// counts are pooled. Parallel and sequential runs agree exactly.
    pub fn run(&self, graph: &CsrGraph) -> Result<RankVector> {
        check_sampling_args(graph, self.damping, self.sample_count)?;
        if self.chains == 0 || self.chains > self.sample_count {
            return Err(RankError::invalid_config(
                "chains",
                format!(
                    "must be within [1, sample_count = {}], got {}",
                    self.sample_count, self.chains
                ),
            ));
        }

        let base_seed = self.seed.unwrap_or_else(rand::random);

        let ranks = if self.chains == 1 {
            let mut rng = StdRng::seed_from_u64(base_seed);
            sample_ranks(graph, self.damping, self.sample_count, &mut rng)?
        } else {
            let visits = self.run_chains(graph, base_seed)?;
            visits_to_ranks(graph, &visits, self.sample_count)
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            samples = self.sample_count,
            chains = self.chains,
            seed = base_seed,
            "sampling finished"
        );

        Ok(ranks)
    }

    fn run_chains(&self, graph: &CsrGraph, base_seed: u64) -> Result<Vec<u64>> {
        let per_chain = self.sample_count / self.chains;
        let remainder = self.sample_count % self.chains;

        let walk = |chain: usize| -> Result<Vec<u64>> {
            let steps = per_chain + usize::from(chain < remainder);
            let mut rng = StdRng::seed_from_u64(chain_seed(base_seed, chain));
            walk_chain(graph, self.damping, steps, &mut rng)
        };

        let per_chain_visits: Vec<Vec<u64>> = if self.parallel {
            (0..self.chains).into_par_iter().map(walk).collect::<Result<_>>()?
        } else {
            (0..self.chains).map(walk).collect::<Result<_>>()?
        };

        let mut visits = vec![0u64; graph.num_nodes];
        for chain_visits in per_chain_visits {
            for (total, v) in visits.iter_mut().zip(chain_visits) {
                *total += v;
            }
        }
        Ok(visits)
    }
}

fn check_sampling_args(graph: &CsrGraph, damping: f64, sample_count: usize) -> Result<()> {
    check_damping(damping)?;
    if sample_count == 0 {
        return Err(RankError::invalid_config(
            "sample_count",
            "must be at least 1",
        ));
    }
    if graph.is_empty() {
        return Err(RankError::EmptyCorpus);
    }
    Ok(())
}

fn chain_seed(base_seed: u64, chain: usize) -> u64 {
    base_seed.wrapping_add((chain as u64).wrapping_mul(CHAIN_SEED_STRIDE))
}

/// Walk `steps` transitions from a uniformly drawn start page
fn walk_chain<R: Rng + ?Sized>(
    graph: &CsrGraph,
    damping: f64,
    steps: usize,
    rng: &mut R,
) -> Result<Vec<u64>> {
    let mut visits = vec![0u64; graph.num_nodes];
    let mut current = rng.gen_range(0..graph.num_nodes) as u32;

    for _ in 0..steps {
        current = distribute_node(graph, current, damping).sample(rng)?;
        visits[current as usize] += 1;
    }

    Ok(visits)
}

fn visits_to_ranks(graph: &CsrGraph, visits: &[u64], sample_count: usize) -> RankVector {
    let scores = visits
        .iter()
        .map(|&v| v as f64 / sample_count as f64)
        .collect();
    RankVector::from_scores(graph, scores)
}
