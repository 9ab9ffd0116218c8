//! Shared configuration types

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Configuration for one ranking run
///
/// Deserializes from JSON with every field optional; unknown fields are
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Probability of following a link rather than jumping (0.0 - 1.0)
    pub damping: f64,
    /// Number of transitions the sampling estimator walks
    pub sample_count: usize,
    /// Largest per-page change at which power iteration stops
    pub threshold: f64,
    /// Iteration cap for power iteration
    pub max_iterations: usize,
    /// Base seed for the sampler; `None` draws one from OS entropy
    pub seed: Option<u64>,
    /// Independent sampling chains sharing `sample_count`
    pub chains: usize,
    /// Use the rayon thread pool for chains and per-page updates
    pub parallel: bool,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            sample_count: 10_000,
            threshold: 0.001,
            max_iterations: 10_000,
            seed: None,
            chains: 1,
            parallel: false,
        }
    }
}

impl RankConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the sample budget
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Set the convergence threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the sampler seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of sampling chains
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    /// Toggle rayon parallelism
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
