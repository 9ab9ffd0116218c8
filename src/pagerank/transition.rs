//! Random surfer transition model
//!
//! Given the current page, produces the one-step probability distribution
//! over the next page. With probability `damping` the surfer follows one of
//! the page's links uniformly; otherwise it jumps to any page uniformly.
//! A dangling page always jumps uniformly.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::check_damping;
use crate::errors::{RankError, Result};
use crate::graph::csr::CsrGraph;

/// Next-page distribution over the whole universe
///
/// Built fresh for every (page, damping) pair and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TransitionDistribution<'g> {
    graph: &'g CsrGraph,
    probs: Vec<f64>,
}

impl<'g> TransitionDistribution<'g> {
    /// Probability of moving to `page`
    pub fn probability(&self, page: &str) -> Result<f64> {
        let node = self.graph.node_id(page)?;
        Ok(self.probs[node as usize])
    }

    /// Probability of moving to node `node`
    pub fn prob(&self, node: u32) -> f64 {
        self.probs.get(node as usize).copied().unwrap_or(0.0)
    }

    /// Iterate `(page, probability)` in universe order
    pub fn iter(&self) -> impl Iterator<Item = (&'g str, f64)> + '_ {
        let graph = self.graph;
        self.probs
            .iter()
            .enumerate()
            .map(move |(i, &p)| (graph.page(i as u32), p))
    }

    /// Probabilities indexed by node ID
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    pub fn sum(&self) -> f64 {
        self.probs.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Draw the next node by weighted random choice
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u32> {
        let index = WeightedIndex::new(&self.probs)
            .map_err(|e| RankError::invalid_config("damping", e.to_string()))?;
        Ok(index.sample(rng) as u32)
    }
}

/// Distribution over the next page when the surfer is on `page`
///
/// # Errors
/// - [`RankError::InvalidConfig`] if `damping` is outside `[0, 1]`
/// - [`RankError::EmptyCorpus`] if the graph has no pages
/// - [`RankError::UnknownPage`] if `page` is not in the universe
///
/// Lookups go through page names; raw node IDs stay inside the crate.
///
/// ```compile_fail
/// use rapid_linkrank::pagerank::transition::distribute_node;
/// ```
pub fn distribute<'g>(
    graph: &'g CsrGraph,
    page: &str,
    damping: f64,
) -> Result<TransitionDistribution<'g>> {
    check_damping(damping)?;
    if graph.is_empty() {
        return Err(RankError::EmptyCorpus);
    }
    let node = graph.node_id(page)?;
    Ok(distribute_node(graph, node, damping))
}

/// Node-indexed variant of [`distribute`] for callers that already hold a
/// valid node ID and a validated damping factor
pub(crate) fn distribute_node(graph: &CsrGraph, node: u32, damping: f64) -> TransitionDistribution<'_> {
    let n = graph.num_nodes;
    let links = graph.neighbors(node);

    let probs = if links.is_empty() {
        vec![1.0 / n as f64; n]
    } else {
        let mut probs = vec![(1.0 - damping) / n as f64; n];
        let follow = damping / links.len() as f64;
        for &target in links {
            probs[target as usize] += follow;
        }
        probs
    };

    TransitionDistribution { graph, probs }
}
