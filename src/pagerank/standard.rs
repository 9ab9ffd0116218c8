//! Standard PageRank algorithm
//!
//! Implements the classic PageRank with power iteration and proper
//! handling of dangling nodes. Each iteration evaluates, for every page,
//!
//! ```text
//! new(p) = (1 - d) / N + d * Σ_{q -> p} old(q) / out(q) + d * D / N
//! ```
//!
//! where `D` is the rank mass currently held by dangling pages. Spreading
//! `D` uniformly keeps the total mass at one.

use rayon::prelude::*;

use super::{check_damping, normalize, RankVector};
use crate::errors::{RankError, Result};
use crate::graph::csr::CsrGraph;

/// Outcome of a converged power iteration
#[derive(Debug, Clone)]
pub struct SolverResult {
    /// Renormalized rank vector
    pub ranks: RankVector,
    /// Number of iterations performed
    pub iterations: usize,
    /// Largest per-page change in the final iteration
    pub delta: f64,
    /// Whether the final change fell within the threshold
    pub converged: bool,
}

/// Iterate PageRank to convergence with the default iteration cap
pub fn iterate_ranks(graph: &CsrGraph, damping: f64, threshold: f64) -> Result<RankVector> {
    StandardPageRank::new()
        .with_damping(damping)
        .with_threshold(threshold)
        .run(graph)
        .map(|result| result.ranks)
}

/// Standard PageRank implementation
#[derive(Debug, Clone)]
pub struct StandardPageRank {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence threshold on the largest per-page change
    pub threshold: f64,
    /// Compute per-page updates on the rayon thread pool
    pub parallel: bool,
}

impl Default for StandardPageRank {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 10_000,
            threshold: 0.001,
            parallel: false,
        }
    }
}

impl StandardPageRank {
    /// Create a new StandardPageRank with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Toggle parallel per-page updates
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run PageRank on a graph from the uniform vector
    ///
    /// # Errors
    /// - [`RankError::InvalidConfig`] for an invalid damping factor,
    ///   threshold or iteration cap
    /// - [`RankError::EmptyCorpus`] if the graph has no pages
    /// - [`RankError::DidNotConverge`] if `max_iterations` runs out
    pub fn run(&self, graph: &CsrGraph) -> Result<SolverResult> {
        self.check(graph)?;
        let n = graph.num_nodes;
        self.solve(graph, vec![1.0 / n as f64; n])
    }

    /// Run PageRank starting from an existing rank vector
    ///
    /// `initial` must cover the same universe as `graph`.
    pub fn run_from(&self, graph: &CsrGraph, initial: &RankVector) -> Result<SolverResult> {
        self.check(graph)?;
        let scores = graph
            .universe()
            .map(|page| initial.rank(page))
            .collect::<Result<Vec<_>>>()?;
        if initial.len() != graph.num_nodes {
            return Err(RankError::invalid_config(
                "initial",
                format!(
                    "initial vector covers {} pages, graph has {}",
                    initial.len(),
                    graph.num_nodes
                ),
            ));
        }
        self.solve(graph, scores)
    }

    fn check(&self, graph: &CsrGraph) -> Result<()> {
        check_damping(self.damping)?;
        if !(self.threshold > 0.0) {
            return Err(RankError::invalid_config(
                "threshold",
                format!("must be greater than 0, got {}", self.threshold),
            ));
        }
        if self.max_iterations == 0 {
            return Err(RankError::invalid_config(
                "max_iterations",
                "must be at least 1",
            ));
        }
        if graph.is_empty() {
            return Err(RankError::EmptyCorpus);
        }
        Ok(())
    }

    fn solve(&self, graph: &CsrGraph, mut scores: Vec<f64>) -> Result<SolverResult> {
        let n = graph.num_nodes;
        let mut new_scores = vec![0.0; n];

        // Precompute dangling node mass contribution
        let dangling_nodes = graph.dangling_nodes();

        let teleport = (1.0 - self.damping) / n as f64;
        let mut iterations = 0;

        loop {
            iterations += 1;

            // Dangling pages link to every page, so their mass is spread evenly
            let dangling_mass: f64 = dangling_nodes.iter().map(|&d| scores[d as usize]).sum();
            let base = teleport + self.damping * dangling_mass / n as f64;

            let old = &scores;
            let update = |(node, slot): (usize, &mut f64)| {
                *slot = base + self.damping * incoming_mass(graph, old, node as u32);
            };
            if self.parallel {
                new_scores.par_iter_mut().enumerate().for_each(update);
            } else {
                new_scores.iter_mut().enumerate().for_each(update);
            }

            // Convergence delta (L-infinity norm)
            let delta = scores
                .iter()
                .zip(new_scores.iter())
                .map(|(old, new)| (old - new).abs())
                .fold(0.0, f64::max);

            // Swap buffers only after the whole vector is updated
            std::mem::swap(&mut scores, &mut new_scores);

            if delta <= self.threshold {
                #[cfg(feature = "tracing")]
                tracing::debug!(iterations, delta, "power iteration converged");

                // Normalize scores (they should already sum to ~1, but ensure numerical stability)
                normalize(&mut scores);
                return Ok(SolverResult {
                    ranks: RankVector::from_scores(graph, scores),
                    iterations,
                    delta,
                    converged: delta <= self.threshold,
                });
            }

            if iterations >= self.max_iterations {
                #[cfg(feature = "tracing")]
                tracing::warn!(iterations, delta, "power iteration hit the iteration cap");

                return Err(RankError::DidNotConverge { iterations, delta });
            }
        }
    }
}

/// Σ old(q) / out(q) over pages q linking to `node`
fn incoming_mass(graph: &CsrGraph, scores: &[f64], node: u32) -> f64 {
    graph
        .in_neighbors(node)
        .iter()
        .map(|&source| scores[source as usize] / graph.degree(source) as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::LinkGraphBuilder;

    fn build_triangle_graph() -> CsrGraph {
        let mut builder = LinkGraphBuilder::new();
        builder.link_pages("a", "b");
        builder.link_pages("b", "c");
        builder.link_pages("c", "a");
        CsrGraph::from_builder(&builder)
    }

    fn build_star_graph() -> CsrGraph {
        // Three spokes pointing at the hub, hub points back at one
        let mut builder = LinkGraphBuilder::new();
        for spoke in ["s1", "s2", "s3"] {
            builder.link_pages(spoke, "hub");
        }
        builder.link_pages("hub", "s1");
        CsrGraph::from_builder(&builder)
    }

    fn build_dangling_graph() -> CsrGraph {
        let mut builder = LinkGraphBuilder::new();
        builder.link_pages("a", "d");
        CsrGraph::from_builder(&builder)
    }

    #[test]
    fn test_triangle_graph_equal_scores() {
        let graph = build_triangle_graph();
        let result = StandardPageRank::new().run(&graph).unwrap();

        // All nodes should have equal score in a symmetric graph
        let expected = 1.0 / 3.0;
        for (_, score) in result.ranks.iter() {
            assert!((score - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_graph_hub_highest() {
        let graph = build_star_graph();
        let result = StandardPageRank::new().run(&graph).unwrap();

        let hub = result.ranks.get("hub").unwrap();
        for (page, score) in result.ranks.iter() {
            assert!(hub >= score, "{page} outranks hub");
        }
    }

    #[test]
    fn test_star_graph_closed_form() {
        // hub = t + d(s1 + 2t), s1 = t + d * hub, s2 = s3 = t
        let graph = build_star_graph();
        let result = StandardPageRank::new()
            .with_threshold(1e-12)
            .run(&graph)
            .unwrap();

        let d: f64 = 0.85;
        let t = (1.0 - d) / 4.0;
        let hub = (t + d * t + 2.0 * d * t) / (1.0 - d * d);
        let s1 = t + d * hub;

        assert!((result.ranks.get("hub").unwrap() - hub).abs() < 1e-9);
        assert!((result.ranks.get("s1").unwrap() - s1).abs() < 1e-9);
        assert!((result.ranks.get("s2").unwrap() - t).abs() < 1e-9);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let graph = build_star_graph();
        let result = StandardPageRank::new().run(&graph).unwrap();

        assert!((result.ranks.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_page() {
        let mut builder = LinkGraphBuilder::new();
        builder.add_page("only");
        let graph = CsrGraph::from_builder(&builder);

        let ranks = iterate_ranks(&graph, 0.85, 0.001).unwrap();
        assert_eq!(ranks.get("only"), Some(1.0));
    }

    #[test]
    fn test_pair_is_even_for_any_damping() {
        let mut builder = LinkGraphBuilder::new();
        builder.link_pages("a", "b");
        builder.link_pages("b", "a");
        let graph = CsrGraph::from_builder(&builder);

        for damping in [0.0, 0.5, 0.85, 1.0] {
            let ranks = iterate_ranks(&graph, damping, 1e-6).unwrap();
            assert!((ranks.get("a").unwrap() - 0.5).abs() < 1e-9);
            assert!((ranks.get("b").unwrap() - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dangling_mass_is_redistributed() {
        let graph = build_dangling_graph();
        let result = StandardPageRank::new()
            .with_threshold(1e-12)
            .run(&graph)
            .unwrap();

        // a = t + d * D / 2, D = d = a + d * a, with t = 0.075
        let d: f64 = 0.85;
        let a = 0.15 / 2.0 / (1.0 - d / 2.0 - d * d / 2.0);
        let dangling = a * (1.0 + d);

        assert!((result.ranks.get("a").unwrap() - a).abs() < 1e-9);
        assert!((result.ranks.get("d").unwrap() - dangling).abs() < 1e-9);
        assert!((result.ranks.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cap_reports_iterations_performed() {
        let graph = build_dangling_graph();
        for cap in 1..6 {
            let solver = StandardPageRank::new()
                .with_threshold(f64::MIN_POSITIVE)
                .with_max_iterations(cap);
            match solver.run(&graph) {
                Err(RankError::DidNotConverge { iterations, .. }) => assert_eq!(iterations, cap),
                other => panic!("expected DidNotConverge, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_result_reports_convergence() {
        let solver = StandardPageRank::new().with_threshold(1e-9);
        let result = solver.run(&build_star_graph()).unwrap();

        assert!(result.converged);
        assert!(result.delta <= solver.threshold);
        assert!(result.iterations > 1);
    }

    #[test]
    fn test_max_iterations_reports_did_not_converge() {
        let graph = build_triangle_graph();
        let err = StandardPageRank::new()
            .with_damping(1.0)
            .with_max_iterations(1)
            .with_threshold(1e-300)
            .run(&build_star_graph())
            .unwrap_err();
        assert!(matches!(err, RankError::DidNotConverge { iterations: 1, .. }));

        // The uniform start is already the fixed point of a symmetric cycle
        let result = StandardPageRank::new()
            .with_max_iterations(1)
            .run(&graph)
            .unwrap();
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_damping_factor() {
        let graph = build_star_graph();

        // Lower damping = more teleportation = more uniform scores
        let low = StandardPageRank::new().with_damping(0.5).run(&graph).unwrap();
        let high = StandardPageRank::new().with_damping(0.95).run(&graph).unwrap();

        let advantage = |r: &SolverResult| r.ranks.get("hub").unwrap() - r.ranks.get("s2").unwrap();
        assert!(advantage(&high) > advantage(&low));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let graph = build_star_graph();
        let sequential = StandardPageRank::new().with_threshold(1e-10);
        let parallel = sequential.clone().with_parallel(true);

        let a = sequential.run(&graph).unwrap();
        let b = parallel.run(&graph).unwrap();
        assert_eq!(a.ranks, b.ranks);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_rerun_from_converged_is_stable() {
        let graph = build_star_graph();
        let solver = StandardPageRank::new();
        let first = solver.run(&graph).unwrap();
        let second = solver.run_from(&graph, &first.ranks).unwrap();

        assert_eq!(second.iterations, 1);
        assert!(first.ranks.max_abs_diff(&second.ranks) <= solver.threshold);
    }

    #[test]
    fn test_run_from_rejects_foreign_vector() {
        let graph = build_star_graph();
        let foreign = StandardPageRank::new().run(&build_triangle_graph()).unwrap();

        assert!(matches!(
            StandardPageRank::new().run_from(&graph, &foreign.ranks),
            Err(RankError::UnknownPage(_))
        ));
    }

    #[test]
    fn test_run_from_rejects_oversized_vector() {
        let mut builder = LinkGraphBuilder::new();
        builder.link_pages("a", "b");
        builder.link_pages("b", "c");
        builder.link_pages("c", "a");
        builder.add_page("extra");
        let wider = StandardPageRank::new().run(&CsrGraph::from_builder(&builder)).unwrap();

        let err = StandardPageRank::new()
            .run_from(&build_triangle_graph(), &wider.ranks)
            .unwrap_err();
        assert!(matches!(err, RankError::InvalidConfig { field: "initial", .. }));
    }

    #[test]
    fn test_invalid_config() {
        let graph = build_triangle_graph();

        for threshold in [0.0, -1.0, f64::NAN] {
            let err = StandardPageRank::new().with_threshold(threshold).run(&graph).unwrap_err();
            assert!(matches!(err, RankError::InvalidConfig { field: "threshold", .. }));
        }

        let err = StandardPageRank::new().with_damping(2.0).run(&graph).unwrap_err();
        assert!(matches!(err, RankError::InvalidConfig { field: "damping", .. }));

        let err = StandardPageRank::new().with_max_iterations(0).run(&graph).unwrap_err();
        assert!(matches!(err, RankError::InvalidConfig { field: "max_iterations", .. }));
    }

    #[test]
    fn test_empty_graph() {
        let graph = CsrGraph::default();
        assert!(matches!(
            iterate_ranks(&graph, 0.85, 0.001),
            Err(RankError::EmptyCorpus)
        ));
    }
}
