//! Ranking engine: orchestrates validation and both estimators.
//!
//! The [`RankingEngine`] owns a [`RankConfig`]. Calling
//! [`RankingEngine::run`] validates the configuration once, then runs the
//! sampling estimator and the power-iteration solver over the same graph,
//! notifying an optional [`RankObserver`] at each stage boundary.
//!
//! Configuration errors and an empty corpus surface before either
//! estimator runs, so a failed run never leaves partial results behind.

use serde::Serialize;

use crate::errors::{RankError, Result};
use crate::graph::csr::CsrGraph;
use crate::pagerank::sampling::SamplingPageRank;
use crate::pagerank::standard::StandardPageRank;
use crate::pagerank::RankVector;
use crate::pipeline::observer::{
    NoopObserver, RankObserver, StageClock, StageReport, StageReportBuilder, STAGE_ITERATE,
    STAGE_SAMPLE, STAGE_VALIDATE,
};
use crate::pipeline::validation::ValidationEngine;
use crate::types::RankConfig;

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for an engine stage (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("rank_stage", stage = $name).entered();
    };
}

/// Output of one engine run: one vector per estimator, never merged.
#[derive(Debug, Clone, Serialize)]
pub struct RankReport {
    /// Monte-Carlo estimate
    pub sampled: RankVector,
    /// Power-iteration estimate
    pub iterated: RankVector,
    /// Iterations the solver needed
    pub iterations: usize,
    /// Whether the solver's final change fell within the threshold
    pub converged: bool,
    /// Largest per-page change in the solver's final iteration
    pub delta: f64,
}

impl RankReport {
    /// Largest per-page disagreement between the two estimates
    pub fn max_deviation(&self) -> f64 {
        self.sampled.max_abs_diff(&self.iterated)
    }
}

/// Orchestrator owning the run configuration.
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    config: RankConfig,
}

impl RankingEngine {
    pub fn new(config: RankConfig) -> Self {
        Self { config }
    }

    /// Start from the default configuration.
    pub fn builder() -> RankingEngineBuilder {
        RankingEngineBuilder::default()
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Validate the configuration without running anything.
    ///
    /// Warnings are logged; the first error is returned as
    /// [`RankError::InvalidConfig`].
    pub fn validate(&self) -> Result<()> {
        let report = ValidationEngine::with_defaults().validate(&self.config);

        #[cfg(feature = "tracing")]
        for warning in report.warnings() {
            tracing::warn!(field = warning.field, "{warning}");
        }

        report.into_result()
    }

    /// Rank a graph with both estimators.
    pub fn run(&self, graph: &CsrGraph) -> Result<RankReport> {
        self.run_with_observer(graph, &mut NoopObserver)
    }

    /// Rank a graph with both estimators, reporting each stage to `observer`.
    ///
    /// Stages run in order:
    /// 1. Validate the configuration (and reject an empty corpus)
    /// 2. Sample
    /// 3. Iterate
    pub fn run_with_observer(
        &self,
        graph: &CsrGraph,
        observer: &mut impl RankObserver,
    ) -> Result<RankReport> {
        let cfg = &self.config;

        // Stage 1: Validate
        {
            trace_stage!(STAGE_VALIDATE);
            observer.on_stage_start(STAGE_VALIDATE);
            let clock = StageClock::start();
            self.validate()?;
            if graph.is_empty() {
                return Err(RankError::EmptyCorpus);
            }
            observer.on_stage_end(STAGE_VALIDATE, &StageReport::new(clock.elapsed()));
        }

        // Stage 2: Sample
        let sampled = {
            trace_stage!(STAGE_SAMPLE);
            observer.on_stage_start(STAGE_SAMPLE);
            let clock = StageClock::start();
            let mut sampler = SamplingPageRank::new()
                .with_damping(cfg.damping)
                .with_sample_count(cfg.sample_count)
                .with_chains(cfg.chains)
                .with_parallel(cfg.parallel);
            sampler.seed = cfg.seed;
            let sampled = sampler.run(graph)?;
            let report = StageReportBuilder::new(clock.elapsed())
                .samples(cfg.sample_count)
                .build();
            observer.on_stage_end(STAGE_SAMPLE, &report);
            observer.on_sampled(&sampled);
            sampled
        };

        // Stage 3: Iterate
        let solved = {
            trace_stage!(STAGE_ITERATE);
            observer.on_stage_start(STAGE_ITERATE);
            let clock = StageClock::start();
            let solved = StandardPageRank::new()
                .with_damping(cfg.damping)
                .with_threshold(cfg.threshold)
                .with_max_iterations(cfg.max_iterations)
                .with_parallel(cfg.parallel)
                .run(graph)?;
            let report = StageReportBuilder::new(clock.elapsed())
                .iterations(solved.iterations)
                .converged(solved.converged)
                .residual(solved.delta)
                .build();
            observer.on_stage_end(STAGE_ITERATE, &report);
            observer.on_iterated(&solved);
            solved
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            pages = graph.num_nodes,
            links = graph.num_links(),
            iterations = solved.iterations,
            "ranking finished"
        );

        Ok(RankReport {
            sampled,
            iterated: solved.ranks,
            iterations: solved.iterations,
            converged: solved.converged,
            delta: solved.delta,
        })
    }
}

// ============================================================================
// RankingEngineBuilder: fluent construction
// ============================================================================

/// Fluent builder for a [`RankingEngine`].
///
/// ```
/// # use rapid_linkrank::pipeline::runner::RankingEngine;
/// let engine = RankingEngine::builder()
///     .damping(0.85)
///     .sample_count(10_000)
///     .seed(42)
///     .build();
/// assert_eq!(engine.config().seed, Some(42));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RankingEngineBuilder {
    config: RankConfig,
}

impl RankingEngineBuilder {
    pub fn damping(mut self, damping: f64) -> Self {
        self.config.damping = damping;
        self
    }

    pub fn sample_count(mut self, sample_count: usize) -> Self {
        self.config.sample_count = sample_count;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn chains(mut self, chains: usize) -> Self {
        self.config.chains = chains;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn build(self) -> RankingEngine {
        RankingEngine::new(self.config)
    }
}

// ============================================================================
// Tests
// ============================================================================
