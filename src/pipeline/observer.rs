//! Engine observer: hooks at stage boundaries for timing and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Use cases include timing stages, capturing the intermediate
//! rank vectors, and emitting structured telemetry.

use std::time::{Duration, Instant};

use crate::pagerank::standard::SolverResult;
use crate::pagerank::RankVector;

/// Configuration validation stage.
pub const STAGE_VALIDATE: &str = "validate";
/// Monte-Carlo sampling stage.
pub const STAGE_SAMPLE: &str = "sample";
/// Power iteration stage.
pub const STAGE_ITERATE: &str = "iterate";

/// Measures wall-clock time of one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    started: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Metrics reported at the end of a stage.
///
/// Only the fields meaningful for a stage are set; the rest stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    elapsed: Duration,
    samples: Option<usize>,
    iterations: Option<usize>,
    converged: Option<bool>,
    residual: Option<f64>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn samples(&self) -> Option<usize> {
        self.samples
    }

    pub fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    pub fn converged(&self) -> Option<bool> {
        self.converged
    }

    pub fn residual(&self) -> Option<f64> {
        self.residual
    }
}

/// Fluent constructor for [`StageReport`].
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.report.samples = Some(samples);
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.report.iterations = Some(iterations);
        self
    }

    pub fn converged(mut self, converged: bool) -> Self {
        self.report.converged = Some(converged);
        self
    }

    pub fn residual(mut self, residual: f64) -> Self {
        self.report.residual = Some(residual);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

/// Callbacks invoked by [`RankingEngine`](super::runner::RankingEngine).
///
/// Every method has an empty default, so implementors override only what
/// they need.
pub trait RankObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    fn on_sampled(&mut self, _ranks: &RankVector) {}

    fn on_iterated(&mut self, _result: &SolverResult) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RankObserver for NoopObserver {}

/// Observer that records the report of every finished stage.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished stages in execution order.
    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    /// Sum of all stage durations.
    pub fn total(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }
}

impl RankObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, report.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_only_given_fields() {
        let report = StageReportBuilder::new(Duration::from_millis(3))
            .iterations(12)
            .converged(true)
            .build();

        assert_eq!(report.elapsed(), Duration::from_millis(3));
        assert_eq!(report.iterations(), Some(12));
        assert_eq!(report.converged(), Some(true));
        assert_eq!(report.samples(), None);
        assert_eq!(report.residual(), None);
    }

    #[test]
    fn test_timing_observer_records_in_order() {
        let mut obs = StageTimingObserver::new();
        obs.on_stage_start(STAGE_VALIDATE);
        obs.on_stage_end(STAGE_VALIDATE, &StageReport::new(Duration::from_millis(1)));
        obs.on_stage_end(STAGE_SAMPLE, &StageReport::new(Duration::from_millis(2)));

        let names: Vec<_> = obs.reports().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![STAGE_VALIDATE, STAGE_SAMPLE]);
        assert_eq!(obs.total(), Duration::from_millis(3));
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = StageClock::start();
        let first = clock.elapsed();
        assert!(clock.elapsed() >= first);
    }
}
