//! Engine configuration validation, orchestration and observation.
//!
//! ## Submodules
//!
//! - [`validation`]: Rule engine that checks a [`RankConfig`](crate::RankConfig)
//! - [`runner`]: The ranking engine running both estimators
//! - [`observer`]: Stage hooks for timing and debugging

pub mod observer;
pub mod runner;
pub mod validation;

// Re-export observer types.
pub use observer::{
    NoopObserver, RankObserver, StageClock, StageReport, StageReportBuilder, StageTimingObserver,
    STAGE_ITERATE, STAGE_SAMPLE, STAGE_VALIDATE,
};

// Re-export runner types.
pub use runner::{RankReport, RankingEngine, RankingEngineBuilder};

// Re-export validation types.
pub use validation::{
    ConfigIssue, IssueCode, Severity, ValidationDiagnostic, ValidationEngine, ValidationReport,
    ValidationRule,
};
