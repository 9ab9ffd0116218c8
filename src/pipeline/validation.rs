//! Validation engine for ranking configurations.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`RankConfig`] and collects every diagnostic into a
//! [`ValidationReport`]. It never short-circuits on the first error, so
//! users see all problems at once. The ranking engine then fails fast on
//! the first error before any estimator runs.
//!
//! # Quick start
//!
//! ```rust
//! use rapid_linkrank::pipeline::validation::ValidationEngine;
//! use rapid_linkrank::RankConfig;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&RankConfig::default().with_damping(1.5));
//! assert!(report.has_errors());
//! for issue in report.errors() {
//!     eprintln!("{issue}");
//! }
//! ```

use std::fmt;

use serde::Serialize;

use crate::errors::{RankError, Result};
use crate::types::RankConfig;

// ─── Issue codes ────────────────────────────────────────────────────────────

/// Stable machine-readable category of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A value lies outside its allowed range.
    OutOfRange,
    /// Two values are individually fine but contradict each other.
    Inconsistent,
    /// A legal value that is likely to give poor results.
    Suspicious,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfRange => "out_of_range",
            Self::Inconsistent => "inconsistent",
            Self::Suspicious => "suspicious",
        }
    }
}

/// A problem found in one configuration field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub code: IssueCode,
    pub field: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ConfigIssue {
    pub fn new(code: IssueCode, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            field,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.as_str(), self.field, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

impl From<ConfigIssue> for RankError {
    fn from(issue: ConfigIssue) -> Self {
        RankError::InvalidConfig {
            field: issue.field,
            message: issue.message,
        }
    }
}

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub issue: ConfigIssue,
}

impl ValidationDiagnostic {
    pub fn error(issue: ConfigIssue) -> Self {
        Self {
            severity: Severity::Error,
            issue,
        }
    }

    pub fn warning(issue: ConfigIssue) -> Self {
        Self {
            severity: Severity::Warning,
            issue,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.issue)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.issue)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Convert the first error into [`RankError::InvalidConfig`].
    pub fn into_result(self) -> Result<()> {
        match self.errors().next() {
            Some(issue) => Err(issue.clone().into()),
            None => Ok(()),
        }
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`RankConfig`] and returns
/// zero or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so they can be shared
/// across threads.
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"damping_range"`).
    fn name(&self) -> &str;

    /// Inspect `cfg` and return any findings.
    fn validate(&self, cfg: &RankConfig) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`RankConfig`] and collects
/// all diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(DampingRangeRule));
        engine.add_rule(Box::new(SampleBudgetRule));
        engine.add_rule(Box::new(ThresholdRule));
        engine.add_rule(Box::new(IterationCapRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run all rules against `cfg` and return the collected report.
    pub fn validate(&self, cfg: &RankConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(cfg));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. damping is a probability ────────────────────────────────────────────

struct DampingRangeRule;

impl ValidationRule for DampingRangeRule {
    fn name(&self) -> &str {
        "damping_range"
    }

    fn validate(&self, cfg: &RankConfig) -> Vec<ValidationDiagnostic> {
        if !(0.0..=1.0).contains(&cfg.damping) {
            vec![ValidationDiagnostic::error(
                ConfigIssue::new(
                    IssueCode::OutOfRange,
                    "damping",
                    format!("must be within [0, 1], got {}", cfg.damping),
                )
                .with_hint("0.85 is the usual choice"),
            )]
        } else if cfg.damping == 1.0 {
            // Without teleportation periodic graphs never settle
            vec![ValidationDiagnostic::warning(
                ConfigIssue::new(
                    IssueCode::Suspicious,
                    "damping",
                    "damping of 1.0 disables random jumps",
                )
                .with_hint("power iteration may hit max_iterations on cyclic graphs"),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 2. sample budget and chain split ───────────────────────────────────────

struct SampleBudgetRule;

impl ValidationRule for SampleBudgetRule {
    fn name(&self) -> &str {
        "sample_budget"
    }

    fn validate(&self, cfg: &RankConfig) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        if cfg.sample_count == 0 {
            out.push(ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::OutOfRange,
                "sample_count",
                "must be at least 1",
            )));
        }

        if cfg.chains == 0 {
            out.push(ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::OutOfRange,
                "chains",
                "must be at least 1",
            )));
        } else if cfg.sample_count > 0 && cfg.chains > cfg.sample_count {
            out.push(ValidationDiagnostic::error(
                ConfigIssue::new(
                    IssueCode::Inconsistent,
                    "chains",
                    format!(
                        "{} chains cannot share {} samples",
                        cfg.chains, cfg.sample_count
                    ),
                )
                .with_hint("Every chain needs at least one transition"),
            ));
        }

        if cfg.parallel && cfg.chains == 1 {
            out.push(ValidationDiagnostic::warning(
                ConfigIssue::new(
                    IssueCode::Suspicious,
                    "chains",
                    "a single sampling chain cannot run in parallel",
                )
                .with_hint("Set chains > 1 to parallelize sampling"),
            ));
        }

        out
    }
}

// ─── 3. convergence threshold is positive ───────────────────────────────────

struct ThresholdRule;

impl ValidationRule for ThresholdRule {
    fn name(&self) -> &str {
        "threshold"
    }

    fn validate(&self, cfg: &RankConfig) -> Vec<ValidationDiagnostic> {
        if !(cfg.threshold > 0.0) {
            vec![ValidationDiagnostic::error(ConfigIssue::new(
                IssueCode::OutOfRange,
                "threshold",
                format!("must be greater than 0, got {}", cfg.threshold),
            ))]
        } else if cfg.threshold >= 1.0 {
            vec![ValidationDiagnostic::warning(ConfigIssue::new(
                IssueCode::Suspicious,
                "threshold",
                format!("{} accepts the uniform vector as converged", cfg.threshold),
            ))]
        } else {
            vec![]
        }
    }
}

// ─── 4. iteration cap ───────────────────────────────────────────────────────

struct IterationCapRule;

impl ValidationRule for IterationCapRule {
    fn name(&self) -> &str {
        "iteration_cap"
    }

    fn validate(&self, cfg: &RankConfig) -> Vec<ValidationDiagnostic> {
        if cfg.max_iterations == 0 {
            vec![ValidationDiagnostic::error(
                ConfigIssue::new(IssueCode::OutOfRange, "max_iterations", "must be at least 1")
                    .with_hint("Use a large cap instead of disabling it"),
            )]
        } else {
            vec![]
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ValidationEngine {
        ValidationEngine::with_defaults()
    }

    // ─── Valid configs ──────────────────────────────────────────────────

    #[test]
    fn test_default_config_is_clean() {
        let report = engine().validate(&RankConfig::default());
        assert!(report.is_valid());
        assert!(report.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_boundary_damping_zero_is_valid() {
        let report = engine().validate(&RankConfig::default().with_damping(0.0));
        assert!(report.is_empty());
    }

    #[test]
    fn test_parallel_chains_are_valid() {
        let cfg = RankConfig::default().with_chains(4).with_parallel(true);
        assert!(engine().validate(&cfg).is_empty());
    }

    // ─── Errors ─────────────────────────────────────────────────────────

    #[test]
    fn test_damping_out_of_range_fails() {
        for damping in [-0.1, 1.5, f64::NAN] {
            let report = engine().validate(&RankConfig::default().with_damping(damping));
            assert!(report.has_errors());
            assert_eq!(report.errors().next().unwrap().field, "damping");
        }
    }

    #[test]
    fn test_zero_samples_fails() {
        let report = engine().validate(&RankConfig::default().with_sample_count(0));
        let fields: Vec<_> = report.errors().map(|e| e.field).collect();
        assert_eq!(fields, vec!["sample_count"]);
    }

    #[test]
    fn test_too_many_chains_fails() {
        let cfg = RankConfig::default().with_sample_count(3).with_chains(5);
        let report = engine().validate(&cfg);
        let issue = report.errors().next().unwrap();
        assert_eq!(issue.field, "chains");
        assert_eq!(issue.code, IssueCode::Inconsistent);
    }

    #[test]
    fn test_zero_chains_fails() {
        let report = engine().validate(&RankConfig::default().with_chains(0));
        assert!(report.has_errors());
    }

    #[test]
    fn test_nonpositive_threshold_fails() {
        for threshold in [0.0, -0.001, f64::NAN] {
            let report = engine().validate(&RankConfig::default().with_threshold(threshold));
            assert_eq!(report.errors().next().unwrap().field, "threshold");
        }
    }

    #[test]
    fn test_zero_iteration_cap_fails() {
        let report = engine().validate(&RankConfig::default().with_max_iterations(0));
        assert_eq!(report.errors().count(), 1);
    }

    #[test]
    fn test_all_rules_fire_independently() {
        let cfg = RankConfig::default()
            .with_damping(2.0)
            .with_sample_count(0)
            .with_threshold(0.0)
            .with_max_iterations(0);
        let report = engine().validate(&cfg);
        assert_eq!(report.errors().count(), 4);
    }

    // ─── Warnings ───────────────────────────────────────────────────────

    #[test]
    fn test_full_damping_warns() {
        let report = engine().validate(&RankConfig::default().with_damping(1.0));
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_loose_threshold_warns() {
        let report = engine().validate(&RankConfig::default().with_threshold(1.0));
        assert!(report.is_valid());
        assert_eq!(report.warnings().next().unwrap().field, "threshold");
    }

    #[test]
    fn test_parallel_single_chain_warns() {
        let report = engine().validate(&RankConfig::default().with_parallel(true));
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }

    // ─── Engine plumbing ────────────────────────────────────────────────

    #[test]
    fn test_into_result_uses_first_error() {
        let cfg = RankConfig::default().with_damping(2.0).with_sample_count(0);
        let err = engine().validate(&cfg).into_result().unwrap_err();
        assert!(matches!(err, RankError::InvalidConfig { field: "damping", .. }));
    }

    #[test]
    fn test_custom_rule() {
        struct NoSeedRule;

        impl ValidationRule for NoSeedRule {
            fn name(&self) -> &str {
                "require_seed"
            }

            fn validate(&self, cfg: &RankConfig) -> Vec<ValidationDiagnostic> {
                if cfg.seed.is_none() {
                    vec![ValidationDiagnostic::error(ConfigIssue::new(
                        IssueCode::Inconsistent,
                        "seed",
                        "reproducible runs need a seed",
                    ))]
                } else {
                    vec![]
                }
            }
        }

        let mut engine = ValidationEngine::with_defaults();
        engine.add_rule(Box::new(NoSeedRule));
        assert_eq!(engine.rule_names().last(), Some(&"require_seed"));

        assert!(engine.validate(&RankConfig::default()).has_errors());
        assert!(engine.validate(&RankConfig::default().with_seed(1)).is_valid());
    }

    #[test]
    fn test_issue_display() {
        let issue = ConfigIssue::new(IssueCode::OutOfRange, "damping", "too big").with_hint("lower it");
        assert_eq!(issue.to_string(), "[out_of_range] damping: too big (hint: lower it)");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = engine().validate(&RankConfig::default().with_sample_count(0));
        let json = serde_json::to_value(&report).unwrap();

        let diag = &json["diagnostics"][0];
        assert_eq!(diag["severity"], "error");
        assert_eq!(diag["code"], "out_of_range");
        assert_eq!(diag["field"], "sample_count");
        assert!(diag.get("hint").is_none());
    }
}
