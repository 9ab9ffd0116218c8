//! Error types for rank computation
//!
//! Every fallible operation in the crate returns [`Result`], reporting
//! failures synchronously to the caller. Nothing is retried internally.

use thiserror::Error;

/// Errors produced by graph construction, the estimators, and the engine
#[derive(Debug, Error)]
pub enum RankError {
    /// An operation referenced a page outside the universe
    #[error("unknown page: {0:?}")]
    UnknownPage(String),

    /// A configuration value is out of range
    #[error("invalid config `{field}`: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    /// The universe has zero pages, so no estimator is defined
    #[error("corpus contains no pages")]
    EmptyCorpus,

    /// The corpus breaks the ingestion contract (e.g. a page links to itself)
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    /// The iterative solver hit its iteration cap before converging
    #[error("did not converge after {iterations} iterations (max delta {delta:e})")]
    DidNotConverge { iterations: usize, delta: f64 },

    /// A JSON configuration document could not be parsed
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl RankError {
    /// Shorthand for [`RankError::InvalidConfig`]
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Stable snake_case name of the error kind, suitable for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownPage(_) => "unknown_page",
            Self::InvalidConfig { .. } => "invalid_config",
            Self::EmptyCorpus => "empty_corpus",
            Self::InvalidCorpus(_) => "invalid_corpus",
            Self::DidNotConverge { .. } => "did_not_converge",
            Self::ConfigParse(_) => "config_parse",
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, RankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = RankError::UnknownPage("missing.html".into());
        assert_eq!(err.to_string(), "unknown page: \"missing.html\"");

        let err = RankError::invalid_config("damping", "must be within [0, 1], got 1.5");
        assert_eq!(
            err.to_string(),
            "invalid config `damping`: must be within [0, 1], got 1.5"
        );

        assert_eq!(RankError::EmptyCorpus.to_string(), "corpus contains no pages");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RankError::EmptyCorpus.kind(), "empty_corpus");
        assert_eq!(
            RankError::DidNotConverge {
                iterations: 3,
                delta: 0.5
            }
            .kind(),
            "did_not_converge"
        );
    }

    #[test]
    fn test_config_parse_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RankError = parse_err.into();
        assert_eq!(err.kind(), "config_parse");
    }
}
