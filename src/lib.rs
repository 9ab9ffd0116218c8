//! # rapid_linkrank
//!
//! PageRank for directed link graphs.
//!
//! Given a corpus mapping each page to the pages it links to, this library
//! estimates every page's rank two independent ways: a Monte-Carlo random
//! surfer that counts visits, and a power-iteration solver over the PageRank
//! recurrence. Both produce a [`RankVector`] summing to one.
//!
//! ## Features
//!
//! - **Reproducible**: the sampler takes an injected, seedable RNG and
//!   pages are ordered lexicographically
//! - **Mass-conserving**: dangling pages spread their rank over the universe
//! - **Bounded**: power iteration stops at a configurable iteration cap
//! - **Parallel**: optional rayon-backed solver updates and sampling chains
//!
//! ```
//! use std::collections::{HashMap, HashSet};
//! use rapid_linkrank::{CsrGraph, RankingEngine};
//!
//! let corpus: HashMap<&str, HashSet<&str>> = HashMap::from([
//!     ("1.html", HashSet::from(["2.html"])),
//!     ("2.html", HashSet::from(["1.html", "3.html"])),
//!     ("3.html", HashSet::new()),
//! ]);
//! let graph = CsrGraph::from_corpus(&corpus).unwrap();
//! let report = RankingEngine::builder().seed(1).build().run(&graph).unwrap();
//! assert!((report.iterated.sum() - 1.0).abs() < 1e-9);
//! ```

pub mod errors;
pub mod graph;
pub mod pagerank;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use errors::{RankError, Result};
pub use types::RankConfig;

// Re-export main functionality
pub use graph::{builder::LinkGraphBuilder, csr::CsrGraph};
pub use pagerank::{
    sampling::{sample_ranks, SamplingPageRank},
    standard::{iterate_ranks, SolverResult, StandardPageRank},
    transition::{distribute, TransitionDistribution},
    RankVector,
};
pub use pipeline::{RankReport, RankingEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
