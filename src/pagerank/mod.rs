//! PageRank estimators
//!
//! This module provides the transition model, the Monte-Carlo sampling
//! estimator and the power-iteration solver, plus the [`RankVector`] they
//! all produce.

pub mod sampling;
pub mod standard;
pub mod transition;

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::{RankError, Result};
use crate::graph::csr::CsrGraph;

/// Per-page rank produced by an estimator
///
/// Covers every page of the universe exactly once, sorted by page
/// identifier. Serializes as a JSON object `page -> rank`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankVector {
    entries: Vec<(String, f64)>,
}

impl RankVector {
    /// Pair node-indexed scores with the graph's page identifiers
    pub(crate) fn from_scores(graph: &CsrGraph, scores: Vec<f64>) -> Self {
        debug_assert_eq!(scores.len(), graph.num_nodes);
        let entries = graph
            .pages
            .iter()
            .cloned()
            .zip(scores)
            .collect();
        Self { entries }
    }

    /// Get the rank of a page
    pub fn get(&self, page: &str) -> Option<f64> {
        self.entries
            .binary_search_by(|(p, _)| p.as_str().cmp(page))
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// Get the rank of a page, failing with [`RankError::UnknownPage`]
    pub fn rank(&self, page: &str) -> Result<f64> {
        self.get(page)
            .ok_or_else(|| RankError::UnknownPage(page.to_string()))
    }

    /// Iterate `(page, rank)` pairs sorted by page
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(p, r)| (p.as_str(), *r))
    }

    /// Ranks in page order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, r)| *r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all ranks (1.0 up to floating error)
    pub fn sum(&self) -> f64 {
        self.values().sum()
    }

    /// Get top N pages by rank, ties broken by page order
    pub fn top_n(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Largest absolute per-page difference to another vector
    ///
    /// Pages missing from `other` count as infinitely far apart.
    pub fn max_abs_diff(&self, other: &RankVector) -> f64 {
        if self.len() != other.len() {
            return f64::INFINITY;
        }
        self.entries
            .iter()
            .zip(&other.entries)
            .map(|((p, a), (q, b))| if p == q { (a - b).abs() } else { f64::INFINITY })
            .fold(0.0, f64::max)
    }
}

impl Serialize for RankVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (page, rank) in &self.entries {
            map.serialize_entry(page, rank)?;
        }
        map.end()
    }
}

/// One line per page, `  page: 0.1234`, sorted by page
impl fmt::Display for RankVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (page, rank) in self.iter() {
            writeln!(f, "  {page}: {rank:.4}")?;
        }
        Ok(())
    }
}

/// Damping must be a probability
pub(crate) fn check_damping(damping: f64) -> Result<()> {
    if (0.0..=1.0).contains(&damping) {
        Ok(())
    } else {
        Err(RankError::invalid_config(
            "damping",
            format!("must be within [0, 1], got {damping}"),
        ))
    }
}

/// Scale scores so they sum to exactly one (up to rounding)
pub(crate) fn normalize(scores: &mut [f64]) {
    let sum: f64 = scores.iter().sum();
    if sum > 0.0 {
        for score in scores.iter_mut() {
            *score /= sum;
        }
    }
}
