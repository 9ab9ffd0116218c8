//! Link graph builder with deduplicated link handling
//!
//! This module provides a mutable graph builder that uses FxHashMap
//! for O(1) page lookups during construction. Freeze it into a
//! [`CsrGraph`](super::csr::CsrGraph) before ranking.

use rustc_hash::{FxHashMap, FxHashSet};

/// A page in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// The page identifier
    pub page: String,
    /// Outgoing links as builder node IDs
    pub links: FxHashSet<u32>,
}

impl BuilderNode {
    /// Create a new page with no outgoing links
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            links: FxHashSet::default(),
        }
    }
}

/// A mutable directed link graph optimized for incremental construction
///
/// Node IDs here follow insertion order. The frozen CSR form reassigns IDs
/// in lexicographic page order.
#[derive(Debug)]
pub struct LinkGraphBuilder {
    /// Maps page -> node ID
    page_to_id: FxHashMap<String, u32>,
    /// Node storage
    nodes: Vec<BuilderNode>,
}

impl Default for LinkGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkGraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self {
            page_to_id: FxHashMap::default(),
            nodes: Vec::new(),
        }
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            page_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Get or create a node for the given page, returning its ID
    pub fn add_page(&mut self, page: &str) -> u32 {
        if let Some(&id) = self.page_to_id.get(page) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.page_to_id.insert(page.to_string(), id);
        self.nodes.push(BuilderNode::new(page));
        id
    }

    /// Add a directed link between two existing nodes
    ///
    /// Self-links and duplicate links are ignored. Returns `true` if the
    /// link was newly inserted.
    pub fn add_link(&mut self, from: u32, to: u32) -> bool {
        if from == to || to as usize >= self.nodes.len() {
            return false;
        }

        match self.nodes.get_mut(from as usize) {
            Some(node) => node.links.insert(to),
            None => false,
        }
    }

    /// Add a directed link by page name, creating either page as needed
    pub fn link_pages(&mut self, from: &str, to: &str) -> bool {
        let from = self.add_page(from);
        let to = self.add_page(to);
        self.add_link(from, to)
    }

    /// Get the number of pages in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of directed links
    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(|n| n.links.len()).sum()
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by page
    pub fn get_node_id(&self, page: &str) -> Option<u32> {
        self.page_to_id.get(page).copied()
    }

    /// Iterate over all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }
}
